//! TCP header descriptor and option dissector.

use super::binding::{BindContext, BindingRule, Predicate};
use super::builtin::{IPV4, IPV6, TCP};
use super::descriptor::{HeaderDescriptor, HeaderLength, SubHeaderSlot};
use super::ipv4::{self, ip_proto};
use crate::subheader::{SubHeaderContainer, MAX_SUB_HEADERS};

/// TCP header without options.
pub const TCP_MIN_HEADER_LEN: usize = 20;

/// TCP option kinds.
pub mod option {
    pub const END_OF_LIST: u8 = 0;
    pub const NO_OPERATION: u8 = 1;
    pub const MSS: u8 = 2;
    pub const WINDOW_SCALE: u8 = 3;
    pub const SACK_PERMITTED: u8 = 4;
    pub const SACK: u8 = 5;
    pub const TIMESTAMP: u8 = 8;
    pub const USER_TIMEOUT: u8 = 28;
    pub const AUTHENTICATION: u8 = 29;
    pub const MULTIPATH: u8 = 30;
    pub const FAST_OPEN: u8 = 34;
}

const OPTION_SLOTS: &[SubHeaderSlot] = &[
    SubHeaderSlot::new(option::MSS, "mss"),
    SubHeaderSlot::new(option::WINDOW_SCALE, "window_scale"),
    SubHeaderSlot::new(option::SACK_PERMITTED, "sack_permitted"),
    SubHeaderSlot::new(option::SACK, "sack"),
    SubHeaderSlot::new(option::TIMESTAMP, "timestamp"),
    SubHeaderSlot::new(option::USER_TIMEOUT, "user_timeout"),
    SubHeaderSlot::new(option::AUTHENTICATION, "authentication"),
    SubHeaderSlot::new(option::MULTIPATH, "multipath"),
    SubHeaderSlot::new(option::FAST_OPEN, "fast_open"),
];

fn over_ipv4(ctx: &BindContext<'_>) -> bool {
    ipv4::carries(ctx, ip_proto::TCP)
}

const BINDINGS: &[BindingRule] = &[
    BindingRule::new(IPV4, Predicate::Fn(over_ipv4)),
    BindingRule::new(IPV6, Predicate::parent_u8(6, ip_proto::TCP)),
];

/// Data offset in 32-bit words, never less than the fixed header.
fn header_length(data: &[u8], offset: usize) -> Option<usize> {
    let doff = usize::from(*data.get(offset + 12)? >> 4) * 4;
    Some(doff.max(TCP_MIN_HEADER_LEN))
}

/// Index options by kind; repeats keep the first instance.
fn dissect_options(header: &[u8], container: &mut SubHeaderContainer) {
    let mut i = TCP_MIN_HEADER_LEN;
    while i < header.len() {
        let kind = header[i];
        match kind {
            option::END_OF_LIST => break,
            option::NO_OPERATION => i += 1,
            _ => {
                let len = match header.get(i + 1) {
                    Some(&len) if len >= 2 => usize::from(len),
                    _ => break,
                };
                if i + len > header.len() {
                    break;
                }
                if usize::from(kind) < MAX_SUB_HEADERS {
                    let _ = container.add_header(usize::from(kind), i, len);
                }
                i += len;
            }
        }
    }
}

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(TCP, "tcp", HeaderLength::Computed(header_length))
        .display_name("TCP")
        .bindings(BINDINGS)
        .sub_headers(dissect_options, OPTION_SLOTS)
}
