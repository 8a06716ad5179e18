//! IPv4 header descriptor and option dissector.
//!
//! The header length is IHL * 4, options and padding included.

use super::binding::{BindContext, BindingRule, Predicate};
use super::builtin::{ETHERNET, IEEE_802DOT1Q, IEEE_SNAP, IPV4, IPV6, NULL_HEADER, PPP, SLL};
use super::descriptor::{HeaderDescriptor, HeaderLength, SubHeaderSlot};
use super::ethernet::ethertype;
use super::{null, ppp};
use crate::packet::HeaderFlags;
use crate::subheader::SubHeaderContainer;

/// IPv4 header without options.
pub const IPV4_MIN_HEADER_LEN: usize = 20;

/// IP protocol numbers used by the built-in bindings.
pub mod ip_proto {
    pub const ICMP: u8 = 1;
    pub const IPIP: u8 = 4;
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
    pub const IPV6: u8 = 41;
    pub const SCTP: u8 = 132;
}

/// IPv4 option numbers (copy and class bits stripped).
pub mod option {
    pub const END_OF_LIST: u8 = 0;
    pub const NO_OPERATION: u8 = 1;
    pub const SECURITY: u8 = 2;
    pub const LOOSE_SOURCE_ROUTE: u8 = 3;
    pub const TIMESTAMP: u8 = 4;
    pub const RECORD_ROUTE: u8 = 7;
    pub const STREAM_ID: u8 = 8;
    pub const STRICT_SOURCE_ROUTE: u8 = 9;
    pub const ROUTER_ALERT: u8 = 20;
}

const OPTION_SLOTS: &[SubHeaderSlot] = &[
    SubHeaderSlot::new(option::SECURITY, "security"),
    SubHeaderSlot::new(option::LOOSE_SOURCE_ROUTE, "loose_source_route"),
    SubHeaderSlot::new(option::TIMESTAMP, "timestamp"),
    SubHeaderSlot::new(option::RECORD_ROUTE, "record_route"),
    SubHeaderSlot::new(option::STREAM_ID, "stream_id"),
    SubHeaderSlot::new(option::STRICT_SOURCE_ROUTE, "strict_source_route"),
    SubHeaderSlot::new(option::ROUTER_ALERT, "router_alert"),
];

const BINDINGS: &[BindingRule] = &[
    BindingRule::new(ETHERNET, Predicate::ethertype(ethertype::IPV4)),
    BindingRule::new(IEEE_802DOT1Q, Predicate::ethertype(ethertype::IPV4)),
    BindingRule::new(IEEE_SNAP, Predicate::ethertype(ethertype::IPV4)),
    BindingRule::new(SLL, Predicate::ethertype(ethertype::IPV4)),
    BindingRule::new(PPP, Predicate::ethertype(ppp::PPP_IPV4)),
    BindingRule::new(NULL_HEADER, Predicate::Fn(null::carries_ipv4)),
    BindingRule::new(IPV4, Predicate::Fn(ipip)),
    BindingRule::new(IPV6, Predicate::parent_u8(6, ip_proto::IPIP)),
];

/// Header length declared by IHL, never less than the fixed header.
fn header_length(data: &[u8], offset: usize) -> Option<usize> {
    let ihl = usize::from(*data.get(offset)? & 0x0F) * 4;
    Some(ihl.max(IPV4_MIN_HEADER_LEN))
}

/// More Fragments bit in the flags/fragment-offset word.
const MORE_FRAGMENTS: u16 = 0x2000;

/// Fragment offset field, in 8-byte units.
fn fragment_offset(header: &[u8]) -> Option<u16> {
    let bytes = header.get(6..8)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]) & 0x1FFF)
}

/// Any fragment of a split datagram, the first one included.
fn classify(header: &[u8]) -> HeaderFlags {
    let Some(bytes) = header.get(6..8) else {
        return HeaderFlags::empty();
    };
    let word = u16::from_be_bytes([bytes[0], bytes[1]]);
    if word & MORE_FRAGMENTS != 0 || word & 0x1FFF != 0 {
        HeaderFlags::FRAGMENTED
    } else {
        HeaderFlags::empty()
    }
}

/// True if the IPv4 parent carries `proto` and is a first (or only) fragment.
///
/// Later fragments hold the middle of an upper-layer PDU, so nothing is bound
/// to them and their bytes become payload.
pub fn carries(ctx: &BindContext<'_>, proto: u8) -> bool {
    ctx.parent_u8(9) == Some(proto) && fragment_offset(ctx.parent_header()) == Some(0)
}

fn ipip(ctx: &BindContext<'_>) -> bool {
    carries(ctx, ip_proto::IPIP)
}

/// Index options by number; repeats keep the first instance.
fn dissect_options(header: &[u8], container: &mut SubHeaderContainer) {
    let mut i = IPV4_MIN_HEADER_LEN;
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
                let _ = container.add_header(usize::from(kind & 0x1F), i, len);
                i += len;
            }
        }
    }
}

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(IPV4, "ipv4", HeaderLength::Computed(header_length))
        .display_name("IPv4")
        .classify(classify)
        .bindings(BINDINGS)
        .sub_headers(dissect_options, OPTION_SLOTS)
}
