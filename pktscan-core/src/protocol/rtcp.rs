//! RTCP packet descriptor.
//!
//! RTCP packets are usually sent compound: several packets back to back in
//! one UDP datagram. Each one gets its own record, bound after the previous.

use super::binding::{read_u16, BindContext, BindingRule, Predicate};
use super::builtin::{RTCP, UDP};
use super::descriptor::{HeaderDescriptor, HeaderLength};
use super::rtp::RTP_PORT;
use super::udp::uses_port;

/// Version/count byte, packet type and length word.
pub const RTCP_HEADER_LEN: usize = 4;

/// Default RTCP port, one above RTP.
pub const RTCP_PORT: u16 = RTP_PORT + 1;

/// RTCP packet types.
pub mod packet_type {
    /// Sender report
    pub const SR: u8 = 200;
    /// Receiver report
    pub const RR: u8 = 201;
    /// Source description
    pub const SDES: u8 = 202;
    pub const BYE: u8 = 203;
    /// Application-defined
    pub const APP: u8 = 204;
}

const VERSION_2: u8 = 0x80;

/// Length word counts 32-bit words minus one.
fn header_length(data: &[u8], offset: usize) -> Option<usize> {
    let words = read_u16(data, offset + 2)?;
    Some((usize::from(words) + 1) * 4)
}

/// Version 2 and one of the SR..APP packet types.
pub fn looks_like_rtcp(data: &[u8]) -> bool {
    data.len() >= RTCP_HEADER_LEN
        && data[0] & 0xC0 == VERSION_2
        && (packet_type::SR..=packet_type::APP).contains(&data[1])
}

fn on_rtcp_port(ctx: &BindContext<'_>) -> bool {
    uses_port(ctx, RTCP_PORT) && looks_like_rtcp(ctx.remaining())
}

fn next_in_compound(ctx: &BindContext<'_>) -> bool {
    looks_like_rtcp(ctx.remaining())
}

/// Dynamic-port RTCP, same port rule as dynamic RTP.
fn unprivileged_ports(ctx: &BindContext<'_>) -> bool {
    let ports_ok = matches!(
        (ctx.parent_u16(0), ctx.parent_u16(2)),
        (Some(src), Some(dst)) if src >= 1024 && dst >= 1024
    );
    ports_ok && looks_like_rtcp(ctx.remaining())
}

const BINDINGS: &[BindingRule] = &[
    BindingRule::new(UDP, Predicate::Fn(on_rtcp_port)),
    BindingRule::new(RTCP, Predicate::Fn(next_in_compound)),
];

const HEURISTICS: &[BindingRule] = &[BindingRule::new(UDP, Predicate::Fn(unprivileged_ports))];

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(RTCP, "rtcp", HeaderLength::Computed(header_length))
        .display_name("RTCP")
        .bindings(BINDINGS)
        .heuristics(HEURISTICS)
}
