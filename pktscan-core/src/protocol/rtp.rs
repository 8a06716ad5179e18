//! RTP header descriptor.

use super::binding::{read_u16, BindContext, BindingRule, Predicate};
use super::builtin::{RTP, UDP};
use super::descriptor::{HeaderDescriptor, HeaderLength};
use super::udp::uses_port;

/// Fixed part: flags, payload type, sequence, timestamp, SSRC.
pub const RTP_FIXED_LEN: usize = 12;

/// Default RTP port for RTP/AVP.
pub const RTP_PORT: u16 = 5004;

const VERSION_2: u8 = 0x80;
const EXTENSION: u8 = 0x10;

/// Fixed part, CSRC list and the optional header extension.
fn header_length(data: &[u8], offset: usize) -> Option<usize> {
    let first = *data.get(offset)?;
    let mut len = RTP_FIXED_LEN + 4 * usize::from(first & 0x0F);
    if first & EXTENSION != 0 {
        let words = read_u16(data, offset + len + 2)?;
        len += 4 + 4 * usize::from(words);
    }
    Some(len)
}

/// Version 2, not an RTCP packet type, long enough for the fixed part.
pub fn looks_like_rtp(data: &[u8]) -> bool {
    if data.len() < RTP_FIXED_LEN || data[0] & 0xC0 != VERSION_2 {
        return false;
    }
    // RTCP SR..APP land on 72..=76 once the marker bit is masked off
    !(72..=76).contains(&(data[1] & 0x7F))
}

fn on_rtp_port(ctx: &BindContext<'_>) -> bool {
    uses_port(ctx, RTP_PORT) && looks_like_rtp(ctx.remaining())
}

/// Dynamic-port RTP; well-known ports below 1024 are left alone.
fn unprivileged_ports(ctx: &BindContext<'_>) -> bool {
    let ports_ok = matches!(
        (ctx.parent_u16(0), ctx.parent_u16(2)),
        (Some(src), Some(dst)) if src >= 1024 && dst >= 1024
    );
    ports_ok && looks_like_rtp(ctx.remaining())
}

const BINDINGS: &[BindingRule] = &[BindingRule::new(UDP, Predicate::Fn(on_rtp_port))];

const HEURISTICS: &[BindingRule] = &[BindingRule::new(UDP, Predicate::Fn(unprivileged_ports))];

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(RTP, "rtp", HeaderLength::Computed(header_length))
        .display_name("RTP")
        .bindings(BINDINGS)
        .heuristics(HEURISTICS)
}
