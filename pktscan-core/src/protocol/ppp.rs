//! PPP header descriptor.

use super::binding::{BindContext, BindingRule, Predicate};
use super::builtin::{L2TP, PPP};
use super::descriptor::{HeaderDescriptor, HeaderLength};
use super::l2tp;

/// PPP protocol number for IPv4.
pub const PPP_IPV4: u16 = 0x0021;
/// PPP protocol number for IPv6.
pub const PPP_IPV6: u16 = 0x0057;

/// HDLC address and control bytes that may precede the protocol field.
const HDLC_ADDRESS: u8 = 0xFF;
const HDLC_CONTROL: u8 = 0x03;

fn header_length(data: &[u8], offset: usize) -> Option<usize> {
    let head = data.get(offset..offset + 2)?;
    if head == [HDLC_ADDRESS, HDLC_CONTROL] {
        Some(4)
    } else {
        Some(2)
    }
}

fn over_l2tp(ctx: &BindContext<'_>) -> bool {
    ctx.parent_u16(0).is_some_and(l2tp::is_data_message)
}

const BINDINGS: &[BindingRule] = &[BindingRule::new(L2TP, Predicate::Fn(over_l2tp))];

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(PPP, "ppp", HeaderLength::Computed(header_length))
        .display_name("PPP")
        .bindings(BINDINGS)
}
