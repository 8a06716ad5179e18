//! L2TPv2 header descriptor.
//!
//! The header is variable: the flags word decides whether the length,
//! sequence numbers and offset padding fields are present.

use super::binding::{read_u16, BindContext, BindingRule, Predicate};
use super::builtin::{L2TP, UDP};
use super::descriptor::{HeaderDescriptor, HeaderLength};
use super::udp::uses_port;

/// Well-known L2TP port.
pub const L2TP_PORT: u16 = 1701;

/// Flag bits in the first header word.
pub mod flags {
    /// Control message
    pub const TYPE: u16 = 0x8000;
    pub const LENGTH: u16 = 0x4000;
    pub const SEQUENCE: u16 = 0x0800;
    pub const OFFSET: u16 = 0x0200;
    pub const PRIORITY: u16 = 0x0100;
}

/// Data messages carry PPP; control messages carry AVPs.
pub fn is_data_message(flag_word: u16) -> bool {
    flag_word & flags::TYPE == 0
}

fn header_length(data: &[u8], offset: usize) -> Option<usize> {
    let flag_word = read_u16(data, offset)?;

    let mut len = 2;
    if flag_word & flags::LENGTH != 0 {
        len += 2;
    }
    // Tunnel and session ids
    len += 4;
    if flag_word & flags::SEQUENCE != 0 {
        len += 4;
    }
    if flag_word & flags::OFFSET != 0 {
        let pad = read_u16(data, offset + len)?;
        len += 2 + usize::from(pad);
    }
    Some(len)
}

fn over_udp(ctx: &BindContext<'_>) -> bool {
    uses_port(ctx, L2TP_PORT)
}

const BINDINGS: &[BindingRule] = &[BindingRule::new(UDP, Predicate::Fn(over_udp))];

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(L2TP, "l2tp", HeaderLength::Computed(header_length))
        .display_name("L2TP")
        .bindings(BINDINGS)
}
