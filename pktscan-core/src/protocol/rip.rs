//! RIP descriptor.
//!
//! The record spans the command header and every route entry after it, up
//! to the end of the datagram.

use super::binding::{BindContext, BindingRule, Predicate};
use super::builtin::{RIP, UDP};
use super::descriptor::{HeaderDescriptor, HeaderLength};
use super::udp::uses_port;

pub const RIP_PORT: u16 = 520;

/// Command, version and two reserved bytes.
pub const RIP_HEADER_LEN: usize = 4;

/// Address family, route tag, address, mask, next hop and metric.
pub const RIP_ENTRY_LEN: usize = 20;

pub mod command {
    pub const REQUEST: u8 = 1;
    pub const RESPONSE: u8 = 2;
}

fn header_length(data: &[u8], offset: usize) -> Option<usize> {
    Some(data.len().saturating_sub(offset).max(RIP_HEADER_LEN))
}

/// Route entries in a RIP message of `length` bytes.
pub fn entry_count(length: usize) -> usize {
    length.saturating_sub(RIP_HEADER_LEN) / RIP_ENTRY_LEN
}

fn over_udp(ctx: &BindContext<'_>) -> bool {
    uses_port(ctx, RIP_PORT)
}

const BINDINGS: &[BindingRule] = &[BindingRule::new(UDP, Predicate::Fn(over_udp))];

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(RIP, "rip", HeaderLength::Computed(header_length))
        .display_name("RIP")
        .bindings(BINDINGS)
}
