//! Linux "cooked" capture (SLL) header descriptor.
//!
//! Used for captures on the "any" interface. The header ends with a protocol
//! field holding an ethertype, so the ethertype bindings apply unchanged.

use super::builtin::SLL;
use super::descriptor::{HeaderDescriptor, HeaderLength};

/// Packet type, ARPHRD type, address length, 8-byte address, protocol.
pub const LINUX_SLL_HEADER_LEN: usize = 16;

/// `sll_pkttype` values.
pub mod packet_type {
    pub const HOST: u16 = 0;
    pub const BROADCAST: u16 = 1;
    pub const MULTICAST: u16 = 2;
    pub const OTHERHOST: u16 = 3;
    pub const OUTGOING: u16 = 4;
}

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(SLL, "linux_sll", HeaderLength::Fixed(LINUX_SLL_HEADER_LEN))
        .display_name("Linux cooked capture")
}
