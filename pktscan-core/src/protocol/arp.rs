//! ARP header descriptor.

use super::binding::{BindingRule, Predicate};
use super::builtin::{ARP, ETHERNET, IEEE_802DOT1Q, IEEE_SNAP, SLL};
use super::descriptor::{HeaderDescriptor, HeaderLength};
use super::ethernet::ethertype;

/// Fixed part: hardware/protocol type and sizes, operation.
pub const ARP_FIXED_LEN: usize = 8;

/// Fixed part plus sender and target hardware/protocol addresses.
fn arp_length(data: &[u8], offset: usize) -> Option<usize> {
    let hlen = usize::from(*data.get(offset + 4)?);
    let plen = usize::from(*data.get(offset + 5)?);
    Some(ARP_FIXED_LEN + 2 * (hlen + plen))
}

const BINDINGS: &[BindingRule] = &[
    BindingRule::new(ETHERNET, Predicate::ethertype(ethertype::ARP)),
    BindingRule::new(IEEE_802DOT1Q, Predicate::ethertype(ethertype::ARP)),
    BindingRule::new(IEEE_SNAP, Predicate::ethertype(ethertype::ARP)),
    BindingRule::new(SLL, Predicate::ethertype(ethertype::ARP)),
];

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(ARP, "arp", HeaderLength::Computed(arp_length))
        .display_name("ARP")
        .bindings(BINDINGS)
}
