//! IEEE 802.1Q VLAN tag descriptor.

use super::binding::{BindingRule, Predicate};
use super::builtin::{ETHERNET, IEEE_802DOT1Q, IEEE_SNAP, SLL};
use super::descriptor::{HeaderDescriptor, HeaderLength};
use super::ethernet::ethertype;

/// TCI plus the inner ethertype.
pub const VLAN_TAG_LEN: usize = 4;

const BINDINGS: &[BindingRule] = &[
    BindingRule::new(ETHERNET, Predicate::ethertype(ethertype::VLAN)),
    BindingRule::new(ETHERNET, Predicate::ethertype(ethertype::QINQ)),
    BindingRule::new(ETHERNET, Predicate::ethertype(ethertype::VLAN_LEGACY)),
    // Stacked tags
    BindingRule::new(IEEE_802DOT1Q, Predicate::ethertype(ethertype::VLAN)),
    BindingRule::new(IEEE_802DOT1Q, Predicate::ethertype(ethertype::QINQ)),
    BindingRule::new(IEEE_SNAP, Predicate::ethertype(ethertype::VLAN)),
    BindingRule::new(SLL, Predicate::ethertype(ethertype::VLAN)),
];

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(IEEE_802DOT1Q, "vlan", HeaderLength::Fixed(VLAN_TAG_LEN))
        .display_name("802.1Q VLAN")
        .bindings(BINDINGS)
}
