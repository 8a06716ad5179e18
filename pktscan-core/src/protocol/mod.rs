//! Protocol descriptors, binding rules and the registry that holds them.
//!
//! Each built-in protocol lives in its own module and exposes a
//! `descriptor()` carrying its length function and the forward bindings that
//! say which parents it may follow. [`default_registry`] registers all of them
//! in a fixed order, which is also the tie-break order for bindings.

pub mod binding;
pub mod descriptor;
pub mod dlt;
pub mod id;
pub mod registry;

pub mod arp;
pub mod ethernet;
pub mod http;
pub mod icmp;
pub mod ieee802;
pub mod ipv4;
pub mod ipv6;
pub mod l2tp;
pub mod linux_sll;
pub mod null;
pub mod payload;
pub mod ppp;
pub mod rip;
pub mod rtcp;
pub mod rtp;
pub mod sctp;
pub mod tcp;
pub mod udp;
pub mod vlan;

#[cfg(test)]
pub mod test_utils;

pub use binding::{Anchor, BindContext, BindingRule, FieldMatch, FieldWidth, Parent, Predicate};
pub use descriptor::{HeaderDescriptor, HeaderLength, SubHeaderSlot};
pub use id::{id_to_mask, mask_to_group, mask_to_id, ProtocolId, ProtocolSet, MAX_ID_COUNT};
pub use registry::ProtocolRegistry;

use crate::error::RegistryError;

/// Ids of the built-in protocols.
///
/// Ids below [`LAST_BUILTIN_ID`](builtin::LAST_BUILTIN_ID) are reserved for
/// this table; descriptors registered without an id are numbered from there.
pub mod builtin {
    use super::ProtocolId;

    pub const PAYLOAD: ProtocolId = ProtocolId::from_raw(0);
    pub const ETHERNET: ProtocolId = ProtocolId::from_raw(1);
    pub const IPV4: ProtocolId = ProtocolId::from_raw(2);
    pub const IPV6: ProtocolId = ProtocolId::from_raw(3);
    pub const TCP: ProtocolId = ProtocolId::from_raw(4);
    pub const UDP: ProtocolId = ProtocolId::from_raw(5);
    pub const IEEE_802DOT3: ProtocolId = ProtocolId::from_raw(6);
    pub const IEEE_802DOT2: ProtocolId = ProtocolId::from_raw(7);
    pub const IEEE_SNAP: ProtocolId = ProtocolId::from_raw(8);
    pub const IEEE_802DOT1Q: ProtocolId = ProtocolId::from_raw(9);
    pub const L2TP: ProtocolId = ProtocolId::from_raw(10);
    pub const PPP: ProtocolId = ProtocolId::from_raw(11);
    pub const ICMP: ProtocolId = ProtocolId::from_raw(12);
    pub const HTTP: ProtocolId = ProtocolId::from_raw(13);
    pub const ARP: ProtocolId = ProtocolId::from_raw(16);
    pub const SLL: ProtocolId = ProtocolId::from_raw(20);
    pub const NULL_HEADER: ProtocolId = ProtocolId::from_raw(21);
    pub const RIP: ProtocolId = ProtocolId::from_raw(22);

    // Group 1
    pub const SCTP: ProtocolId = ProtocolId::from_raw(32);
    /// First SCTP chunk id; chunk type `t` maps to `SCTP_CHUNK_BASE + t`.
    pub const SCTP_CHUNK_BASE: u16 = 33;
    pub const SCTP_DATA: ProtocolId = ProtocolId::from_raw(SCTP_CHUNK_BASE);
    pub const SCTP_SHUTDOWN_COMPLETE: ProtocolId = ProtocolId::from_raw(SCTP_CHUNK_BASE + 14);
    pub const RTP: ProtocolId = ProtocolId::from_raw(48);
    pub const RTCP: ProtocolId = ProtocolId::from_raw(49);

    /// First id handed out to descriptors registered without one.
    pub const LAST_BUILTIN_ID: u16 = 64;
}

/// Register every built-in descriptor, binding and link-type mapping.
pub fn register_builtins(registry: &mut ProtocolRegistry) -> Result<(), RegistryError> {
    // Layer 2
    registry.register(ethernet::descriptor())?;
    registry.register(ieee802::dot3_descriptor())?;
    registry.register(ieee802::llc_descriptor())?;
    registry.register(ieee802::snap_descriptor())?;
    registry.register(vlan::descriptor())?;
    registry.register(linux_sll::descriptor())?;
    registry.register(null::descriptor())?;
    registry.register(ppp::descriptor())?;

    // Layer 3
    registry.register(arp::descriptor())?;
    registry.register(ipv4::descriptor())?;
    registry.register(ipv6::descriptor())?;
    registry.register(icmp::descriptor())?;

    // Layer 4
    registry.register(tcp::descriptor())?;
    registry.register(udp::descriptor())?;
    registry.register(sctp::descriptor())?;
    sctp::register_chunks(registry)?;

    // Tunnels and application layer
    registry.register(l2tp::descriptor())?;
    registry.register(http::descriptor())?;
    registry.register(rtp::descriptor())?;
    registry.register(rtcp::descriptor())?;
    registry.register(rip::descriptor())?;

    dlt::register_defaults(registry)
}

/// Create a registry with all built-in protocols.
pub fn default_registry() -> ProtocolRegistry {
    let mut registry = ProtocolRegistry::new();
    if let Err(e) = register_builtins(&mut registry) {
        tracing::error!(error = %e, "built-in protocol table is inconsistent");
    }
    registry
}
