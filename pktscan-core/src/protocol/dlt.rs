//! Data-link type numbers and their default start protocols.
//!
//! Values are the `LINKTYPE_*` numbers found in pcap file headers.

use super::builtin::{ETHERNET, IEEE_802DOT3, IPV4, NULL_HEADER, PPP, SLL};
use super::registry::ProtocolRegistry;
use crate::error::RegistryError;

/// BSD loopback encapsulation
pub const LINKTYPE_NULL: u32 = 0;
/// Ethernet (10Mb and up)
pub const LINKTYPE_ETHERNET: u32 = 1;
/// IEEE 802.5 / 802.3 framing
pub const LINKTYPE_IEEE802: u32 = 6;
/// Point-to-point protocol
pub const LINKTYPE_PPP: u32 = 9;
/// Raw IP as numbered on some BSDs
pub const LINKTYPE_RAW_BSD: u32 = 12;
/// Raw IP as numbered on OpenBSD
pub const LINKTYPE_RAW_OPENBSD: u32 = 14;
/// Raw IP
pub const LINKTYPE_RAW: u32 = 101;
/// OpenBSD loopback encapsulation
pub const LINKTYPE_LOOP: u32 = 108;
/// Linux "cooked" capture encapsulation
pub const LINKTYPE_LINUX_SLL: u32 = 113;

/// Map the link types the built-in protocols understand.
pub fn register_defaults(registry: &mut ProtocolRegistry) -> Result<(), RegistryError> {
    registry.register_dlt(LINKTYPE_NULL, NULL_HEADER)?;
    registry.register_dlt(LINKTYPE_ETHERNET, ETHERNET)?;
    registry.register_dlt(LINKTYPE_IEEE802, IEEE_802DOT3)?;
    registry.register_dlt(LINKTYPE_PPP, PPP)?;
    registry.register_dlt(LINKTYPE_RAW_BSD, IPV4)?;
    registry.register_dlt(LINKTYPE_RAW_OPENBSD, IPV4)?;
    registry.register_dlt(LINKTYPE_RAW, IPV4)?;
    registry.register_dlt(LINKTYPE_LOOP, NULL_HEADER)?;
    registry.register_dlt(LINKTYPE_LINUX_SLL, SLL)?;
    Ok(())
}
