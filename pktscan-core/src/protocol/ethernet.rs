//! Ethernet II header descriptor.

use super::binding::read_u16;
use super::builtin::ETHERNET;
use super::descriptor::{HeaderDescriptor, HeaderLength};

/// Ethernet II header: two MAC addresses and an ethertype.
pub const ETHERNET_HEADER_LEN: usize = 14;

/// Largest type/length value that is an 802.3 length rather than an ethertype.
pub const MAX_8023_LENGTH: u16 = 1500;

/// Well-known EtherType values (IEEE 802).
pub mod ethertype {
    pub const IPV4: u16 = 0x0800;
    pub const ARP: u16 = 0x0806;
    pub const VLAN: u16 = 0x8100;
    pub const IPV6: u16 = 0x86DD;
    pub const QINQ: u16 = 0x88A8;
    /// Pre-standard QinQ tag
    pub const VLAN_LEGACY: u16 = 0x9100;
}

/// Bytes after the frame's declared content, before the capture end.
///
/// Ethernet pads short frames to 60 bytes, and some captures carry a trailing
/// FCS. The enclosed IPv4/IPv6 length (or the 802.3 length field) says where
/// the real content stops; anything past that is trailer. Unknown content or
/// an implausible length yields no trailer.
pub(crate) fn trailer_length(data: &[u8], offset: usize) -> Option<usize> {
    let content_start = offset.checked_add(ETHERNET_HEADER_LEN)?;
    let type_or_len = read_u16(data, offset + 12)?;

    let content_len = match type_or_len {
        ethertype::IPV4 => {
            let ihl = usize::from(data.get(content_start)? & 0x0F) * 4;
            let total = usize::from(read_u16(data, content_start + 2)?);
            if ihl < 20 || total < ihl {
                return None;
            }
            total
        }
        ethertype::IPV6 => 40 + usize::from(read_u16(data, content_start + 4)?),
        len if len <= MAX_8023_LENGTH => usize::from(len),
        _ => return None,
    };

    let content_end = content_start.checked_add(content_len)?;
    data.len().checked_sub(content_end).filter(|&trailer| trailer > 0)
}

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(ETHERNET, "ethernet", HeaderLength::Fixed(ETHERNET_HEADER_LEN))
        .display_name("Ethernet")
        .postfix(trailer_length)
}
