//! BSD loopback ("null") header descriptor.
//!
//! A 4-byte address family in the byte order of the capturing host, which
//! may differ from the reader's. Both orders are accepted.

use super::binding::BindContext;
use super::builtin::NULL_HEADER;
use super::descriptor::{HeaderDescriptor, HeaderLength};

pub const NULL_HEADER_LEN: usize = 4;

/// Address families seen in loopback headers.
pub mod family {
    pub const INET: u32 = 2;
    /// AF_INET6 on NetBSD, OpenBSD and Linux
    pub const INET6_BSD: u32 = 24;
    /// AF_INET6 on FreeBSD
    pub const INET6_FREEBSD: u32 = 28;
    /// AF_INET6 on macOS
    pub const INET6_DARWIN: u32 = 30;
}

fn address_family(ctx: &BindContext<'_>) -> Option<u32> {
    let header = ctx.parent_header();
    let bytes: [u8; 4] = header.get(..4)?.try_into().ok()?;
    let little = u32::from_le_bytes(bytes);
    // Families are small; a big value means the other byte order
    Some(if little <= 0xFFFF {
        little
    } else {
        u32::from_be_bytes(bytes)
    })
}

pub fn carries_ipv4(ctx: &BindContext<'_>) -> bool {
    address_family(ctx) == Some(family::INET)
}

pub fn carries_ipv6(ctx: &BindContext<'_>) -> bool {
    matches!(
        address_family(ctx),
        Some(family::INET6_BSD | family::INET6_FREEBSD | family::INET6_DARWIN)
    )
}

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(NULL_HEADER, "null", HeaderLength::Fixed(NULL_HEADER_LEN))
        .display_name("Null/Loopback")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(data: &[u8]) -> BindContext<'_> {
        BindContext {
            data,
            parent: NULL_HEADER,
            parent_offset: 0,
            parent_length: NULL_HEADER_LEN,
            offset: NULL_HEADER_LEN,
        }
    }

    #[test]
    fn test_family_either_byte_order() {
        assert!(carries_ipv4(&ctx(&[0x02, 0x00, 0x00, 0x00, 0x45])));
        assert!(carries_ipv4(&ctx(&[0x00, 0x00, 0x00, 0x02, 0x45])));
        assert!(!carries_ipv6(&ctx(&[0x02, 0x00, 0x00, 0x00])));

        assert!(carries_ipv6(&ctx(&[0x1e, 0x00, 0x00, 0x00, 0x60])));
        assert!(carries_ipv6(&ctx(&[0x00, 0x00, 0x00, 0x18, 0x60])));
        assert!(carries_ipv6(&ctx(&[0x1c, 0x00, 0x00, 0x00, 0x60])));
    }

    #[test]
    fn test_short_header_carries_nothing() {
        assert!(!carries_ipv4(&ctx(&[0x02, 0x00])));
    }
}
