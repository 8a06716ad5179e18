//! SCTP common header and chunk descriptors.
//!
//! Every chunk type from DATA (0) to SHUTDOWN COMPLETE (14) gets its own id,
//! `SCTP_CHUNK_BASE + type`, so chunk sequences appear as consecutive header
//! records. Chunk padding to a 4-byte boundary is reported as gap.
//!
//! INIT and INIT ACK chunks carry type-length-value parameters after their
//! fixed fields; those are indexed as sub-headers.

use super::binding::{BindContext, BindingRule, Predicate};
use super::builtin::{IPV4, IPV6, SCTP, SCTP_CHUNK_BASE};
use super::descriptor::{HeaderDescriptor, HeaderLength, SubHeaderSlot};
use super::id::ProtocolId;
use super::ipv4::{self, ip_proto};
use super::registry::ProtocolRegistry;
use crate::error::RegistryError;
use crate::subheader::SubHeaderContainer;

/// Ports, verification tag and checksum.
pub const SCTP_HEADER_LEN: usize = 12;

/// Type, flags and length.
pub const CHUNK_HEADER_LEN: usize = 4;

/// Chunk header plus the fixed INIT / INIT ACK fields (tag, window, streams, TSN).
pub const INIT_FIXED_LEN: usize = 20;

/// Chunk type numbers with dedicated handling.
pub mod chunk {
    pub const DATA: u8 = 0;
    pub const INIT: u8 = 1;
    pub const INIT_ACK: u8 = 2;
    pub const COOKIE_ACK: u8 = 11;
}

/// INIT / INIT ACK parameter types.
pub mod param {
    pub const IPV4_ADDRESS: u16 = 5;
    pub const IPV6_ADDRESS: u16 = 6;
    pub const STATE_COOKIE: u16 = 7;
    pub const UNRECOGNIZED_PARAMETERS: u16 = 8;
    pub const COOKIE_PRESERVATIVE: u16 = 9;
    pub const HOST_NAME_ADDRESS: u16 = 11;
    pub const SUPPORTED_ADDRESS_TYPES: u16 = 12;
    pub const ECN_CAPABLE: u16 = 0x8000;
    pub const FORWARD_TSN_SUPPORTED: u16 = 0xC000;
    pub const ADAPTATION_LAYER_INDICATION: u16 = 0xC006;
}

/// Parameter types in sub-header id order.
const PARAM_TYPES: [u16; 10] = [
    param::IPV4_ADDRESS,
    param::IPV6_ADDRESS,
    param::STATE_COOKIE,
    param::UNRECOGNIZED_PARAMETERS,
    param::COOKIE_PRESERVATIVE,
    param::HOST_NAME_ADDRESS,
    param::SUPPORTED_ADDRESS_TYPES,
    param::ECN_CAPABLE,
    param::FORWARD_TSN_SUPPORTED,
    param::ADAPTATION_LAYER_INDICATION,
];

const PARAM_SLOTS: &[SubHeaderSlot] = &[
    SubHeaderSlot::new(0, "ipv4_address"),
    SubHeaderSlot::new(1, "ipv6_address"),
    SubHeaderSlot::new(2, "state_cookie"),
    SubHeaderSlot::new(3, "unrecognized_parameters"),
    SubHeaderSlot::new(4, "cookie_preservative"),
    SubHeaderSlot::new(5, "host_name_address"),
    SubHeaderSlot::new(6, "supported_address_types"),
    SubHeaderSlot::new(7, "ecn_capable"),
    SubHeaderSlot::new(8, "forward_tsn_supported"),
    SubHeaderSlot::new(9, "adaptation_layer_indication"),
];

/// Sub-header id of parameter type `param_type`, if it is a known one.
pub fn param_index(param_type: u16) -> Option<usize> {
    PARAM_TYPES.iter().position(|&t| t == param_type)
}

/// Names of chunk types `0..CHUNK_NAMES.len()`.
pub const CHUNK_NAMES: [&str; 15] = [
    "sctp_data",
    "sctp_init",
    "sctp_init_ack",
    "sctp_sack",
    "sctp_heartbeat",
    "sctp_heartbeat_ack",
    "sctp_abort",
    "sctp_shutdown",
    "sctp_shutdown_ack",
    "sctp_error",
    "sctp_cookie_echo",
    "sctp_cookie_ack",
    "sctp_ecne",
    "sctp_cwr",
    "sctp_shutdown_complete",
];

fn over_ipv4(ctx: &BindContext<'_>) -> bool {
    ipv4::carries(ctx, ip_proto::SCTP)
}

const BINDINGS: &[BindingRule] = &[
    BindingRule::new(IPV4, Predicate::Fn(over_ipv4)),
    BindingRule::new(IPV6, Predicate::parent_u8(6, ip_proto::SCTP)),
];

/// Chunk length field, which counts the chunk header but not the padding.
///
/// A length below the chunk header is treated as a bare header.
fn chunk_length(data: &[u8], offset: usize) -> Option<usize> {
    let bytes = data.get(offset + 2..offset + 4)?;
    let len = usize::from(u16::from_be_bytes([bytes[0], bytes[1]]));
    Some(len.max(CHUNK_HEADER_LEN))
}

fn chunk_padding(data: &[u8], offset: usize) -> Option<usize> {
    let len = chunk_length(data, offset)?;
    Some((4 - len % 4) % 4)
}

/// Index INIT / INIT ACK parameters; repeats keep the first instance.
///
/// Parameters are padded to 4 bytes. The walk stops at the first parameter
/// that is malformed or runs past the chunk.
fn dissect_params(header: &[u8], container: &mut SubHeaderContainer) {
    let mut i = INIT_FIXED_LEN;
    while let Some(bytes) = header.get(i..i + 4) {
        let param_type = u16::from_be_bytes([bytes[0], bytes[1]]);
        let len = usize::from(u16::from_be_bytes([bytes[2], bytes[3]]));
        if len < 4 || i + len > header.len() {
            break;
        }
        if let Some(index) = param_index(param_type) {
            let _ = container.add_header(index, i, len);
        }
        i += (len + 3) & !3;
    }
}

/// Id used for chunk type `chunk_type`, if it has one.
pub fn chunk_id(chunk_type: u8) -> Option<ProtocolId> {
    (usize::from(chunk_type) < CHUNK_NAMES.len())
        .then(|| ProtocolId::from_raw(SCTP_CHUNK_BASE + u16::from(chunk_type)))
}

pub fn descriptor() -> HeaderDescriptor {
    HeaderDescriptor::new(SCTP, "sctp", HeaderLength::Fixed(SCTP_HEADER_LEN))
        .display_name("SCTP")
        .bindings(BINDINGS)
}

/// Register one descriptor per chunk type and bind each of them after the
/// common header and after every other chunk.
pub fn register_chunks(registry: &mut ProtocolRegistry) -> Result<(), RegistryError> {
    let ids: Vec<ProtocolId> = (0..CHUNK_NAMES.len() as u8).filter_map(chunk_id).collect();

    for (chunk_type, (&id, name)) in ids.iter().zip(CHUNK_NAMES).enumerate() {
        let mut descriptor =
            HeaderDescriptor::new(id, name, HeaderLength::Computed(chunk_length)).gap(chunk_padding);
        if matches!(chunk_type as u8, chunk::INIT | chunk::INIT_ACK) {
            descriptor = descriptor.sub_headers(dissect_params, PARAM_SLOTS);
        }
        registry.register(descriptor)?;
    }

    for (chunk_type, &child) in ids.iter().enumerate() {
        let on_type = Predicate::child_u8(0, 0xFF, chunk_type as u8);
        for &parent in std::iter::once(&SCTP).chain(ids.iter()) {
            registry.add_binding(child, BindingRule::new(parent, on_type))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::builtin::{SCTP_DATA, SCTP_SHUTDOWN_COMPLETE};

    #[test]
    fn test_chunk_length_and_padding() {
        let chunk = [
            0x00, // type: DATA
            0x03, // flags
            0x00, 0x15, // length: 21
        ];
        assert_eq!(chunk_length(&chunk, 0), Some(21));
        assert_eq!(chunk_padding(&chunk, 0), Some(3));

        let chunk = [0x0b, 0x00, 0x00, 0x04]; // COOKIE ACK, length 4
        assert_eq!(chunk_length(&chunk, 0), Some(4));
        assert_eq!(chunk_padding(&chunk, 0), Some(0));

        let bogus = [0x00, 0x00, 0x00, 0x01];
        assert_eq!(chunk_length(&bogus, 0), Some(4));
        assert_eq!(chunk_length(&bogus[..3], 0), None);
    }

    #[test]
    fn test_chunk_ids() {
        assert_eq!(chunk_id(0), Some(SCTP_DATA));
        assert_eq!(chunk_id(14), Some(SCTP_SHUTDOWN_COMPLETE));
        assert_eq!(chunk_id(15), None);
        assert_eq!(chunk_id(0xC0), None);
    }

    /// INIT chunk with the given parameters appended after the fixed fields.
    fn init_chunk(params: &[u8]) -> Vec<u8> {
        let len = (INIT_FIXED_LEN + params.len()) as u16;
        let mut chunk = vec![chunk::INIT, 0x00];
        chunk.extend_from_slice(&len.to_be_bytes());
        chunk.extend_from_slice(&[0x00, 0x00, 0x00, 0x2a]); // initiate tag
        chunk.extend_from_slice(&[0x00, 0x01, 0x00, 0x00]); // a_rwnd
        chunk.extend_from_slice(&[0x00, 0x0a, 0x00, 0x0a]); // streams out / in
        chunk.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]); // initial TSN
        chunk.extend_from_slice(params);
        chunk
    }

    #[test]
    fn test_dissect_init_params() {
        let chunk = init_chunk(&[
            0x00, 0x05, 0x00, 0x08, 10, 0, 0, 1, // IPv4 address
            0x00, 0x05, 0x00, 0x08, 10, 0, 0, 2, // second IPv4 address
            0x00, 0x0b, 0x00, 0x07, b'h', b'o', b's', 0x00, // host name + pad
            0x80, 0x00, 0x00, 0x04, // ECN capable
            0x00, 0x0c, 0x00, 0x06, 0x00, 0x05, // supported address types
        ]);

        let mut container = SubHeaderContainer::new(SCTP_DATA);
        dissect_params(&chunk, &mut container);

        assert_eq!(container.count(), 4);
        let ipv4 = param_index(param::IPV4_ADDRESS).unwrap();
        assert_eq!(container.get_header(ipv4), Ok((20, 8)));
        assert_eq!(container.slice(&chunk, ipv4), Ok(&[0, 5, 0, 8, 10, 0, 0, 1][..]));
        assert_eq!(
            container.get_header(param_index(param::HOST_NAME_ADDRESS).unwrap()),
            Ok((36, 7))
        );
        assert_eq!(
            container.get_header(param_index(param::ECN_CAPABLE).unwrap()),
            Ok((44, 4))
        );
        assert_eq!(
            container.get_header(param_index(param::SUPPORTED_ADDRESS_TYPES).unwrap()),
            Ok((48, 6))
        );
    }

    #[test]
    fn test_dissect_stops_on_bad_param_length() {
        let chunk = init_chunk(&[
            0x00, 0x09, 0x00, 0x08, 0x00, 0x00, 0x27, 0x10, // cookie preservative
            0x00, 0x06, 0x00, 0x02, // IPv6 address with length 2
            0x00, 0x07, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, // state cookie
        ]);

        let mut container = SubHeaderContainer::new(SCTP_DATA);
        dissect_params(&chunk, &mut container);
        assert_eq!(container.count(), 1);
        assert!(container.has_header(param_index(param::COOKIE_PRESERVATIVE).unwrap()));
        assert!(!container.has_header(param_index(param::STATE_COOKIE).unwrap()));
    }

    #[test]
    fn test_unknown_params_skipped() {
        let chunk = init_chunk(&[
            0x00, 0x63, 0x00, 0x05, 0xff, 0x00, 0x00, 0x00, // type 99, padded
            0xc0, 0x00, 0x00, 0x04, // forward TSN supported
        ]);

        let mut container = SubHeaderContainer::new(SCTP_DATA);
        dissect_params(&chunk, &mut container);
        assert_eq!(container.count(), 1);
        assert_eq!(
            container.get_header(param_index(param::FORWARD_TSN_SUPPORTED).unwrap()),
            Ok((28, 4))
        );
        assert_eq!(param_index(99), None);
    }

    #[test]
    fn test_only_init_chunks_have_params() {
        let mut registry = ProtocolRegistry::new();
        registry.register(descriptor()).unwrap();
        register_chunks(&mut registry).unwrap();

        for chunk_type in [chunk::INIT, chunk::INIT_ACK] {
            let desc = registry.lookup(chunk_id(chunk_type).unwrap()).unwrap();
            assert!(desc.sub_header_dissector().is_some());
            assert_eq!(desc.sub_header_name(2), Some("state_cookie"));
        }
        let data = registry.lookup(chunk_id(chunk::DATA).unwrap()).unwrap();
        assert!(data.sub_header_dissector().is_none());
    }
}
