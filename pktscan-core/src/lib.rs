//! # pktscan-core
//!
//! Table-driven packet header scanning.
//!
//! Protocols are described by data, not code: each [`HeaderDescriptor`]
//! says how long its header is and which [`BindingRule`]s let it follow
//! another header. A [`Scanner`] walks captured bytes with those tables and
//! fills a reusable [`PacketState`] with one [`HeaderRecord`] per header
//! found. Field decoding is left to the caller; records carry offsets and
//! lengths only.
//!
//! ## Quick Start
//!
//! ```rust
//! use pktscan_core::prelude::*;
//! use pktscan_core::protocol::{builtin, dlt};
//!
//! let registry = default_registry();
//! let scanner = Scanner::new(&registry);
//!
//! let frame = [0u8; 60];
//! let mut state = PacketState::new();
//! let outcome = scanner
//!     .scan_link(&mut state, &frame, FrameMeta::new(frame.len(), frame.len()), dlt::LINKTYPE_ETHERNET)
//!     .unwrap();
//!
//! assert_eq!(state.header_id(0).unwrap(), builtin::ETHERNET);
//! assert_ne!(outcome, ScanOutcome::MaxDepth);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                        pktscan-core                                 |
//! +---------------------------------------------------------------------+
//! |  protocol/   - ProtocolId, descriptors, bindings, registry, DLTs,   |
//! |                built-in protocol tables                             |
//! |  scan/       - Scanner state machine, ScanConfig, ScanOutcome       |
//! |  packet/     - HeaderRecord, PacketState, HeaderView                |
//! |  subheader   - SubHeaderContainer (option bitmaps)                  |
//! |  error       - Error types                                          |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Supported Protocols
//!
//! | Layer | Protocols |
//! |-------|-----------|
//! | Link | Ethernet, 802.3, LLC, SNAP, VLAN (802.1Q), Linux SLL, BSD loopback, PPP |
//! | Network | IPv4, IPv6, ARP, ICMP |
//! | Transport | TCP, UDP, SCTP (+ chunks) |
//! | Tunnel | L2TP |
//! | Application | HTTP, RTP, RTCP, RIP |

pub mod error;
pub mod packet;
pub mod prelude;
pub mod protocol;
pub mod scan;
pub mod subheader;

// Re-export commonly used types at crate root for convenience
pub use error::{Error, RegistryError, Result, ScanError, SubHeaderError};
pub use packet::{FrameMeta, HeaderFlags, HeaderRecord, HeaderView, PacketState, RecordHandle, MAX_HEADERS};
pub use protocol::{
    default_registry, register_builtins, BindContext, BindingRule, HeaderDescriptor, HeaderLength,
    Parent, Predicate, ProtocolId, ProtocolRegistry, ProtocolSet,
};
pub use scan::{ScanConfig, ScanOutcome, Scanner};
pub use subheader::{SubHeaderContainer, MAX_SUB_HEADERS};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
