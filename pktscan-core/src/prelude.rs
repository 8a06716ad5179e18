//! Convenient re-exports for common usage.
//!
//! ```rust
//! use pktscan_core::prelude::*;
//!
//! let registry = default_registry();
//! let scanner = Scanner::new(&registry);
//! let mut state = PacketState::new();
//! # let _ = (&scanner, &mut state);
//! ```

// Protocol tables
pub use crate::protocol::{
    default_registry, BindContext, BindingRule, HeaderDescriptor, HeaderLength, Predicate,
    ProtocolId, ProtocolRegistry,
};

// Scanning
pub use crate::packet::{FrameMeta, HeaderFlags, HeaderRecord, HeaderView, PacketState};
pub use crate::scan::{ScanConfig, ScanOutcome, Scanner};
pub use crate::subheader::SubHeaderContainer;

// Error types
pub use crate::error::{Error, Result};
