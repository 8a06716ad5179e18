//! Error types for pktscan-core.
//!
//! Errors are split by the phase in which they can occur:
//!
//! - [`RegistryError`] - Configuration errors raised while building a registry
//! - [`ScanError`] - Contract violations when driving a scan or reading results
//! - [`SubHeaderError`] - Misuse of a [`SubHeaderContainer`](crate::SubHeaderContainer)
//! - [`enum@Error`] - Umbrella enum wrapping all of the above
//!
//! Malformed or truncated packet bytes are never reported through these types.
//! They surface as [`ScanOutcome`](crate::ScanOutcome) and per-record
//! [`HeaderFlags`](crate::HeaderFlags) instead.

use thiserror::Error;

/// Main error type for pktscan-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Error while registering descriptors, bindings or link types
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Error while scanning or reading scan results
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    /// Error while indexing sub-headers
    #[error("Sub-header error: {0}")]
    SubHeader(#[from] SubHeaderError),
}

/// Errors raised while building a [`ProtocolRegistry`](crate::ProtocolRegistry).
///
/// A failed registration leaves the registry exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Another descriptor already owns this id
    #[error("protocol id {id} is already registered to '{existing}'")]
    DuplicateId { id: u16, existing: &'static str },

    /// Another descriptor already owns this name
    #[error("protocol name '{name}' is already registered with id {existing}")]
    DuplicateName { name: &'static str, existing: u16 },

    /// Id outside the registry's id space, or no free id left to assign
    #[error("registry full: id {id} is not below {max}")]
    RegistryFull { id: u32, max: u16 },

    /// Id passed to a mask helper is outside `[0, MAX_ID_COUNT)`
    #[error("protocol id {id} out of range [0, {max})")]
    IdOutOfRange { id: i64, max: u16 },

    /// A binding or link-type mapping names an id nobody registered
    #[error("unknown protocol id {id}")]
    UnknownProtocol { id: u16 },
}

/// Contract violations while scanning or reading a [`PacketState`](crate::PacketState).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The scan reached an id with no registered descriptor
    #[error("no descriptor registered for protocol id {id}")]
    UnknownProtocol { id: u16 },

    /// Positional accessor used outside `[0, count)`
    #[error("header index {index} out of range (count {count})")]
    IndexOutOfRange { index: usize, count: usize },

    /// Record handle taken before the state was reset
    #[error("record handle from generation {handle} used after reset (now {current})")]
    StaleHandle { handle: u32, current: u32 },
}

/// Errors raised by [`SubHeaderContainer`](crate::SubHeaderContainer).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubHeaderError {
    /// The sub-header id already has an entry
    #[error("sub-header {id} is already present")]
    AlreadyPresent { id: usize },

    /// The sub-header id does not fit in the presence bitmap
    #[error("sub-header id {id} exceeds capacity {capacity}")]
    Capacity { id: usize, capacity: usize },

    /// The sub-header id has no entry
    #[error("sub-header {id} is not present")]
    NotPresent { id: usize },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
