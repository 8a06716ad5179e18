//! Scan configuration.

use crate::packet::MAX_HEADERS;

/// Knobs for a [`Scanner`](super::Scanner).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Header records per packet before the scan stops with `MaxDepth`
    /// (capped at [`MAX_HEADERS`])
    pub max_headers: usize,
    /// Try reverse (heuristic) bindings when no forward binding matches
    pub heuristics: bool,
    /// Let descriptors declare trailers that shrink the region scanned after them
    pub trim_trailers: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_headers: MAX_HEADERS, // 64 records
            heuristics: true,
            trim_trailers: true,
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_headers(mut self, max_headers: usize) -> Self {
        self.max_headers = max_headers;
        self
    }

    pub fn with_heuristics(mut self, heuristics: bool) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn with_trim_trailers(mut self, trim_trailers: bool) -> Self {
        self.trim_trailers = trim_trailers;
        self
    }

    /// Record limit actually applied.
    pub fn header_limit(&self) -> usize {
        self.max_headers.min(MAX_HEADERS)
    }
}
