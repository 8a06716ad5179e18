//! The scanning state machine.
//!
//! Starting from a given protocol at offset 0, the scanner appends one
//! [`HeaderRecord`] per recognized header and asks the registry which header
//! follows, until one of four things happens:
//!
//! ```text
//!   START -> MATCHED -> APPEND -> RESOLVE -+-> MATCHED ...
//!                                          +-> NO_MATCH -> PAYLOAD -> END
//!                                          +-> END        (no bytes left)
//!            APPEND ----------------------> TRUNCATED -> END
//!            MATCHED ---------------------> MAX_DEPTH -> END
//! ```
//!
//! Malformed or short packets never produce an error: the scan stops and the
//! [`PacketState`] says why through its [`ScanOutcome`]. Only an unknown
//! start id is an error.
//!
//! Scanning touches nothing but the caller's [`PacketState`], so reusing one
//! state per thread makes the hot path allocation-free.

mod config;

pub use config::ScanConfig;

use tracing::{debug, trace};

use crate::error::ScanError;
use crate::packet::{FrameMeta, HeaderFlags, HeaderRecord, PacketState};
use crate::protocol::builtin::PAYLOAD;
use crate::protocol::{BindContext, HeaderDescriptor, ProtocolId, ProtocolRegistry};

/// Why a scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanOutcome {
    /// Every captured byte belongs to a recognized header
    End,
    /// No binding matched; the rest was recorded as payload
    Payload,
    /// The last record did not fit in the captured bytes
    Truncated,
    /// The header limit was reached
    MaxDepth,
}

/// State machine steps between appends.
#[derive(Debug, Clone, Copy)]
enum Step {
    Matched { id: ProtocolId, offset: usize },
    Resolve { index: usize },
    NoMatch { offset: usize },
    Done(ScanOutcome),
}

/// Walks packet bytes using a registry's descriptors and bindings.
#[derive(Debug, Clone, Copy)]
pub struct Scanner<'r> {
    registry: &'r ProtocolRegistry,
    config: ScanConfig,
}

impl<'r> Scanner<'r> {
    pub fn new(registry: &'r ProtocolRegistry) -> Self {
        Self::with_config(registry, ScanConfig::default())
    }

    pub fn with_config(registry: &'r ProtocolRegistry, config: ScanConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &'r ProtocolRegistry {
        self.registry
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan `data[..cap_len]` starting with protocol `start`.
    pub fn scan(&self, data: &[u8], cap_len: usize, start: ProtocolId) -> Result<PacketState, ScanError> {
        let mut state = PacketState::new();
        self.scan_into(&mut state, data, FrameMeta::new(cap_len, cap_len), start)?;
        Ok(state)
    }

    /// Scan starting from the protocol mapped to data-link type `dlt`.
    ///
    /// Unknown link types start (and end) with a single payload record.
    pub fn scan_link(
        &self,
        state: &mut PacketState,
        data: &[u8],
        meta: FrameMeta,
        dlt: u32,
    ) -> Result<ScanOutcome, ScanError> {
        self.scan_into(state, data, meta, self.registry.map_dlt(dlt))
    }

    /// Rebuild `state` by scanning `data` starting with protocol `start`.
    ///
    /// `meta.cap_len` is clamped to `data.len()`. On error `state` is left
    /// untouched.
    pub fn scan_into(
        &self,
        state: &mut PacketState,
        data: &[u8],
        meta: FrameMeta,
        start: ProtocolId,
    ) -> Result<ScanOutcome, ScanError> {
        if !self.registry.contains(start) {
            return Err(ScanError::UnknownProtocol { id: start.raw() });
        }

        let cap_len = meta.cap_len.min(data.len());
        state.begin(FrameMeta { cap_len, ..meta });

        // Effective end: shrinks as enclosing headers declare trailers
        let mut end = cap_len;
        let mut step = Step::Matched {
            id: start,
            offset: 0,
        };

        let outcome = loop {
            step = match step {
                Step::Matched { id, offset } => self.append(state, data, &mut end, id, offset)?,
                Step::Resolve { index } => self.resolve(state, data, end, index)?,
                Step::NoMatch { offset } => self.append_payload(state, end, offset),
                Step::Done(outcome) => break outcome,
            };
        };

        state.finish(outcome);
        match outcome {
            ScanOutcome::Truncated | ScanOutcome::MaxDepth => debug!(
                frame = meta.frame_number,
                ?outcome,
                headers = state.header_count(),
                cursor = state.cursor(),
                "scan stopped early"
            ),
            _ => trace!(
                frame = meta.frame_number,
                ?outcome,
                headers = state.header_count(),
                "scan complete"
            ),
        }
        Ok(outcome)
    }

    /// MATCHED: measure the header and append its record.
    fn append(
        &self,
        state: &mut PacketState,
        data: &[u8],
        end: &mut usize,
        id: ProtocolId,
        offset: usize,
    ) -> Result<Step, ScanError> {
        let descriptor = self.descriptor(id)?;
        if state.header_count() >= self.config.header_limit() {
            state.set_cursor(offset);
            return Ok(Step::Done(ScanOutcome::MaxDepth));
        }

        let region = &data[..*end];
        let prefix = descriptor
            .prefix_length(region, offset)
            .filter(|&prefix| prefix <= *end - offset);
        let Some(prefix) = prefix else {
            return Ok(self.append_truncated(state, *end, id, offset, None, 0));
        };
        let header = offset + prefix;
        let Some(length) = descriptor.header_length(region, header) else {
            return Ok(self.append_truncated(state, *end, id, header, None, prefix));
        };
        if header.checked_add(length).map_or(true, |e| e > *end) {
            return Ok(self.append_truncated(state, *end, id, header, Some(length), prefix));
        }

        let mut record = HeaderRecord::new(id, header, length);
        record.prefix = prefix;
        record.gap = descriptor.gap_length(region, header);
        if self.config.trim_trailers {
            record.postfix = descriptor
                .postfix_length(region, header)
                .min(*end - record.end());
            *end -= record.postfix;
        }
        record.flags |= descriptor.flags(&region[header..record.end()]);

        let index = state.header_count();
        if !state.push(record) {
            state.set_cursor(offset);
            return Ok(Step::Done(ScanOutcome::MaxDepth));
        }
        state.set_cursor(record.next_offset().min(*end));
        trace!(
            id = id.raw(),
            name = descriptor.name(),
            offset = header,
            length,
            "appended header"
        );
        Ok(Step::Resolve { index })
    }

    /// TRUNCATED: keep what is known about the header and stop.
    ///
    /// `length` is the declared length when it could be computed; otherwise
    /// the record spans the remaining bytes.
    fn append_truncated(
        &self,
        state: &mut PacketState,
        end: usize,
        id: ProtocolId,
        offset: usize,
        length: Option<usize>,
        prefix: usize,
    ) -> Step {
        let offset = offset.min(end);
        let mut record = HeaderRecord::new(id, offset, length.unwrap_or(end - offset));
        record.prefix = prefix.min(offset);
        record.flags |= HeaderFlags::TRUNCATED;

        if !state.push(record) {
            return Step::Done(ScanOutcome::MaxDepth);
        }
        state.set_cursor(end);
        Step::Done(ScanOutcome::Truncated)
    }

    /// RESOLVE: pick the next header from the bindings.
    fn resolve(&self, state: &PacketState, data: &[u8], end: usize, index: usize) -> Result<Step, ScanError> {
        let parent = *state.record(index)?;
        let offset = parent.next_offset();
        if offset >= end {
            return Ok(Step::Done(ScanOutcome::End));
        }

        let ctx = BindContext {
            data: &data[..end],
            parent: parent.id,
            parent_offset: parent.offset,
            parent_length: parent.length,
            offset,
        };
        Ok(match self.registry.resolve(&ctx, self.config.heuristics) {
            Some(id) => Step::Matched { id, offset },
            None => Step::NoMatch { offset },
        })
    }

    /// NO_MATCH: the remaining bytes become a payload record.
    fn append_payload(&self, state: &mut PacketState, end: usize, offset: usize) -> Step {
        if state.header_count() >= self.config.header_limit() {
            state.set_cursor(offset);
            return Step::Done(ScanOutcome::MaxDepth);
        }

        let mut record = HeaderRecord::new(PAYLOAD, offset, end - offset);
        record.flags |= HeaderFlags::PAYLOAD;
        if !state.push(record) {
            state.set_cursor(offset);
            return Step::Done(ScanOutcome::MaxDepth);
        }
        state.set_cursor(end);
        Step::Done(ScanOutcome::Payload)
    }

    fn descriptor(&self, id: ProtocolId) -> Result<&'r HeaderDescriptor, ScanError> {
        self.registry
            .lookup(id)
            .ok_or(ScanError::UnknownProtocol { id: id.raw() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::binding::{BindingRule, Predicate};
    use crate::protocol::builtin::{ETHERNET, HTTP, IPV4, TCP, UDP};
    use crate::protocol::descriptor::HeaderLength;
    use crate::protocol::test_utils::{eth_ipv4_udp, ethernet_frame, Ipv4Builder, TcpBuilder};
    use crate::protocol::{default_registry, dlt};

    fn layout(state: &PacketState) -> Vec<(ProtocolId, usize, usize)> {
        state.iter().map(|r| (r.id, r.offset, r.length)).collect()
    }

    #[test]
    fn test_ethernet_ipv4_udp() {
        let registry = default_registry();
        let frame = eth_ipv4_udp(&[]);
        let state = Scanner::new(&registry)
            .scan(&frame, frame.len(), ETHERNET)
            .unwrap();

        assert_eq!(
            layout(&state),
            vec![(ETHERNET, 0, 14), (IPV4, 14, 20), (UDP, 34, 8)]
        );
        assert_eq!(state.outcome(), ScanOutcome::End);
        assert!(state.iter().all(|r| r.flags.is_empty()));
    }

    #[test]
    fn test_remainder_becomes_payload() {
        let registry = default_registry();
        let frame = eth_ipv4_udp(b"hello");
        let state = Scanner::new(&registry)
            .scan(&frame, frame.len(), ETHERNET)
            .unwrap();

        assert_eq!(
            layout(&state),
            vec![
                (ETHERNET, 0, 14),
                (IPV4, 14, 20),
                (UDP, 34, 8),
                (PAYLOAD, 42, 5)
            ]
        );
        assert_eq!(state.outcome(), ScanOutcome::Payload);
        assert!(state.records()[3].is_payload());
        assert_eq!(state.records()[2].payload, 0);
    }

    #[test]
    fn test_truncated_to_20_bytes() {
        let registry = default_registry();
        let frame = eth_ipv4_udp(&[]);
        let state = Scanner::new(&registry).scan(&frame, 20, ETHERNET).unwrap();

        assert_eq!(state.header_count(), 2);
        assert!(!state.records()[0].is_truncated());
        let ip = state.records()[1];
        assert_eq!((ip.id, ip.offset, ip.length), (IPV4, 14, 20));
        assert!(ip.is_truncated());
        assert_eq!(state.outcome(), ScanOutcome::Truncated);
        assert_eq!(state.cursor(), 20);
    }

    #[test]
    fn test_short_captures() {
        let registry = default_registry();
        let frame = eth_ipv4_udp(&[]);
        // Capture ends exactly after Ethernet's type field: IPv4's IHL is unseen
        let state = Scanner::new(&registry).scan(&frame, 14, ETHERNET).unwrap();
        assert_eq!(state.header_count(), 1);
        assert_eq!(state.outcome(), ScanOutcome::End);

        let frame = ethernet_frame(0x0800, &TcpBuilder::new().build());
        let mut state = PacketState::new();
        let scanner = Scanner::new(&registry);
        scanner
            .scan_into(&mut state, &frame[..26], FrameMeta::new(26, 54), ETHERNET)
            .unwrap();
        // Ethernet, then IPv4 cut short
        assert_eq!(state.header_count(), 2);
        assert!(state.is_truncated());
        assert!(state.is_snapped());
    }

    #[test]
    fn test_cap_len_clamped_to_data() {
        let registry = default_registry();
        let frame = eth_ipv4_udp(&[]);
        let state = Scanner::new(&registry)
            .scan(&frame, 10_000, ETHERNET)
            .unwrap();
        assert_eq!(state.cap_len(), frame.len());
        assert_eq!(state.header_count(), 3);
    }

    #[test]
    fn test_unknown_start_id() {
        let registry = default_registry();
        let scanner = Scanner::new(&registry);
        assert_eq!(
            scanner.scan(&[0u8; 4], 4, ProtocolId::from_raw(999)).unwrap_err(),
            ScanError::UnknownProtocol { id: 999 }
        );
    }

    #[test]
    fn test_rescan_is_idempotent() {
        let registry = default_registry();
        let frame = eth_ipv4_udp(b"abcdef");
        let scanner = Scanner::new(&registry);

        let mut state = PacketState::new();
        scanner
            .scan_into(&mut state, &frame, FrameMeta::new(frame.len(), frame.len()), ETHERNET)
            .unwrap();
        let first: Vec<HeaderRecord> = state.records().to_vec();

        scanner
            .scan_into(&mut state, &frame, FrameMeta::new(frame.len(), frame.len()), ETHERNET)
            .unwrap();
        assert_eq!(state.records(), first.as_slice());
    }

    #[test]
    fn test_cyclic_binding_stops_at_max_depth() {
        let mut registry = ProtocolRegistry::new();
        let looped = ProtocolId::from_raw(100);
        // Zero-length header that binds to itself
        registry
            .register(HeaderDescriptor::new(looped, "loop", HeaderLength::Fixed(0)))
            .unwrap();
        registry
            .add_binding(looped, BindingRule::new(looped, Predicate::Always))
            .unwrap();

        let state = Scanner::new(&registry).scan(&[0u8; 8], 8, looped).unwrap();
        assert_eq!(state.outcome(), ScanOutcome::MaxDepth);
        assert_eq!(state.header_count(), crate::packet::MAX_HEADERS);

        let config = ScanConfig::new().with_max_headers(5);
        let state = Scanner::with_config(&registry, config)
            .scan(&[0u8; 8], 8, looped)
            .unwrap();
        assert_eq!(state.outcome(), ScanOutcome::MaxDepth);
        assert_eq!(state.header_count(), 5);
    }

    #[test]
    fn test_oversized_prefix_truncates() {
        fn huge_prefix(_: &[u8], _: usize) -> Option<usize> {
            Some(usize::MAX)
        }
        fn offset_nibble(data: &[u8], offset: usize) -> Option<usize> {
            data.get(offset + 12).map(|b| usize::from(b >> 4) * 4)
        }

        let mut registry = ProtocolRegistry::new();
        let id = ProtocolId::from_raw(100);
        registry
            .register(
                HeaderDescriptor::new(id, "prefixed", HeaderLength::Computed(offset_nibble))
                    .prefix(huge_prefix),
            )
            .unwrap();

        let state = Scanner::new(&registry).scan(&[0u8; 8], 8, id).unwrap();
        assert_eq!(state.outcome(), ScanOutcome::Truncated);
        assert_eq!(layout(&state), vec![(id, 0, 8)]);
        assert!(state.records()[0].is_truncated());
        assert_eq!(state.records()[0].prefix, 0);
    }

    #[test]
    fn test_ethernet_trailer_trimmed() {
        let registry = default_registry();
        let mut frame = eth_ipv4_udp(b"hi");
        frame.resize(60, 0);

        let state = Scanner::new(&registry)
            .scan(&frame, frame.len(), ETHERNET)
            .unwrap();
        assert_eq!(state.records()[0].postfix, 60 - 44);
        // The two UDP data bytes are payload; the padding is not
        assert_eq!(state.records().last().map(|r| (r.id, r.length)), Some((PAYLOAD, 2)));
        assert_eq!(state.view(&frame, 0).unwrap().postfix(), &frame[44..]);

        let untrimmed = Scanner::with_config(&registry, ScanConfig::new().with_trim_trailers(false))
            .scan(&frame, frame.len(), ETHERNET)
            .unwrap();
        assert_eq!(
            untrimmed.records().last().map(|r| (r.id, r.length)),
            Some((PAYLOAD, 18))
        );
    }

    #[test]
    fn test_heuristics_toggle() {
        let registry = default_registry();
        let tcp = TcpBuilder::new()
            .dst_port(3128)
            .psh_ack()
            .payload(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n".to_vec())
            .build();
        let frame = ethernet_frame(0x0800, &Ipv4Builder::new().tcp().payload(tcp).build());

        let with = Scanner::new(&registry)
            .scan(&frame, frame.len(), ETHERNET)
            .unwrap();
        assert_eq!(with.header_id(3), Ok(HTTP));
        assert_eq!(with.outcome(), ScanOutcome::End);

        let without = Scanner::with_config(&registry, ScanConfig::new().with_heuristics(false))
            .scan(&frame, frame.len(), ETHERNET)
            .unwrap();
        assert_eq!(without.header_id(2), Ok(TCP));
        assert_eq!(without.header_id(3), Ok(PAYLOAD));
    }

    #[test]
    fn test_scan_link_maps_dlt() {
        let registry = default_registry();
        let frame = eth_ipv4_udp(&[]);
        let scanner = Scanner::new(&registry);
        let mut state = PacketState::new();

        let meta = FrameMeta::new(frame.len(), frame.len());
        scanner
            .scan_link(&mut state, &frame, meta, dlt::LINKTYPE_ETHERNET)
            .unwrap();
        assert_eq!(state.header_id(0), Ok(ETHERNET));

        // Raw IP: skip the Ethernet header
        let ip = &frame[14..];
        scanner
            .scan_link(&mut state, ip, FrameMeta::new(ip.len(), ip.len()), dlt::LINKTYPE_RAW)
            .unwrap();
        assert_eq!(layout(&state), vec![(IPV4, 0, 20), (UDP, 20, 8)]);

        // Unknown link type: one payload record
        scanner.scan_link(&mut state, &frame, meta, 4242).unwrap();
        assert_eq!(layout(&state), vec![(PAYLOAD, 0, frame.len())]);
    }

    #[test]
    fn test_empty_capture() {
        let registry = default_registry();
        let state = Scanner::new(&registry).scan(&[], 0, ETHERNET).unwrap();
        assert_eq!(state.header_count(), 1);
        assert!(state.records()[0].is_truncated());
        assert_eq!(state.records()[0].length, 14);
    }
}
