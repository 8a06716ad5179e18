//! Per-header bookkeeping produced by a scan.

use crate::protocol::ProtocolId;

bitflags::bitflags! {
    /// Data-quality markers on a [`HeaderRecord`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HeaderFlags: u8 {
        /// Declared length runs past the captured bytes, or could not be
        /// computed from what was captured.
        const TRUNCATED = 0b0000_0001;
        /// Header belongs to a fragment of a larger datagram.
        const FRAGMENTED = 0b0000_0010;
        /// Record was produced because no binding matched.
        const PAYLOAD = 0b0000_0100;
    }
}

/// One recognized header inside a packet.
///
/// `offset` and `length` come from the scan. `prefix`, `gap` and `postfix`
/// come from the descriptor's optional functions, and `payload` is filled by
/// the post-pass once the whole packet is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeaderRecord {
    pub id: ProtocolId,
    /// Absolute offset of the header proper (after any prefix)
    pub offset: usize,
    pub length: usize,
    pub prefix: usize,
    pub gap: usize,
    pub payload: usize,
    pub postfix: usize,
    pub flags: HeaderFlags,
}

impl HeaderRecord {
    pub const EMPTY: HeaderRecord = HeaderRecord {
        id: ProtocolId::from_raw(0),
        offset: 0,
        length: 0,
        prefix: 0,
        gap: 0,
        payload: 0,
        postfix: 0,
        flags: HeaderFlags::empty(),
    };

    pub fn new(id: ProtocolId, offset: usize, length: usize) -> Self {
        Self {
            id,
            offset,
            length,
            ..Self::EMPTY
        }
    }

    /// First byte after the header proper.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }

    /// Where the next header (or payload) starts: header end plus gap.
    pub fn next_offset(&self) -> usize {
        self.end().saturating_add(self.gap)
    }

    /// Start of the record including its prefix.
    pub fn start(&self) -> usize {
        self.offset.saturating_sub(self.prefix)
    }

    pub fn is_truncated(&self) -> bool {
        self.flags.contains(HeaderFlags::TRUNCATED)
    }

    pub fn is_fragmented(&self) -> bool {
        self.flags.contains(HeaderFlags::FRAGMENTED)
    }

    pub fn is_payload(&self) -> bool {
        self.flags.contains(HeaderFlags::PAYLOAD)
    }
}

impl Default for HeaderRecord {
    fn default() -> Self {
        Self::EMPTY
    }
}
