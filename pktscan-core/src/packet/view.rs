//! Borrowed views of scanned headers.
//!
//! A [`HeaderView`] pairs a copy of a [`HeaderRecord`] with the captured
//! bytes. Views are cheap to build and are never re-pointed at another
//! packet; build a fresh one from the [`PacketState`](super::PacketState)
//! after every scan.

use super::record::{HeaderFlags, HeaderRecord};
use crate::protocol::binding::{read_u16, read_u32};
use crate::protocol::ProtocolId;

#[derive(Debug, Clone, Copy)]
pub struct HeaderView<'a> {
    data: &'a [u8],
    record: HeaderRecord,
    /// End of the region this header's trailer sits at
    region_end: usize,
}

impl<'a> HeaderView<'a> {
    pub fn new(data: &'a [u8], record: HeaderRecord) -> Self {
        Self {
            data,
            record,
            region_end: data.len(),
        }
    }

    /// Place the trailer at `region_end` instead of the end of `data`.
    ///
    /// Needed when an enclosing header already declared a trailer of its own.
    pub fn with_region_end(mut self, region_end: usize) -> Self {
        self.region_end = region_end.min(self.data.len());
        self
    }

    pub fn id(&self) -> ProtocolId {
        self.record.id
    }

    pub fn offset(&self) -> usize {
        self.record.offset
    }

    pub fn length(&self) -> usize {
        self.record.length
    }

    pub fn flags(&self) -> HeaderFlags {
        self.record.flags
    }

    pub fn record(&self) -> &HeaderRecord {
        &self.record
    }

    pub fn is_truncated(&self) -> bool {
        self.record.is_truncated()
    }

    /// Header bytes that were captured; shorter than `length()` if truncated.
    pub fn header(&self) -> &'a [u8] {
        self.clamped(self.record.offset, self.record.end())
    }

    pub fn prefix(&self) -> &'a [u8] {
        self.clamped(self.record.start(), self.record.offset)
    }

    pub fn gap(&self) -> &'a [u8] {
        self.clamped(self.record.end(), self.record.next_offset())
    }

    /// Bytes after the header (and gap) not claimed by a following header.
    pub fn payload(&self) -> &'a [u8] {
        let start = self.record.next_offset();
        self.clamped(start, start.saturating_add(self.record.payload))
    }

    /// Trailer this header declared at the end of the region it encloses.
    pub fn postfix(&self) -> &'a [u8] {
        let start = self
            .region_end
            .saturating_sub(self.record.postfix)
            .max(self.record.end());
        self.clamped(start, self.region_end)
    }

    /// Everything from the header start to the end of the capture.
    pub fn remaining(&self) -> &'a [u8] {
        self.clamped(self.record.offset, self.data.len())
    }

    /// Byte at `at` within the header.
    pub fn u8_at(&self, at: usize) -> Option<u8> {
        self.header().get(at).copied()
    }

    /// Big-endian u16 at `at` within the header.
    pub fn u16_at(&self, at: usize) -> Option<u16> {
        read_u16(self.header(), at)
    }

    /// Big-endian u32 at `at` within the header.
    pub fn u32_at(&self, at: usize) -> Option<u32> {
        read_u32(self.header(), at)
    }

    fn clamped(&self, start: usize, end: usize) -> &'a [u8] {
        let end = end.min(self.data.len());
        let start = start.min(end);
        &self.data[start..end]
    }
}
