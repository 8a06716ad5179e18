//! Per-packet header bookkeeping.

use super::record::{HeaderFlags, HeaderRecord};
use super::view::HeaderView;
use crate::error::ScanError;
use crate::protocol::{ProtocolId, ProtocolSet};
use crate::scan::ScanOutcome;

/// Most header records a single packet can hold.
pub const MAX_HEADERS: usize = 64;

/// Capture metadata for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameMeta {
    pub frame_number: u64,
    /// Bytes actually captured
    pub cap_len: usize,
    /// Bytes on the wire
    pub wire_len: usize,
}

impl FrameMeta {
    pub fn new(cap_len: usize, wire_len: usize) -> Self {
        Self {
            frame_number: 0,
            cap_len,
            wire_len,
        }
    }

    pub fn with_frame_number(mut self, frame_number: u64) -> Self {
        self.frame_number = frame_number;
        self
    }
}

/// Positional reference to a record, valid until the state is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHandle {
    index: usize,
    generation: u32,
}

impl RecordHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Ordered header records for one packet.
///
/// Storage is a fixed array, so a state can be kept and rescanned for every
/// packet without allocating. A scan always rebuilds the state from scratch.
#[derive(Debug, Clone)]
pub struct PacketState {
    records: [HeaderRecord; MAX_HEADERS],
    count: usize,
    meta: FrameMeta,
    present: ProtocolSet,
    outcome: ScanOutcome,
    cursor: usize,
    generation: u32,
}

impl PacketState {
    pub fn new() -> Self {
        Self {
            records: [HeaderRecord::EMPTY; MAX_HEADERS],
            count: 0,
            meta: FrameMeta::default(),
            present: ProtocolSet::new(),
            outcome: ScanOutcome::End,
            cursor: 0,
            generation: 0,
        }
    }

    /// Drop all records. Handles taken before the reset stop resolving.
    pub fn reset(&mut self) {
        self.count = 0;
        self.meta = FrameMeta::default();
        self.present.clear();
        self.outcome = ScanOutcome::End;
        self.cursor = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    pub(crate) fn begin(&mut self, meta: FrameMeta) {
        self.reset();
        self.meta = meta;
    }

    /// Append a record; false when storage is full.
    pub(crate) fn push(&mut self, record: HeaderRecord) -> bool {
        if self.count == MAX_HEADERS {
            return false;
        }
        debug_assert!(
            self.count == 0 || self.records[self.count - 1].offset <= record.offset,
            "header offsets must not decrease"
        );
        self.records[self.count] = record;
        self.count += 1;
        self.present.insert(record.id);
        true
    }

    pub(crate) fn set_cursor(&mut self, cursor: usize) {
        self.cursor = cursor;
    }

    /// Record the outcome and derive payload lengths.
    ///
    /// Each record's payload runs from its end (plus gap) to the start of the
    /// next record, or for the last record to the capture end less every
    /// trailer declared so far.
    pub(crate) fn finish(&mut self, outcome: ScanOutcome) {
        self.outcome = outcome;

        let mut end = self.meta.cap_len;
        for i in 0..self.count {
            let next_start = (i + 1 < self.count).then(|| self.records[i + 1].start());
            let rec = &mut self.records[i];

            let floor = rec.end().min(end);
            end = end.saturating_sub(rec.postfix).max(floor);
            rec.gap = rec.gap.min(end.saturating_sub(rec.end()));

            rec.payload = if rec.is_truncated() {
                0
            } else {
                next_start
                    .unwrap_or(end)
                    .min(end)
                    .saturating_sub(rec.next_offset())
            };
        }
    }

    pub fn header_count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn record(&self, index: usize) -> Result<&HeaderRecord, ScanError> {
        self.records()
            .get(index)
            .ok_or(ScanError::IndexOutOfRange {
                index,
                count: self.count,
            })
    }

    pub fn header_id(&self, index: usize) -> Result<ProtocolId, ScanError> {
        self.record(index).map(|r| r.id)
    }

    pub fn header_offset(&self, index: usize) -> Result<usize, ScanError> {
        self.record(index).map(|r| r.offset)
    }

    pub fn header_length(&self, index: usize) -> Result<usize, ScanError> {
        self.record(index).map(|r| r.length)
    }

    pub fn header_flags(&self, index: usize) -> Result<HeaderFlags, ScanError> {
        self.record(index).map(|r| r.flags)
    }

    /// Records in scan order.
    pub fn records(&self) -> &[HeaderRecord] {
        &self.records[..self.count]
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderRecord> + '_ {
        self.records().iter()
    }

    pub fn handle(&self, index: usize) -> Result<RecordHandle, ScanError> {
        self.record(index)?;
        Ok(RecordHandle {
            index,
            generation: self.generation,
        })
    }

    /// Record behind a handle taken since the last reset.
    pub fn resolve(&self, handle: RecordHandle) -> Result<&HeaderRecord, ScanError> {
        if handle.generation != self.generation {
            return Err(ScanError::StaleHandle {
                handle: handle.generation,
                current: self.generation,
            });
        }
        self.record(handle.index)
    }

    pub fn has_protocol(&self, id: ProtocolId) -> bool {
        self.present.contains(id)
    }

    /// Ids of every recorded header.
    pub fn present(&self) -> &ProtocolSet {
        &self.present
    }

    /// Index of the first record with `id`.
    pub fn find(&self, id: ProtocolId) -> Option<usize> {
        self.find_nth(id, 0)
    }

    /// Index of the `instance`-th record with `id`, counting from zero.
    pub fn find_nth(&self, id: ProtocolId, instance: usize) -> Option<usize> {
        if !self.has_protocol(id) {
            return None;
        }
        self.records()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.id == id)
            .nth(instance)
            .map(|(i, _)| i)
    }

    pub fn outcome(&self) -> ScanOutcome {
        self.outcome
    }

    /// True when the scan stopped on a header that did not fit the capture.
    pub fn is_truncated(&self) -> bool {
        self.outcome == ScanOutcome::Truncated
    }

    /// Offset where the scan stopped.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn frame(&self) -> &FrameMeta {
        &self.meta
    }

    pub fn cap_len(&self) -> usize {
        self.meta.cap_len
    }

    pub fn wire_len(&self) -> usize {
        self.meta.wire_len
    }

    /// Fewer bytes captured than were on the wire.
    pub fn is_snapped(&self) -> bool {
        self.meta.cap_len < self.meta.wire_len
    }

    /// View of record `index` over the scanned bytes.
    pub fn view<'a>(&self, data: &'a [u8], index: usize) -> Result<HeaderView<'a>, ScanError> {
        let record = *self.record(index)?;
        let region_end = self.region_ends().nth(index).unwrap_or(0);
        Ok(HeaderView::new(self.captured(data), record).with_region_end(region_end))
    }

    /// Views of every record, in scan order.
    pub fn views<'a, 's>(&'s self, data: &'a [u8]) -> impl Iterator<Item = HeaderView<'a>> + 's
    where
        'a: 's,
    {
        let data = self.captured(data);
        self.records()
            .iter()
            .zip(self.region_ends())
            .map(move |(&record, end)| HeaderView::new(data, record).with_region_end(end))
    }

    /// Effective end each record was scanned against, after the trailers of
    /// the records before it.
    fn region_ends(&self) -> impl Iterator<Item = usize> + '_ {
        self.records().iter().scan(self.meta.cap_len, |end, rec| {
            let region_end = *end;
            *end = end.saturating_sub(rec.postfix).max(rec.end().min(*end));
            Some(region_end)
        })
    }

    fn captured<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[..self.meta.cap_len.min(data.len())]
    }
}

impl Default for PacketState {
    fn default() -> Self {
        Self::new()
    }
}
