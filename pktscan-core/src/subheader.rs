//! Bitmap-indexed storage for optional sub-headers.
//!
//! Some headers carry a variable set of optional pieces inside their own byte
//! range, such as IPv4 and TCP options. A [`SubHeaderContainer`] records where each one lives, keyed by a small id,
//! in fixed arrays so filling it never allocates. Offsets are relative to the
//! start of the parent header.
//!
//! Only one instance per sub-header id is kept. A repeated id is rejected
//! with [`SubHeaderError::AlreadyPresent`].

use crate::error::SubHeaderError;
use crate::protocol::ProtocolId;

/// Number of distinct sub-header ids a container can index.
pub const MAX_SUB_HEADERS: usize = 64;

/// Presence bitmap plus parallel offset/length arrays for one parent header.
#[derive(Debug, Clone)]
pub struct SubHeaderContainer {
    parent: ProtocolId,
    bitmap: u64,
    offsets: [usize; MAX_SUB_HEADERS],
    lengths: [usize; MAX_SUB_HEADERS],
    count: usize,
}

impl SubHeaderContainer {
    pub fn new(parent: ProtocolId) -> Self {
        Self {
            parent,
            bitmap: 0,
            offsets: [0; MAX_SUB_HEADERS],
            lengths: [0; MAX_SUB_HEADERS],
            count: 0,
        }
    }

    /// Id of the header whose sub-headers are indexed here.
    pub fn parent(&self) -> ProtocolId {
        self.parent
    }

    /// Record sub-header `id` at `offset` (relative to the parent) spanning `length` bytes.
    pub fn add_header(&mut self, id: usize, offset: usize, length: usize) -> Result<(), SubHeaderError> {
        if id >= MAX_SUB_HEADERS {
            return Err(SubHeaderError::Capacity {
                id,
                capacity: MAX_SUB_HEADERS,
            });
        }
        let bit = 1u64 << id;
        if self.bitmap & bit != 0 {
            return Err(SubHeaderError::AlreadyPresent { id });
        }

        self.bitmap |= bit;
        self.offsets[id] = offset;
        self.lengths[id] = length;
        self.count += 1;
        debug_assert_eq!(self.count, self.bitmap.count_ones() as usize);
        Ok(())
    }

    pub fn has_header(&self, id: usize) -> bool {
        id < MAX_SUB_HEADERS && self.bitmap & (1u64 << id) != 0
    }

    /// `(offset, length)` of sub-header `id`.
    pub fn get_header(&self, id: usize) -> Result<(usize, usize), SubHeaderError> {
        if self.has_header(id) {
            Ok((self.offsets[id], self.lengths[id]))
        } else {
            Err(SubHeaderError::NotPresent { id })
        }
    }

    /// Bytes of sub-header `id`, sliced out of the parent header.
    ///
    /// Clamped to `header` so a sub-header running past the capture yields
    /// only its captured part.
    pub fn slice<'a>(&self, header: &'a [u8], id: usize) -> Result<&'a [u8], SubHeaderError> {
        let (offset, length) = self.get_header(id)?;
        let start = offset.min(header.len());
        let end = offset.saturating_add(length).min(header.len());
        Ok(&header[start..end])
    }

    /// Forget every entry so the container can index a new header region.
    pub fn clear(&mut self) {
        self.bitmap = 0;
        self.count = 0;
    }

    /// Clear and rebind to another parent header.
    pub fn reset(&mut self, parent: ProtocolId) {
        self.clear();
        self.parent = parent;
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Raw presence bitmap.
    pub fn bitmap(&self) -> u64 {
        self.bitmap
    }

    /// `(id, offset, length)` of present sub-headers, by ascending id.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let mut bits = self.bitmap;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let id = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some((id, self.offsets[id], self.lengths[id]))
        })
    }
}
