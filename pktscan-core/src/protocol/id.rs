//! Protocol identifiers, packed presence masks and id bitsets.
//!
//! A [`ProtocolId`] is a small integer below [`MAX_ID_COUNT`]. Ids are grouped
//! in runs of 32: a 64-bit mask stores the group number in its high half and a
//! single presence bit in its low half, which is the format packed-mask tooling
//! expects. Inside the engine, [`ProtocolSet`] is used instead: a flat bitset
//! indexed directly by id.

use std::fmt;

use crate::error::RegistryError;

/// Size of the protocol id space.
pub const MAX_ID_COUNT: u16 = 1024;

/// Number of ids sharing one mask group.
pub const GROUP_SIZE: u32 = 32;

const SET_WORDS: usize = MAX_ID_COUNT as usize / 64;

/// Numeric identifier of a registered protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolId(u16);

impl ProtocolId {
    /// Wrap a raw id without range checking.
    ///
    /// The registry rejects ids at or above [`MAX_ID_COUNT`] when the
    /// descriptor is registered.
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Index into per-id tables.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Mask group this id belongs to.
    pub const fn group(self) -> u32 {
        self.0 as u32 >> 5
    }

    /// Packed 64-bit mask for this id.
    pub fn mask(self) -> Result<u64, RegistryError> {
        id_to_mask(i64::from(self.0))
    }

    /// Rebuild the id a mask was packed from.
    ///
    /// Returns `None` when the mask has no presence bit or names a group past
    /// the id space.
    pub fn from_mask(mask: u64) -> Option<Self> {
        let bit = mask_to_id(mask);
        if bit >= GROUP_SIZE {
            return None;
        }
        let raw = mask_to_group(mask).checked_mul(GROUP_SIZE)?.checked_add(bit)?;
        if raw < u32::from(MAX_ID_COUNT) {
            Some(Self(raw as u16))
        } else {
            None
        }
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ProtocolId> for u16 {
    fn from(id: ProtocolId) -> Self {
        id.0
    }
}

/// Pack an id into its group/presence-bit mask.
///
/// Fails with [`RegistryError::IdOutOfRange`] for negative ids and ids at or
/// above [`MAX_ID_COUNT`].
pub fn id_to_mask(id: i64) -> Result<u64, RegistryError> {
    if !(0..i64::from(MAX_ID_COUNT)).contains(&id) {
        return Err(RegistryError::IdOutOfRange {
            id,
            max: MAX_ID_COUNT,
        });
    }
    let group = (id as u64) >> 5;
    let bit = 1u64 << (id as u64 & 0x1F);
    Ok((group << 32) | bit)
}

/// Position of the presence bit inside the mask's group.
///
/// Returns 32 when the low half carries no bit.
pub fn mask_to_id(mask: u64) -> u32 {
    (mask as u32).trailing_zeros()
}

/// Group number stored in the mask's high half.
pub fn mask_to_group(mask: u64) -> u32 {
    (mask >> 32) as u32
}

/// Fixed-size bitset over the whole id space.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtocolSet {
    words: [u64; SET_WORDS],
}

impl ProtocolSet {
    pub const fn new() -> Self {
        Self {
            words: [0; SET_WORDS],
        }
    }

    pub fn insert(&mut self, id: ProtocolId) {
        if let Some(word) = self.words.get_mut(id.index() / 64) {
            *word |= 1 << (id.index() % 64);
        }
    }

    pub fn remove(&mut self, id: ProtocolId) {
        if let Some(word) = self.words.get_mut(id.index() / 64) {
            *word &= !(1 << (id.index() % 64));
        }
    }

    pub fn contains(&self, id: ProtocolId) -> bool {
        self.words
            .get(id.index() / 64)
            .is_some_and(|word| word & (1 << (id.index() % 64)) != 0)
    }

    pub fn clear(&mut self) {
        self.words = [0; SET_WORDS];
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// True if any id is present in both sets.
    pub fn intersects(&self, other: &ProtocolSet) -> bool {
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }

    /// Present ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ProtocolId> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(ProtocolId((w * 64 + bit) as u16))
            })
        })
    }

    /// Packed masks of every present id, one per id.
    pub fn masks(&self) -> impl Iterator<Item = u64> + '_ {
        self.iter().filter_map(|id| id.mask().ok())
    }
}

impl fmt::Debug for ProtocolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|id| id.raw())).finish()
    }
}

impl FromIterator<ProtocolId> for ProtocolSet {
    fn from_iter<I: IntoIterator<Item = ProtocolId>>(iter: I) -> Self {
        let mut set = ProtocolSet::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_projections_cover_id_space() {
        for id in 0..i64::from(MAX_ID_COUNT) {
            let mask = id_to_mask(id).unwrap();
            assert_eq!(i64::from(mask_to_id(mask)), id & 0x1F, "id {id}");
            assert_eq!(i64::from(mask_to_group(mask)), id >> 5, "id {id}");
            assert_eq!(mask.count_ones(), 1 + (id >> 5).count_ones());
        }
    }

    #[test]
    fn test_id_to_mask_rejects_out_of_range() {
        for id in [1024, -1, i64::from(u32::MAX), i64::MIN, i64::MAX] {
            assert_eq!(
                id_to_mask(id),
                Err(RegistryError::IdOutOfRange {
                    id,
                    max: MAX_ID_COUNT
                })
            );
        }
    }

    #[test]
    fn test_known_masks() {
        // Group 0, bit 2
        assert_eq!(id_to_mask(2).unwrap(), 0x0000_0000_0000_0004);
        // Group 1, bit 0
        assert_eq!(id_to_mask(32).unwrap(), 0x0000_0001_0000_0001);
        // Last id: group 31, bit 31
        assert_eq!(id_to_mask(1023).unwrap(), 0x0000_001F_8000_0000);
    }

    #[test]
    fn test_from_mask_round_trip() {
        for raw in [0u16, 5, 31, 32, 47, 512, 1023] {
            let id = ProtocolId::from_raw(raw);
            assert_eq!(ProtocolId::from_mask(id.mask().unwrap()), Some(id));
        }
        assert_eq!(ProtocolId::from_mask(0), None);
        assert_eq!(ProtocolId::from_mask(0xFFFF_FFFF_0000_0001), None);
    }

    #[test]
    fn test_protocol_set() {
        let mut set = ProtocolSet::new();
        assert!(set.is_empty());

        set.insert(ProtocolId::from_raw(1));
        set.insert(ProtocolId::from_raw(64));
        set.insert(ProtocolId::from_raw(1023));
        set.insert(ProtocolId::from_raw(1));
        assert_eq!(set.len(), 3);
        assert!(set.contains(ProtocolId::from_raw(64)));
        assert!(!set.contains(ProtocolId::from_raw(63)));

        let ids: Vec<u16> = set.iter().map(ProtocolId::raw).collect();
        assert_eq!(ids, vec![1, 64, 1023]);

        set.remove(ProtocolId::from_raw(64));
        assert!(!set.contains(ProtocolId::from_raw(64)));

        // Ids past the space are ignored rather than panicking
        set.insert(ProtocolId::from_raw(4000));
        assert!(!set.contains(ProtocolId::from_raw(4000)));

        set.clear();
        assert!(set.is_empty());
    }

    #[test]
    fn test_protocol_set_intersects() {
        let a: ProtocolSet = [2u16, 5].into_iter().map(ProtocolId::from_raw).collect();
        let b: ProtocolSet = [5u16, 9].into_iter().map(ProtocolId::from_raw).collect();
        let c: ProtocolSet = [100u16].into_iter().map(ProtocolId::from_raw).collect();
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
