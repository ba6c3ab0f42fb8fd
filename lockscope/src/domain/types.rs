//! Newtype wrappers for domain values

use std::fmt;

/// Sequence number of one snapshot in the store.
///
/// Snapshots are numbered contiguously from 0; the analyzer treats the first
/// missing `SlotId` as the end of the sequence. Displays zero-padded to five
/// digits, matching the on-disk naming (`slot-00042.profile`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub u32);

impl SlotId {
    /// First slot in every store.
    pub const FIRST: SlotId = SlotId(0);

    #[must_use]
    pub fn next(self) -> SlotId {
        SlotId(self.0 + 1)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}
