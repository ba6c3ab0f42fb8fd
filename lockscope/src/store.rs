//! Snapshot store
//!
//! An append-only directory of sequentially numbered snapshot files,
//! `slot-00000.profile`, `slot-00001.profile`, … — one per sampling
//! interval. The naming scheme plus atomic write-then-rename is the sole
//! correctness mechanism: there is no cross-process locking, and a reader
//! can never observe a partially written snapshot because the file only
//! appears under its final name once fully written.
//!
//! A missing sequence number is the normal end-of-sequence signal for
//! readers ([`SnapshotStore::read`] returns `Ok(None)`), which also makes a
//! still-running sampler's not-yet-written trailing slot look simply "not
//! yet available".

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::domain::{SlotId, StoreError};
use crate::profile::ProfileCapture;

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Open a store for writing, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|source| StoreError::CreateDir { dir: dir.clone(), source })?;
        Ok(SnapshotStore { dir })
    }

    /// Open an existing store for reading. Fails if the path is not a
    /// directory — the analyzer treats that as a fatal user error.
    pub fn open_existing(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(StoreError::NotADirectory(dir));
        }
        Ok(SnapshotStore { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn slot_path(&self, slot: SlotId) -> PathBuf {
        self.dir.join(format!("slot-{slot}.profile"))
    }

    /// Persist one snapshot atomically: serialize into a temporary file in
    /// the store directory, then rename onto the final slot name.
    pub fn write(&self, slot: SlotId, capture: &ProfileCapture) -> Result<(), StoreError> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer(&mut tmp, capture)?;
        // Same-directory rename; the snapshot appears complete or not at all.
        tmp.persist(self.slot_path(slot)).map_err(|err| StoreError::Io(err.error))?;
        Ok(())
    }

    /// Read one snapshot. `Ok(None)` means the slot does not exist (end of
    /// sequence, or not yet written by a live sampler); an unparseable file
    /// is reported as [`StoreError::Malformed`].
    pub fn read(&self, slot: SlotId) -> Result<Option<ProfileCapture>, StoreError> {
        let path = self.slot_path(slot);
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|source| StoreError::Malformed { path, source })
    }
}
