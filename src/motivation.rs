use std::sync::Mutex;
use thiserror::Error;

use crate::models::{MAX_MOTIVATION_LEVEL, MIN_MOTIVATION_LEVEL, MotivationEntry};
use crate::storage::{KeyValueStore, StorageError, load_list, load_values, save_list};

/// Storage key holding the motivation history
pub const MOTIVATION_STORAGE_KEY: &str = "@audio_diary_motivation";

#[derive(Debug, Error)]
pub enum MotivationError {
    #[error("Invalid motivation level {0} (expected 1 to 5)")]
    InvalidLevel(i64),
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

/// Append-only log of motivation ratings
pub struct MotivationStore<S> {
    storage: S,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> MotivationStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// Record a rating taken now.
    ///
    /// Stored records are carried over untouched, including ones this version
    /// cannot read. A blob that is not a JSON array is logged and replaced
    /// rather than blocking the new rating.
    pub fn add_motivation_entry(&self, level: i64) -> Result<MotivationEntry, MotivationError> {
        let level = u8::try_from(level)
            .ok()
            .filter(|l| (MIN_MOTIVATION_LEVEL..=MAX_MOTIVATION_LEVEL).contains(&i64::from(*l)))
            .ok_or(MotivationError::InvalidLevel(level))?;

        let _guard = self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)?;
        let mut history = match load_values(&self.storage, MOTIVATION_STORAGE_KEY) {
            Err(StorageError::CorruptData { key, source }) => {
                tracing::warn!(%key, error = %source, "replacing unreadable motivation history");
                Vec::new()
            }
            other => other?,
        };
        let entry = MotivationEntry::new(level);
        history.push(serde_json::to_value(&entry).map_err(StorageError::from)?);
        save_list(&self.storage, MOTIVATION_STORAGE_KEY, &history)?;
        Ok(entry)
    }

    /// All ratings in the order they were recorded
    pub fn list_motivation_history(&self) -> Result<Vec<MotivationEntry>, StorageError> {
        load_list(&self.storage, MOTIVATION_STORAGE_KEY)
    }

    pub fn clear_motivation_history(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)?;
        self.storage.remove(MOTIVATION_STORAGE_KEY)
    }
}
