use std::collections::BTreeMap;
use std::sync::Mutex;
use thiserror::Error;

use crate::models::{DiaryEntry, Location, Mood, Weather};
use crate::stats::{self, DayMarkers};
use crate::storage::{KeyValueStore, StorageError, load_list, load_list_strict, save_list};
use crate::utils::parse_date;

/// Storage key holding the JSON array of diary entries
pub const DIARY_ENTRIES_KEY: &str = "diary_entries";

type Listener = Box<dyn Fn(&[DiaryEntry]) + Send + Sync>;

#[derive(Debug, Error)]
pub enum EntryError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
    #[error("Add some text or record audio before saving")]
    EmptyEntry,
    #[error("Invalid entry date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Fields supplied by one editor save.
///
/// `None` leaves the stored value alone, so saving just new text for a day
/// keeps its recording, title, flag and mood.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryDraft {
    pub date: String,
    pub title: Option<String>,
    pub text: Option<String>,
    pub audio_path: Option<String>,
    pub is_important: Option<bool>,
    pub mood: Option<Mood>,
    pub location: Option<Location>,
    pub weather: Option<Weather>,
}

impl EntryDraft {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Self::default()
        }
    }

    fn apply_to(self, entry: &mut DiaryEntry) {
        if let Some(title) = self.title {
            entry.title = title;
        }
        if let Some(text) = self.text {
            entry.text = text;
        }
        if let Some(audio_path) = self.audio_path {
            entry.audio_path = audio_path;
        }
        if let Some(important) = self.is_important {
            entry.is_important = important;
        }
        if self.mood.is_some() {
            entry.mood = self.mood;
        }
        if self.location.is_some() {
            entry.location = self.location;
        }
        if self.weather.is_some() {
            entry.weather = self.weather;
        }
    }
}

/// The diary entries, persisted as one JSON array.
///
/// Reads are tolerant: a missing or unreadable array lists as empty.
/// Mutations load the whole array, change it and write it back while
/// holding a lock, so two mutations through the same store never
/// overwrite each other.
pub struct EntryStore<S> {
    storage: S,
    write_lock: Mutex<()>,
    listeners: Mutex<Vec<Listener>>,
}

impl<S: KeyValueStore> EntryStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// All entries in stored order
    pub fn list_entries(&self) -> Result<Vec<DiaryEntry>, StorageError> {
        load_list(&self.storage, DIARY_ENTRIES_KEY)
    }

    /// Replace the entry with the same id, or append it
    pub fn upsert_entry(&self, entry: DiaryEntry) -> Result<(), StorageError> {
        self.modify(|entries| match entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        })
    }

    /// First entry stored for `date`
    pub fn find_entry_by_date(&self, date: &str) -> Result<Option<DiaryEntry>, StorageError> {
        Ok(self.list_entries()?.into_iter().find(|e| e.date == date))
    }

    pub fn find_entry(&self, id: &str) -> Result<Option<DiaryEntry>, StorageError> {
        Ok(self.list_entries()?.into_iter().find(|e| e.id == id))
    }

    /// Remove every entry with `id`. Unknown ids are not an error.
    pub fn delete_entry(&self, id: &str) -> Result<(), StorageError> {
        self.modify(|entries| entries.retain(|e| e.id != id))
    }

    /// Set the important flag; returns false if no entry has `id`
    pub fn set_important(&self, id: &str, important: bool) -> Result<bool, StorageError> {
        self.modify(|entries| match entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.is_important = important;
                true
            }
            None => false,
        })
    }

    /// Flip the important flag, returning the new value
    pub fn toggle_important(&self, id: &str) -> Result<Option<bool>, StorageError> {
        self.modify(|entries| {
            entries.iter_mut().find(|e| e.id == id).map(|entry| {
                entry.is_important = !entry.is_important;
                entry.is_important
            })
        })
    }

    /// Save an editor draft, treating its date as the key.
    ///
    /// The draft is merged onto the entry already stored for that date, which
    /// keeps its id and creation time, or onto a fresh entry. A blank title
    /// gets a numbered default. Nothing is written when the merged entry has
    /// neither text nor audio.
    pub fn save_for_date(&self, draft: EntryDraft) -> Result<DiaryEntry, EntryError> {
        if parse_date(&draft.date).is_err() {
            return Err(EntryError::InvalidDate(draft.date));
        }

        self.try_modify(|entries| {
            let position = entries.iter().position(|e| e.date == draft.date);
            let mut merged = match position {
                Some(index) => entries[index].clone(),
                None => DiaryEntry::new(draft.date.clone()),
            };
            draft.apply_to(&mut merged);

            if !merged.has_text() && !merged.has_audio() {
                return Err(EntryError::EmptyEntry);
            }
            merged.title = merged.title.trim().to_string();
            if merged.title.is_empty() {
                merged.title = default_title(entries, &merged.date);
            }

            match position {
                Some(index) => entries[index] = merged.clone(),
                None => entries.push(merged.clone()),
            }
            Ok(merged)
        })
    }

    /// Calendar markers for every date that has an entry
    pub fn marked_dates(&self) -> Result<BTreeMap<String, DayMarkers>, StorageError> {
        Ok(stats::marked_dates(&self.list_entries()?))
    }

    /// Register a callback that receives the full list after each mutation.
    ///
    /// Listeners run on the mutating thread and must not subscribe further
    /// listeners themselves.
    pub fn subscribe<F>(&self, listener: F) -> Result<(), StorageError>
    where
        F: Fn(&[DiaryEntry]) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock().map_err(|_| StorageError::LockPoisoned)?;
        listeners.push(Box::new(listener));
        Ok(())
    }

    fn modify<R>(&self, change: impl FnOnce(&mut Vec<DiaryEntry>) -> R) -> Result<R, StorageError> {
        self.try_modify(|entries| Ok::<_, StorageError>(change(entries)))
    }

    /// Load, change and write back under the lock; an `Err` from `change` skips the write
    fn try_modify<R, E>(
        &self,
        change: impl FnOnce(&mut Vec<DiaryEntry>) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StorageError>,
    {
        let (result, entries) = {
            let _guard = self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)?;
            let mut entries: Vec<DiaryEntry> = load_list_strict(&self.storage, DIARY_ENTRIES_KEY)?;
            let result = change(&mut entries)?;
            save_list(&self.storage, DIARY_ENTRIES_KEY, &entries)?;
            (result, entries)
        };
        self.notify(&entries)?;
        Ok(result)
    }

    fn notify(&self, entries: &[DiaryEntry]) -> Result<(), StorageError> {
        let listeners = self.listeners.lock().map_err(|_| StorageError::LockPoisoned)?;
        for listener in listeners.iter() {
            listener(entries);
        }
        Ok(())
    }
}

/// "Entry #N", numbering past every entry not written on `date`
pub fn default_title(entries: &[DiaryEntry], date: &str) -> String {
    let others = entries.iter().filter(|e| e.date != date).count();
    format!("Entry #{}", others + 1)
}
