use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::utils::get_current_timestamp;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
    #[error("Stored data under '{key}' is corrupt: {source}")]
    CorruptData {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize data: {0}")]
    SerializeError(#[from] serde_json::Error),
    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Minimal string key-value capability the stores persist through.
///
/// Every call is fallible; a missing key reads as `None`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Durable key-value storage backed by a single SQLite table
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open (or create) the database file and initialize the schema
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::DirectoryError(e.to_string()))?;
            }
        }

        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "opened diary database");
        Self::with_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        let storage = SqliteStorage { conn: Mutex::new(conn) };
        storage.initialize_schema()?;
        Ok(storage)
    }

    fn initialize_schema(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    #[cfg(test)]
    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key ASC")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

impl KeyValueStore for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, get_current_timestamp()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", rusqlite::params![key])?;
        Ok(())
    }
}

/// Process-local storage, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::LockPoisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::LockPoisoned)?;
        values.remove(key);
        Ok(())
    }
}

/// Read a JSON array stored under `key`, treating a missing or corrupt blob as empty.
///
/// Elements that do not deserialize are skipped individually so one bad
/// record never hides the rest. Storage failures still propagate.
pub fn load_list<T, S>(storage: &S, key: &str) -> Result<Vec<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let values = match load_values(storage, key) {
        Err(StorageError::CorruptData { key, source }) => {
            tracing::warn!(%key, error = %source, "discarding unreadable stored data");
            return Ok(Vec::new());
        }
        other => other?,
    };

    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(error) => {
                tracing::warn!(%key, index, %error, "skipping unreadable stored item");
                None
            }
        })
        .collect())
}

/// Read a JSON array stored under `key`; a corrupt blob or element is an error
pub fn load_list_strict<T, S>(storage: &S, key: &str) -> Result<Vec<T>, StorageError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    load_values(storage, key)?
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).map_err(|source| StorageError::CorruptData {
                key: key.to_string(),
                source,
            })
        })
        .collect()
}

/// The stored array as untyped JSON values, so records can be carried through unchanged
pub fn load_values<S>(storage: &S, key: &str) -> Result<Vec<Value>, StorageError>
where
    S: KeyValueStore + ?Sized,
{
    match storage.get(key)? {
        Some(json) => serde_json::from_str(&json).map_err(|source| StorageError::CorruptData {
            key: key.to_string(),
            source,
        }),
        None => Ok(Vec::new()),
    }
}

/// Serialize `items` as a JSON array and store it under `key`
pub fn save_list<T, S>(storage: &S, key: &str, items: &[T]) -> Result<(), StorageError>
where
    T: Serialize,
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(items)?;
    storage.set(key, &json)?;
    tracing::debug!(%key, count = items.len(), "persisted list");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_list_tolerates_corrupt_blob() {
        let storage = MemoryStorage::new();
        storage.set("diary_entries", "{not json").unwrap();
        let lenient: Vec<serde_json::Value> = load_list(&storage, "diary_entries").unwrap();
        assert!(lenient.is_empty());

        let strict: Result<Vec<serde_json::Value>, _> = load_list_strict(&storage, "diary_entries");
        assert!(matches!(strict, Err(StorageError::CorruptData { .. })));
    }

    #[test]
    fn test_load_list_treats_non_array_as_corrupt() {
        let storage = MemoryStorage::new();
        storage.set("k", r#"{"date": "2024-01-01"}"#).unwrap();
        let lenient: Vec<serde_json::Value> = load_list(&storage, "k").unwrap();
        assert!(lenient.is_empty());
    }

    #[test]
    fn test_load_list_skips_only_bad_elements() {
        let storage = MemoryStorage::new();
        storage.set("k", r#"[1, "two", 3]"#).unwrap();
        let lenient: Vec<i32> = load_list(&storage, "k").unwrap();
        assert_eq!(lenient, vec![1, 3]);

        let strict: Result<Vec<i32>, _> = load_list_strict(&storage, "k");
        assert!(matches!(strict, Err(StorageError::CorruptData { .. })));

        let raw = load_values(&storage, "k").unwrap();
        assert_eq!(raw.len(), 3);
    }

    #[test]
    fn test_save_list_round_trips() {
        let storage = MemoryStorage::new();
        save_list(&storage, "k", &[1, 2, 3]).unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("[1,2,3]"));
        let values: Vec<i32> = load_list(&storage, "k").unwrap();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_sqlite_get_set_remove() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert_eq!(storage.get("diary_entries").unwrap(), None);

        storage.set("diary_entries", "[]").unwrap();
        assert_eq!(storage.get("diary_entries").unwrap().as_deref(), Some("[]"));

        storage.set("diary_entries", "[1]").unwrap();
        assert_eq!(storage.get("diary_entries").unwrap().as_deref(), Some("[1]"));
        assert_eq!(storage.keys().unwrap(), vec!["diary_entries".to_string()]);

        storage.remove("diary_entries").unwrap();
        assert_eq!(storage.get("diary_entries").unwrap(), None);
    }

    #[test]
    fn test_sqlite_remove_missing_key_is_ok() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert!(storage.remove("themeMode").is_ok());
    }

    #[test]
    fn test_sqlite_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("app.db");
        let storage = SqliteStorage::open(&db_path).unwrap();
        storage.set("k", "v").unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn test_memory_storage_shared_through_arc() {
        let storage = Arc::new(MemoryStorage::new());
        let other = Arc::clone(&storage);
        storage.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
        other.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }
}
