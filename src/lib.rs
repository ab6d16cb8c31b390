pub mod cli;
pub mod config;
pub mod entries;
pub mod models;
pub mod motivation;
pub mod preferences;
pub mod quotes;
pub mod stats;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use entries::{EntryDraft, EntryStore};
pub use models::{DiaryEntry, Mood, MotivationEntry};
pub use motivation::MotivationStore;
pub use preferences::{ThemeMode, ThemePreferences};
pub use storage::{KeyValueStore, MemoryStorage, SqliteStorage};
pub use utils::Profile;
