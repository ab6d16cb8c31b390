use std::fmt;
use std::str::FromStr;

use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the theme preference
pub const THEME_MODE_KEY: &str = "themeMode";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::System => "system",
        }
    }

    /// Whether the dark palette applies, given the platform's own preference
    pub fn is_dark(&self, system_prefers_dark: bool) -> bool {
        match self {
            ThemeMode::Light => false,
            ThemeMode::Dark => true,
            ThemeMode::System => system_prefers_dark,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(ThemeMode::Light),
            "dark" => Ok(ThemeMode::Dark),
            "system" => Ok(ThemeMode::System),
            other => Err(format!("Unknown theme mode '{}' (expected light, dark or system)", other)),
        }
    }
}

pub struct ThemePreferences<S> {
    storage: S,
}

impl<S: KeyValueStore> ThemePreferences<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The saved mode, or `System` when nothing valid is stored
    pub fn theme_mode(&self) -> Result<ThemeMode, StorageError> {
        let Some(saved) = self.storage.get(THEME_MODE_KEY)? else {
            return Ok(ThemeMode::default());
        };
        Ok(saved.parse().unwrap_or_else(|e: String| {
            tracing::warn!(error = %e, "ignoring saved theme preference");
            ThemeMode::default()
        }))
    }

    pub fn set_theme_mode(&self, mode: ThemeMode) -> Result<(), StorageError> {
        self.storage.set(THEME_MODE_KEY, mode.as_str())
    }
}
