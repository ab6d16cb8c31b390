use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_recent_entries_limit")]
    pub recent_entries_limit: usize,
    #[serde(default = "default_important_entries_limit")]
    pub important_entries_limit: usize,
    #[serde(default = "default_show_quote")]
    pub show_quote: bool,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            recent_entries_limit: default_recent_entries_limit(),
            important_entries_limit: default_important_entries_limit(),
            show_quote: default_show_quote(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

fn default_database_path() -> String {
    database_path_for(utils::Profile::Prod)
}

fn default_recent_entries_limit() -> usize {
    5
}

fn default_important_entries_limit() -> usize {
    5
}

fn default_show_quote() -> bool {
    true
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

/// Where `profile` keeps its database, unexpanded when no data dir is known
fn database_path_for(profile: utils::Profile) -> String {
    match utils::get_data_dir(profile) {
        Some(data_dir) => data_dir.join(DATABASE_FILE).to_string_lossy().into_owned(),
        None => format!("~/.local/share/{}/{}", profile.app_name(), DATABASE_FILE),
    }
}

const DATABASE_FILE: &str = "diary.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine the config directory")]
    ConfigDirError,
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// The profile's `config.toml`, written with defaults on first run.
    ///
    /// The database always lives in the profile's data directory, whatever
    /// the file says, so dev and prod data never mix.
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let path = Self::get_config_path(profile)?;
        let mut config = if path.exists() {
            Self::read_file(&path)?
        } else {
            let mut fresh = Config::default();
            fresh.save_to_path(&path).inspect_err(|e| {
                tracing::error!(path = %path.display(), error = %e, "failed to write default config");
            })?;
            tracing::info!(path = %path.display(), "wrote default config");
            fresh
        };
        config.database_path = database_path_for(profile);
        Ok(config)
    }

    /// Load an explicitly chosen config file; its database path is honored as written
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        Self::read_file(path)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Write the config as TOML, stamping the current version
    pub fn save_to_path(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.config_version = Some(CURRENT_CONFIG_VERSION);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents).map_err(|e| ConfigError::WriteError(e.to_string()))
    }

    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let dir = utils::get_config_dir(profile).ok_or(ConfigError::ConfigDirError)?;
        Ok(dir.join("config.toml"))
    }

    /// The database path with `~` expanded
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = toml::from_str("database_path = \"/tmp/d.db\"").unwrap();
        assert_eq!(config.database_path, "/tmp/d.db");
        assert_eq!(config.recent_entries_limit, 5);
        assert!(config.show_quote);
        assert_eq!(config.config_version, Some(CURRENT_CONFIG_VERSION));
    }

    #[test]
    fn test_save_and_load_from_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("conf").join("config.toml");

        let mut config = Config::default();
        config.database_path = "/tmp/elsewhere.db".to_string();
        config.important_entries_limit = 3;
        config.config_version = None;
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.database_path, "/tmp/elsewhere.db");
        assert_eq!(loaded.important_entries_limit, 3);
        assert_eq!(loaded.config_version, Some(CURRENT_CONFIG_VERSION));
    }

    #[test]
    fn test_profiles_use_separate_databases() {
        let dev = database_path_for(utils::Profile::Dev);
        let prod = database_path_for(utils::Profile::Prod);
        assert_ne!(dev, prod);
        assert!(dev.ends_with(DATABASE_FILE));
        assert_eq!(Config::default().database_path, prod);
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load_from_path(&temp_dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "recent_entries_limit = \"many\"").unwrap();
        assert!(matches!(Config::load_from_path(&path), Err(ConfigError::ParseError(_))));
    }
}
