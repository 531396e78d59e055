//! Configuration Storage
//!
//! This module loads optional application settings from a TOML file in the
//! platform configuration directory. Settings are read-only: the application
//! never writes this file, and the API key is never part of it.

use crate::error::{Result, SqlChatError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file name
const CONFIG_FILE: &str = "config.toml";

/// Configuration directory name under the platform config dir
const CONFIG_DIR: &str = "sql-chat";

/// Default location of the seeded store, relative to the working directory
pub const DEFAULT_STORE_PATH: &str = "./sql_lite_database.db";

/// Default OpenAI-compatible API root
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the store is (re)created on every run
    pub store_path: PathBuf,
    /// Chat model identifier
    pub model: String,
    /// API root for the OpenAI-compatible provider
    pub base_url: String,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
    /// Maximum reasoning steps per question
    pub max_iterations: usize,
    /// Row limit the agent is told to apply to its queries
    pub top_k: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
            max_iterations: 15,
            top_k: 10,
        }
    }
}

impl Settings {
    /// Get the configuration directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR))
            .ok_or_else(|| {
                SqlChatError::Config("Could not find configuration directory".to_string())
            })
    }

    /// Get the configuration file path
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load settings from the platform configuration file, or defaults if absent
    pub fn load() -> Result<Self> {
        match Self::config_file() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Load settings from an explicit file path, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            SqlChatError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse(&content)
            .map_err(|e| SqlChatError::Config(format!("{} in {}", e, path.display())))
    }

    /// Parse settings from TOML text and validate them
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)
            .map_err(|e| SqlChatError::Config(format!("Failed to parse config: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(SqlChatError::Config("model must not be empty".to_string()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SqlChatError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.max_iterations == 0 {
            return Err(SqlChatError::Config(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.top_k == 0 {
            return Err(SqlChatError::Config("top_k must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.store_path, PathBuf::from("./sql_lite_database.db"));
        assert_eq!(settings.base_url, "https://api.openai.com/v1");
        assert_eq!(settings.max_iterations, 15);
        assert_eq!(settings.top_k, 10);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = Settings::parse("model = \"gpt-4o\"\ntop_k = 5\n").unwrap();
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.top_k, 5);
        assert_eq!(settings.timeout_secs, 60);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Settings::parse("max_iterations = 0").is_err());
        assert!(Settings::parse("base_url = \"ftp://example.com\"").is_err());
        assert!(Settings::parse("model = \"  \"").is_err());
        assert!(Settings::parse("top_k = \"ten\"").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "store_path = \"/tmp/store.db\"\ntimeout_secs = 5\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.store_path, PathBuf::from("/tmp/store.db"));
        assert_eq!(settings.timeout_secs, 5);
    }
}
