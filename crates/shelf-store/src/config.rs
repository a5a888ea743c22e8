//! Store configuration with environment variable and file-based loading.
//!
//! Environment variables:
//! - `SHELF_DATA_PATH`: Base path for durable state
//!
//! Default path: `~/.shelf`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Configuration for the content store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base path for durable state.
    /// The record file lives at `{base_path}/contents.json`, uploaded
    /// binaries under `{base_path}/uploads/`.
    pub base_path: PathBuf,
}

/// Get the default data path (~/.shelf).
fn default_base_path() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".shelf"))
        .unwrap_or_else(|| PathBuf::from(".shelf"))
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let base_path = env::var("SHELF_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_base_path());

        Self { base_path }
    }

    /// Load configuration from a TOML file, falling back to environment.
    ///
    /// The file should contain a `[store]` section:
    /// ```toml
    /// [store]
    /// base_path = "/var/lib/shelf"
    /// ```
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let table: toml::Table = contents
            .parse()
            .with_context(|| format!("failed to parse TOML: {}", path.display()))?;

        if let Some(store_section) = table.get("store") {
            let config: StoreConfig = store_section
                .clone()
                .try_into()
                .context("failed to parse [store] section")?;
            Ok(config)
        } else {
            // No [store] section, fall back to env
            Ok(Self::from_env())
        }
    }

    /// Create a config with a specific base path.
    pub fn with_base_path(path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: path.into(),
        }
    }

    /// Get the path of the durable record file.
    pub fn records_path(&self) -> PathBuf {
        self.base_path.join("contents.json")
    }

    /// Get the uploads directory path.
    pub fn uploads_dir(&self) -> PathBuf {
        self.base_path.join("uploads")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert!(config.base_path.to_string_lossy().contains(".shelf"));
    }

    #[test]
    fn test_with_base_path() {
        let config = StoreConfig::with_base_path("/custom/path");
        assert_eq!(config.base_path, PathBuf::from("/custom/path"));
    }

    #[test]
    fn test_derived_paths() {
        let config = StoreConfig::with_base_path("/var/lib/shelf");
        assert_eq!(
            config.records_path(),
            PathBuf::from("/var/lib/shelf/contents.json")
        );
        assert_eq!(config.uploads_dir(), PathBuf::from("/var/lib/shelf/uploads"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelf.toml");
        std::fs::write(&path, "[store]\nbase_path = \"/tank/shelf\"\n").unwrap();

        let config = StoreConfig::from_file(&path).unwrap();
        assert_eq!(config.base_path, PathBuf::from("/tank/shelf"));
    }

    #[test]
    fn test_from_file_without_section_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelf.toml");
        std::fs::write(&path, "[other]\nkey = 1\n").unwrap();

        env::remove_var("SHELF_DATA_PATH");
        let config = StoreConfig::from_file(&path).unwrap();
        assert!(config.base_path.to_string_lossy().contains(".shelf"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = StoreConfig::with_base_path("/custom/shelf");
        let json = serde_json::to_string(&config).unwrap();
        let restored: StoreConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.base_path, restored.base_path);
    }
}
