//! # Configuration
//!
//! Host settings for the sync processors, read from a JSON file.
//!
//! Every field is optional; a missing file yields the defaults. The
//! `NUTRISYNC_LOG` environment variable takes precedence over `log_level`.
//!
//! ```json
//! {
//!   "log_level": "debug",
//!   "dropbox": {
//!     "app_folder": "/NutriInfo",
//!     "share_poll": { "max_attempts": 6, "interval_ms": 600 }
//!   }
//! }
//! ```

use crate::logging::LOG_ENV;
use nutrisync_dropbox::DropboxSyncConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "nutrisync";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutriSyncConfig {
    pub log_level: String,
    pub dropbox: DropboxSyncConfig,
}

impl Default for NutriSyncConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            dropbox: DropboxSyncConfig::default(),
        }
    }
}

impl NutriSyncConfig {
    /// `<config_dir>/nutrisync/config.json`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from `path`. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default().with_log_override(std::env::var(LOG_ENV).ok()));
        }

        let raw = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| format!("Invalid config {}: {e}", path.display()))?;

        Ok(config.with_log_override(std::env::var(LOG_ENV).ok()))
    }

    /// Load from [`default_path`](Self::default_path), or defaults.
    pub fn load_default() -> Result<Self, String> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default().with_log_override(std::env::var(LOG_ENV).ok())),
        }
    }

    pub fn with_log_override(mut self, level: Option<String>) -> Self {
        if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
            self.log_level = level.trim().to_string();
        }
        self
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialise config: {e}"))?;
        fs::write(path, json).map_err(|e| format!("Failed to write {}: {e}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = NutriSyncConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(cfg.dropbox, DropboxSyncConfig::default());
        assert_eq!(cfg.dropbox.app_folder, "/NutriInfo");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"dropbox": {{"app_folder": "/Other", "share_poll": {{"max_attempts": 3}}}}}}"#
        )
        .unwrap();

        let cfg = NutriSyncConfig::load(file.path()).unwrap();
        assert_eq!(cfg.dropbox.app_folder, "/Other");
        assert_eq!(cfg.dropbox.share_poll.max_attempts, 3);
        assert_eq!(cfg.dropbox.share_poll.interval_ms, 600);
        assert_eq!(cfg.dropbox.shared_folder_list_limit, 100);
        assert_eq!(cfg.dropbox.request_timeout_secs, 120);
    }

    #[test]
    fn malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = NutriSyncConfig::load(file.path()).unwrap_err();
        assert!(err.contains("Invalid config"));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut cfg = NutriSyncConfig::default();
        cfg.dropbox.shared_folder_list_limit = 250;
        cfg.save(&path).unwrap();

        let loaded = NutriSyncConfig::load(&path).unwrap();
        assert_eq!(loaded.dropbox.shared_folder_list_limit, 250);
    }

    #[test]
    fn log_override() {
        let cfg = NutriSyncConfig::default().with_log_override(Some("nutrisync=trace".into()));
        assert_eq!(cfg.log_level, "nutrisync=trace");

        let cfg = NutriSyncConfig::default().with_log_override(Some("  ".into()));
        assert_eq!(cfg.log_level, "info");

        let cfg = NutriSyncConfig::default().with_log_override(None);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn default_path_ends_with_file_name() {
        if let Some(p) = NutriSyncConfig::default_path() {
            assert!(p.ends_with("nutrisync/config.json"));
        }
    }
}
