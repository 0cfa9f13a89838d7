//! Portal preference persistence.
//!
//! A tiny JSON-backed store recording lightweight per-admin configuration:
//! the review-list page size and the credit-assignments feature flag. The
//! file lives in the standard configuration directory
//! (`~/.config/cohort/preferences.json` on most platforms) and is safe to
//! read/write from multiple threads thanks to the internal `Mutex`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Environment variable allowing callers to override the preferences file path.
pub const PREFERENCES_PATH_ENV: &str = "COHORT_PREFERENCES_PATH";

/// Default filename for the JSON payload.
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

/// Error surfaced when reading or writing preferences fails.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("preferences I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("preferences serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted preference values.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PreferencesPayload {
    /// Rows shown in a collapsed review list before "show all".
    pub review_page_size: Option<usize>,
    /// Whether the learner-credit assignment checkpoint is enabled.
    pub assignments_enabled: Option<bool>,
}

/// Thread-safe preferences store backed by a JSON file.
#[derive(Debug, Default)]
pub struct PortalPreferences {
    path: PathBuf,
    payload: Mutex<PreferencesPayload>,
    persist_to_disk: bool,
}

impl PortalPreferences {
    /// Creates a store at the default config-directory path (or the
    /// `COHORT_PREFERENCES_PATH` override).
    pub fn new() -> Result<Self, PreferencesError> {
        Self::from_path(default_preferences_path())
    }

    /// Creates a store rooted at an explicit path.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, PreferencesError> {
        let path = path.into();
        let payload = load_payload(&path)?;
        Ok(Self {
            path,
            payload: Mutex::new(payload),
            persist_to_disk: true,
        })
    }

    /// Builds an in-memory store used as a fallback when the config
    /// directory cannot be accessed.
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            payload: Mutex::new(PreferencesPayload::default()),
            persist_to_disk: false,
        }
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved review page size, if any.
    pub fn review_page_size(&self) -> Option<usize> {
        self.payload.lock().expect("preferences lock poisoned").review_page_size
    }

    /// Persists a new review page size.
    pub fn set_review_page_size(&self, page_size: Option<usize>) -> Result<(), PreferencesError> {
        let mut payload = self.payload.lock().expect("preferences lock poisoned");
        payload.review_page_size = page_size;
        if self.persist_to_disk {
            self.save_locked(&payload)?;
        }
        Ok(())
    }

    /// Whether the credit-assignments checkpoint is enabled. Defaults off.
    pub fn assignments_enabled(&self) -> bool {
        self.payload
            .lock()
            .expect("preferences lock poisoned")
            .assignments_enabled
            .unwrap_or(false)
    }

    /// Persists the credit-assignments flag.
    pub fn set_assignments_enabled(&self, enabled: bool) -> Result<(), PreferencesError> {
        let mut payload = self.payload.lock().expect("preferences lock poisoned");
        payload.assignments_enabled = Some(enabled);
        if self.persist_to_disk {
            self.save_locked(&payload)?;
        }
        Ok(())
    }

    fn save_locked(&self, payload: &PreferencesPayload) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(payload)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

fn default_preferences_path() -> PathBuf {
    if let Ok(path) = env::var(PREFERENCES_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cohort")
        .join(PREFERENCES_FILE_NAME)
}

fn load_payload(path: &Path) -> Result<PreferencesPayload, PreferencesError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(payload) => Ok(payload),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse preferences file; using defaults"
                );
                Ok(PreferencesPayload::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(PreferencesPayload::default()),
        Err(error) => Err(PreferencesError::Io(error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = PortalPreferences::from_path(dir.path().join("preferences.json")).expect("build store");

        assert_eq!(store.review_page_size(), None);
        assert!(!store.assignments_enabled());
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("preferences.json");

        let store = PortalPreferences::from_path(&path).expect("build store");
        store.set_review_page_size(Some(10)).expect("persist page size");
        store.set_assignments_enabled(true).expect("persist flag");

        let reloaded = PortalPreferences::from_path(&path).expect("reload store");
        assert_eq!(reloaded.review_page_size(), Some(10));
        assert!(reloaded.assignments_enabled());
    }

    #[test]
    fn malformed_file_degrades_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{not json").expect("write garbage");

        let store = PortalPreferences::from_path(&path).expect("build store");
        assert_eq!(store.review_page_size(), None);
    }

    #[test]
    fn ephemeral_store_never_touches_disk() {
        let store = PortalPreferences::ephemeral();
        store.set_review_page_size(Some(5)).expect("in-memory update");
        assert_eq!(store.review_page_size(), Some(5));
        assert_eq!(store.path(), Path::new(""));
    }
}
