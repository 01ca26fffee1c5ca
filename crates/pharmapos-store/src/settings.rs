//! # Settings Store
//!
//! Loads and saves the pharmacy settings file.
//!
//! Settings always live in a local JSON file regardless of which backend
//! holds the business data: the settings themselves decide whether a remote
//! backend is used, so they have to be readable before any backend exists.

use std::path::{Path, PathBuf};

use tracing::debug;

use pharmapos_core::Settings;

use crate::error::StoreResult;

/// File name under the data directory.
const SETTINGS_FILE: &str = "settings.json";

/// Local settings persistence.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a settings store rooted at the data directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        SettingsStore {
            path: data_dir.as_ref().join(SETTINGS_FILE),
        }
    }

    /// Loads settings, falling back to defaults when no file exists yet.
    /// A corrupt file is an error, not a silent reset.
    pub async fn load(&self) -> StoreResult<Settings> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No settings file, using defaults");
                Ok(Settings::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persists settings, creating the data directory when needed.
    pub async fn save(&self, settings: &Settings) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(settings)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}
