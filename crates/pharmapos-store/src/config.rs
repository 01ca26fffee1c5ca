//! # Store Configuration
//!
//! Decides which backend the adapter runs on.
//!
//! ## Resolution Priority
//! ```text
//! 1. Settings override      service_url + service_key saved in settings
//! 2. Process environment    PHARMAPOS_SERVICE_URL / PHARMAPOS_SERVICE_KEY
//! 3. Built-in default       compiled-in credentials (none in this build)
//! 4. Local fallback         JSON files + a blocking startup warning
//! ```
//! Both halves of a credential pair must come from the same tier; a URL from
//! settings never pairs with a key from the environment.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use pharmapos_core::Settings;

use crate::backend::Backend;
use crate::error::StoreResult;
use crate::local::LocalBackend;
use crate::remote::RemoteBackend;

/// Environment variable naming the remote service URL.
pub const ENV_SERVICE_URL: &str = "PHARMAPOS_SERVICE_URL";

/// Environment variable naming the remote access key.
pub const ENV_SERVICE_KEY: &str = "PHARMAPOS_SERVICE_KEY";

/// Compiled-in fallback credentials for packaged builds. This build ships
/// without any; installs with neither settings nor environment configured
/// run local-only.
const DEFAULT_SERVICE_URL: Option<&str> = None;
const DEFAULT_SERVICE_KEY: Option<&str> = None;

/// Resolved backing-store choice.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreConfig {
    /// JSON files under the data directory
    Local { data_dir: PathBuf },
    /// Remote REST table-store
    Remote {
        service_url: String,
        service_key: String,
        /// Still needed for settings persistence, which is always local
        data_dir: PathBuf,
    },
}

impl StoreConfig {
    /// Resolves the backing store from settings, environment and defaults.
    ///
    /// Falling through every tier is a configuration gap, not a hard error:
    /// it is surfaced as a blocking startup warning and the adapter runs
    /// local-only.
    pub fn resolve(settings: &Settings, data_dir: impl Into<PathBuf>) -> StoreConfig {
        let data_dir = data_dir.into();

        let env_pair = credential_pair(
            std::env::var(ENV_SERVICE_URL).ok(),
            std::env::var(ENV_SERVICE_KEY).ok(),
        );
        let default_pair = credential_pair(
            DEFAULT_SERVICE_URL.map(str::to_string),
            DEFAULT_SERVICE_KEY.map(str::to_string),
        );

        match pick_credentials(settings, env_pair, default_pair) {
            Some((source, service_url, service_key)) => {
                info!(source = %source, url = %service_url, "Using remote table-store");
                StoreConfig::Remote {
                    service_url,
                    service_key,
                    data_dir,
                }
            }
            None => {
                warn!(
                    "No remote store credentials configured (settings, {} / {}); \
                     falling back to local-only storage",
                    ENV_SERVICE_URL, ENV_SERVICE_KEY
                );
                StoreConfig::Local { data_dir }
            }
        }
    }

    /// Builds the backend this configuration names.
    pub fn build_backend(&self) -> StoreResult<Box<dyn Backend>> {
        match self {
            StoreConfig::Local { data_dir } => Ok(Box::new(LocalBackend::new(data_dir.clone()))),
            StoreConfig::Remote {
                service_url,
                service_key,
                ..
            } => Ok(Box::new(RemoteBackend::new(service_url, service_key)?)),
        }
    }

    /// The local data directory (settings always persist there).
    pub fn data_dir(&self) -> &Path {
        match self {
            StoreConfig::Local { data_dir } => data_dir,
            StoreConfig::Remote { data_dir, .. } => data_dir,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, StoreConfig::Remote { .. })
    }
}

/// Keeps a credential pair only when both halves are non-empty.
fn credential_pair(url: Option<String>, key: Option<String>) -> Option<(String, String)> {
    match (url, key) {
        (Some(url), Some(key)) if !url.trim().is_empty() && !key.trim().is_empty() => {
            Some((url, key))
        }
        _ => None,
    }
}

/// Applies the tier order. Pure so the precedence is testable without
/// touching the process environment.
fn pick_credentials(
    settings: &Settings,
    env_pair: Option<(String, String)>,
    default_pair: Option<(String, String)>,
) -> Option<(&'static str, String, String)> {
    if let Some((url, key)) = settings.credential_override() {
        return Some(("settings", url.to_string(), key.to_string()));
    }
    if let Some((url, key)) = env_pair {
        return Some(("environment", url, key));
    }
    if let Some((url, key)) = default_pair {
        return Some(("built-in", url, key));
    }
    None
}

// =============================================================================
// Unit Tests
// =============================================================================
