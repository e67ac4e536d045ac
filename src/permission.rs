//! Persisted microphone-permission flag.
//!
//! Exactly one boolean survives process restarts: whether the user has
//! granted microphone access. It is read once at startup and written once on
//! grant; no other interaction state is persisted.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::AppPaths;

#[derive(Debug, Default, Serialize, Deserialize)]
struct PermissionFlag {
    granted: bool,
}

// ---------------------------------------------------------------------------
// PermissionStore
// ---------------------------------------------------------------------------

/// File-backed store for the microphone-permission grant.
///
/// A missing or unreadable file reads as "not granted" — the orchestrator
/// then walks through the permission request again, which is always safe.
#[derive(Debug, Clone)]
pub struct PermissionStore {
    path: PathBuf,
}

impl PermissionStore {
    /// Store under the platform config directory (`permission.toml`).
    pub fn new() -> Self {
        Self {
            path: AppPaths::new().permission_file,
        }
    }

    /// Store at an explicit path (useful for tests).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the persisted grant. Missing or corrupt files read as `false`.
    pub fn load(&self) -> bool {
        if !self.path.exists() {
            return false;
        }
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match toml::from_str::<PermissionFlag>(&content) {
                Ok(flag) => flag.granted,
                Err(e) => {
                    log::warn!("permission file is corrupt ({e}); treating as not granted");
                    false
                }
            },
            Err(e) => {
                log::warn!("could not read permission file ({e}); treating as not granted");
                false
            }
        }
    }

    /// Persist the grant, creating parent directories as needed.
    pub fn grant(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&PermissionFlag { granted: true })?;
        std::fs::write(&self.path, content)?;
        log::info!("microphone permission persisted");
        Ok(())
    }
}

impl Default for PermissionStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
