//! Configuration file store
//!
//! Loads and saves the JSON configuration file and validates the storage
//! candidate lists before the coordinator is allowed to use them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::schema::AppConfig;
use crate::error::{AppError, Result};

/// Configuration store backed by a JSON file
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Create a store for the given config file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the configuration, falling back to defaults when the file
    /// does not exist yet
    pub fn load(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            info!(
                "Config file {} not found, using defaults",
                self.path.display()
            );
            return Ok(AppConfig::default());
        }

        let raw = std::fs::read_to_string(&self.path)?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        validate(&config)?;
        Ok(config)
    }

    /// Persist the configuration to disk
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        validate(config)?;
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Failed to create config directory: {}", e);
            }
        }
        let raw = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Config file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Validate the storage candidate lists
///
/// The candidate list must be nonempty (there is no primary storage
/// otherwise), descriptions must be parallel to it, and duplicate paths
/// would break the at-most-once registry invariant.
pub fn validate(config: &AppConfig) -> Result<()> {
    let storage = &config.storage;

    if storage.candidate_paths.is_empty() {
        return Err(AppError::Config(
            "storage.candidate_paths must not be empty".to_string(),
        ));
    }

    if storage.descriptions.len() != storage.candidate_paths.len() {
        return Err(AppError::Config(format!(
            "storage.descriptions has {} entries but storage.candidate_paths has {}",
            storage.descriptions.len(),
            storage.candidate_paths.len()
        )));
    }

    let mut seen = HashSet::new();
    for path in &storage.candidate_paths {
        if !seen.insert(path) {
            return Err(AppError::Config(format!(
                "duplicate candidate path: {}",
                path.display()
            )));
        }
    }

    Ok(())
}
