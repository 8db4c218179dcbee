use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Candidate storage volumes and exposure settings
    pub storage: StorageConfig,
    /// Lock-gate security settings
    pub security: SecurityConfig,
    /// PTP transfer mode (applied on session start; latest value wins)
    pub ptp_mode: bool,
    /// Control surface settings
    pub web: WebConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            security: SecurityConfig::default(),
            ptp_mode: false,
            web: WebConfig::default(),
        }
    }
}

/// Candidate storage configuration
///
/// `candidate_paths` is the closed, ordered list of mount paths this service
/// is willing to expose. Mount notifications for any other path are ignored.
/// Index 0 is the primary storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Ordered candidate mount paths (index 0 is the primary storage)
    pub candidate_paths: Vec<PathBuf>,
    /// Display names, parallel to `candidate_paths`
    pub descriptions: Vec<String>,
    /// Reserved space in megabytes, applied to the primary storage only
    pub reserve_mb: u64,
    /// Volumes already mounted when the service starts; synthesized into
    /// mount events during startup
    pub premounted: Vec<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            candidate_paths: vec![PathBuf::from("/storage/emulated/0")],
            descriptions: vec!["Internal storage".to_string()],
            reserve_mb: 50,
            premounted: Vec::new(),
        }
    }
}

impl StorageConfig {
    /// Reserved space for the primary storage, in bytes
    pub fn reserve_bytes(&self) -> u64 {
        self.reserve_mb * 1024 * 1024
    }

    /// Primary storage path (candidate index 0)
    pub fn primary_path(&self) -> Option<&PathBuf> {
        self.candidate_paths.first()
    }
}

/// Lock-gate security configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    /// Withhold storages from the host until an unlock is observed.
    /// This is the boot-time equivalent of a secure locked keyguard.
    pub suppress_until_unlock: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            suppress_until_unlock: true,
        }
    }
}

/// Web server (control surface) configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address
    pub address: String,
    /// Listen port
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8460,
        }
    }
}
