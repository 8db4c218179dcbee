//! System event types
//!
//! Defines all event types that can be broadcast through the event bus.

use serde::{Deserialize, Serialize};

/// System event enumeration
///
/// All events are tagged with their event name for serialization.
/// The `serde(tag = "event", content = "data")` attribute creates a
/// JSON structure like:
/// ```json
/// {"event": "storage_mounted", "data": {"path": "/storage/emulated/0", "storage_id": 65537}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SystemEvent {
    /// An MTP session started accepting host connections
    SessionStarted {
        /// Primary storage path the session is bound to
        primary_path: String,
        /// Whether the session runs in PTP mode
        ptp_mode: bool,
    },

    /// The MTP session was terminated
    SessionStopped,

    /// A recognized volume was mounted and registered
    StorageMounted {
        path: String,
        storage_id: u32,
        description: String,
    },

    /// A registered volume was unmounted and removed
    StorageUnmounted { path: String, storage_id: u32 },

    /// A registered volume was announced to the running session
    StorageExposed { path: String, storage_id: u32 },

    /// The lock gate opened and retained storages were replayed
    UnlockReplay {
        /// Number of storages announced to the session
        exposed: usize,
    },

    /// The PTP transfer-mode setting changed (applies on next session start)
    PtpModeChanged { enabled: bool },

    /// Generic error notification
    Error { message: String },
}
