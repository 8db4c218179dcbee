//! Coordinator data types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::oneshot;

use crate::error::Result;
use crate::storage::StorageDescriptor;

/// Volume mount state as reported by the mount notifier
///
/// Only transitions into and out of `Mounted` matter to the coordinator;
/// the remaining states exist so notifiers can report what they see
/// without translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeState {
    Mounted,
    Unmounted,
    Checking,
    Ejecting,
    Removed,
    Bad,
}

/// Events consumed by the coordinator loop
///
/// Every external notifier is a producer pushing one of these variants;
/// the single-consumer loop is the serialization point for all state.
#[derive(Debug)]
pub enum CoordinatorEvent {
    /// A volume changed mount state
    StorageStateChanged {
        path: PathBuf,
        old_state: VolumeState,
        new_state: VolumeState,
    },
    /// The device was unlocked (fired once per unlock)
    UnlockObserved,
    /// Start an MTP session bound to the given primary storage
    StartRequested {
        primary_path: PathBuf,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Stop the running session
    StopRequested { reply: oneshot::Sender<Result<()>> },
    /// The PTP transfer-mode setting changed
    PtpModeChanged(bool),
    /// An object appeared in a storage
    ObjectAdded(u32),
    /// An object disappeared from a storage
    ObjectRemoved(u32),
    /// Snapshot request from the control surface
    StateQuery {
        reply: oneshot::Sender<MtpState>,
    },
}

/// Coordinator state snapshot, taken inside the serialized region
#[derive(Debug, Clone, Serialize)]
pub struct MtpState {
    /// Whether an MTP session is running
    pub running: bool,
    /// Whether storages are withheld pending unlock
    pub suppressed: bool,
    /// PTP mode for the next session start
    pub ptp_mode: bool,
    /// Currently registered (mounted, recognized) storages
    pub storages: Vec<StorageDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_state_wire_names() {
        assert_eq!(
            serde_json::to_string(&VolumeState::Mounted).unwrap(),
            "\"mounted\""
        );
        let state: VolumeState = serde_json::from_str("\"ejecting\"").unwrap();
        assert_eq!(state, VolumeState::Ejecting);
    }
}
