//! Session lifecycle management
//!
//! Wraps creation and destruction of the external session collaborators.
//! At most one session exists at a time; start and stop are idempotent and
//! every forwarding call tolerates a missing session as a no-op. The
//! lifecycle carries no locking of its own - the coordinator event loop is
//! the single serialization point for all mutations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::backend::{ObjectDatabase, SessionFactory, TransferServer};
use crate::error::Result;
use crate::storage::StorageDescriptor;

/// Collaborator handles for the one active session
struct ActiveSession {
    database: Arc<dyn ObjectDatabase>,
    server: Arc<dyn TransferServer>,
    primary_path: PathBuf,
}

/// Owner of the external session collaborators' create/start/stop calls
pub struct SessionLifecycle {
    factory: Arc<dyn SessionFactory>,
    active: Option<ActiveSession>,
    /// Transfer mode for the next start (a running session keeps its mode)
    ptp_mode: bool,
}

impl SessionLifecycle {
    /// Create a lifecycle with the given collaborator factory and initial
    /// transfer mode
    pub fn new(factory: Arc<dyn SessionFactory>, ptp_mode: bool) -> Self {
        Self {
            factory,
            active: None,
            ptp_mode,
        }
    }

    /// Start a session bound to `primary_path`
    ///
    /// No-op if a session is already running. On any failure the lifecycle
    /// is left fully stopped; there is no partial-failure state.
    pub async fn start(&mut self, primary_path: &Path) -> Result<()> {
        if self.active.is_some() {
            debug!("session already running, ignoring start");
            return Ok(());
        }

        let (database, server) = self.factory.open(primary_path)?;
        server.set_ptp_mode(self.ptp_mode).await;

        if let Err(e) = server.start().await {
            database.close().await;
            return Err(e);
        }

        info!(
            "started MTP session (primary={}, ptp={})",
            primary_path.display(),
            self.ptp_mode
        );
        self.active = Some(ActiveSession {
            database,
            server,
            primary_path: primary_path.to_path_buf(),
        });
        Ok(())
    }

    /// Stop the running session
    ///
    /// No-op if no session is running; the underlying stop primitive is
    /// never reached in that case.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(active) = self.active.take() else {
            debug!("no session running, ignoring stop");
            return Ok(());
        };

        let result = active.server.stop().await;
        active.database.close().await;
        info!("stopped MTP session");
        result
    }

    /// Announce a storage to the session's database and server
    ///
    /// Dropped silently when no session is running; storages may
    /// legitimately be registered before a session exists.
    pub async fn add_storage(&self, storage: &StorageDescriptor) {
        if let Some(ref active) = self.active {
            debug!(
                "add storage {:#010x} {}",
                storage.storage_id,
                storage.mount_path.display()
            );
            active.database.add_storage(storage).await;
            active.server.add_storage(storage).await;
        }
    }

    /// Withdraw a storage from the session's database and server
    pub async fn remove_storage(&self, storage: &StorageDescriptor) {
        if let Some(ref active) = self.active {
            debug!(
                "remove storage {:#010x} {}",
                storage.storage_id,
                storage.mount_path.display()
            );
            active.database.remove_storage(storage).await;
            active.server.remove_storage(storage).await;
        }
    }

    /// Forward an object-added notification; dropped without a session
    pub async fn notify_object_added(&self, handle: u32) {
        if let Some(ref active) = self.active {
            active.server.send_object_added(handle).await;
        }
    }

    /// Forward an object-removed notification; dropped without a session
    pub async fn notify_object_removed(&self, handle: u32) {
        if let Some(ref active) = self.active {
            active.server.send_object_removed(handle).await;
        }
    }

    /// Update the transfer mode; takes effect on the next start
    pub fn set_ptp_mode(&mut self, enabled: bool) {
        self.ptp_mode = enabled;
    }

    /// Transfer mode for the next start
    pub fn ptp_mode(&self) -> bool {
        self.ptp_mode
    }

    /// Whether a session is currently running
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Primary storage path of the running session, if any
    pub fn primary_path(&self) -> Option<&Path> {
        self.active.as_ref().map(|a| a.primary_path.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::{Call, RecordingFactory};
    use std::path::PathBuf;

    fn descriptor(id: u32) -> StorageDescriptor {
        StorageDescriptor {
            storage_id: id,
            mount_path: PathBuf::from("/storage/emulated/0"),
            description: "Internal storage".to_string(),
            reserve_bytes: 0,
        }
    }

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let factory = RecordingFactory::new();
        let mut lifecycle = SessionLifecycle::new(factory.clone(), false);
        let primary = Path::new("/storage/emulated/0");

        lifecycle.start(primary).await.unwrap();
        lifecycle.start(primary).await.unwrap();

        assert!(lifecycle.is_running());
        assert_eq!(factory.count(&Call::ServerStart), 1);
    }

    #[tokio::test]
    async fn test_stop_without_session_never_reaches_backend() {
        let factory = RecordingFactory::new();
        let mut lifecycle = SessionLifecycle::new(factory.clone(), false);

        lifecycle.stop().await.unwrap();

        assert_eq!(factory.count(&Call::ServerStop), 0);
    }

    #[tokio::test]
    async fn test_stop_closes_database() {
        let factory = RecordingFactory::new();
        let mut lifecycle = SessionLifecycle::new(factory.clone(), false);

        lifecycle.start(Path::new("/storage/emulated/0")).await.unwrap();
        lifecycle.stop().await.unwrap();

        assert!(!lifecycle.is_running());
        assert_eq!(factory.count(&Call::ServerStop), 1);
        assert_eq!(factory.count(&Call::DatabaseClose), 1);
    }

    #[tokio::test]
    async fn test_start_failure_is_atomic() {
        let factory = RecordingFactory::new();
        factory.fail_next_start();
        let mut lifecycle = SessionLifecycle::new(factory.clone(), false);

        let result = lifecycle.start(Path::new("/storage/emulated/0")).await;

        assert!(result.is_err());
        assert!(!lifecycle.is_running());
        // The database handle acquired before the failed start is released
        assert_eq!(factory.count(&Call::DatabaseClose), 1);
    }

    #[tokio::test]
    async fn test_forwards_without_session_are_dropped() {
        let factory = RecordingFactory::new();
        let lifecycle = SessionLifecycle::new(factory.clone(), false);

        lifecycle.add_storage(&descriptor(0x0001_0001)).await;
        lifecycle.remove_storage(&descriptor(0x0001_0001)).await;
        lifecycle.notify_object_added(7).await;
        lifecycle.notify_object_removed(7).await;

        assert!(factory.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_storage_reaches_database_then_server() {
        let factory = RecordingFactory::new();
        let mut lifecycle = SessionLifecycle::new(factory.clone(), false);

        lifecycle.start(Path::new("/storage/emulated/0")).await.unwrap();
        lifecycle.add_storage(&descriptor(0x0001_0001)).await;

        let calls = factory.calls();
        let db_pos = calls
            .iter()
            .position(|c| *c == Call::DatabaseAddStorage(0x0001_0001))
            .unwrap();
        let srv_pos = calls
            .iter()
            .position(|c| *c == Call::ServerAddStorage(0x0001_0001))
            .unwrap();
        assert!(db_pos < srv_pos);
    }

    #[tokio::test]
    async fn test_ptp_mode_applies_on_next_start() {
        let factory = RecordingFactory::new();
        let mut lifecycle = SessionLifecycle::new(factory.clone(), false);
        let primary = Path::new("/storage/emulated/0");

        lifecycle.start(primary).await.unwrap();
        lifecycle.set_ptp_mode(true);
        // Running session keeps its mode
        assert_eq!(factory.count(&Call::SetPtpMode(true)), 0);

        lifecycle.stop().await.unwrap();
        lifecycle.start(primary).await.unwrap();

        assert_eq!(factory.count(&Call::SetPtpMode(false)), 1);
        assert_eq!(factory.count(&Call::SetPtpMode(true)), 1);
    }

    #[tokio::test]
    async fn test_object_notifications_forward_while_running() {
        let factory = RecordingFactory::new();
        let mut lifecycle = SessionLifecycle::new(factory.clone(), false);

        lifecycle.start(Path::new("/storage/emulated/0")).await.unwrap();
        lifecycle.notify_object_added(42).await;
        lifecycle.notify_object_removed(42).await;

        assert_eq!(factory.count(&Call::ObjectAdded(42)), 1);
        assert_eq!(factory.count(&Call::ObjectRemoved(42)), 1);
    }
}
