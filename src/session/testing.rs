//! Recording session collaborators for unit tests

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::backend::{ObjectDatabase, SessionFactory, TransferServer};
use crate::error::{AppError, Result};
use crate::storage::StorageDescriptor;

/// One recorded collaborator call (storages identified by storage_id)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(PathBuf),
    SetPtpMode(bool),
    ServerStart,
    ServerStop,
    ServerAddStorage(u32),
    ServerRemoveStorage(u32),
    DatabaseAddStorage(u32),
    DatabaseRemoveStorage(u32),
    DatabaseClose,
    ObjectAdded(u32),
    ObjectRemoved(u32),
}

/// Factory whose collaborators record every call into a shared log
pub struct RecordingFactory {
    calls: Arc<Mutex<Vec<Call>>>,
    fail_next_start: Arc<AtomicBool>,
}

impl RecordingFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_next_start: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Make the next server start fail
    pub fn fail_next_start(&self) {
        self.fail_next_start.store(true, Ordering::SeqCst);
    }

    /// Snapshot of all recorded calls, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of times a call was recorded
    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }
}

impl SessionFactory for RecordingFactory {
    fn open(
        &self,
        primary_path: &Path,
    ) -> Result<(Arc<dyn ObjectDatabase>, Arc<dyn TransferServer>)> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Open(primary_path.to_path_buf()));
        let database = Arc::new(RecordingDatabase {
            calls: Arc::clone(&self.calls),
        });
        let server = Arc::new(RecordingServer {
            calls: Arc::clone(&self.calls),
            fail_next_start: Arc::clone(&self.fail_next_start),
        });
        Ok((database, server))
    }
}

struct RecordingDatabase {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingDatabase {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ObjectDatabase for RecordingDatabase {
    async fn add_storage(&self, storage: &StorageDescriptor) {
        self.record(Call::DatabaseAddStorage(storage.storage_id));
    }

    async fn remove_storage(&self, storage: &StorageDescriptor) {
        self.record(Call::DatabaseRemoveStorage(storage.storage_id));
    }

    async fn close(&self) {
        self.record(Call::DatabaseClose);
    }
}

struct RecordingServer {
    calls: Arc<Mutex<Vec<Call>>>,
    fail_next_start: Arc<AtomicBool>,
}

impl RecordingServer {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TransferServer for RecordingServer {
    async fn start(&self) -> Result<()> {
        if self.fail_next_start.swap(false, Ordering::SeqCst) {
            return Err(AppError::Session("simulated start failure".to_string()));
        }
        self.record(Call::ServerStart);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.record(Call::ServerStop);
        Ok(())
    }

    async fn set_ptp_mode(&self, enabled: bool) {
        self.record(Call::SetPtpMode(enabled));
    }

    async fn add_storage(&self, storage: &StorageDescriptor) {
        self.record(Call::ServerAddStorage(storage.storage_id));
    }

    async fn remove_storage(&self, storage: &StorageDescriptor) {
        self.record(Call::ServerRemoveStorage(storage.storage_id));
    }

    async fn send_object_added(&self, handle: u32) {
        self.record(Call::ObjectAdded(handle));
    }

    async fn send_object_removed(&self, handle: u32) {
        self.record(Call::ObjectRemoved(handle));
    }
}
