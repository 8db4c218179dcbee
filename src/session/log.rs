//! Logging session backend
//!
//! A development collaborator pair that traces every lifecycle and
//! forwarding call instead of driving a real MTP transport. Used as the
//! default factory until a kernel gadget transport is wired in, and handy
//! for exercising the coordinator from the control surface.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::backend::{ObjectDatabase, SessionFactory, TransferServer};
use crate::error::Result;
use crate::storage::StorageDescriptor;

/// Factory producing logging collaborators
pub struct LogSessionFactory;

impl LogSessionFactory {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogSessionFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionFactory for LogSessionFactory {
    fn open(
        &self,
        primary_path: &Path,
    ) -> Result<(Arc<dyn ObjectDatabase>, Arc<dyn TransferServer>)> {
        info!(
            "opening log session bound to {}",
            primary_path.display()
        );
        Ok((Arc::new(LogDatabase), Arc::new(LogServer)))
    }
}

struct LogDatabase;

#[async_trait]
impl ObjectDatabase for LogDatabase {
    async fn add_storage(&self, storage: &StorageDescriptor) {
        info!(
            "db: add storage {:#010x} ({})",
            storage.storage_id, storage.description
        );
    }

    async fn remove_storage(&self, storage: &StorageDescriptor) {
        info!("db: remove storage {:#010x}", storage.storage_id);
    }

    async fn close(&self) {
        info!("db: closed");
    }
}

struct LogServer;

#[async_trait]
impl TransferServer for LogServer {
    async fn start(&self) -> Result<()> {
        info!("server: accepting host connections");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        info!("server: stopped");
        Ok(())
    }

    async fn set_ptp_mode(&self, enabled: bool) {
        info!("server: ptp mode {}", enabled);
    }

    async fn add_storage(&self, storage: &StorageDescriptor) {
        info!(
            "server: announce storage {:#010x} ({})",
            storage.storage_id,
            storage.mount_path.display()
        );
    }

    async fn remove_storage(&self, storage: &StorageDescriptor) {
        info!("server: withdraw storage {:#010x}", storage.storage_id);
    }

    async fn send_object_added(&self, handle: u32) {
        info!("server: object added {}", handle);
    }

    async fn send_object_removed(&self, handle: u32) {
        info!("server: object removed {}", handle);
    }
}
