//! Session collaborator trait definitions

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::storage::StorageDescriptor;

/// Per-session object database collaborator
///
/// Indexes file metadata for the host's object enumeration. Bound to the
/// primary storage path when the session is opened; closed when the
/// session stops.
#[async_trait]
pub trait ObjectDatabase: Send + Sync {
    /// Make a storage's objects visible to enumeration
    async fn add_storage(&self, storage: &StorageDescriptor);

    /// Drop a storage's objects from enumeration
    async fn remove_storage(&self, storage: &StorageDescriptor);

    /// Release the database handle
    async fn close(&self);
}

/// MTP protocol server collaborator
///
/// Accepts host connections and transfers bytes. Responsible for its own
/// internal concurrency; every call here is expected to return quickly.
#[async_trait]
pub trait TransferServer: Send + Sync {
    /// Begin accepting host connections
    async fn start(&self) -> Result<()>;

    /// Stop accepting connections and tear the session down
    async fn stop(&self) -> Result<()>;

    /// Select PTP or MTP transfer mode (must be set before `start`)
    async fn set_ptp_mode(&self, enabled: bool);

    /// Announce a storage to the connected host
    async fn add_storage(&self, storage: &StorageDescriptor);

    /// Withdraw a storage from the connected host
    async fn remove_storage(&self, storage: &StorageDescriptor);

    /// Notify the host of a new object
    async fn send_object_added(&self, handle: u32);

    /// Notify the host of a removed object
    async fn send_object_removed(&self, handle: u32);
}

/// Factory constructing the collaborator pair for one session
pub trait SessionFactory: Send + Sync {
    /// Open a database/server pair bound to the primary storage path
    fn open(
        &self,
        primary_path: &Path,
    ) -> Result<(Arc<dyn ObjectDatabase>, Arc<dyn TransferServer>)>;
}
