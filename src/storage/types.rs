//! Storage data types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Descriptor of a mounted, recognized storage volume
///
/// Immutable once built; registry lookups key on `mount_path`. The
/// `storage_id` is derived from the volume's candidate slot index and is
/// stable for the life of a mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageDescriptor {
    /// Stable storage identifier announced to the host
    pub storage_id: u32,
    /// Mount path (registry identity)
    pub mount_path: PathBuf,
    /// Display name shown by the host
    pub description: String,
    /// Space withheld from the host's free-space report, in bytes
    pub reserve_bytes: u64,
}

impl StorageDescriptor {
    /// Derive the storage id for a candidate slot index
    ///
    /// Physical volume id in the high 16 bits (slot index + 1), partition
    /// number 1 in the low 16 bits.
    pub fn id_for_slot(index: usize) -> u32 {
        ((index as u32 + 1) << 16) | 0x0001
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_for_slot() {
        assert_eq!(StorageDescriptor::id_for_slot(0), 0x0001_0001);
        assert_eq!(StorageDescriptor::id_for_slot(1), 0x0002_0001);
        assert_eq!(StorageDescriptor::id_for_slot(2), 0x0003_0001);
    }

    #[test]
    fn test_id_is_stable() {
        assert_eq!(
            StorageDescriptor::id_for_slot(0),
            StorageDescriptor::id_for_slot(0)
        );
    }
}
