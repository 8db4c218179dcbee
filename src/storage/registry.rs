//! Registry of currently mounted, recognized storage volumes
//!
//! Entries are created on a mount event for a candidate path and destroyed
//! on the corresponding unmount. Paths outside the configured candidate
//! list are never registered. The registry has no locking of its own; it
//! is owned and serialized by the coordinator event loop.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::StorageDescriptor;

/// Mount-path keyed registry of recognized storage volumes
pub struct StorageRegistry {
    /// Ordered candidate mount paths (index 0 is the primary storage)
    candidate_paths: Vec<PathBuf>,
    /// Display names, parallel to `candidate_paths`
    descriptions: Vec<String>,
    /// Reserved space for the primary storage, in bytes
    reserve_bytes: u64,
    /// Currently mounted volumes
    mounted: HashMap<PathBuf, StorageDescriptor>,
}

impl StorageRegistry {
    /// Create a registry for the given candidate configuration
    pub fn new(
        candidate_paths: Vec<PathBuf>,
        descriptions: Vec<String>,
        reserve_bytes: u64,
    ) -> Self {
        Self {
            candidate_paths,
            descriptions,
            reserve_bytes,
            mounted: HashMap::new(),
        }
    }

    /// Register a mounted volume
    ///
    /// Builds and stores a descriptor if `path` is one of the candidate
    /// paths; returns `None` for unrecognized paths (a no-op, not an
    /// error - most mount events are irrelevant to this service). The
    /// reserved-space setting applies to the primary storage only.
    pub fn register(&mut self, path: &Path) -> Option<StorageDescriptor> {
        let index = self.candidate_paths.iter().position(|p| p == path)?;

        let reserve_bytes = if index == 0 { self.reserve_bytes } else { 0 };
        let description = self
            .descriptions
            .get(index)
            .cloned()
            .unwrap_or_else(|| path.display().to_string());

        let descriptor = StorageDescriptor {
            storage_id: StorageDescriptor::id_for_slot(index),
            mount_path: path.to_path_buf(),
            description,
            reserve_bytes,
        };

        debug!(
            "registered storage {:#010x} at {}",
            descriptor.storage_id,
            path.display()
        );
        self.mounted.insert(path.to_path_buf(), descriptor.clone());
        Some(descriptor)
    }

    /// Remove a volume, returning its descriptor if it was registered
    pub fn unregister(&mut self, path: &Path) -> Option<StorageDescriptor> {
        self.mounted.remove(path)
    }

    /// Snapshot of all registered descriptors (order not significant)
    pub fn values(&self) -> Vec<StorageDescriptor> {
        self.mounted.values().cloned().collect()
    }

    /// Whether a path is currently registered
    pub fn contains(&self, path: &Path) -> bool {
        self.mounted.contains_key(path)
    }

    /// Number of registered volumes
    pub fn len(&self) -> usize {
        self.mounted.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_registry() -> StorageRegistry {
        StorageRegistry::new(
            vec![
                PathBuf::from("/storage/emulated/0"),
                PathBuf::from("/storage/sdcard1"),
            ],
            vec!["Internal storage".to_string(), "SD card".to_string()],
            50 * 1024 * 1024,
        )
    }

    #[test]
    fn test_register_recognized_path() {
        let mut registry = test_registry();

        let descriptor = registry
            .register(Path::new("/storage/emulated/0"))
            .expect("primary path should register");

        assert_eq!(descriptor.storage_id, 0x0001_0001);
        assert_eq!(descriptor.description, "Internal storage");
        assert_eq!(descriptor.reserve_bytes, 50 * 1024 * 1024);
        assert!(registry.contains(Path::new("/storage/emulated/0")));
    }

    #[test]
    fn test_register_unrecognized_path_is_noop() {
        let mut registry = test_registry();

        assert!(registry.register(Path::new("/mnt/usbdisk")).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reserve_applies_to_primary_only() {
        let mut registry = test_registry();

        let secondary = registry
            .register(Path::new("/storage/sdcard1"))
            .unwrap();
        assert_eq!(secondary.reserve_bytes, 0);
        assert_eq!(secondary.storage_id, 0x0002_0001);
        assert_eq!(secondary.description, "SD card");
    }

    #[test]
    fn test_path_appears_at_most_once() {
        let mut registry = test_registry();

        registry.register(Path::new("/storage/sdcard1")).unwrap();
        registry.register(Path::new("/storage/sdcard1")).unwrap();

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister() {
        let mut registry = test_registry();

        registry.register(Path::new("/storage/emulated/0")).unwrap();
        let removed = registry.unregister(Path::new("/storage/emulated/0"));

        assert_eq!(removed.unwrap().storage_id, 0x0001_0001);
        assert!(registry.is_empty());
        assert!(registry.unregister(Path::new("/storage/emulated/0")).is_none());
    }

    #[test]
    fn test_mount_unmount_sequences_track_set() {
        let mut registry = test_registry();
        let primary = Path::new("/storage/emulated/0");
        let card = Path::new("/storage/sdcard1");

        registry.register(primary);
        registry.register(card);
        registry.unregister(primary);

        let values = registry.values();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].mount_path, card);
    }
}
