//! Storage volume model
//!
//! Descriptors for recognized storage volumes and the registry of
//! currently mounted ones. The registry holds what *could* be exposed to
//! the host; whether a volume actually is exposed is decided by the
//! coordinator's lock gate and session state.

pub mod registry;
pub mod types;

pub use registry::StorageRegistry;
pub use types::StorageDescriptor;
