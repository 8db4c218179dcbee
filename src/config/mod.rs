//! Application configuration
//!
//! Split into the schema (serde structs with defaults) and the store
//! (JSON file load/save plus validation).

pub mod schema;
pub mod store;

pub use schema::{AppConfig, SecurityConfig, StorageConfig, WebConfig};
pub use store::ConfigStore;
