//! MTP session collaborators and lifecycle
//!
//! The actual MTP transport and its per-session object database are
//! external collaborators reached through trait seams. This module owns
//! their create/start/stop calls and guarantees there is at most one
//! active session, treating "no session running" as a safe no-op for all
//! forwarding calls.

pub mod backend;
pub mod lifecycle;
pub mod log;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{ObjectDatabase, SessionFactory, TransferServer};
pub use lifecycle::SessionLifecycle;
pub use log::LogSessionFactory;
