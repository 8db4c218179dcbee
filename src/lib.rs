//! mtpd - MTP storage-exposure gating service
//!
//! This crate coordinates exposure of mounted storage volumes to a USB host
//! over an MTP session: a volume becomes visible only once it is mounted,
//! the device has been unlocked, and a session is running.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod session;
pub mod state;
pub mod storage;
pub mod web;

pub use error::{AppError, Result};
