//! Web control surface
//!
//! A narrow cross-process call surface for the mount notifier, the lock
//! notifier, and operators. No authentication beyond process/network
//! boundary trust; bind it to loopback.

mod handlers;
mod routes;
mod ws;

pub use routes::create_router;
