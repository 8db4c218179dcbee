use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::coordinator::CoordinatorHandle;
use crate::events::EventBus;

/// Application-wide state shared across handlers
///
/// All coordinator state lives behind the [`CoordinatorHandle`]; handlers
/// never touch the registry or gate directly.
pub struct AppState {
    /// Loaded configuration
    pub config: AppConfig,
    /// Producer side of the gating state machine
    pub coordinator: CoordinatorHandle,
    /// Event bus for real-time notifications
    pub events: Arc<EventBus>,
    /// Shutdown signal sender
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: AppConfig,
        coordinator: CoordinatorHandle,
        events: Arc<EventBus>,
        shutdown_tx: broadcast::Sender<()>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            coordinator,
            events,
            shutdown_tx,
        })
    }

    /// Subscribe to shutdown signal
    pub fn shutdown_signal(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }
}
