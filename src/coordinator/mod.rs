//! Event coordinator - the storage-exposure gating state machine
//!
//! Three independent sources feed this module concurrently: the mount
//! notifier, the lock-state notifier, and the session control surface.
//! All of them push tagged [`CoordinatorEvent`]s through a
//! [`CoordinatorHandle`]; a single-consumer loop applies them one at a
//! time against the registry, the lock gate, and the session lifecycle.
//! That loop is the only place any of this state is touched, so no two
//! transitions can ever interleave.
//!
//! Architecture:
//! ```text
//! mount notifier ──┐
//! lock notifier  ──┼──> CoordinatorHandle ──> event loop ──> SessionLifecycle
//! control surface ─┘         (mpsc)             │                 │
//!                                         StorageRegistry    database/server
//!                                         LockGate            collaborators
//! ```

pub mod gate;
pub mod types;

pub use gate::LockGate;
pub use types::{CoordinatorEvent, MtpState, VolumeState};

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::events::{EventBus, SystemEvent};
use crate::session::{SessionFactory, SessionLifecycle};
use crate::storage::StorageRegistry;

/// Coordinator construction settings, usually taken from [`AppConfig`]
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    /// Ordered candidate mount paths (index 0 is the primary storage)
    pub candidate_paths: Vec<PathBuf>,
    /// Display names, parallel to `candidate_paths`
    pub descriptions: Vec<String>,
    /// Reserved space for the primary storage, in bytes
    pub reserve_bytes: u64,
    /// Initial gate suppression (device locked at startup)
    pub suppress_until_unlock: bool,
    /// Initial PTP transfer mode
    pub ptp_mode: bool,
}

impl From<&AppConfig> for CoordinatorSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            candidate_paths: config.storage.candidate_paths.clone(),
            descriptions: config.storage.descriptions.clone(),
            reserve_bytes: config.storage.reserve_bytes(),
            suppress_until_unlock: config.security.suppress_until_unlock,
            ptp_mode: config.ptp_mode,
        }
    }
}

/// Cloneable producer side of the coordinator
///
/// Each external notifier holds one of these and pushes tagged events;
/// requests that need an answer carry a oneshot reply channel and await it.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<CoordinatorEvent>,
}

impl CoordinatorHandle {
    /// Deliver a mount-state notification
    pub fn storage_state_changed(
        &self,
        path: PathBuf,
        old_state: VolumeState,
        new_state: VolumeState,
    ) {
        let _ = self.tx.send(CoordinatorEvent::StorageStateChanged {
            path,
            old_state,
            new_state,
        });
    }

    /// Deliver the unlock broadcast
    pub fn unlock_observed(&self) {
        let _ = self.tx.send(CoordinatorEvent::UnlockObserved);
    }

    /// Request a session start and wait for the outcome
    pub async fn start_requested(&self, primary_path: PathBuf) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CoordinatorEvent::StartRequested {
                primary_path,
                reply,
            })
            .map_err(|_| coordinator_gone())?;
        rx.await.map_err(|_| coordinator_gone())?
    }

    /// Request a session stop and wait for the outcome
    pub async fn stop_requested(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CoordinatorEvent::StopRequested { reply })
            .map_err(|_| coordinator_gone())?;
        rx.await.map_err(|_| coordinator_gone())?
    }

    /// Deliver a PTP-mode setting change (latest value wins)
    pub fn ptp_mode_changed(&self, enabled: bool) {
        let _ = self.tx.send(CoordinatorEvent::PtpModeChanged(enabled));
    }

    /// Forward an object-added notification
    pub fn object_added(&self, handle: u32) {
        let _ = self.tx.send(CoordinatorEvent::ObjectAdded(handle));
    }

    /// Forward an object-removed notification
    pub fn object_removed(&self, handle: u32) {
        let _ = self.tx.send(CoordinatorEvent::ObjectRemoved(handle));
    }

    /// Fetch a state snapshot taken inside the serialized region
    pub async fn state(&self) -> Result<MtpState> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(CoordinatorEvent::StateQuery { reply })
            .map_err(|_| coordinator_gone())?;
        rx.await.map_err(|_| coordinator_gone())
    }
}

fn coordinator_gone() -> AppError {
    AppError::Internal("coordinator event loop is not running".to_string())
}

/// The gating state machine
///
/// Owns all mutable state; consumed by [`EventCoordinator::run`] on a
/// dedicated task.
pub struct EventCoordinator {
    registry: StorageRegistry,
    gate: LockGate,
    session: SessionLifecycle,
    events: Arc<EventBus>,
    rx: mpsc::UnboundedReceiver<CoordinatorEvent>,
}

impl EventCoordinator {
    /// Create a coordinator and its producer handle
    pub fn new(
        settings: CoordinatorSettings,
        factory: Arc<dyn SessionFactory>,
        events: Arc<EventBus>,
    ) -> (Self, CoordinatorHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            registry: StorageRegistry::new(
                settings.candidate_paths,
                settings.descriptions,
                settings.reserve_bytes,
            ),
            gate: LockGate::new(settings.suppress_until_unlock),
            session: SessionLifecycle::new(factory, settings.ptp_mode),
            events,
            rx,
        };
        (coordinator, CoordinatorHandle { tx })
    }

    /// Spawn the event loop on a tokio task and return the handle
    pub fn spawn(
        settings: CoordinatorSettings,
        factory: Arc<dyn SessionFactory>,
        events: Arc<EventBus>,
    ) -> CoordinatorHandle {
        let (coordinator, handle) = Self::new(settings, factory, events);
        tokio::spawn(coordinator.run());
        handle
    }

    /// Consume events until every handle is dropped
    pub async fn run(mut self) {
        info!(
            "coordinator started (suppressed={}, ptp={})",
            self.gate.is_suppressed(),
            self.session.ptp_mode()
        );
        while let Some(event) = self.rx.recv().await {
            self.handle_event(event).await;
        }
        if let Err(e) = self.session.stop().await {
            warn!("error stopping session on coordinator exit: {}", e);
        }
        info!("coordinator event loop exited");
    }

    async fn handle_event(&mut self, event: CoordinatorEvent) {
        match event {
            CoordinatorEvent::StorageStateChanged {
                path,
                old_state,
                new_state,
            } => {
                debug!(
                    "storage state changed {} {:?} -> {:?}",
                    path.display(),
                    old_state,
                    new_state
                );
                if new_state == VolumeState::Mounted {
                    self.volume_mounted(path).await;
                } else if old_state == VolumeState::Mounted {
                    self.volume_unmounted(path).await;
                }
            }
            CoordinatorEvent::UnlockObserved => self.handle_unlock().await,
            CoordinatorEvent::StartRequested {
                primary_path,
                reply,
            } => {
                let result = self.handle_start(primary_path).await;
                let _ = reply.send(result);
            }
            CoordinatorEvent::StopRequested { reply } => {
                let result = self.handle_stop().await;
                let _ = reply.send(result);
            }
            CoordinatorEvent::PtpModeChanged(enabled) => {
                self.session.set_ptp_mode(enabled);
                info!("ptp mode set to {} (applies on next start)", enabled);
                self.events
                    .publish(SystemEvent::PtpModeChanged { enabled });
            }
            CoordinatorEvent::ObjectAdded(handle) => {
                self.session.notify_object_added(handle).await;
            }
            CoordinatorEvent::ObjectRemoved(handle) => {
                self.session.notify_object_removed(handle).await;
            }
            CoordinatorEvent::StateQuery { reply } => {
                let _ = reply.send(MtpState {
                    running: self.session.is_running(),
                    suppressed: self.gate.is_suppressed(),
                    ptp_mode: self.session.ptp_mode(),
                    storages: self.registry.values(),
                });
            }
        }
    }

    /// A volume transitioned into the mounted state
    ///
    /// Registers recognized paths; exposure happens only when the gate is
    /// open. While suppressed the descriptor is retained for replay.
    async fn volume_mounted(&mut self, path: PathBuf) {
        let Some(storage) = self.registry.register(&path) else {
            debug!("ignoring unrecognized mount path {}", path.display());
            return;
        };

        info!(
            "storage mounted: {} ({:#010x})",
            path.display(),
            storage.storage_id
        );
        self.events.publish(SystemEvent::StorageMounted {
            path: path.display().to_string(),
            storage_id: storage.storage_id,
            description: storage.description.clone(),
        });

        if !self.gate.is_suppressed() {
            self.session.add_storage(&storage).await;
            if self.session.is_running() {
                self.events.publish(SystemEvent::StorageExposed {
                    path: path.display().to_string(),
                    storage_id: storage.storage_id,
                });
            }
        }
    }

    /// A volume left the mounted state
    ///
    /// A storage that disappears must never remain visible, so removal is
    /// forwarded regardless of gate state.
    async fn volume_unmounted(&mut self, path: PathBuf) {
        let Some(storage) = self.registry.unregister(&path) else {
            return;
        };

        info!(
            "storage unmounted: {} ({:#010x})",
            path.display(),
            storage.storage_id
        );
        self.session.remove_storage(&storage).await;
        self.events.publish(SystemEvent::StorageUnmounted {
            path: path.display().to_string(),
            storage_id: storage.storage_id,
        });
    }

    /// Catch-up replay for storages that mounted while suppressed
    async fn handle_unlock(&mut self) {
        if !self.gate.unlock_observed() {
            debug!("unlock observed but gate already open");
            return;
        }

        let storages = self.registry.values();
        info!("gate opened, replaying {} storage(s)", storages.len());
        for storage in &storages {
            self.session.add_storage(storage).await;
            if self.session.is_running() {
                self.events.publish(SystemEvent::StorageExposed {
                    path: storage.mount_path.display().to_string(),
                    storage_id: storage.storage_id,
                });
            }
        }
        self.events.publish(SystemEvent::UnlockReplay {
            exposed: if self.session.is_running() {
                storages.len()
            } else {
                0
            },
        });
    }

    /// Start a session and replay the registry if the gate is open
    ///
    /// Idempotent: a duplicate start request must not create a second
    /// session or duplicate storage announcements. Failure leaves the
    /// session stopped.
    async fn handle_start(&mut self, primary_path: PathBuf) -> Result<()> {
        if self.session.is_running() {
            debug!("start requested but session already running");
            return Ok(());
        }

        self.session.start(&primary_path).await?;

        if !self.gate.is_suppressed() {
            for storage in self.registry.values() {
                self.session.add_storage(&storage).await;
                self.events.publish(SystemEvent::StorageExposed {
                    path: storage.mount_path.display().to_string(),
                    storage_id: storage.storage_id,
                });
            }
        }

        self.events.publish(SystemEvent::SessionStarted {
            primary_path: primary_path.display().to_string(),
            ptp_mode: self.session.ptp_mode(),
        });
        Ok(())
    }

    /// Stop the session; idempotent
    async fn handle_stop(&mut self) -> Result<()> {
        let was_running = self.session.is_running();
        self.session.stop().await?;
        if was_running {
            self.events.publish(SystemEvent::SessionStopped);
        }
        Ok(())
    }
}
