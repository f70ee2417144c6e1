//! Discovery Dashboard
//!
//! Runs the three discovery columns side by side. Rendering faults are
//! isolated per column: a column whose renderer errors or panics, or whose
//! feed task dies, goes offline on its own and can be retried, while the
//! other columns keep their live state.

use std::fmt::Display;
use std::panic::{catch_unwind, AssertUnwindSafe};

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::column::{create_column_with_rng, ColumnHandle, ColumnView};
use crate::adapters::simulated_feed::{FeedConfig, FeedEvent};
use crate::domain::ColumnKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("Column {0} is not offline")]
    NotOffline(ColumnKind),
    #[error("Column {0} is offline")]
    Offline(ColumnKind),
}

/// Externally visible state of a column slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnStatus {
    Loading,
    Live,
    Offline { reason: String },
}

/// Output of rendering one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel {
    Rendered { kind: ColumnKind, body: String },
    Offline { kind: ColumnKind, reason: String },
}

impl Panel {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Panel::Rendered { kind, .. } | Panel::Offline { kind, .. } => *kind,
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self, Panel::Offline { .. })
    }
}

enum Slot {
    Active {
        handle: ColumnHandle,
        events: broadcast::Receiver<FeedEvent>,
    },
    Offline {
        reason: String,
    },
}

/// The three columns plus their fault state
pub struct Dashboard {
    config: FeedConfig,
    seed: Option<u64>,
    generation: u64,
    slots: Vec<(ColumnKind, Slot)>,
}

impl Dashboard {
    /// Start all columns with entropy-seeded feeds
    pub fn start(config: FeedConfig) -> Self {
        Self::build(config, None)
    }

    /// Start all columns with reproducible feeds
    pub fn start_seeded(config: FeedConfig, seed: u64) -> Self {
        Self::build(config, Some(seed))
    }

    fn build(config: FeedConfig, seed: Option<u64>) -> Self {
        let mut dashboard = Self {
            config,
            seed,
            generation: 0,
            slots: Vec::with_capacity(ColumnKind::ALL.len()),
        };
        for kind in ColumnKind::ALL {
            let slot = dashboard.spawn_slot(kind);
            dashboard.slots.push((kind, slot));
        }
        info!("Dashboard started with {} columns", dashboard.slots.len());
        dashboard
    }

    fn spawn_slot(&mut self, kind: ColumnKind) -> Slot {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.generation)),
            None => StdRng::from_entropy(),
        };
        self.generation += 1;

        let handle = create_column_with_rng(kind, &self.config, rng);
        let events = handle.subscribe();
        Slot::Active { handle, events }
    }

    fn slot_mut(&mut self, kind: ColumnKind) -> &mut Slot {
        let idx = ColumnKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default();
        &mut self.slots[idx].1
    }

    fn slot(&self, kind: ColumnKind) -> &Slot {
        let idx = ColumnKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default();
        &self.slots[idx].1
    }

    pub fn column(&self, kind: ColumnKind) -> Option<&ColumnHandle> {
        match self.slot(kind) {
            Slot::Active { handle, .. } => Some(handle),
            Slot::Offline { .. } => None,
        }
    }

    /// Mutable access for filter/sort input
    pub fn column_mut(&mut self, kind: ColumnKind) -> Result<&mut ColumnHandle, DashboardError> {
        match self.slot_mut(kind) {
            Slot::Active { handle, .. } => Ok(handle),
            Slot::Offline { .. } => Err(DashboardError::Offline(kind)),
        }
    }

    pub async fn status(&self, kind: ColumnKind) -> ColumnStatus {
        match self.slot(kind) {
            Slot::Offline { reason } => ColumnStatus::Offline { reason: reason.clone() },
            Slot::Active { handle, .. } => {
                if handle.is_loading().await {
                    ColumnStatus::Loading
                } else {
                    ColumnStatus::Live
                }
            }
        }
    }

    /// Wait until every active column has loaded
    pub async fn wait_until_loaded(&self) {
        for (_, slot) in &self.slots {
            if let Slot::Active { handle, .. } = slot {
                handle.wait_until_loaded().await;
            }
        }
    }

    /// Drain pending feed events; true if any column changed since the last call
    pub fn take_changes(&mut self) -> bool {
        let mut changed = false;
        for (_, slot) in self.slots.iter_mut() {
            if let Slot::Active { events, .. } = slot {
                loop {
                    match events.try_recv() {
                        Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => changed = true,
                        Err(_) => break,
                    }
                }
            }
        }
        changed
    }

    /// Render every column, isolating faults per column
    pub async fn render<F, E>(&mut self, mut render: F) -> Vec<Panel>
    where
        F: FnMut(&ColumnView) -> Result<String, E>,
        E: Display,
    {
        let mut panels = Vec::with_capacity(self.slots.len());

        for kind in ColumnKind::ALL {
            let outcome = match self.slot(kind) {
                Slot::Offline { reason } => Err(reason.clone()),
                Slot::Active { handle, .. } if handle.is_faulted() => {
                    Err("feed task stopped unexpectedly".to_string())
                }
                Slot::Active { handle, .. } => {
                    let view = handle.view().await;
                    match catch_unwind(AssertUnwindSafe(|| render(&view))) {
                        Ok(Ok(body)) => Ok(body),
                        Ok(Err(e)) => Err(format!("render failed: {}", e)),
                        Err(payload) => Err(format!("render panicked: {}", panic_message(&*payload))),
                    }
                }
            };

            match outcome {
                Ok(body) => panels.push(Panel::Rendered { kind, body }),
                Err(reason) => {
                    self.take_offline(kind, &reason).await;
                    panels.push(Panel::Offline { kind, reason });
                }
            }
        }

        panels
    }

    /// Put a column offline, tearing down its feed
    pub async fn take_offline(&mut self, kind: ColumnKind, reason: &str) {
        let previous = std::mem::replace(
            self.slot_mut(kind),
            Slot::Offline { reason: reason.to_string() },
        );
        if let Slot::Active { mut handle, .. } = previous {
            warn!(column = %kind, reason, "Column offline");
            handle.dispose().await;
        }
    }

    /// Restart an offline column from scratch
    pub async fn retry(&mut self, kind: ColumnKind) -> Result<(), DashboardError> {
        if !matches!(self.slot(kind), Slot::Offline { .. }) {
            return Err(DashboardError::NotOffline(kind));
        }
        let slot = self.spawn_slot(kind);
        *self.slot_mut(kind) = slot;
        info!(column = %kind, "Column retried");
        Ok(())
    }

    /// Dispose every column
    pub async fn shutdown(&mut self) {
        for (_, slot) in self.slots.iter_mut() {
            if let Slot::Active { handle, .. } = slot {
                handle.dispose().await;
            }
        }
        info!("Dashboard stopped");
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
