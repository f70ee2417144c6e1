//! Keyed Flash Resets
//!
//! Each mutated token gets one pending reset that clears its
//! `last_update_direction` after the flash duration. Resets are keyed by
//! token id: scheduling again for the same id aborts the earlier reset, so a
//! stale timer can never clear a newer flash.

use std::collections::HashMap;
use std::sync::Weak;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

use super::simulator::{ColumnState, FeedEvent};
use crate::domain::UpdateDirection;

struct PendingReset {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Pending flash resets for one column
#[derive(Default)]
pub struct FlashResets {
    pending: HashMap<String, PendingReset>,
    next_generation: u64,
}

impl std::fmt::Debug for FlashResets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlashResets")
            .field("pending", &self.pending.len())
            .field("next_generation", &self.next_generation)
            .finish()
    }
}

impl FlashResets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resets still waiting to fire
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Schedule (or replace) the reset for `id`
    ///
    /// The spawned task only holds a weak reference to the column, so a reset
    /// that outlives its column does nothing.
    pub fn schedule(
        &mut self,
        id: &str,
        delay: Duration,
        state: Weak<RwLock<ColumnState>>,
        events: broadcast::Sender<FeedEvent>,
    ) {
        let generation = self.next_generation;
        self.next_generation += 1;

        let token_id = id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let Some(state) = state.upgrade() else {
                return;
            };
            let mut guard = state.write().await;
            if !guard.flashes.complete(&token_id, generation) {
                return;
            }
            if let Some(token) = guard.tokens.iter_mut().find(|t| t.id == token_id) {
                token.last_update_direction = UpdateDirection::None;
            }
            drop(guard);

            debug!(token = %token_id, "Flash cleared");
            let _ = events.send(FeedEvent::FlashCleared { id: token_id });
        });

        if let Some(previous) = self
            .pending
            .insert(id.to_string(), PendingReset { generation, handle })
        {
            previous.handle.abort();
        }
    }

    /// Remove the entry for `id` if it still belongs to `generation`
    fn complete(&mut self, id: &str, generation: u64) -> bool {
        match self.pending.get(id) {
            Some(pending) if pending.generation == generation => {
                self.pending.remove(id);
                true
            }
            _ => false,
        }
    }

    /// Abort every pending reset
    pub fn cancel_all(&mut self) {
        for (_, pending) in self.pending.drain() {
            pending.handle.abort();
        }
    }
}

impl Drop for FlashResets {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
