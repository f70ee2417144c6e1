//! Column Handle
//!
//! Owns one discovery column: its simulated feed task, the live token list
//! and the filter/sort inputs. Consumers read either the raw live snapshot or
//! the derived view, and subscribe to feed events to know when to recompute.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::adapters::simulated_feed::{
    ColumnState, FeedConfig, FeedEvent, FeedPhase, FeedSimulator, SharedColumnState,
};
use crate::domain::{ColumnKind, SortField, SortOrder, SortState, Token, ViewState};

/// Live `{tokens, loading}` view of a column
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSnapshot {
    pub tokens: Vec<Token>,
    pub loading: bool,
}

/// Filtered and sorted column contents
#[derive(Debug, Clone, Serialize)]
pub struct ColumnView {
    pub kind: ColumnKind,
    /// Tokens after filter and sort
    pub tokens: Vec<Token>,
    /// Size of the live list before filtering
    pub total: usize,
    pub loading: bool,
    pub sort: SortState,
    pub filter: String,
}

/// Handle to one running column
pub struct ColumnHandle {
    kind: ColumnKind,
    state: SharedColumnState,
    inputs: ViewState,
    events: broadcast::Sender<FeedEvent>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    disposed: bool,
}

/// Create a column and start its feed
///
/// Must be called from within a tokio runtime.
pub fn create_column(kind: ColumnKind, config: &FeedConfig) -> ColumnHandle {
    create_column_with_rng(kind, config, StdRng::from_entropy())
}

/// Create a column whose feed draws from the given RNG
pub fn create_column_with_rng(kind: ColumnKind, config: &FeedConfig, rng: StdRng) -> ColumnHandle {
    let state: SharedColumnState = Arc::new(RwLock::new(ColumnState::new(kind)));
    let (events, _) = FeedSimulator::event_channel();
    let cancel = CancellationToken::new();

    let task = FeedSimulator::new(
        kind,
        config.clone(),
        rng,
        Arc::clone(&state),
        events.clone(),
        cancel.clone(),
    )
    .spawn();

    info!(column = %kind, "Column created");

    ColumnHandle {
        kind,
        state,
        inputs: ViewState::new(kind),
        events,
        cancel,
        task: Some(task),
        disposed: false,
    }
}

impl ColumnHandle {
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Current live list and loading flag
    pub async fn snapshot(&self) -> ColumnSnapshot {
        let state = self.state.read().await;
        ColumnSnapshot {
            tokens: state.tokens.clone(),
            loading: state.is_loading(),
        }
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.is_loading()
    }

    pub async fn phase(&self) -> FeedPhase {
        self.state.read().await.phase
    }

    /// Recompute the filtered, sorted view
    pub async fn view(&self) -> ColumnView {
        let (tokens, total, loading) = {
            let state = self.state.read().await;
            (self.inputs.derive(&state.tokens), state.tokens.len(), state.is_loading())
        };

        ColumnView {
            kind: self.kind,
            tokens,
            total,
            loading,
            sort: self.inputs.sort,
            filter: self.inputs.filter.clone(),
        }
    }

    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        self.inputs.filter = text.into();
    }

    /// Select a sort field; selecting the active field flips the order
    pub fn set_sort_field(&mut self, field: SortField) {
        self.inputs.sort.select(field);
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.inputs.sort.order = order;
    }

    /// Replace field and order without toggling
    pub fn set_sort(&mut self, sort: SortState) {
        self.inputs.sort = sort;
    }

    pub fn sort(&self) -> SortState {
        self.inputs.sort
    }

    pub fn filter(&self) -> &str {
        &self.inputs.filter
    }

    /// Receive feed events from this point on
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.events.subscribe()
    }

    /// Wait until the initial token list is in place
    ///
    /// Returns false if the feed stopped before loading.
    pub async fn wait_until_loaded(&self) -> bool {
        let mut rx = self.subscribe();
        loop {
            match self.phase().await {
                FeedPhase::Live => return true,
                FeedPhase::Stopped => return false,
                FeedPhase::Loading => {}
            }
            match rx.recv().await {
                Ok(FeedEvent::Loaded { .. }) => return true,
                Ok(FeedEvent::Stopped) | Err(broadcast::error::RecvError::Closed) => return false,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            }
        }
    }

    /// The feed task ended without the column being disposed
    pub fn is_faulted(&self) -> bool {
        !self.disposed && self.task.as_ref().is_some_and(|t| t.is_finished())
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Stop the feed and cancel every timer scoped to this column
    pub async fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.cancel.cancel();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if e.is_panic() {
                    warn!(column = %self.kind, "Feed task panicked before dispose");
                }
            }
        }

        // covers a feed that died without running its own teardown
        let mut state = self.state.write().await;
        state.flashes.cancel_all();
        state.phase = FeedPhase::Stopped;
        drop(state);

        info!(column = %self.kind, "Column disposed");
    }
}

impl Drop for ColumnHandle {
    fn drop(&mut self) {
        if self.disposed {
            return;
        }
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Ok(mut state) = self.state.try_write() {
            state.flashes.cancel_all();
            state.phase = FeedPhase::Stopped;
        }
    }
}
