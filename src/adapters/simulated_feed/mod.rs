//! Simulated Feed Adapter
//!
//! Stand-in for a live token stream. Each discovery column gets its own
//! `FeedSimulator` task that loads a randomized token list after a short
//! delay and then keeps drifting it on jittered timers.
//!
//! # Example
//!
//! ```ignore
//! let state = Arc::new(RwLock::new(ColumnState::new(ColumnKind::NewPairs)));
//! let (events, mut rx) = FeedSimulator::event_channel();
//! let cancel = CancellationToken::new();
//!
//! let task = FeedSimulator::new(
//!     ColumnKind::NewPairs,
//!     FeedConfig::default(),
//!     StdRng::from_entropy(),
//!     state.clone(),
//!     events,
//!     cancel.clone(),
//! )
//! .spawn();
//!
//! while let Ok(event) = rx.recv().await {
//!     if let FeedEvent::Mutated { ids } = event {
//!         println!("drifted: {:?}", ids);
//!     }
//! }
//! ```

mod flash;
mod simulator;

pub use flash::FlashResets;
pub use simulator::{
    apply_drift, ColumnState, Drift, FeedConfig, FeedEvent, FeedPhase, FeedSimulator,
    SharedColumnState, DEFAULT_FLASH_MS, DEFAULT_TOKEN_COUNT,
};
