//! Simulated Column Feed
//!
//! Drives one discovery column through Loading -> Live. While live, a
//! self-rescheduling cycle drifts one or two random tokens, flashes them and
//! advances Final Stretch progress. All waits are cancellable through the
//! column's `CancellationToken`.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::flash::FlashResets;
use crate::domain::generator::{sparkline_point, GeneratorConfig, TokenGenerator};
use crate::domain::{ColumnKind, Token, UpdateDirection};

/// Tokens generated per column
pub const DEFAULT_TOKEN_COUNT: usize = 15;
/// Initial load delay bounds (ms)
pub const DEFAULT_LOAD_DELAY_MIN_MS: u64 = 400;
pub const DEFAULT_LOAD_DELAY_MAX_MS: u64 = 1_000;
/// Delay before the first cycle after loading (ms)
pub const DEFAULT_FIRST_TICK_MS: u64 = 1_000;
/// Delay bounds between cycles (ms)
pub const DEFAULT_TICK_MIN_MS: u64 = 500;
pub const DEFAULT_TICK_MAX_MS: u64 = 2_000;
/// Maximum tokens mutated in one cycle
pub const DEFAULT_MAX_MUTATIONS_PER_TICK: usize = 2;
/// Drift bound: delta is uniform in [-v, v]
pub const DEFAULT_VOLATILITY: f64 = 0.02;
/// How long a mutated token stays flashed (ms)
pub const DEFAULT_FLASH_MS: u64 = 800;
/// Largest progress increment per mutation
pub const DEFAULT_MAX_PROGRESS_STEP: f64 = 0.5;

/// Event channel capacity per column
const EVENT_BUFFER_SIZE: usize = 256;

/// Timing and drift parameters for a column feed
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub token_count: usize,
    pub load_delay_min: Duration,
    pub load_delay_max: Duration,
    pub first_tick: Duration,
    pub tick_min: Duration,
    pub tick_max: Duration,
    pub max_mutations_per_tick: usize,
    pub volatility: f64,
    pub flash_duration: Duration,
    pub max_progress_step: f64,
    pub generator: GeneratorConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            token_count: DEFAULT_TOKEN_COUNT,
            load_delay_min: Duration::from_millis(DEFAULT_LOAD_DELAY_MIN_MS),
            load_delay_max: Duration::from_millis(DEFAULT_LOAD_DELAY_MAX_MS),
            first_tick: Duration::from_millis(DEFAULT_FIRST_TICK_MS),
            tick_min: Duration::from_millis(DEFAULT_TICK_MIN_MS),
            tick_max: Duration::from_millis(DEFAULT_TICK_MAX_MS),
            max_mutations_per_tick: DEFAULT_MAX_MUTATIONS_PER_TICK,
            volatility: DEFAULT_VOLATILITY,
            flash_duration: Duration::from_millis(DEFAULT_FLASH_MS),
            max_progress_step: DEFAULT_MAX_PROGRESS_STEP,
            generator: GeneratorConfig::default(),
        }
    }
}

/// Lifecycle of a column feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    Loading,
    Live,
    Stopped,
}

/// Change notifications published by a column feed
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Initial token list is in place
    Loaded { count: usize },
    /// Tokens drifted in one cycle, in list order
    Mutated { ids: Vec<String> },
    /// A token's flash expired
    FlashCleared { id: String },
    /// The feed was torn down
    Stopped,
}

/// Live state of one column, owned by its feed
#[derive(Debug)]
pub struct ColumnState {
    pub kind: ColumnKind,
    pub tokens: Vec<Token>,
    pub phase: FeedPhase,
    pub flashes: FlashResets,
}

impl ColumnState {
    pub fn new(kind: ColumnKind) -> Self {
        Self {
            kind,
            tokens: Vec::new(),
            phase: FeedPhase::Loading,
            flashes: FlashResets::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FeedPhase::Loading
    }
}

pub type SharedColumnState = Arc<RwLock<ColumnState>>;

/// Random inputs for one token mutation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drift {
    /// Multiplicative change, price and market cap scale by `1 + delta`
    pub delta: f64,
    /// Value appended to the sparkline
    pub sparkline_point: f64,
    /// Progress increment (Final Stretch only)
    pub progress_step: Option<f64>,
}

/// Apply one mutation to a token in place
pub fn apply_drift(token: &mut Token, drift: &Drift) {
    let factor = 1.0 + drift.delta;
    token.price *= factor;
    token.market_cap *= factor;

    // drop the oldest point, append the new one; length is unchanged
    let shift = 1.min(token.sparkline.len());
    token.sparkline.rotate_left(shift);
    if let Some(last) = token.sparkline.last_mut() {
        *last = drift.sparkline_point;
    }

    token.last_update_direction = if drift.delta > 0.0 {
        UpdateDirection::Up
    } else {
        UpdateDirection::Down
    };

    if let (Some(step), Some(progress)) = (drift.progress_step, token.progress) {
        token.progress = Some((progress + step).min(100.0));
    }
}

/// Timer-driven simulator for one column
pub struct FeedSimulator {
    kind: ColumnKind,
    config: FeedConfig,
    generator: TokenGenerator,
    rng: StdRng,
    state: SharedColumnState,
    events: broadcast::Sender<FeedEvent>,
    cancel: CancellationToken,
}

impl FeedSimulator {
    pub fn new(
        kind: ColumnKind,
        config: FeedConfig,
        rng: StdRng,
        state: SharedColumnState,
        events: broadcast::Sender<FeedEvent>,
        cancel: CancellationToken,
    ) -> Self {
        let generator = TokenGenerator::new(config.generator.clone());
        Self {
            kind,
            config,
            generator,
            rng,
            state,
            events,
            cancel,
        }
    }

    /// New event channel sized for a column feed
    pub fn event_channel() -> (broadcast::Sender<FeedEvent>, broadcast::Receiver<FeedEvent>) {
        broadcast::channel(EVENT_BUFFER_SIZE)
    }

    /// Run the feed on the tokio runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Load, then cycle until cancelled
    pub async fn run(mut self) {
        let load_delay = self.random_delay(self.config.load_delay_min, self.config.load_delay_max);
        debug!(column = %self.kind, ?load_delay, "Feed loading");

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                self.stop().await;
                return;
            }
            _ = tokio::time::sleep(load_delay) => {}
        }

        self.load().await;

        let mut delay = self.config.first_tick;
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            self.tick().await;

            if self.cancel.is_cancelled() {
                break;
            }
            delay = self.random_delay(self.config.tick_min, self.config.tick_max);
        }

        self.stop().await;
    }

    /// Generate the initial token list and go live
    async fn load(&mut self) {
        let slug = self.kind.slug();
        let tokens: Vec<Token> = (0..self.config.token_count)
            .map(|i| {
                self.generator
                    .generate(&format!("{}-{}", slug, i), i, &mut self.rng)
            })
            .collect();
        let count = tokens.len();

        {
            let mut state = self.state.write().await;
            state.tokens = tokens;
            state.phase = FeedPhase::Live;
        }

        info!(column = %self.kind, count, "Feed live");
        let _ = self.events.send(FeedEvent::Loaded { count });
    }

    /// One mutation cycle; returns the mutated ids in list order
    pub async fn tick(&mut self) -> Vec<String> {
        let state = Arc::clone(&self.state);
        let mut guard = state.write().await;

        let len = guard.tokens.len();
        if len == 0 || guard.phase != FeedPhase::Live {
            return Vec::new();
        }

        let max = self.config.max_mutations_per_tick.max(1);
        let count = self.rng.gen_range(1..=max).min(len);
        let mut indices = rand::seq::index::sample(&mut self.rng, len, count).into_vec();
        indices.sort_unstable();

        let mut ids = Vec::with_capacity(indices.len());
        for idx in indices {
            let drift = self.draw_drift();
            let token = &mut guard.tokens[idx];
            apply_drift(token, &drift);
            let id = token.id.clone();

            guard.flashes.schedule(
                &id,
                self.config.flash_duration,
                Arc::downgrade(&state),
                self.events.clone(),
            );
            ids.push(id);
        }
        drop(guard);

        debug!(column = %self.kind, ?ids, "Feed cycle");
        let _ = self.events.send(FeedEvent::Mutated { ids: ids.clone() });
        ids
    }

    /// Cancel pending flash resets and mark the column stopped
    async fn stop(&mut self) {
        {
            let mut state = self.state.write().await;
            state.flashes.cancel_all();
            state.phase = FeedPhase::Stopped;
        }
        info!(column = %self.kind, "Feed stopped");
        let _ = self.events.send(FeedEvent::Stopped);
    }

    fn draw_drift(&mut self) -> Drift {
        let v = self.config.volatility;
        let progress_step = if self.kind == ColumnKind::FinalStretch {
            // (0, max]
            Some(self.config.max_progress_step * (1.0 - self.rng.gen::<f64>()))
        } else {
            None
        };

        Drift {
            delta: self.rng.gen_range(-v..=v),
            sparkline_point: sparkline_point(&mut self.rng),
            progress_step,
        }
    }

    fn random_delay(&mut self, min: Duration, max: Duration) -> Duration {
        let lo = min.as_millis() as u64;
        let hi = max.as_millis() as u64;
        if hi <= lo {
            return min;
        }
        Duration::from_millis(self.rng.gen_range(lo..=hi))
    }
}
