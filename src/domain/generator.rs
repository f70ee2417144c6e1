//! Mock Token Generator
//!
//! Produces randomized `Token` records with a fixed shape. Symbols rotate
//! through a fixed list by index; every numeric field is drawn from a
//! configurable range.

use rand::Rng;
use std::ops::Range;

use super::token::{MigrationVenue, Token, TokenAge, UpdateDirection, SPARKLINE_LEN};

/// Rotating symbol list, indexed by `index % MOCK_SYMBOLS.len()`
pub const MOCK_SYMBOLS: [&str; 14] = [
    "WIF", "POPCAT", "BONK", "PEPE", "JUP", "PYTH", "DRIFT", "MEW", "BOME", "BRETT", "MOG",
    "PONKE", "TRUMP", "GIGA",
];

/// Default number of leading indices that get a minutes-old age
pub const DEFAULT_FRESH_COUNT: usize = 5;

/// Default probability that a token is verified
pub const DEFAULT_VERIFIED_PROBABILITY: f64 = 0.3;

/// Default probability that a migration lands on Raydium
pub const DEFAULT_RAYDIUM_PROBABILITY: f64 = 0.4;

/// Value ranges used by the generator
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub price: Range<f64>,
    pub market_cap: Range<f64>,
    pub volume_24h: Range<f64>,
    pub liquidity: Range<f64>,
    pub change_1h: Range<f64>,
    pub change_24h: Range<f64>,
    pub holders: Range<u32>,
    pub transactions_5m: Range<u32>,
    pub progress: Range<u32>,
    /// Age in minutes for "fresh" listings (inclusive upper bound)
    pub fresh_age_minutes: (u32, u32),
    /// Age in hours for older listings (inclusive upper bound)
    pub older_age_hours: (u32, u32),
    /// Indices below this are fresh
    pub fresh_count: usize,
    pub verified_probability: f64,
    /// Chance of Raydium; the remainder splits evenly between Meteora and Orca
    pub raydium_probability: f64,
    pub sparkline_len: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            price: 0.00001..0.00051,
            market_cap: 50_000.0..2_050_000.0,
            volume_24h: 10_000.0..810_000.0,
            liquidity: 5_000.0..305_000.0,
            change_1h: -10.0..10.0,
            change_24h: -40.0..60.0,
            holders: 0..12_000,
            transactions_5m: 0..50,
            progress: 0..100,
            fresh_age_minutes: (1, 10),
            older_age_hours: (1, 23),
            fresh_count: DEFAULT_FRESH_COUNT,
            verified_probability: DEFAULT_VERIFIED_PROBABILITY,
            raydium_probability: DEFAULT_RAYDIUM_PROBABILITY,
            sparkline_len: SPARKLINE_LEN,
        }
    }
}

/// Builds mock tokens from a `GeneratorConfig`
#[derive(Debug, Clone, Default)]
pub struct TokenGenerator {
    config: GeneratorConfig,
}

impl TokenGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generate one token for `id` at list position `index`
    pub fn generate<R: Rng + ?Sized>(&self, id: &str, index: usize, rng: &mut R) -> Token {
        let cfg = &self.config;
        let symbol = symbol_for_index(index);

        let age = if index < cfg.fresh_count {
            TokenAge::Minutes(rng.gen_range(cfg.fresh_age_minutes.0..=cfg.fresh_age_minutes.1))
        } else {
            TokenAge::Hours(rng.gen_range(cfg.older_age_hours.0..=cfg.older_age_hours.1))
        };

        let migrated_to = if rng.gen_bool(cfg.raydium_probability) {
            MigrationVenue::Raydium
        } else if rng.gen_bool(0.5) {
            MigrationVenue::Meteora
        } else {
            MigrationVenue::Orca
        };

        Token {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: format!("{} Token", symbol),
            price: rng.gen_range(cfg.price.clone()),
            market_cap: rng.gen_range(cfg.market_cap.clone()),
            volume_24h: rng.gen_range(cfg.volume_24h.clone()),
            liquidity: rng.gen_range(cfg.liquidity.clone()),
            age,
            change_1h: rng.gen_range(cfg.change_1h.clone()),
            change_24h: rng.gen_range(cfg.change_24h.clone()),
            holders: rng.gen_range(cfg.holders.clone()),
            transactions_5m: rng.gen_range(cfg.transactions_5m.clone()),
            progress: Some(rng.gen_range(cfg.progress.clone()) as f64),
            migrated_to: Some(migrated_to),
            sparkline: (0..cfg.sparkline_len)
                .map(|_| sparkline_point(&mut *rng))
                .collect(),
            last_update_direction: UpdateDirection::None,
            is_verified: rng.gen_bool(cfg.verified_probability),
        }
    }
}

/// Symbol for a list position
pub fn symbol_for_index(index: usize) -> &'static str {
    MOCK_SYMBOLS[index % MOCK_SYMBOLS.len()]
}

/// A fresh sparkline value in [0, 100)
pub fn sparkline_point<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(0.0..100.0)
}

/// Generate a token with the default ranges
pub fn generate<R: Rng + ?Sized>(id: &str, index: usize, rng: &mut R) -> Token {
    TokenGenerator::default().generate(id, index, rng)
}
