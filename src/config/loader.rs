//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/dashboard.toml.
//! Every section is optional; missing keys fall back to the built-in defaults.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::adapters::simulated_feed::FeedConfig;
use crate::domain::generator::{
    GeneratorConfig, DEFAULT_FRESH_COUNT, DEFAULT_RAYDIUM_PROBABILITY, DEFAULT_VERIFIED_PROBABILITY,
};

/// Main configuration structure matching dashboard.toml
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedSection,
    #[serde(default)]
    pub generator: GeneratorSection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub display: DisplaySection,
}

/// Feed timing configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedSection {
    /// Tokens generated per column
    pub token_count: usize,
    /// Initial load delay bounds in milliseconds
    pub load_delay_min_ms: u64,
    pub load_delay_max_ms: u64,
    /// Delay before the first mutation cycle in milliseconds
    pub first_tick_ms: u64,
    /// Delay bounds between mutation cycles in milliseconds
    pub tick_min_ms: u64,
    pub tick_max_ms: u64,
    /// Maximum tokens drifted per cycle
    pub max_mutations_per_tick: usize,
    /// Drift bound (0.02 = +/-2% per mutation)
    pub volatility: f64,
    /// Flash duration in milliseconds
    pub flash_ms: u64,
    /// Largest Final Stretch progress increment per mutation
    pub max_progress_step: f64,
    /// Points kept in each sparkline
    pub sparkline_len: usize,
}

impl Default for FeedSection {
    fn default() -> Self {
        let feed = FeedConfig::default();
        Self {
            token_count: feed.token_count,
            load_delay_min_ms: feed.load_delay_min.as_millis() as u64,
            load_delay_max_ms: feed.load_delay_max.as_millis() as u64,
            first_tick_ms: feed.first_tick.as_millis() as u64,
            tick_min_ms: feed.tick_min.as_millis() as u64,
            tick_max_ms: feed.tick_max.as_millis() as u64,
            max_mutations_per_tick: feed.max_mutations_per_tick,
            volatility: feed.volatility,
            flash_ms: feed.flash_duration.as_millis() as u64,
            max_progress_step: feed.max_progress_step,
            sparkline_len: feed.generator.sparkline_len,
        }
    }
}

/// Generator policy configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorSection {
    /// Leading indices that get a minutes-old age
    pub fresh_count: usize,
    /// Probability a token is verified (0-1)
    pub verified_probability: f64,
    /// Probability a migration lands on Raydium (0-1)
    pub raydium_probability: f64,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            fresh_count: DEFAULT_FRESH_COUNT,
            verified_probability: DEFAULT_VERIFIED_PROBABILITY,
            raydium_probability: DEFAULT_RAYDIUM_PROBABILITY,
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Terminal display configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Minimum milliseconds between redraws
    pub refresh_ms: u64,
    /// Rows shown per column (0 = all)
    pub max_rows: usize,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            refresh_ms: 250,
            max_rows: 15,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        let feed = &self.feed;

        if feed.token_count == 0 {
            return Err(ConfigError::ValidationError(
                "token_count must be > 0".to_string(),
            ));
        }

        if feed.load_delay_min_ms > feed.load_delay_max_ms {
            return Err(ConfigError::ValidationError(format!(
                "load_delay_min_ms ({}) must be <= load_delay_max_ms ({})",
                feed.load_delay_min_ms, feed.load_delay_max_ms
            )));
        }

        if feed.tick_min_ms == 0 || feed.tick_min_ms > feed.tick_max_ms {
            return Err(ConfigError::ValidationError(format!(
                "tick range must satisfy 0 < tick_min_ms <= tick_max_ms, got {}..{}",
                feed.tick_min_ms, feed.tick_max_ms
            )));
        }

        if feed.max_mutations_per_tick == 0 {
            return Err(ConfigError::ValidationError(
                "max_mutations_per_tick must be > 0".to_string(),
            ));
        }

        if feed.volatility <= 0.0 || feed.volatility >= 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "volatility must be in (0, 1), got {}",
                feed.volatility
            )));
        }

        if feed.flash_ms == 0 {
            return Err(ConfigError::ValidationError(
                "flash_ms must be > 0".to_string(),
            ));
        }

        if feed.max_progress_step <= 0.0 || feed.max_progress_step > 100.0 {
            return Err(ConfigError::ValidationError(format!(
                "max_progress_step must be in (0, 100], got {}",
                feed.max_progress_step
            )));
        }

        if feed.sparkline_len == 0 {
            return Err(ConfigError::ValidationError(
                "sparkline_len must be > 0".to_string(),
            ));
        }

        for (name, p) in [
            ("verified_probability", self.generator.verified_probability),
            ("raydium_probability", self.generator.raydium_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must be 0-1, got {}",
                    name, p
                )));
            }
        }

        if self.display.refresh_ms == 0 {
            return Err(ConfigError::ValidationError(
                "refresh_ms must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Redraw throttle for the terminal view
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.display.refresh_ms)
    }
}

// Conversion from Config to FeedConfig
impl From<&Config> for FeedConfig {
    fn from(config: &Config) -> Self {
        let feed = &config.feed;

        FeedConfig {
            token_count: feed.token_count,
            load_delay_min: Duration::from_millis(feed.load_delay_min_ms),
            load_delay_max: Duration::from_millis(feed.load_delay_max_ms),
            first_tick: Duration::from_millis(feed.first_tick_ms),
            tick_min: Duration::from_millis(feed.tick_min_ms),
            tick_max: Duration::from_millis(feed.tick_max_ms),
            max_mutations_per_tick: feed.max_mutations_per_tick,
            volatility: feed.volatility,
            flash_duration: Duration::from_millis(feed.flash_ms),
            max_progress_step: feed.max_progress_step,
            generator: GeneratorConfig {
                fresh_count: config.generator.fresh_count,
                verified_probability: config.generator.verified_probability,
                raydium_probability: config.generator.raydium_probability,
                sparkline_len: feed.sparkline_len,
                ..GeneratorConfig::default()
            },
        }
    }
}
