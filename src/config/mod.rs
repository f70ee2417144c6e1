//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, ConfigError, DisplaySection, FeedSection, GeneratorSection, LoggingSection,
    load_config, parse_config,
};
