//! Adapters Layer - Feed source and terminal front end
//!
//! - Simulated feed: randomized token stream per column
//! - CLI: command-line interface and text rendering

pub mod cli;
pub mod simulated_feed;

pub use cli::CliApp;
pub use simulated_feed::{FeedConfig, FeedEvent, FeedPhase};
