//! Token Feed - Simulated Token Discovery Dashboard Library
//!
//! Three discovery columns (New Pairs, Final Stretch, Migrated), each fed by
//! a simulated market that drifts prices and flashes updated rows.
//!
//! # Modules
//!
//! - `domain`: Token types, generator, filter/sort pipeline, formatting
//! - `adapters`: Simulated feed and CLI
//! - `application`: Column handles and the fault-isolating dashboard
//! - `config`: Configuration loading and validation

pub mod domain;
pub mod adapters;
pub mod config;
pub mod application;
