//! CLI Adapter
//!
//! Command-line interface for the token feed.
//! Uses clap derive macros for argument parsing.

mod commands;
mod render;

pub use commands::{
    load_app_config, CliApp, Command, InputCommand, InputError, OutputFormat, RunCmd,
    SnapshotCmd, ViewArgs, DEFAULT_CONFIG_PATH,
};
pub use render::{render_column, render_offline, render_panels, RenderError};

use anyhow::Result;

use crate::config::Config;

/// Execute the CLI command
pub async fn execute(app: CliApp, config: Config) -> Result<()> {
    commands::execute(app, config).await
}
