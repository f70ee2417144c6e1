//! Token Feed - Simulated Token Discovery Dashboard
//!
//! Streams three discovery columns in the terminal.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use token_feed::adapters::cli::{self, load_app_config, CliApp};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    let config = load_app_config(app.config_path())?;
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    cli::execute(app, config).await
}

/// Flags win over `RUST_LOG`, which wins over the config level
fn init_logging(verbose: bool, debug: bool, config_level: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
