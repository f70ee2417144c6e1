//! CLI Command Handlers
//!
//! Implementation of the `run` and `snapshot` commands for the token feed.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::render::{render_column, render_panels};
use crate::adapters::simulated_feed::FeedConfig;
use crate::application::{ColumnView, Dashboard, DashboardError};
use crate::config::{load_config, Config};
use crate::domain::{
    ColumnKind, ParseColumnError, ParseSortError, SortField, SortOrder, SortState,
};

/// Config path used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";

/// Token Feed - simulated token discovery dashboard
#[derive(Parser, Debug)]
#[command(
    name = "token-feed",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Simulated token discovery feed",
    long_about = "Streams three discovery columns (New Pairs, Final Stretch, Migrated) \
                  fed by a simulated market, with per-column filter and sort."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

impl CliApp {
    /// Config path requested by the subcommand, if any
    pub fn config_path(&self) -> Option<&Path> {
        match &self.command {
            Command::Run(cmd) => cmd.config.as_deref(),
            Command::Snapshot(cmd) => cmd.config.as_deref(),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream the live dashboard
    Run(RunCmd),

    /// Wait for all columns to load and print them once
    Snapshot(SnapshotCmd),
}

/// Column view options shared by both commands
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Case-insensitive symbol filter applied to every column
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,

    /// Sort field (price, marketCap, volume24h, age, change24h, progress)
    #[arg(long, value_name = "FIELD")]
    pub sort: Option<SortField>,

    /// Sort order
    #[arg(long, value_name = "ORDER")]
    pub order: Option<SortOrder>,

    /// Seed the feeds for a reproducible session
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,
}

/// Stream the dashboard
#[derive(Parser, Debug)]
pub struct RunCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Stop after this many seconds
    #[arg(short, long, value_name = "SECS")]
    pub duration: Option<u64>,

    #[command(flatten)]
    pub view: ViewArgs,
}

/// Print one rendering
#[derive(Parser, Debug)]
pub struct SnapshotCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Load the config file, falling back to defaults when the default path is absent
pub fn load_app_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).to_string();
            load_config(&expanded)
                .with_context(|| format!("Failed to load configuration from {}", expanded))
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(DEFAULT_CONFIG_PATH)
            .with_context(|| format!("Failed to load configuration from {}", DEFAULT_CONFIG_PATH)),
        None => Ok(Config::default()),
    }
}

/// Execute the CLI command
pub async fn execute(app: CliApp, config: Config) -> Result<()> {
    match app.command {
        Command::Run(cmd) => run_command(cmd, &config).await,
        Command::Snapshot(cmd) => snapshot_command(cmd, &config).await,
    }
}

fn start_dashboard(config: &Config, view: &ViewArgs) -> Result<Dashboard> {
    let feed = FeedConfig::from(config);
    let mut dashboard = match view.seed {
        Some(seed) => Dashboard::start_seeded(feed, seed),
        None => Dashboard::start(feed),
    };

    for kind in ColumnKind::ALL {
        let column = dashboard.column_mut(kind)?;
        if let Some(filter) = &view.filter {
            column.set_filter_text(filter.clone());
        }
        if view.sort.is_some() || view.order.is_some() {
            let current = column.sort();
            column.set_sort(SortState {
                field: view.sort.unwrap_or(current.field),
                order: view.order.unwrap_or_default(),
            });
        }
    }

    Ok(dashboard)
}

/// Handle run command
async fn run_command(cmd: RunCmd, config: &Config) -> Result<()> {
    tracing::info!("Starting token feed dashboard");

    let mut dashboard = start_dashboard(config, &cmd.view)?;
    let max_rows = config.display.max_rows;

    let mut refresh = tokio::time::interval(config.refresh_interval());
    refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let deadline = tokio::time::sleep(Duration::from_secs(cmd.duration.unwrap_or(0)));
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut dirty = true;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("Shutdown signal received");
                break;
            }
            _ = &mut deadline, if cmd.duration.is_some() => {
                tracing::info!("Run duration elapsed");
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match InputCommand::from_str(&line) {
                    Ok(InputCommand::Quit) => break,
                    Ok(input) => {
                        if let Err(e) = apply_input(&mut dashboard, input).await {
                            tracing::warn!("{}", e);
                        }
                        dirty = true;
                    }
                    Err(InputError::Empty) => {}
                    Err(e) => tracing::warn!("{}", e),
                },
                Ok(None) | Err(_) => stdin_open = false,
            },
            _ = refresh.tick() => {
                dirty |= dashboard.take_changes();
                if dirty {
                    let panels = dashboard.render(|view| render_column(view, max_rows)).await;
                    print!("\x1b[2J\x1b[H");
                    println!(
                        "token-feed  {}  (filter|sort|order|retry <column> ..., quit)\n",
                        chrono::Local::now().format("%H:%M:%S")
                    );
                    println!("{}", render_panels(&panels));
                    dirty = false;
                }
            }
        }
    }

    dashboard.shutdown().await;
    tracing::info!("Token feed stopped");
    Ok(())
}

/// Handle snapshot command
async fn snapshot_command(cmd: SnapshotCmd, config: &Config) -> Result<()> {
    let mut dashboard = start_dashboard(config, &cmd.view)?;
    dashboard.wait_until_loaded().await;

    let output = match cmd.format {
        OutputFormat::Json => {
            let mut views: Vec<ColumnView> = Vec::with_capacity(ColumnKind::ALL.len());
            for kind in ColumnKind::ALL {
                if let Some(column) = dashboard.column(kind) {
                    views.push(column.view().await);
                }
            }
            serde_json::to_string_pretty(&views).context("Failed to serialize snapshot")?
        }
        OutputFormat::Text => {
            let max_rows = config.display.max_rows;
            let panels = dashboard.render(|view| render_column(view, max_rows)).await;
            render_panels(&panels)
        }
    };

    dashboard.shutdown().await;
    println!("{}", output);
    Ok(())
}

/// Interactive input read from stdin while `run` is streaming
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Filter { column: ColumnKind, text: String },
    Sort { column: ColumnKind, field: SortField },
    Order { column: ColumnKind, order: SortOrder },
    Retry { column: ColumnKind },
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Empty input")]
    Empty,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing argument for {0}")]
    MissingArgument(&'static str),

    #[error(transparent)]
    Column(#[from] ParseColumnError),

    #[error(transparent)]
    Sort(#[from] ParseSortError),
}

impl FromStr for InputCommand {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(InputError::Empty)?;

        if matches!(verb, "quit" | "q" | "exit") {
            return Ok(InputCommand::Quit);
        }

        let column: ColumnKind = words
            .next()
            .ok_or(InputError::MissingArgument("column"))?
            .parse()?;

        match verb {
            // filter text may contain spaces; no text clears the filter
            "filter" => Ok(InputCommand::Filter {
                column,
                text: words.collect::<Vec<_>>().join(" "),
            }),
            "sort" => {
                let field = words.next().ok_or(InputError::MissingArgument("sort"))?.parse()?;
                Ok(InputCommand::Sort { column, field })
            }
            "order" => {
                let order = words.next().ok_or(InputError::MissingArgument("order"))?.parse()?;
                Ok(InputCommand::Order { column, order })
            }
            "retry" => Ok(InputCommand::Retry { column }),
            other => Err(InputError::UnknownCommand(other.to_string())),
        }
    }
}

async fn apply_input(dashboard: &mut Dashboard, input: InputCommand) -> Result<(), DashboardError> {
    match input {
        InputCommand::Filter { column, text } => dashboard.column_mut(column)?.set_filter_text(text),
        InputCommand::Sort { column, field } => dashboard.column_mut(column)?.set_sort_field(field),
        InputCommand::Order { column, order } => dashboard.column_mut(column)?.set_sort_order(order),
        InputCommand::Retry { column } => dashboard.retry(column).await?,
        InputCommand::Quit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_app_parse_run() {
        let args = vec!["token-feed", "run", "--config", "test.toml", "--duration", "5"];
        let app = CliApp::try_parse_from(args).unwrap();

        assert_eq!(app.config_path(), Some(Path::new("test.toml")));
        match app.command {
            Command::Run(cmd) => {
                assert_eq!(cmd.duration, Some(5));
                assert!(cmd.view.filter.is_none());
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_app_parse_run_view_options() {
        let args = vec![
            "token-feed", "run", "--filter", "wif", "--sort", "marketCap", "--order", "asc",
            "--seed", "7",
        ];
        let app = CliApp::try_parse_from(args).unwrap();

        match app.command {
            Command::Run(cmd) => {
                assert_eq!(cmd.view.filter.as_deref(), Some("wif"));
                assert_eq!(cmd.view.sort, Some(SortField::MarketCap));
                assert_eq!(cmd.view.order, Some(SortOrder::Asc));
                assert_eq!(cmd.view.seed, Some(7));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_app_parse_snapshot_json() {
        let args = vec!["token-feed", "snapshot", "--format", "json"];
        let app = CliApp::try_parse_from(args).unwrap();

        assert!(app.config_path().is_none());
        match app.command {
            Command::Snapshot(cmd) => assert_eq!(cmd.format, OutputFormat::Json),
            _ => panic!("Expected Snapshot command"),
        }
    }

    #[test]
    fn test_cli_app_global_flags() {
        let args = vec!["token-feed", "snapshot", "-v", "--debug"];
        let app = CliApp::try_parse_from(args).unwrap();
        assert!(app.verbose);
        assert!(app.debug);
    }

    #[test]
    fn test_cli_app_rejects_bad_sort() {
        let args = vec!["token-feed", "run", "--sort", "holders"];
        assert!(CliApp::try_parse_from(args).is_err());
    }

    #[test]
    fn test_load_app_config_explicit_missing_file() {
        let result = load_app_config(Some(Path::new("/nonexistent/dashboard.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_input_commands() {
        assert_eq!(
            "filter new-pairs wif hat".parse(),
            Ok(InputCommand::Filter { column: ColumnKind::NewPairs, text: "wif hat".to_string() })
        );
        assert_eq!(
            "filter migrated".parse(),
            Ok(InputCommand::Filter { column: ColumnKind::Migrated, text: String::new() })
        );
        assert_eq!(
            "sort final marketCap".parse(),
            Ok(InputCommand::Sort { column: ColumnKind::FinalStretch, field: SortField::MarketCap })
        );
        assert_eq!(
            "order migrated asc".parse(),
            Ok(InputCommand::Order { column: ColumnKind::Migrated, order: SortOrder::Asc })
        );
        assert_eq!(
            "retry migrated".parse(),
            Ok(InputCommand::Retry { column: ColumnKind::Migrated })
        );
        assert_eq!("q".parse(), Ok(InputCommand::Quit));
    }

    #[test]
    fn test_parse_input_errors() {
        assert_eq!("   ".parse::<InputCommand>(), Err(InputError::Empty));
        assert_eq!(
            "sort".parse::<InputCommand>(),
            Err(InputError::MissingArgument("column"))
        );
        assert_eq!(
            "sort new-pairs".parse::<InputCommand>(),
            Err(InputError::MissingArgument("sort"))
        );
        assert!(matches!(
            "launch new-pairs".parse::<InputCommand>(),
            Err(InputError::UnknownCommand(_))
        ));
        assert!(matches!(
            "retry graduated".parse::<InputCommand>(),
            Err(InputError::Column(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sort_flag_applies_descending_to_every_column() {
        let args = vec!["token-feed", "snapshot", "--sort", "marketCap", "--seed", "4"];
        let app = CliApp::try_parse_from(args).unwrap();
        let Command::Snapshot(cmd) = app.command else {
            panic!("Expected Snapshot command");
        };

        let mut dashboard = start_dashboard(&Config::default(), &cmd.view).unwrap();
        for kind in ColumnKind::ALL {
            let sort = dashboard.column(kind).unwrap().sort();
            assert_eq!(sort, SortState { field: SortField::MarketCap, order: SortOrder::Desc });
        }
        dashboard.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_flag_keeps_column_field() {
        let args = vec!["token-feed", "snapshot", "--order", "asc", "--seed", "4"];
        let app = CliApp::try_parse_from(args).unwrap();
        let Command::Snapshot(cmd) = app.command else {
            panic!("Expected Snapshot command");
        };

        let mut dashboard = start_dashboard(&Config::default(), &cmd.view).unwrap();
        let sort = dashboard.column(ColumnKind::FinalStretch).unwrap().sort();
        assert_eq!(sort, SortState { field: SortField::Progress, order: SortOrder::Asc });
        dashboard.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply_input_to_offline_column() {
        let mut dashboard = Dashboard::start_seeded(FeedConfig::default(), 9);
        dashboard.take_offline(ColumnKind::Migrated, "test").await;

        let result = apply_input(
            &mut dashboard,
            InputCommand::Filter { column: ColumnKind::Migrated, text: "wif".to_string() },
        )
        .await;
        assert_eq!(result, Err(DashboardError::Offline(ColumnKind::Migrated)));

        apply_input(&mut dashboard, InputCommand::Retry { column: ColumnKind::Migrated })
            .await
            .unwrap();
        apply_input(
            &mut dashboard,
            InputCommand::Sort { column: ColumnKind::Migrated, field: SortField::Age },
        )
        .await
        .unwrap();
        assert_eq!(
            dashboard.column(ColumnKind::Migrated).unwrap().sort().field,
            SortField::Age
        );

        dashboard.shutdown().await;
    }
}
