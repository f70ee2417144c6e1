//! Terminal Rendering
//!
//! Plain-text tables for the discovery columns. Rows carry a flash marker
//! (`▲`/`▼`) while a drift is fresh.

use std::fmt::Write;

use thiserror::Error;

use crate::application::{ColumnView, Panel};
use crate::domain::format::{format_pct, format_usd, render_sparkline};
use crate::domain::{ColumnKind, Token, UpdateDirection};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("Token {id} has a non-finite {field}")]
    NonFinite { id: String, field: &'static str },
}

/// Render one column as a text table, showing at most `max_rows` rows (0 = all)
pub fn render_column(view: &ColumnView, max_rows: usize) -> Result<String, RenderError> {
    let mut out = String::new();

    write!(out, "{}", view.kind.title().to_uppercase())?;
    if view.loading {
        writeln!(out, "  [loading]")?;
        writeln!(out, "  loading pairs...")?;
        return Ok(out);
    }

    write!(out, "  [{} live | sort {} {}", view.total, view.sort.field, view.sort.order)?;
    if !view.filter.is_empty() {
        write!(out, " | filter \"{}\"", view.filter)?;
    }
    writeln!(out, "]")?;

    writeln!(
        out,
        "  {:<10} {:>14} {:>9} {:>9} {:>4} {:>7} {:>8}  {}",
        "PAIR",
        "PRICE",
        "MCAP",
        "VOL 24H",
        "AGE",
        "24H",
        extra_header(view.kind),
        "CHART"
    )?;

    if view.tokens.is_empty() {
        writeln!(out, "  no tokens match")?;
        return Ok(out);
    }

    let limit = if max_rows == 0 { view.tokens.len() } else { max_rows };
    for token in view.tokens.iter().take(limit) {
        render_row(&mut out, view.kind, token)?;
    }

    if view.tokens.len() > limit {
        writeln!(out, "  ... {} more", view.tokens.len() - limit)?;
    }

    Ok(out)
}

fn render_row(out: &mut String, kind: ColumnKind, token: &Token) -> Result<(), RenderError> {
    for (field, value) in [("price", token.price), ("marketCap", token.market_cap)] {
        if !value.is_finite() {
            return Err(RenderError::NonFinite { id: token.id.clone(), field });
        }
    }

    let marker = match token.last_update_direction {
        UpdateDirection::Up => '▲',
        UpdateDirection::Down => '▼',
        UpdateDirection::None => ' ',
    };
    let pair = if token.is_verified {
        format!("{} ✓", token.symbol)
    } else {
        token.symbol.clone()
    };

    writeln!(
        out,
        "{} {:<10} {:>14} {:>9} {:>9} {:>4} {:>7} {:>8}  {}",
        marker,
        pair,
        format_usd(token.price),
        format_usd(token.market_cap),
        format_usd(token.volume_24h),
        token.age.to_string(),
        format_pct(token.change_24h),
        extra_cell(kind, token),
        render_sparkline(&token.sparkline)
    )?;
    Ok(())
}

fn extra_header(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::NewPairs => "HOLDERS",
        ColumnKind::FinalStretch => "PROG",
        ColumnKind::Migrated => "POOL",
    }
}

fn extra_cell(kind: ColumnKind, token: &Token) -> String {
    match kind {
        ColumnKind::NewPairs => token.holders.to_string(),
        ColumnKind::FinalStretch => token
            .progress
            .map(|p| format!("{:.1}%", p))
            .unwrap_or_else(|| "-".to_string()),
        ColumnKind::Migrated => token
            .migrated_to
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string()),
    }
}

/// Offline placeholder with the retry hint
pub fn render_offline(kind: ColumnKind, reason: &str) -> String {
    format!(
        "{}  [offline]\n  {}\n  type `retry {}` to reconnect\n",
        kind.title().to_uppercase(),
        reason,
        kind.slug()
    )
}

/// Join rendered panels into one screen
pub fn render_panels(panels: &[Panel]) -> String {
    panels
        .iter()
        .map(|panel| match panel {
            Panel::Rendered { body, .. } => body.clone(),
            Panel::Offline { kind, reason } => render_offline(*kind, reason),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
