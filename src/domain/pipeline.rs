//! Sort/Filter Pipeline
//!
//! Derives the displayed ordering of a column from its live token list.
//! The live list is never touched; every call returns a fresh vector.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::token::{ColumnKind, Token};

/// Sortable token fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Price,
    MarketCap,
    #[serde(rename = "volume24h")]
    Volume24h,
    Age,
    #[serde(rename = "change24h")]
    Change24h,
    Progress,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::Price,
        SortField::MarketCap,
        SortField::Volume24h,
        SortField::Age,
        SortField::Change24h,
        SortField::Progress,
    ];

    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Price => "price",
            SortField::MarketCap => "marketCap",
            SortField::Volume24h => "volume24h",
            SortField::Age => "age",
            SortField::Change24h => "change24h",
            SortField::Progress => "progress",
        }
    }

    /// Sort key for a token; missing numeric values sort as 0
    pub fn key(&self, token: &Token) -> SortKey {
        match self {
            SortField::Price => SortKey::Number(token.price),
            SortField::MarketCap => SortKey::Number(token.market_cap),
            SortField::Volume24h => SortKey::Number(token.volume_24h),
            SortField::Age => SortKey::Text(token.age.to_string()),
            SortField::Change24h => SortKey::Number(token.change_24h),
            SortField::Progress => SortKey::Number(token.progress.unwrap_or(0.0)),
        }
    }

    /// Default sort field for a column
    pub fn default_for(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::FinalStretch => SortField::Progress,
            ColumnKind::NewPairs | ColumnKind::Migrated => SortField::MarketCap,
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseSortError {
    #[error("Unknown sort field: {0} (expected one of price, marketCap, volume24h, age, change24h, progress)")]
    UnknownField(String),
    #[error("Unknown sort order: {0} (expected asc or desc)")]
    UnknownOrder(String),
}

impl FromStr for SortField {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseSortError::UnknownField(s.to_string()))
    }
}

/// Comparable value of a sort field
///
/// Age sorts by its display string (`"10h"` before `"2m"`), the rest numerically.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    /// Ascending comparison; NaN and mixed kinds compare equal
    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Text(a), SortKey::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            _ => Ordering::Equal,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn flipped(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ParseSortError::UnknownOrder(s.to_string())),
        }
    }
}

/// Active sort selection for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortState {
    /// Column default, descending
    pub fn default_for(kind: ColumnKind) -> Self {
        Self {
            field: SortField::default_for(kind),
            order: SortOrder::Desc,
        }
    }

    /// Header-click semantics: the active field flips, a new field resets to desc
    pub fn select(&mut self, field: SortField) {
        if self.field == field {
            self.order = self.order.flipped();
        } else {
            self.field = field;
            self.order = SortOrder::Desc;
        }
    }
}

/// Filter and sort inputs for one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub filter: String,
    pub sort: SortState,
}

impl ViewState {
    pub fn new(kind: ColumnKind) -> Self {
        Self {
            filter: String::new(),
            sort: SortState::default_for(kind),
        }
    }

    pub fn derive(&self, tokens: &[Token]) -> Vec<Token> {
        derive_view(tokens, &self.filter, self.sort)
    }
}

/// Case-insensitive substring match on the symbol
pub fn matches_filter(token: &Token, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }
    token
        .symbol
        .to_lowercase()
        .contains(&filter.to_lowercase())
}

/// Filter then stable-sort a copy of `tokens`
pub fn derive_view(tokens: &[Token], filter: &str, sort: SortState) -> Vec<Token> {
    let mut view: Vec<Token> = tokens
        .iter()
        .filter(|t| matches_filter(t, filter))
        .cloned()
        .collect();

    // slice::sort_by is stable, equal keys keep live-list order
    view.sort_by(|a, b| compare(a, b, sort));
    view
}

fn compare(a: &Token, b: &Token, sort: SortState) -> Ordering {
    let ord = sort.field.key(a).compare(&sort.field.key(b));
    match sort.order {
        SortOrder::Asc => ord,
        SortOrder::Desc => ord.reverse(),
    }
}
