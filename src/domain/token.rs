//! Token Snapshot Types
//!
//! A `Token` is one row of a discovery column: identity, market figures,
//! a short sparkline history and the transient flash marker set by the feed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of points kept in a token's sparkline window
pub const SPARKLINE_LEN: usize = 15;

/// Pool a token graduated to (Migrated column only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MigrationVenue {
    Raydium,
    Meteora,
    Orca,
}

impl fmt::Display for MigrationVenue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationVenue::Raydium => write!(f, "Raydium"),
            MigrationVenue::Meteora => write!(f, "Meteora"),
            MigrationVenue::Orca => write!(f, "Orca"),
        }
    }
}

/// Direction of the most recent drift, cleared once the flash expires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateDirection {
    Up,
    Down,
    #[default]
    None,
}

impl UpdateDirection {
    /// Returns true while the token is flashing
    pub fn is_flashing(&self) -> bool {
        !matches!(self, UpdateDirection::None)
    }
}

/// Listing age, fixed when the token is generated
///
/// Renders and serializes as `"7m"` or `"13h"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TokenAge {
    Minutes(u32),
    Hours(u32),
}

impl fmt::Display for TokenAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenAge::Minutes(m) => write!(f, "{}m", m),
            TokenAge::Hours(h) => write!(f, "{}h", h),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid age: {0} (expected minutes like 7m or hours like 13h)")]
pub struct ParseAgeError(pub String);

impl FromStr for TokenAge {
    type Err = ParseAgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseAgeError(s.to_string());
        if let Some(minutes) = s.strip_suffix('m') {
            minutes.parse().map(TokenAge::Minutes).map_err(|_| invalid())
        } else if let Some(hours) = s.strip_suffix('h') {
            hours.parse().map(TokenAge::Hours).map_err(|_| invalid())
        } else {
            Err(invalid())
        }
    }
}

impl From<TokenAge> for String {
    fn from(age: TokenAge) -> Self {
        age.to_string()
    }
}

impl TryFrom<String> for TokenAge {
    type Error = ParseAgeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Discovery column variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnKind {
    NewPairs,
    FinalStretch,
    Migrated,
}

impl ColumnKind {
    /// All columns in dashboard order
    pub const ALL: [ColumnKind; 3] = [
        ColumnKind::NewPairs,
        ColumnKind::FinalStretch,
        ColumnKind::Migrated,
    ];

    /// Human-readable column title
    pub fn title(&self) -> &'static str {
        match self {
            ColumnKind::NewPairs => "New Pairs",
            ColumnKind::FinalStretch => "Final Stretch",
            ColumnKind::Migrated => "Migrated",
        }
    }

    /// Prefix used when minting token ids for this column
    pub fn slug(&self) -> &'static str {
        match self {
            ColumnKind::NewPairs => "new-pairs",
            ColumnKind::FinalStretch => "final-stretch",
            ColumnKind::Migrated => "migrated",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown column: {0} (expected new-pairs, final-stretch or migrated)")]
pub struct ParseColumnError(pub String);

impl FromStr for ColumnKind {
    type Err = ParseColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "new" | "newpairs" => Ok(ColumnKind::NewPairs),
            "final" | "finalstretch" => Ok(ColumnKind::FinalStretch),
            "migrated" => Ok(ColumnKind::Migrated),
            _ => Err(ParseColumnError(s.to_string())),
        }
    }
}

/// Snapshot of one tradable asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Stable identifier, unique within its column
    pub id: String,
    pub symbol: String,
    pub name: String,
    /// Price in USD
    pub price: f64,
    /// Market cap in USD
    pub market_cap: f64,
    #[serde(rename = "volume24h")]
    pub volume_24h: f64,
    pub liquidity: f64,
    pub age: TokenAge,
    #[serde(rename = "change1h")]
    pub change_1h: f64,
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    pub holders: u32,
    #[serde(rename = "transactions5m")]
    pub transactions_5m: u32,
    /// Bonding curve progress 0-100 (Final Stretch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_to: Option<MigrationVenue>,
    /// Recent values in [0, 100], oldest first
    pub sparkline: Vec<f64>,
    #[serde(default)]
    pub last_update_direction: UpdateDirection,
    pub is_verified: bool,
}

impl Token {
    /// Market cap per unit of price (unchanged by drift)
    pub fn supply(&self) -> f64 {
        if self.price <= 0.0 {
            return 0.0;
        }
        self.market_cap / self.price
    }
}
