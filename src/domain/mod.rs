//! Domain Layer - Core token feed logic
//!
//! Pure types and functions with no runtime dependencies:
//! - `token`: token snapshot, column kinds, age and flash direction
//! - `generator`: randomized token construction
//! - `pipeline`: filter and sort of a column's live list
//! - `format`: USD/percent/sparkline display helpers

pub mod token;
pub mod generator;
pub mod pipeline;
pub mod format;

pub use token::{
    ColumnKind, MigrationVenue, ParseAgeError, ParseColumnError, Token, TokenAge, UpdateDirection,
    SPARKLINE_LEN,
};
pub use generator::{generate, GeneratorConfig, TokenGenerator, MOCK_SYMBOLS};
pub use pipeline::{
    derive_view, matches_filter, ParseSortError, SortField, SortKey, SortOrder, SortState,
    ViewState,
};
pub use format::{format_pct, format_usd, render_sparkline};
