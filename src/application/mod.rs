//! Application Layer - Column handles and the dashboard
//!
//! Wires the simulated feed to per-column view state and isolates
//! rendering faults per column.

pub mod column;
pub mod dashboard;

pub use column::{create_column, create_column_with_rng, ColumnHandle, ColumnSnapshot, ColumnView};
pub use dashboard::{ColumnStatus, Dashboard, DashboardError, Panel};
