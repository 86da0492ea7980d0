//! Read-only views over a parsed sales table
//!
//! Every function here takes a [`SaleTable`](crate::app::models::SaleTable)
//! by reference and returns a new value, so one table can feed any number of
//! reports.
//!
//! - [`filter`] - Date range and dimension filters
//! - [`summary`] - Headline totals of a table
//! - [`aggregation`] - Per-dimension and per-month totals, month pivots

pub mod aggregation;
pub mod filter;
pub mod summary;

#[cfg(test)]
pub mod tests;

pub use aggregation::{Dimension, GroupTotal, MonthlyTotal, PivotTable, group_totals, monthly_totals, pivot_by_month};
pub use filter::SaleFilter;
pub use summary::SalesSummary;
