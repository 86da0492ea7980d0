//! Parser for sales CSV exports of a legacy accounting system
//!
//! The exports are irregular: Windows-1252 bytes, an optional `sep=` line,
//! either `,` or `;` as delimiter, free-form Portuguese header labels and
//! comma-decimal amounts. This module turns such a file into a typed
//! [`SaleTable`](crate::app::models::SaleTable).
//!
//! ## Architecture
//!
//! The parser is organized into pipeline stages:
//! - [`loader`] - Byte sources and legacy decoding
//! - [`sanitizer`] - Declaration/blank line removal and delimiter detection
//! - [`column_mapping`] - Header label to canonical field resolution
//! - [`resolver`] - Delimited parsing and structural row checks
//! - [`record_parser`] - Per-row normalization and filtering
//! - [`field_parsers`] - Date, amount and text cell helpers
//! - [`stats`] - Parsing statistics and result structures
//! - [`parser`] - Orchestration of the stages and batch runs
//!
//! ## Usage
//!
//! ```rust
//! use sales_processor::{ByteSource, SalesCsvParser};
//!
//! # fn example() -> sales_processor::Result<()> {
//! let parser = SalesCsvParser::default();
//! let bytes = b"sep=;\nData;Valor\n01-03-2024;1.234,56\n".to_vec();
//! let result = parser.parse_source(&ByteSource::buffer("upload.csv", bytes))?;
//!
//! println!("Accepted {} of {} records",
//!          result.stats.accepted,
//!          result.stats.total_records);
//! # Ok(())
//! # }
//! ```

pub mod column_mapping;
pub mod field_parsers;
pub mod loader;
pub mod parser;
pub mod record_parser;
pub mod resolver;
pub mod sanitizer;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use column_mapping::{ColumnAssignment, ColumnMap, MatchKind};
pub use loader::ByteSource;
pub use parser::SalesCsvParser;
pub use record_parser::{NormalizeOptions, RowOutcome};
pub use stats::{BatchResult, FileReport, FileSummary, ParseResult, ParseStats, ParseStatus};
