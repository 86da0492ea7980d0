//! Parsing statistics and result structures for sales export processing
//!
//! This module provides the diagnostic counters of one pipeline run, the
//! per-file result handed to callers and the aggregate of a batch run.

use serde::{Deserialize, Serialize};

use super::column_mapping::ColumnMap;
use crate::app::models::SaleTable;
use crate::{Error, Result};

/// Row-level diagnostics for one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Data records read after sanitization (header excluded)
    pub total_records: usize,

    /// Records turned into sales
    pub accepted: usize,

    /// Records with an unparseable date/amount or a non-positive amount
    pub rows_rejected_parse: usize,

    /// Records carrying a cancellation reason
    pub rows_rejected_cancelled: usize,

    /// Records skipped by the delimited parse (wrong field count)
    pub rows_malformed: usize,

    /// Rejection messages for diagnostics, capped per file
    pub errors: Vec<String>,
}

impl ParseStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep a rejection message unless the cap is reached
    pub fn record_error(&mut self, message: String, cap: usize) {
        if self.errors.len() < cap {
            self.errors.push(message);
        }
    }

    /// All rejected records regardless of reason
    pub fn rejected_total(&self) -> usize {
        self.rows_rejected_parse + self.rows_rejected_cancelled + self.rows_malformed
    }

    /// Every record is accounted for exactly once
    pub fn is_balanced(&self) -> bool {
        self.accepted + self.rejected_total() == self.total_records
    }

    /// Calculate success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            (self.accepted as f64 / self.total_records as f64) * 100.0
        }
    }

    /// Check if parsing was mostly successful (>90% accepted)
    pub fn is_successful(&self) -> bool {
        self.success_rate() > 90.0
    }

    /// Add another file's counters to this one
    pub fn merge(&mut self, other: &ParseStats) {
        self.total_records += other.total_records;
        self.accepted += other.accepted;
        self.rows_rejected_parse += other.rows_rejected_parse;
        self.rows_rejected_cancelled += other.rows_rejected_cancelled;
        self.rows_malformed += other.rows_malformed;
        self.errors.extend(other.errors.iter().cloned());
    }
}

/// Whether a run produced any rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    Complete,
    /// Every data row was rejected; still a valid result
    EmptyResult,
}

/// Result of running the pipeline over one source
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub source_name: String,

    /// Delimiter used for the delimited parse
    pub delimiter: char,

    /// Cleaned header labels
    pub header: Vec<String>,

    pub column_map: ColumnMap,

    /// Accepted sales in input order
    pub table: SaleTable,

    pub stats: ParseStats,
}

impl ParseResult {
    pub fn status(&self) -> ParseStatus {
        if self.table.is_empty() {
            ParseStatus::EmptyResult
        } else {
            ParseStatus::Complete
        }
    }

    /// Turn an empty result into [`Error::EmptyResult`]
    pub fn into_non_empty(self) -> Result<Self> {
        match self.status() {
            ParseStatus::Complete => Ok(self),
            ParseStatus::EmptyResult => Err(Error::empty_result(self.source_name)),
        }
    }

    /// Get summary string for logging
    pub fn summary(&self) -> String {
        format!(
            "{}: {} of {} records accepted ({} parse, {} cancelled, {} malformed rejected)",
            self.source_name,
            self.stats.accepted,
            self.stats.total_records,
            self.stats.rows_rejected_parse,
            self.stats.rows_rejected_cancelled,
            self.stats.rows_malformed
        )
    }
}

/// Per-file outcome inside a batch
#[derive(Debug)]
pub struct FileReport {
    pub source_name: String,

    /// Statistics of the run, or the structural error that stopped this file
    pub outcome: std::result::Result<FileSummary, Error>,
}

/// Non-tabular part of a successful [`ParseResult`]
#[derive(Debug, Clone)]
pub struct FileSummary {
    pub delimiter: char,
    pub header: Vec<String>,
    pub column_map: ColumnMap,
    pub stats: ParseStats,
    pub status: ParseStatus,
}

/// Result of a batch run over several sources
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Accepted sales of all files, in source order
    pub table: SaleTable,

    pub files: Vec<FileReport>,
}

impl BatchResult {
    /// Counters summed over all successfully parsed files
    pub fn total_stats(&self) -> ParseStats {
        let mut total = ParseStats::new();
        for file in &self.files {
            if let Ok(summary) = &file.outcome {
                total.merge(&summary.stats);
            }
        }
        total
    }

    /// Files that failed structurally
    pub fn failed_files(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.files.iter().filter_map(|f| match &f.outcome {
            Err(e) => Some((f.source_name.as_str(), e)),
            Ok(_) => None,
        })
    }

    pub fn succeeded_count(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_ok()).count()
    }
}
