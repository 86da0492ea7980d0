//! Core sales export parser implementation
//!
//! This module wires the pipeline stages together: loading, sanitization,
//! column resolution and row normalization. It also runs the pipeline over
//! several sources and concatenates their tables.

use tracing::{debug, info, warn};

use super::loader::{self, ByteSource};
use super::record_parser::{NormalizeOptions, normalize_rows};
use super::resolver;
use super::sanitizer;
use super::stats::{BatchResult, FileReport, FileSummary, ParseResult, ParseStats, ParseStatus};
use crate::config::PipelineConfig;
use crate::Result;

/// Sales export parser
///
/// Holds only configuration; every call is independent, so one parser can be
/// reused for any number of files.
#[derive(Debug, Clone)]
pub struct SalesCsvParser {
    config: PipelineConfig,
    options: NormalizeOptions,
}

impl SalesCsvParser {
    /// Create a new parser with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        let options = NormalizeOptions::from_config(&config);
        Self { config, options }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline over one byte source
    ///
    /// An all-rejected file is returned with [`ParseStatus::EmptyResult`];
    /// use [`ParseResult::into_non_empty`] to treat that as an error.
    pub fn parse_source(&self, source: &ByteSource) -> Result<ParseResult> {
        info!("Parsing sales export: {}", source.name());

        let raw = loader::load(source)?;
        self.parse_lines(&raw.source_name, &raw.lines)
    }

    /// Run the pipeline on already decoded text
    pub fn parse_text(&self, source_name: &str, text: &str) -> Result<ParseResult> {
        self.parse_lines(source_name, &loader::split_lines(text))
    }

    /// Run sanitization, column resolution and normalization on decoded lines
    pub fn parse_lines(&self, source_name: &str, lines: &[String]) -> Result<ParseResult> {
        let sanitized = sanitizer::sanitize(source_name, lines, self.config.delimiter_policy)?;
        let resolved = resolver::resolve(source_name, &sanitized, &self.config.labels)?;

        let mut stats = ParseStats::new();
        stats.total_records = resolved.total_records;
        stats.rows_malformed = resolved.malformed.len();
        for message in &resolved.malformed {
            stats.record_error(message.clone(), self.options.max_error_messages);
        }

        let table = normalize_rows(&resolved.rows, &resolved.column_map, &self.options, &mut stats);

        debug_assert!(stats.is_balanced());

        let result = ParseResult {
            source_name: source_name.to_string(),
            delimiter: sanitized.delimiter,
            header: resolved.header,
            column_map: resolved.column_map,
            table,
            stats,
        };

        match result.status() {
            ParseStatus::Complete => info!("{}", result.summary()),
            ParseStatus::EmptyResult => warn!("No valid sales rows: {}", result.summary()),
        }

        Ok(result)
    }

    /// Parse several sources into one table
    ///
    /// A structural error (empty input, missing required column) is recorded
    /// against its file and the batch continues. An unavailable source aborts
    /// the whole batch.
    pub fn parse_batch(&self, sources: &[ByteSource]) -> Result<BatchResult> {
        self.parse_batch_with(sources, |_| {})
    }

    /// Like [`parse_batch`](Self::parse_batch), calling `on_file` after each
    /// file has been recorded
    pub fn parse_batch_with<F>(&self, sources: &[ByteSource], mut on_file: F) -> Result<BatchResult>
    where
        F: FnMut(&FileReport),
    {
        let mut batch = BatchResult::default();

        for source in sources {
            let source_name = source.name();
            match self.parse_source(source) {
                Ok(result) => {
                    let status = result.status();
                    batch.table.append(result.table);
                    batch.files.push(FileReport {
                        source_name,
                        outcome: Ok(FileSummary {
                            delimiter: result.delimiter,
                            header: result.header,
                            column_map: result.column_map,
                            stats: result.stats,
                            status,
                        }),
                    });
                }
                Err(e) if e.is_critical() => {
                    warn!("Aborting batch at {}: {}", source_name, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", source_name, e);
                    batch.files.push(FileReport {
                        source_name,
                        outcome: Err(e),
                    });
                }
            }

            if let Some(report) = batch.files.last() {
                on_file(report);
            }
        }

        debug!(
            "Batch finished: {} of {} files parsed, {} sales",
            batch.succeeded_count(),
            batch.files.len(),
            batch.table.len()
        );

        Ok(batch)
    }
}

impl Default for SalesCsvParser {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
