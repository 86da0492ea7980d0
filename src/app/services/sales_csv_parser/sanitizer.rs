//! Line sanitizing and delimiter detection
//!
//! Spreadsheet-oriented export tools prepend a `sep=<char>` directive that is
//! not part of the data. This module removes it together with blank lines and
//! decides which delimiter the rest of the pipeline uses.

use csv::ReaderBuilder;
use tracing::debug;

use crate::config::DelimiterPolicy;
use crate::constants::{DEFAULT_DELIMITER, FALLBACK_DELIMITER, SEPARATOR_DECLARATION_PREFIX};
use crate::{Error, Result};

/// Lines ready for delimited parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedInput {
    /// Delimiter chosen for this file
    pub delimiter: char,

    /// Delimiter named by a declaration line, if one was present
    pub declared: Option<char>,

    /// Header line followed by data lines
    pub lines: Vec<String>,

    /// Declaration and blank lines removed
    pub discarded: usize,
}

impl SanitizedInput {
    /// Number of data lines (everything after the header)
    pub fn data_line_count(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    /// Sanitized text joined back for the CSV reader
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Interpret a separator declaration line
///
/// Returns `None` when the line is not a declaration. Leading whitespace and
/// an opening double quote (`"sep=;"`) are tolerated.
pub fn parse_declaration(line: &str) -> Option<char> {
    let probe = line.trim_start().trim_start_matches('"');
    let rest = probe.strip_prefix(SEPARATOR_DECLARATION_PREFIX)?;

    if rest.contains(';') {
        Some(';')
    } else if rest.contains('\t') {
        Some('\t')
    } else {
        Some(DEFAULT_DELIMITER)
    }
}

/// Remove declaration and blank lines, then settle on a delimiter
pub fn sanitize(
    source_name: &str,
    lines: &[String],
    policy: DelimiterPolicy,
) -> Result<SanitizedInput> {
    let mut declared = None;
    let mut kept = Vec::with_capacity(lines.len());
    let mut discarded = 0;

    for line in lines {
        if let Some(delimiter) = parse_declaration(line) {
            // The first declaration wins; repeated ones are dropped as well
            if declared.is_none() {
                declared = Some(delimiter);
            }
            discarded += 1;
            continue;
        }

        if line.trim().is_empty() {
            discarded += 1;
            continue;
        }

        kept.push(line.clone());
    }

    // A header alone carries no data
    if kept.len() < 2 {
        return Err(Error::empty_input(source_name));
    }

    let delimiter = match declared {
        Some(delimiter) => delimiter,
        None => match policy {
            DelimiterPolicy::DeclarationOrComma => DEFAULT_DELIMITER,
            DelimiterPolicy::DeclarationOrTrial => trial_delimiter(&kept[0]),
        },
    };

    debug!(
        "Sanitized {}: delimiter {:?} ({}), {} lines kept, {} discarded",
        source_name,
        delimiter,
        if declared.is_some() { "declared" } else { "inferred" },
        kept.len(),
        discarded
    );

    Ok(SanitizedInput {
        delimiter,
        declared,
        lines: kept,
        discarded,
    })
}

/// Split the header with a comma; a single resulting column means `;`
fn trial_delimiter(header_line: &str) -> char {
    if count_fields(header_line, DEFAULT_DELIMITER) >= 2 {
        DEFAULT_DELIMITER
    } else {
        FALLBACK_DELIMITER
    }
}

/// Field count of one line under a delimiter, honoring quotes
pub fn count_fields(line: &str, delimiter: char) -> usize {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter as u8)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => record.len(),
        _ => 0,
    }
}
