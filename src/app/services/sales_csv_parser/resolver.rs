//! Delimited parsing of sanitized lines into header, rows and column map
//!
//! Rows whose field count does not match the header are skipped and counted.
//! One repair happens before that check: an unquoted comma-decimal amount in a
//! comma-delimited file (`...,100,50`) spills into two cells and is rejoined.

use csv::{ReaderBuilder, StringRecord};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::column_mapping::{ColumnMap, clean_header_cell};
use super::sanitizer::SanitizedInput;
use crate::app::models::CanonicalField;
use crate::config::ColumnLabels;
use crate::{Error, Result};

static SPILL_INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-?\d[\d.]*\s*$").expect("valid integer part regex"));

static SPILL_FRACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}\s*$").expect("valid fraction part regex"));

/// One data row with its position among the sanitized data lines (1-based)
#[derive(Debug, Clone)]
pub struct DataRow {
    pub number: usize,
    pub record: StringRecord,
}

/// Output of column resolution
#[derive(Debug, Clone)]
pub struct ResolvedTable {
    /// Cleaned header labels
    pub header: Vec<String>,

    /// Well-formed data rows in input order
    pub rows: Vec<DataRow>,

    /// Field to column mapping
    pub column_map: ColumnMap,

    /// Data records read from the input
    pub total_records: usize,

    /// Rows skipped for an inconsistent field count or unreadable CSV
    pub malformed: Vec<String>,

    /// Rows rescued by the decimal-comma repair
    pub repaired: usize,
}

/// Parse sanitized lines and resolve semantic columns
pub fn resolve(
    source_name: &str,
    input: &SanitizedInput,
    labels: &ColumnLabels,
) -> Result<ResolvedTable> {
    let text = input.text();
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(input.delimiter as u8)
        .quote(b'"')
        .from_reader(text.as_bytes());

    let mut records = reader.records();

    let header: Vec<String> = match records.next() {
        Some(Ok(record)) => record.iter().map(clean_header_cell).collect(),
        Some(Err(e)) => {
            return Err(Error::csv_parsing(
                source_name,
                "Failed to read header row",
                Some(e),
            ));
        }
        None => return Err(Error::empty_input(source_name)),
    };

    let column_map = ColumnMap::resolve(source_name, &header, labels)?;
    let amount_index = column_map.get(CanonicalField::Amount);

    let mut rows = Vec::new();
    let mut malformed = Vec::new();
    let mut total_records = 0;
    let mut repaired = 0;

    for result in records {
        total_records += 1;
        let number = total_records;

        let record = match result {
            Ok(record) => record,
            Err(e) => {
                malformed.push(format!("Record {}: unreadable CSV: {}", number, e));
                continue;
            }
        };

        if record.len() == header.len() {
            rows.push(DataRow { number, record });
            continue;
        }

        let rejoined = match (input.delimiter, amount_index) {
            (',', Some(index)) => repair_decimal_spill(&record, header.len(), index),
            _ => None,
        };

        match rejoined {
            Some(record) => {
                repaired += 1;
                rows.push(DataRow { number, record });
            }
            None => malformed.push(format!(
                "Record {}: expected {} fields, found {}",
                number,
                header.len(),
                record.len()
            )),
        }
    }

    let (resolved, exact, variant, positional) = column_map.stats();
    debug!(
        "Resolved {} columns ({} exact, {} variant, {} positional); {} rows, {} malformed, {} repaired",
        resolved,
        exact,
        variant,
        positional,
        rows.len(),
        malformed.len(),
        repaired
    );

    Ok(ResolvedTable {
        header,
        rows,
        column_map,
        total_records,
        malformed,
        repaired,
    })
}

/// Rejoin `int` and `frac` cells of an unquoted comma-decimal amount
///
/// Applies only when the record is exactly one field longer than the header,
/// the amount cell is an integer part (a leading `-` is kept so the amount
/// check can reject it) and the next cell is one or two digits.
pub fn repair_decimal_spill(
    record: &StringRecord,
    header_len: usize,
    amount_index: usize,
) -> Option<StringRecord> {
    if record.len() != header_len + 1 {
        return None;
    }

    let integer = record.get(amount_index)?;
    let fraction = record.get(amount_index + 1)?;
    if !SPILL_INTEGER_RE.is_match(integer) || !SPILL_FRACTION_RE.is_match(fraction) {
        return None;
    }

    let mut fixed = StringRecord::with_capacity(record.as_slice().len() + 1, header_len);
    for (i, field) in record.iter().enumerate() {
        if i == amount_index {
            fixed.push_field(&format!("{},{}", integer.trim(), fraction.trim()));
        } else if i != amount_index + 1 {
            fixed.push_field(field);
        }
    }

    Some(fixed)
}
