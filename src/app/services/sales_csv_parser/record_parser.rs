//! Row normalization for sales export records
//!
//! Each well-formed row is turned into a [`SaleRecord`] or rejected. The order
//! of checks is fixed: date, positive gross amount, optional text fields, sign
//! adjustment, and finally the cancellation marker.

use csv::StringRecord;
use tracing::debug;

use super::column_mapping::ColumnMap;
use super::field_parsers::{
    get_mapped_field, get_required_field, parse_gross_amount, parse_sale_date,
    text_or_placeholder,
};
use super::resolver::DataRow;
use super::stats::ParseStats;
use crate::app::models::{CanonicalField, CreditNoteCodes, SaleRecord, SaleTable};
use crate::Result;
use crate::config::PipelineConfig;

/// Settings that drive row normalization
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub date_format: String,
    pub placeholder_prefix: String,
    pub credit_codes: CreditNoteCodes,
    pub max_error_messages: usize,
}

impl NormalizeOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            date_format: config.date_format.clone(),
            placeholder_prefix: config.placeholder_prefix.clone(),
            credit_codes: config.credit_codes(),
            max_error_messages: config.max_error_messages,
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Result of normalizing one row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted(SaleRecord),
    /// Date or amount could not be parsed, or the amount was not positive
    RejectedParse(String),
    /// Administratively voided transaction, with its reason
    RejectedCancelled(String),
}

/// Normalize one record
pub fn normalize_record(
    record: &StringRecord,
    mapping: &ColumnMap,
    options: &NormalizeOptions,
) -> RowOutcome {
    match build_sale(record, mapping, options) {
        Ok(sale) => match get_mapped_field(record, mapping, CanonicalField::CancellationReason) {
            Some(reason) => RowOutcome::RejectedCancelled(reason.to_string()),
            None => RowOutcome::Accepted(sale),
        },
        Err(e) => RowOutcome::RejectedParse(e.to_string()),
    }
}

fn build_sale(
    record: &StringRecord,
    mapping: &ColumnMap,
    options: &NormalizeOptions,
) -> Result<SaleRecord> {
    let date = parse_sale_date(
        get_required_field(record, mapping, CanonicalField::Date)?,
        &options.date_format,
    )?;
    let gross_amount = parse_gross_amount(get_required_field(
        record,
        mapping,
        CanonicalField::Amount,
    )?)?;

    let text = |field| text_or_placeholder(record, mapping, field, &options.placeholder_prefix);

    SaleRecord::new(
        date,
        text(CanonicalField::Family),
        text(CanonicalField::DocumentCode),
        text(CanonicalField::Salesperson),
        text(CanonicalField::Customer),
        gross_amount,
        &options.credit_codes,
    )
}

/// Normalize all rows of one file
///
/// Never fails: rejected rows are only counted. `stats` must already carry the
/// record total and malformed count from column resolution.
pub fn normalize_rows(
    rows: &[DataRow],
    mapping: &ColumnMap,
    options: &NormalizeOptions,
    stats: &mut ParseStats,
) -> SaleTable {
    let mut table = SaleTable::new();

    for row in rows {
        match normalize_record(&row.record, mapping, options) {
            RowOutcome::Accepted(sale) => {
                table.push(sale);
                stats.accepted += 1;
            }
            RowOutcome::RejectedParse(reason) => {
                stats.rows_rejected_parse += 1;
                stats.record_error(
                    format!("Record {}: {}", row.number, reason),
                    options.max_error_messages,
                );
                debug!("Rejected record {}: {}", row.number, reason);
            }
            RowOutcome::RejectedCancelled(reason) => {
                stats.rows_rejected_cancelled += 1;
                debug!("Cancelled record {}: {}", row.number, reason);
            }
        }
    }

    table
}
