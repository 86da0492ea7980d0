//! Field parsing utilities for sales export records
//!
//! This module provides helper functions for parsing the localized date and
//! amount cells and for reading the descriptive text columns.

use chrono::{Datelike, NaiveDate};
use csv::StringRecord;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

use super::column_mapping::ColumnMap;
use crate::app::models::CanonicalField;
use crate::constants::{AMOUNT_TOKEN_PATTERN, MAX_GROSS_AMOUNT};
use crate::{Error, Result};

static AMOUNT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(AMOUNT_TOKEN_PATTERN).expect("valid amount token regex"));

/// Parse a date cell with the configured day-first pattern
///
/// Only the first whitespace-separated token is used, so a trailing time of
/// day is ignored. Years outside four digits are rejected.
pub fn parse_sale_date(value: &str, date_format: &str) -> Result<NaiveDate> {
    let token = value.split_whitespace().next().unwrap_or("");

    let date = NaiveDate::parse_from_str(token, date_format).map_err(|e| {
        Error::data_validation(format!(
            "Invalid date '{}' (expected {}): {}",
            value.trim(),
            date_format,
            e
        ))
    })?;

    if !(1000..=9999).contains(&date.year()) {
        return Err(Error::data_validation(format!(
            "Invalid date '{}': year must have four digits",
            value.trim()
        )));
    }

    Ok(date)
}

/// Parse the gross amount of a sale
///
/// Currency symbols, spaces and other text are dropped; the first numeric
/// token is normalized to a period decimal separator. The result must be
/// strictly positive and at most [`MAX_GROSS_AMOUNT`].
pub fn parse_gross_amount(value: &str) -> Result<Decimal> {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{00a0}')
        .collect();

    let token = AMOUNT_TOKEN_RE
        .find(&compact)
        .map(|m| m.as_str())
        .ok_or_else(|| Error::data_validation(format!("No numeric value in amount '{}'", value.trim())))?;

    let normalized = normalize_number_token(token);
    let amount = Decimal::from_str(&normalized).map_err(|e| {
        Error::data_validation(format!("Invalid amount '{}': {}", value.trim(), e))
    })?;

    if amount <= Decimal::ZERO {
        return Err(Error::data_validation(format!(
            "Amount '{}' is not strictly positive",
            value.trim()
        )));
    }

    if amount > Decimal::from(MAX_GROSS_AMOUNT) {
        return Err(Error::data_validation(format!(
            "Amount '{}' exceeds the maximum of {}",
            value.trim(),
            MAX_GROSS_AMOUNT
        )));
    }

    Ok(amount)
}

/// Convert a localized numeric token to `123456.78` form
///
/// - With a comma: dots are thousands separators, the comma is the decimal point
/// - Without a comma: several dots are thousands separators, a single dot is
///   the decimal point
pub fn normalize_number_token(token: &str) -> String {
    let token = token.trim_end_matches(['.', ',']);

    if token.contains(',') {
        token.replace('.', "").replace(',', ".")
    } else if token.matches('.').count() > 1 {
        token.replace('.', "")
    } else {
        token.to_string()
    }
}

/// Trimmed, non-empty cell of a mapped field
pub fn get_mapped_field<'a>(
    record: &'a StringRecord,
    mapping: &ColumnMap,
    field: CanonicalField,
) -> Option<&'a str> {
    mapping
        .get(field)
        .and_then(|index| record.get(index))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

/// Get a required field value from a record
pub fn get_required_field<'a>(
    record: &'a StringRecord,
    mapping: &ColumnMap,
    field: CanonicalField,
) -> Result<&'a str> {
    get_mapped_field(record, mapping, field)
        .ok_or_else(|| Error::data_validation(format!("Empty value for required column '{}'", field)))
}

/// Text of an optional field, or its placeholder when absent or empty
pub fn text_or_placeholder(
    record: &StringRecord,
    mapping: &ColumnMap,
    field: CanonicalField,
    placeholder_prefix: &str,
) -> String {
    match get_mapped_field(record, mapping, field) {
        Some(value) => value.to_string(),
        None => field.placeholder(placeholder_prefix),
    }
}
