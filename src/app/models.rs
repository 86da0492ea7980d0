//! Core data models for normalized sales data
//!
//! This module defines the canonical record produced by the ingestion
//! pipeline, the table that collects those records, and the identifiers of
//! the semantic fields that the column resolver looks for.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::constants::MAX_GROSS_AMOUNT;
use crate::{Error, Result};

/// Semantic fields that are mapped onto physical columns of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Date,
    Family,
    DocumentCode,
    Salesperson,
    Customer,
    Amount,
    CancellationReason,
}

impl CanonicalField {
    /// All fields in declaration order
    pub const ALL: [CanonicalField; 7] = [
        CanonicalField::Date,
        CanonicalField::Family,
        CanonicalField::DocumentCode,
        CanonicalField::Salesperson,
        CanonicalField::Customer,
        CanonicalField::Amount,
        CanonicalField::CancellationReason,
    ];

    /// Snake-case identifier used in errors and reports
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalField::Date => "date",
            CanonicalField::Family => "family",
            CanonicalField::DocumentCode => "document_code",
            CanonicalField::Salesperson => "salesperson",
            CanonicalField::Customer => "customer",
            CanonicalField::Amount => "amount",
            CanonicalField::CancellationReason => "cancellation_reason",
        }
    }

    /// Required fields fail the whole file when they cannot be resolved
    pub fn is_required(&self) -> bool {
        matches!(self, CanonicalField::Date | CanonicalField::Amount)
    }

    /// Placeholder text for an absent optional field, e.g. `UNSPECIFIED_FAMILY`
    pub fn placeholder(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.name().to_uppercase())
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Case-insensitive set of document codes that book a negative amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditNoteCodes {
    codes: HashSet<String>,
}

impl CreditNoteCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            codes: codes
                .into_iter()
                .map(|c| c.as_ref().trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    /// Exact, case-insensitive membership test
    pub fn contains(&self, document_code: &str) -> bool {
        self.codes.contains(&document_code.trim().to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for CreditNoteCodes {
    fn default() -> Self {
        Self::new(crate::constants::CREDIT_NOTE_CODES.iter())
    }
}

/// One accepted sales line
///
/// The sign of `net_amount` is fully determined by the document code: credit
/// notes are negative, everything else is the positive gross amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub date: NaiveDate,
    pub family: String,
    pub document_code: String,
    pub salesperson: String,
    pub customer: String,
    pub net_amount: Decimal,
}

impl SaleRecord {
    /// Build a record from a strictly positive gross amount
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataValidation`] when `gross_amount` is not > 0 or
    /// is above [`MAX_GROSS_AMOUNT`].
    pub fn new(
        date: NaiveDate,
        family: String,
        document_code: String,
        salesperson: String,
        customer: String,
        gross_amount: Decimal,
        credit_codes: &CreditNoteCodes,
    ) -> Result<Self> {
        if gross_amount <= Decimal::ZERO {
            return Err(Error::data_validation(format!(
                "Gross amount must be strictly positive, got {}",
                gross_amount
            )));
        }
        if gross_amount > Decimal::from(MAX_GROSS_AMOUNT) {
            return Err(Error::data_validation(format!(
                "Gross amount {} exceeds the maximum of {}",
                gross_amount, MAX_GROSS_AMOUNT
            )));
        }

        let net_amount = if credit_codes.contains(&document_code) {
            -gross_amount
        } else {
            gross_amount
        };

        Ok(Self {
            date,
            family,
            document_code,
            salesperson,
            customer,
            net_amount,
        })
    }

    /// Unsigned amount as parsed from the export
    pub fn gross_amount(&self) -> Decimal {
        self.net_amount.abs()
    }

    pub fn is_credit_note(&self) -> bool {
        self.net_amount < Decimal::ZERO
    }

    /// Text value of one of the descriptive fields
    pub fn text_field(&self, field: CanonicalField) -> Option<&str> {
        match field {
            CanonicalField::Family => Some(&self.family),
            CanonicalField::DocumentCode => Some(&self.document_code),
            CanonicalField::Salesperson => Some(&self.salesperson),
            CanonicalField::Customer => Some(&self.customer),
            _ => None,
        }
    }
}

/// Ordered collection of accepted sales records
///
/// Insertion order follows input row order (and file order in batch mode).
/// Consumers derive new tables or aggregates; nothing mutates a table once
/// the pipeline has handed it out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTable {
    records: Vec<SaleRecord>,
}

impl SaleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<SaleRecord>) -> Self {
        Self { records }
    }

    pub(crate) fn push(&mut self, record: SaleRecord) {
        self.records.push(record);
    }

    /// Append all records of another table, preserving order
    pub fn append(&mut self, other: SaleTable) {
        self.records.extend(other.records);
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SaleRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of signed net amounts
    pub fn net_total(&self) -> Decimal {
        self.records.iter().map(|r| r.net_amount).sum()
    }

    /// Earliest and latest sale date
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.date).min()?;
        let last = self.records.iter().map(|r| r.date).max()?;
        Some((first, last))
    }
}

impl FromIterator<SaleRecord> for SaleTable {
    fn from_iter<T: IntoIterator<Item = SaleRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SaleTable {
    type Item = &'a SaleRecord;
    type IntoIter = std::slice::Iter<'a, SaleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for SaleTable {
    type Item = SaleRecord;
    type IntoIter = std::vec::IntoIter<SaleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
