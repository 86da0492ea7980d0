//! Synthetic sales exports for demos, benchmarks and tests
//!
//! Generated files use the same layout the accounting system writes: a
//! `sep=;` declaration, the canonical header, day-first dates and
//! comma-decimal amounts with dot thousands separators. Output is fully
//! determined by [`SampleOptions`], so the same seed always yields the same
//! file.

use chrono::{Days, Local, NaiveDate};
use csv::{Terminator, WriterBuilder};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::debug;

use super::sales_csv_parser::loader::encode_legacy;
use crate::constants::{DEFAULT_DATE_FORMAT, labels};
use crate::{Error, Result};

const FAMILIES: &[&str] = &["Produto A", "Produto B", "Produto C", "Produto D", "Produto E"];
const FAMILY_WEIGHTS: &[u32] = &[25, 20, 20, 20, 15];
const SALESPEOPLE: &[&str] = &["Vendedor 1", "Vendedor 2", "Vendedor 3", "Vendedor 4"];
const CUSTOMERS: &[&str] = &["Cliente X", "Cliente Y", "Cliente Z", "Cliente W", "Cliente Q"];
const INVOICE_CODE: &str = "FT";
const CREDIT_NOTE_CODE: &str = "NC";
const CANCELLATION_REASON: &str = "Erro de digitação";

/// Shape of a generated export
#[derive(Debug, Clone, PartialEq)]
pub struct SampleOptions {
    /// Number of data lines
    pub rows: usize,
    /// Dates are drawn from the `days` days before `end_date`, inclusive
    pub days: u32,
    pub end_date: NaiveDate,
    pub seed: u64,
    /// Probability that a line is a credit note
    pub credit_note_share: f64,
    /// Probability that a line carries a cancellation reason
    pub cancelled_share: f64,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            rows: 1000,
            days: 90,
            end_date: Local::now().date_naive(),
            seed: 42,
            credit_note_share: 0.05,
            cancelled_share: 0.02,
        }
    }
}

impl SampleOptions {
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 {
            return Err(Error::configuration("Sample export needs at least one row"));
        }
        for (name, share) in [
            ("credit_note_share", self.credit_note_share),
            ("cancelled_share", self.cancelled_share),
        ] {
            if !(0.0..=1.0).contains(&share) {
                return Err(Error::configuration(format!(
                    "{} must be between 0 and 1, got {}",
                    name, share
                )));
            }
        }
        if self.end_date.checked_sub_days(Days::new(u64::from(self.days))).is_none() {
            return Err(Error::configuration(format!(
                "{} days before {} is out of the calendar range",
                self.days, self.end_date
            )));
        }
        Ok(())
    }
}

/// Generate the text of a synthetic export
pub fn generate_sample_export(options: &SampleOptions) -> Result<String> {
    options.validate()?;

    let mut rng = StdRng::seed_from_u64(options.seed);
    let family_dist = WeightedIndex::new(FAMILY_WEIGHTS)
        .map_err(|e| Error::configuration(format!("Invalid family weights: {}", e)))?;

    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record([
        labels::DATE,
        labels::FAMILY,
        labels::DOCUMENT_CODE,
        labels::SALESPERSON,
        labels::CUSTOMER,
        labels::AMOUNT,
        labels::CANCELLATION_REASON,
    ])?;

    for _ in 0..options.rows {
        let offset = rng.gen_range(0..=u64::from(options.days));
        let date = options
            .end_date
            .checked_sub_days(Days::new(offset))
            .unwrap_or(options.end_date);

        let quantity: i64 = rng.gen_range(1..20);
        let unit_price_cents: i64 = rng.gen_range(500..=15_000);
        let amount = Decimal::new(quantity * unit_price_cents, 2);

        let code = if rng.gen_bool(options.credit_note_share) {
            CREDIT_NOTE_CODE
        } else {
            INVOICE_CODE
        };
        let reason = if rng.gen_bool(options.cancelled_share) {
            CANCELLATION_REASON
        } else {
            ""
        };

        let date_text = date.format(DEFAULT_DATE_FORMAT).to_string();
        let amount_text = format_legacy_amount(amount);
        writer.write_record([
            date_text.as_str(),
            FAMILIES[family_dist.sample(&mut rng)],
            code,
            SALESPEOPLE.choose(&mut rng).copied().unwrap_or_default(),
            CUSTOMERS.choose(&mut rng).copied().unwrap_or_default(),
            amount_text.as_str(),
            reason,
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::io("Failed to finish sample export", e.into_error()))?;
    let body = String::from_utf8(bytes)
        .map_err(|e| Error::data_validation(format!("Sample export is not UTF-8: {}", e)))?;

    debug!(
        "Generated sample export: {} rows, seed {}, ending {}",
        options.rows, options.seed, options.end_date
    );

    Ok(format!("sep=;\r\n{}", body))
}

/// Generate a synthetic export encoded as the accounting system writes it
pub fn generate_sample_bytes(options: &SampleOptions) -> Result<Vec<u8>> {
    Ok(encode_legacy(&generate_sample_export(options)?))
}

/// `1234.5` → `1.234,50`
pub fn format_legacy_amount(amount: Decimal) -> String {
    let text = format!("{:.2}", amount.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}{},{}", sign, grouped, fraction)
}
