//! Configuration management and validation.
//!
//! Provides the pipeline configuration: delimiter policy, date pattern,
//! credit-note codes, placeholder naming and the header label rules used by
//! the column resolver. Values are layered defaults -> JSON file -> CLI flags.

use crate::app::models::{CanonicalField, CreditNoteCodes};
use crate::constants::{
    self, CONFIG_DIR_NAME, CONFIG_FILE_NAME, CREDIT_NOTE_CODES, DEFAULT_DATE_FORMAT,
    DEFAULT_FILE_PATTERN, DEFAULT_MAX_ERROR_MESSAGES, DEFAULT_PLACEHOLDER_PREFIX, label_variants,
};
use crate::{Error, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// How the delimiter is chosen when the export has no `sep=` declaration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelimiterPolicy {
    /// Split the header on `,`; fall back to `;` if that yields a single column
    #[default]
    DeclarationOrTrial,
    /// Always use `,`
    DeclarationOrComma,
}

/// Matching rules for one canonical field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLabels {
    /// Label matched exactly (case-sensitive)
    pub exact: String,

    /// Ordered substring rules; every token of a rule must occur in the header
    /// (compared lowercase)
    pub variants: Vec<Vec<String>>,
}

impl FieldLabels {
    fn from_static(exact: &str, variants: &[&[&str]]) -> Self {
        Self {
            exact: exact.to_string(),
            variants: variants
                .iter()
                .map(|rule| rule.iter().map(|t| t.to_lowercase()).collect())
                .collect(),
        }
    }
}

/// Header label rules for all canonical fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLabels {
    pub date: FieldLabels,
    pub family: FieldLabels,
    pub document_code: FieldLabels,
    pub salesperson: FieldLabels,
    pub customer: FieldLabels,
    pub amount: FieldLabels,
    pub cancellation_reason: FieldLabels,
}

impl Default for ColumnLabels {
    fn default() -> Self {
        use constants::labels;

        Self {
            date: FieldLabels::from_static(labels::DATE, label_variants::DATE),
            family: FieldLabels::from_static(labels::FAMILY, label_variants::FAMILY),
            document_code: FieldLabels::from_static(
                labels::DOCUMENT_CODE,
                label_variants::DOCUMENT_CODE,
            ),
            salesperson: FieldLabels::from_static(labels::SALESPERSON, label_variants::SALESPERSON),
            customer: FieldLabels::from_static(labels::CUSTOMER, label_variants::CUSTOMER),
            amount: FieldLabels::from_static(labels::AMOUNT, label_variants::AMOUNT),
            cancellation_reason: FieldLabels::from_static(
                labels::CANCELLATION_REASON,
                label_variants::CANCELLATION_REASON,
            ),
        }
    }
}

impl ColumnLabels {
    /// Rules for a given field
    pub fn for_field(&self, field: CanonicalField) -> &FieldLabels {
        match field {
            CanonicalField::Date => &self.date,
            CanonicalField::Family => &self.family,
            CanonicalField::DocumentCode => &self.document_code,
            CanonicalField::Salesperson => &self.salesperson,
            CanonicalField::Customer => &self.customer,
            CanonicalField::Amount => &self.amount,
            CanonicalField::CancellationReason => &self.cancellation_reason,
        }
    }
}

/// Global configuration for sales export processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Delimiter choice when no declaration line is present
    pub delimiter_policy: DelimiterPolicy,

    /// chrono pattern for the date column
    pub date_format: String,

    /// Prefix of placeholders for absent optional fields
    pub placeholder_prefix: String,

    /// Document codes booked as negative amounts
    pub credit_note_codes: Vec<String>,

    /// Header label rules
    pub labels: ColumnLabels,

    /// File name pattern for directory inputs
    pub file_pattern: String,

    /// Descend into sub-directories of directory inputs
    pub recursive: bool,

    /// Rejection messages kept per file for diagnostics
    pub max_error_messages: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delimiter_policy: DelimiterPolicy::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            placeholder_prefix: DEFAULT_PLACEHOLDER_PREFIX.to_string(),
            credit_note_codes: CREDIT_NOTE_CODES.iter().map(|c| c.to_string()).collect(),
            labels: ColumnLabels::default(),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            recursive: true,
            max_error_messages: DEFAULT_MAX_ERROR_MESSAGES,
        }
    }
}

impl PipelineConfig {
    /// Create configuration with a custom delimiter policy
    pub fn with_delimiter_policy(mut self, policy: DelimiterPolicy) -> Self {
        self.delimiter_policy = policy;
        self
    }

    /// Create configuration with a custom date pattern
    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    /// Create configuration with a custom placeholder prefix
    pub fn with_placeholder_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.placeholder_prefix = prefix.into();
        self
    }

    /// Replace the credit-note code set
    pub fn with_credit_note_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.credit_note_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the header label rules
    pub fn with_labels(mut self, labels: ColumnLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Set the file pattern used for directory inputs
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }

    /// Only look at the top level of directory inputs
    pub fn without_recursion(mut self) -> Self {
        self.recursive = false;
        self
    }

    /// Credit-note codes as a lookup set
    pub fn credit_codes(&self) -> CreditNoteCodes {
        CreditNoteCodes::new(&self.credit_note_codes)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.date_format.trim().is_empty() {
            return Err(Error::configuration("Date format cannot be empty"));
        }

        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::configuration(format!(
                "Invalid date format '{}'",
                self.date_format
            )));
        }

        if self.placeholder_prefix.is_empty() {
            return Err(Error::configuration("Placeholder prefix cannot be empty"));
        }

        glob::Pattern::new(&self.file_pattern).map_err(|e| {
            Error::configuration(format!("Invalid file pattern '{}': {}", self.file_pattern, e))
        })?;

        for field in CanonicalField::ALL {
            let rules = self.labels.for_field(field);
            if rules.exact.trim().is_empty() && rules.variants.is_empty() {
                return Err(Error::configuration(format!(
                    "No labels configured for field '{}'",
                    field
                )));
            }
            if rules.variants.iter().any(|rule| rule.is_empty()) {
                return Err(Error::configuration(format!(
                    "Empty label rule for field '{}'",
                    field
                )));
            }
        }

        Ok(())
    }

    /// Load configuration from a JSON file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: PipelineConfig = serde_json::from_str(&content).map_err(|e| {
            Error::configuration(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Default config file location, e.g. ~/.config/sales-processor/config.json
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Resolve configuration: explicit file, else default file if present, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.validate()?;
        Ok(config)
    }
}
