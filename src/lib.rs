//! Sales Processor Library
//!
//! A Rust library for turning the irregular CSV sales exports produced by a
//! legacy desktop accounting system into one canonical, typed sales table.
//!
//! This library provides tools for:
//! - Loading export bytes from uploads, local files or remotely fetched buffers
//! - Stripping `sep=` declaration lines and detecting the field delimiter
//! - Resolving semantic columns from free-form header labels
//! - Parsing day-first dates and comma-decimal amounts
//! - Signing credit-note documents and excluding cancelled transactions
//! - Filtering, summarising and grouping the resulting table
//! - Generating synthetic exports in the same layout

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod file_discovery;
        pub mod sales_csv_parser;
        pub mod sales_views;
        pub mod sample_export;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{CanonicalField, SaleRecord, SaleTable};
pub use app::services::sales_csv_parser::{ByteSource, ParseResult, ParseStats, SalesCsvParser};
pub use config::PipelineConfig;

/// Result type alias for the sales processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for sales export processing
///
/// Source errors abort a run, structural errors abort a single file and
/// row-level problems never surface here (they are counted in
/// [`ParseStats`]).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The byte source could not be opened or read
    #[error("Source unavailable: {source_name}: {reason}")]
    SourceUnavailable {
        source_name: String,
        reason: String,
        #[source]
        io: Option<std::io::Error>,
    },

    /// No data lines remain after sanitization
    #[error("Empty input: no data lines left in '{source_name}' after removing declarations and blank lines")]
    EmptyInput { source_name: String },

    /// A required semantic column could not be resolved from the header
    #[error("Required column missing in '{source_name}': no column matches field '{field}'")]
    RequiredColumnMissing { source_name: String, field: String },

    /// Every data row was rejected
    #[error("Empty result: no valid sales rows in '{source_name}'")]
    EmptyResult { source_name: String },

    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV parsing error
    #[error("CSV parsing error in '{source_name}': {message}")]
    CsvParsing {
        source_name: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },
}

impl Error {
    /// Create a source unavailable error from an I/O failure
    pub fn source_unavailable(source_name: impl Into<String>, io: std::io::Error) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: io.to_string(),
            io: Some(io),
        }
    }

    /// Create a source unavailable error without an underlying I/O error
    pub fn source_missing(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.into(),
            io: None,
        }
    }

    /// Create an empty input error
    pub fn empty_input(source_name: impl Into<String>) -> Self {
        Self::EmptyInput {
            source_name: source_name.into(),
        }
    }

    /// Create a required column missing error
    pub fn required_column_missing(source_name: impl Into<String>, field: CanonicalField) -> Self {
        Self::RequiredColumnMissing {
            source_name: source_name.into(),
            field: field.name().to_string(),
        }
    }

    /// Create an empty result error
    pub fn empty_result(source_name: impl Into<String>) -> Self {
        Self::EmptyResult {
            source_name: source_name.into(),
        }
    }

    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a CSV parsing error with context
    pub fn csv_parsing(
        source_name: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::CsvParsing {
            source_name: source_name.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a directory traversal error
    pub fn directory_traversal(message: impl Into<String>, source: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: message.into(),
            source,
        }
    }

    /// Name of the offending field for column errors
    pub fn missing_field(&self) -> Option<&str> {
        match self {
            Self::RequiredColumnMissing { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Whether this error stops a whole batch rather than a single file
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. }
                | Self::Io { .. }
                | Self::Configuration { .. }
                | Self::DirectoryTraversal { .. }
        )
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Self::CsvParsing {
            source_name: "unknown".to_string(),
            message: "CSV parsing failed".to_string(),
            source: Some(error),
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "Directory traversal failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Configuration {
            message: format!("Invalid JSON: {}", error),
        }
    }
}
