//! Application constants for the sales processor
//!
//! This module contains the default labels, codes and formats used by the
//! ingestion pipeline. Everything here can be overridden through
//! [`crate::config::PipelineConfig`]; these values describe the exports of the
//! legacy accounting system as they are usually configured.

// =============================================================================
// Raw Loading
// =============================================================================

/// Encoding label of the legacy export files (WHATWG name)
pub const LEGACY_ENCODING_LABEL: &str = "windows-1252";

/// A UTF-8 byte order mark as it appears after a Windows-1252 decode
pub const MISDECODED_UTF8_BOM: &str = "\u{00ef}\u{00bb}\u{00bf}";

// =============================================================================
// Line Sanitizing
// =============================================================================

/// Prefix of the separator-declaration line emitted by spreadsheet exports
pub const SEPARATOR_DECLARATION_PREFIX: &str = "sep=";

/// Delimiter used when nothing else decides
pub const DEFAULT_DELIMITER: char = ',';

/// Delimiter tried when a comma split of the header is degenerate
pub const FALLBACK_DELIMITER: char = ';';

// =============================================================================
// Column Resolution
// =============================================================================

/// Canonical header labels used by the accounting export
pub mod labels {
    pub const DATE: &str = "Data";
    pub const FAMILY: &str = "Família [Artigos]";
    pub const DOCUMENT_CODE: &str = "Doc.";
    pub const SALESPERSON: &str = "Vendedor";
    pub const CUSTOMER: &str = "Nome [Clientes]";
    pub const AMOUNT: &str = "Valor [Documentos GC Lin]";
    pub const CANCELLATION_REASON: &str = "Motivo de anulação do documento";
}

/// Substring rules per field; every token of a rule must appear in the header
pub mod label_variants {
    pub const DATE: &[&[&str]] = &[&["data"]];
    pub const FAMILY: &[&[&str]] = &[&["família"], &["familia"]];
    pub const DOCUMENT_CODE: &[&[&str]] = &[&["doc."], &["tipo", "doc"], &["doc"]];
    pub const SALESPERSON: &[&[&str]] = &[&["vendedor"], &["comercial"]];
    pub const CUSTOMER: &[&[&str]] = &[&["nome"], &["cliente"], &["terceiro"]];
    pub const AMOUNT: &[&[&str]] = &[&["valor", "documentos"], &["valor"]];
    pub const CANCELLATION_REASON: &[&[&str]] = &[&["anula"], &["motivo"]];
}

/// Characters stripped from both ends of header cells
pub const HEADER_TRIM_CHARS: &[char] = &['"', '\'', ' ', '\t', '\u{00a0}'];

// =============================================================================
// Row Normalization
// =============================================================================

/// Day-month-year date pattern of the export
pub const DEFAULT_DATE_FORMAT: &str = "%d-%m-%Y";

/// Document codes whose amounts are booked as negative (credit/debit notes)
pub const CREDIT_NOTE_CODES: &[&str] = &["NC", "NCA", "NCM", "NCS", "NFI", "QUE", "ND"];

/// Prefix of the placeholder used for absent optional text fields
pub const DEFAULT_PLACEHOLDER_PREFIX: &str = "UNSPECIFIED_";

/// First numeric token of an amount cell
pub const AMOUNT_TOKEN_PATTERN: &str = r"-?\d[\d.,]*";

/// Largest gross amount accepted for one sale line
///
/// Keeps every table total far inside the range of `Decimal`.
pub const MAX_GROSS_AMOUNT: i64 = 1_000_000_000_000;

/// Maximum number of rejection messages kept per file
pub const DEFAULT_MAX_ERROR_MESSAGES: usize = 100;

// =============================================================================
// File Discovery
// =============================================================================

/// Default file name pattern for export discovery
pub const DEFAULT_FILE_PATTERN: &str = "*.csv";

/// Application directory name under the user config directory
pub const CONFIG_DIR_NAME: &str = "sales-processor";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.json";
