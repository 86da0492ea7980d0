//! Test utilities for sales export parser testing
//!
//! This module provides sample exports and helper functions used across the
//! different test modules.

use std::io::Write;
use tempfile::NamedTempFile;

use crate::app::models::SaleTable;
use rust_decimal::Decimal;

mod parser_tests;

/// Full canonical header, semicolon delimited
pub const CANONICAL_HEADER: &str = "Data;Família [Artigos];Doc.;Vendedor;Nome [Clientes];Valor [Documentos GC Lin];Motivo de anulação do documento";

/// Helper to create a semicolon export with a declaration line
pub fn create_test_export() -> String {
    [
        "sep=;",
        CANONICAL_HEADER,
        "01-03-2024;ELET;FT;Ana;João Silva;100,50;",
        "02-03-2024;ELET;NC;Ana;João Silva;20,00;",
        "03-03-2024;MOB;FT;Rui;Maria Costa;1.234,56;",
        "04-03-2024;MOB;FT;Rui;Maria Costa;50,00;Erro de digitação",
        "",
    ]
    .join("\n")
}

/// Helper to build lines the way the loader hands them over
pub fn lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

/// Helper to create a temporary file with given bytes
pub fn create_temp_file(content: &[u8]) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Net amounts of a table in row order
pub fn net_amounts(table: &SaleTable) -> Vec<Decimal> {
    table.iter().map(|r| r.net_amount).collect()
}
