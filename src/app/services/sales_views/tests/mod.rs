//! Test utilities for sales view testing

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::app::models::{CreditNoteCodes, SaleRecord, SaleTable};

// Test modules
mod aggregation_tests;
mod summary_tests;

pub fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Helper to create one sale from a gross amount
pub fn sale(day: NaiveDate, family: &str, code: &str, salesperson: &str, customer: &str, gross: &str) -> SaleRecord {
    SaleRecord::new(
        day,
        family.to_string(),
        code.to_string(),
        salesperson.to_string(),
        customer.to_string(),
        dec(gross),
        &CreditNoteCodes::default(),
    )
    .unwrap()
}

/// Helper to create a small table spanning two months
pub fn create_test_table() -> SaleTable {
    SaleTable::from_records(vec![
        sale(date(2024, 2, 28), "ELET", "FT", "Ana", "João Silva", "100.50"),
        sale(date(2024, 3, 1), "ELET", "NC", "Ana", "João Silva", "20.00"),
        sale(date(2024, 3, 1), "MOB", "FT", "Rui", "Maria Costa", "300.00"),
        sale(date(2024, 3, 15), "ILUM", "FT", "Ana", "Maria Costa", "50.00"),
        sale(date(2024, 3, 31), "MOB", "FS", "Rui", "Pedro Lopes", "100.00"),
    ])
}
