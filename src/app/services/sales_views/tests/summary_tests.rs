//! Tests for table summaries

use super::*;
use crate::app::models::SaleTable;
use crate::app::services::sales_views::SalesSummary;

#[test]
fn test_summary_of_test_table() {
    let summary = SalesSummary::from_table(&create_test_table());

    assert_eq!(summary.records, 5);
    assert_eq!(summary.distinct_families, 3);
    assert_eq!(summary.distinct_customers, 3);
    assert_eq!(summary.distinct_salespeople, 2);
    assert_eq!(summary.gross_sales, dec("550.50"));
    assert_eq!(summary.credit_total, dec("-20.00"));
    assert_eq!(summary.net_total, dec("530.50"));
    assert_eq!(summary.first_date, Some(date(2024, 2, 28)));
    assert_eq!(summary.last_date, Some(date(2024, 3, 31)));
}

#[test]
fn test_summary_of_empty_table() {
    let summary = SalesSummary::from_table(&SaleTable::new());

    assert_eq!(summary, SalesSummary::default());
    assert_eq!(summary.credit_ratio(), 0.0);
}

#[test]
fn test_credit_ratio() {
    let table = SaleTable::from_records(vec![
        sale(date(2024, 1, 1), "A", "FT", "Ana", "X", "200"),
        sale(date(2024, 1, 2), "A", "NC", "Ana", "X", "50"),
    ]);
    let summary = SalesSummary::from_table(&table);
    assert!((summary.credit_ratio() - 25.0).abs() < 1e-9);
}
