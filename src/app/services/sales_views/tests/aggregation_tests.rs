//! Tests for grouped totals and pivots

use super::*;
use crate::app::models::SaleTable;
use crate::app::services::sales_views::aggregation::{PivotRow, PivotTable};
use crate::app::services::sales_views::{Dimension, group_totals, monthly_totals, pivot_by_month};

#[test]
fn test_group_totals_sorted_by_net_total() {
    let totals = group_totals(&create_test_table(), Dimension::Family);

    let keys: Vec<_> = totals.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["MOB", "ELET", "ILUM"]);
    assert_eq!(totals[0].net_total, dec("400.00"));
    assert_eq!(totals[0].records, 2);
    assert_eq!(totals[1].net_total, dec("80.50"));
}

#[test]
fn test_group_totals_ties_break_by_key() {
    let table = SaleTable::from_records(vec![
        sale(date(2024, 1, 1), "B", "FT", "Rui", "X", "10"),
        sale(date(2024, 1, 1), "A", "FT", "Ana", "X", "10"),
    ]);
    let totals = group_totals(&table, Dimension::Salesperson);

    assert_eq!(totals[0].key, "Ana");
    assert_eq!(totals[1].key, "Rui");
}

#[test]
fn test_group_totals_sum_to_table_total() {
    let table = create_test_table();
    for dimension in [
        Dimension::Family,
        Dimension::Salesperson,
        Dimension::Customer,
        Dimension::DocumentCode,
    ] {
        let sum: rust_decimal::Decimal = group_totals(&table, dimension).iter().map(|g| g.net_total).sum();
        assert_eq!(sum, table.net_total(), "dimension {}", dimension);
    }
}

#[test]
fn test_monthly_totals_in_calendar_order() {
    let months = monthly_totals(&create_test_table());

    assert_eq!(months.len(), 2);
    assert_eq!(months[0].label(), "2024-02");
    assert_eq!(months[0].net_total, dec("100.50"));
    assert_eq!(months[1].label(), "2024-03");
    assert_eq!(months[1].records, 4);
    assert_eq!(months[1].net_total, dec("430.00"));
}

#[test]
fn test_pivot_by_month() {
    let pivot = pivot_by_month(&create_test_table(), Dimension::Salesperson);

    assert_eq!(pivot.months, vec!["2024-02", "2024-03"]);
    assert_eq!(pivot.rows.len(), 2);

    let ana = pivot.row("Ana").unwrap();
    assert_eq!(ana.cells, vec![dec("100.50"), dec("30.00")]);
    assert_eq!(ana.total, dec("130.50"));

    let rui = pivot.row("Rui").unwrap();
    assert_eq!(rui.cells, vec![dec("0"), dec("400.00")]);

    assert_eq!(pivot.month_totals(), vec![dec("100.50"), dec("430.00")]);
}

#[test]
fn test_month_totals_with_short_rows() {
    let pivot = PivotTable {
        dimension: Dimension::Family,
        months: vec!["2024-02".to_string(), "2024-03".to_string()],
        rows: vec![
            PivotRow {
                key: "ELET".to_string(),
                cells: vec![dec("10.00"), dec("5.00")],
                total: dec("15.00"),
            },
            PivotRow {
                key: "MOB".to_string(),
                cells: vec![dec("7.00")],
                total: dec("7.00"),
            },
        ],
    };

    assert_eq!(pivot.month_totals(), vec![dec("17.00"), dec("5.00")]);
}

#[test]
fn test_empty_table_aggregates() {
    let table = SaleTable::new();
    assert!(group_totals(&table, Dimension::Customer).is_empty());
    assert!(monthly_totals(&table).is_empty());

    let pivot = pivot_by_month(&table, Dimension::Family);
    assert!(pivot.months.is_empty());
    assert!(pivot.rows.is_empty());
}
