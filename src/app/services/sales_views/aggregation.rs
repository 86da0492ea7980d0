//! Grouped totals and month pivots

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::app::models::{CanonicalField, SaleRecord, SaleTable};

/// Descriptive column a table can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Family,
    Salesperson,
    Customer,
    DocumentCode,
}

impl Dimension {
    pub fn field(&self) -> CanonicalField {
        match self {
            Dimension::Family => CanonicalField::Family,
            Dimension::Salesperson => CanonicalField::Salesperson,
            Dimension::Customer => CanonicalField::Customer,
            Dimension::DocumentCode => CanonicalField::DocumentCode,
        }
    }

    /// Value of this dimension for one sale
    pub fn key<'a>(&self, sale: &'a SaleRecord) -> &'a str {
        match self {
            Dimension::Family => &sale.family,
            Dimension::Salesperson => &sale.salesperson,
            Dimension::Customer => &sale.customer,
            Dimension::DocumentCode => &sale.document_code,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field().name())
    }
}

/// Net total of one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub key: String,
    pub records: usize,
    pub net_total: Decimal,
}

/// Net total of one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub records: usize,
    pub net_total: Decimal,
}

impl MonthlyTotal {
    /// `YYYY-MM`
    pub fn label(&self) -> String {
        month_label(self.year, self.month)
    }
}

fn month_label(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Totals per group, largest net total first, ties by key
pub fn group_totals(table: &SaleTable, dimension: Dimension) -> Vec<GroupTotal> {
    let mut groups: HashMap<&str, (usize, Decimal)> = HashMap::new();
    for sale in table {
        let entry = groups.entry(dimension.key(sale)).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += sale.net_amount;
    }

    let mut totals: Vec<GroupTotal> = groups
        .into_iter()
        .map(|(key, (records, net_total))| GroupTotal {
            key: key.to_string(),
            records,
            net_total,
        })
        .collect();

    totals.sort_by(|a, b| b.net_total.cmp(&a.net_total).then_with(|| a.key.cmp(&b.key)));
    totals
}

/// Totals per calendar month in chronological order
pub fn monthly_totals(table: &SaleTable) -> Vec<MonthlyTotal> {
    let mut months: BTreeMap<(i32, u32), (usize, Decimal)> = BTreeMap::new();
    for sale in table {
        let entry = months
            .entry((sale.date.year(), sale.date.month()))
            .or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += sale.net_amount;
    }

    months
        .into_iter()
        .map(|((year, month), (records, net_total))| MonthlyTotal {
            year,
            month,
            records,
            net_total,
        })
        .collect()
}

/// One row of a month pivot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotRow {
    pub key: String,

    /// Net total per month, aligned with [`PivotTable::months`]
    pub cells: Vec<Decimal>,

    pub total: Decimal,
}

/// Net totals with one row per group and one column per month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotTable {
    pub dimension: Dimension,

    /// `YYYY-MM` labels in chronological order
    pub months: Vec<String>,

    /// Rows sorted by key
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn row(&self, key: &str) -> Option<&PivotRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// Column totals aligned with `months`; missing cells count as zero
    pub fn month_totals(&self) -> Vec<Decimal> {
        (0..self.months.len())
            .map(|i| {
                self.rows
                    .iter()
                    .map(|r| r.cells.get(i).copied().unwrap_or_default())
                    .sum()
            })
            .collect()
    }
}

/// Pivot net totals by group and month; months without sales hold zero
pub fn pivot_by_month(table: &SaleTable, dimension: Dimension) -> PivotTable {
    let month_keys: BTreeSet<(i32, u32)> = table
        .iter()
        .map(|s| (s.date.year(), s.date.month()))
        .collect();
    let column: HashMap<(i32, u32), usize> = month_keys
        .iter()
        .enumerate()
        .map(|(i, key)| (*key, i))
        .collect();

    let mut rows: BTreeMap<&str, Vec<Decimal>> = BTreeMap::new();
    for sale in table {
        let cells = rows
            .entry(dimension.key(sale))
            .or_insert_with(|| vec![Decimal::ZERO; month_keys.len()]);
        cells[column[&(sale.date.year(), sale.date.month())]] += sale.net_amount;
    }

    PivotTable {
        dimension,
        months: month_keys
            .iter()
            .map(|(year, month)| month_label(*year, *month))
            .collect(),
        rows: rows
            .into_iter()
            .map(|(key, cells)| PivotRow {
                key: key.to_string(),
                total: cells.iter().copied().sum(),
                cells,
            })
            .collect(),
    }
}
