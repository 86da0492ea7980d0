//! Headline figures of a sales table

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::app::models::SaleTable;

/// Totals and counts describing one table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub records: usize,
    pub distinct_families: usize,
    pub distinct_customers: usize,
    pub distinct_salespeople: usize,

    /// Sum of all signed amounts
    pub net_total: Decimal,

    /// Sum of positive amounts
    pub gross_sales: Decimal,

    /// Sum of negative amounts (zero or below)
    pub credit_total: Decimal,

    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl SalesSummary {
    pub fn from_table(table: &SaleTable) -> Self {
        let mut families = HashSet::new();
        let mut customers = HashSet::new();
        let mut salespeople = HashSet::new();
        let mut gross_sales = Decimal::ZERO;
        let mut credit_total = Decimal::ZERO;

        for sale in table {
            families.insert(sale.family.as_str());
            customers.insert(sale.customer.as_str());
            salespeople.insert(sale.salesperson.as_str());

            if sale.is_credit_note() {
                credit_total += sale.net_amount;
            } else {
                gross_sales += sale.net_amount;
            }
        }

        let (first_date, last_date) = match table.date_range() {
            Some((first, last)) => (Some(first), Some(last)),
            None => (None, None),
        };

        Self {
            records: table.len(),
            distinct_families: families.len(),
            distinct_customers: customers.len(),
            distinct_salespeople: salespeople.len(),
            net_total: gross_sales + credit_total,
            gross_sales,
            credit_total,
            first_date,
            last_date,
        }
    }

    /// Share of gross sales given back through credit notes, in percent
    pub fn credit_ratio(&self) -> f64 {
        if self.gross_sales.is_zero() {
            return 0.0;
        }
        (-self.credit_total)
            .checked_div(self.gross_sales)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .and_then(|ratio| ratio.to_f64())
            .unwrap_or(0.0)
    }
}
