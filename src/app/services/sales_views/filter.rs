//! Filtering of sales tables

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::app::models::{SaleRecord, SaleTable};

/// Criteria a sale must meet to be kept
///
/// Date bounds are inclusive. An empty value set means the dimension is not
/// filtered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub families: BTreeSet<String>,
    pub salespeople: BTreeSet<String>,
    pub customers: BTreeSet<String>,
    pub document_codes: BTreeSet<String>,
}

impl SaleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_date(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn to_date(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn with_families<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.families.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_salespeople<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.salespeople.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_customers<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.customers.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn with_document_codes<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.document_codes.extend(values.into_iter().map(Into::into));
        self
    }

    /// True when no criterion is set
    pub fn is_unrestricted(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.families.is_empty()
            && self.salespeople.is_empty()
            && self.customers.is_empty()
            && self.document_codes.is_empty()
    }

    /// Check if a single sale passes every criterion
    pub fn matches(&self, sale: &SaleRecord) -> bool {
        if self.date_from.is_some_and(|from| sale.date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| sale.date > to) {
            return false;
        }

        allows(&self.families, &sale.family)
            && allows(&self.salespeople, &sale.salesperson)
            && allows(&self.customers, &sale.customer)
            && allows(&self.document_codes, &sale.document_code)
    }

    /// New table with the matching sales, in original order
    pub fn apply(&self, table: &SaleTable) -> SaleTable {
        let filtered: SaleTable = table.iter().filter(|s| self.matches(s)).cloned().collect();
        debug!("Filter kept {} of {} sales", filtered.len(), table.len());
        filtered
    }
}

fn allows(values: &BTreeSet<String>, value: &str) -> bool {
    values.is_empty() || values.contains(value)
}
