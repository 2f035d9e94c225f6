//! The row-fetch capability consumed by the dashboard pipeline.

use crate::error::Result;
use crate::models::{DateRange, TransactionRow};

/// Which transaction rows to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub range: DateRange,
    pub merchant_id: Option<String>,
    pub customer_id: Option<String>,
}

impl RowFilter {
    pub fn new(range: DateRange) -> Self {
        Self {
            range,
            merchant_id: None,
            customer_id: None,
        }
    }

    pub fn merchant(mut self, merchant_id: impl Into<String>) -> Self {
        self.merchant_id = Some(merchant_id.into());
        self
    }

    pub fn customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    /// Same equality filters over a different window.
    pub fn with_range(&self, range: DateRange) -> Self {
        Self {
            range,
            ..self.clone()
        }
    }

    pub fn matches(&self, row: &TransactionRow) -> bool {
        self.range.contains(row.occurred_on)
            && self
                .merchant_id
                .as_deref()
                .map_or(true, |m| row.merchant_ref.as_deref() == Some(m))
            && self
                .customer_id
                .as_deref()
                .map_or(true, |c| row.customer_ref.as_deref() == Some(c))
    }
}

/// Anything that can return the transaction rows matching a filter.
///
/// Implemented by the DuckDB [`Connection`](crate::Connection) and by
/// in-memory row collections.
pub trait RowSource {
    fn fetch_rows(&self, filter: &RowFilter) -> Result<Vec<TransactionRow>>;
}

impl RowSource for [TransactionRow] {
    fn fetch_rows(&self, filter: &RowFilter) -> Result<Vec<TransactionRow>> {
        Ok(self.iter().filter(|r| filter.matches(r)).cloned().collect())
    }
}

impl RowSource for Vec<TransactionRow> {
    fn fetch_rows(&self, filter: &RowFilter) -> Result<Vec<TransactionRow>> {
        self.as_slice().fetch_rows(filter)
    }
}
