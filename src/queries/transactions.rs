//! Transaction queries joining the fact table with its time, payment,
//! customer and merchant dimensions.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::connection::Connection;
use crate::error::Result;
use crate::models::{RecentTransaction, TransactionRow};
use crate::source::{RowFilter, RowSource};
use crate::sql_builder::SqlBuilder;

const WINDOW_TABLES: &[&str] = &["transaction_facts", "core_time", "core_payment"];
const DETAIL_TABLES: &[&str] = &[
    "transaction_facts",
    "core_time",
    "core_payment",
    "core_customer",
    "core_merchant",
];

const FACT_COLUMNS: &[&str] = &[
    "CAST(f.transaction_id AS VARCHAR) AS transaction_id",
    "f.amount",
    "f.fee",
    "f.commission",
    "f.status",
    "f.platform_source",
    "f.transaction_type",
    "CAST(f.customer_id AS VARCHAR) AS customer_id",
    "CAST(f.merchant_id AS VARCHAR) AS merchant_id",
    "p.channel",
    "p.payment_type",
    "CAST(t.full_date AS VARCHAR) AS full_date",
];

// ---------------------------------------------------------------------------
// TransactionQuery
// ---------------------------------------------------------------------------

/// Query interface for transaction rows.
pub struct TransactionQuery<'a> {
    conn: &'a Connection,
}

impl<'a> TransactionQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Rows inside the filter's window, oldest first.
    pub fn window(&self, filter: &RowFilter) -> Result<Vec<TransactionRow>> {
        self.conn.ensure_tables(WINDOW_TABLES)?;

        let mut qb = fact_query();
        qb.where_date_range("t.full_date", &filter.range);
        if let Some(merchant) = &filter.merchant_id {
            qb.where_eq("CAST(f.merchant_id AS VARCHAR)", merchant);
        }
        if let Some(customer) = &filter.customer_id {
            qb.where_eq("CAST(f.customer_id AS VARCHAR)", customer);
        }
        qb.order_by(&["t.full_date ASC", "f.transaction_id ASC"]);

        let (sql, params) = qb.build();
        let rows = self.conn.execute(&sql, &params)?;
        rows.iter()
            .map(|r| -> Result<TransactionRow> { Ok(TransactionRow::from_record(&to_record(r))?) })
            .collect()
    }

    /// The `limit` most recent transactions with customer and merchant names.
    pub fn recent(&self, limit: usize) -> Result<Vec<RecentTransaction>> {
        self.page(limit, 0)
    }

    /// A page of transactions, newest first.
    pub fn page(&self, limit: usize, offset: usize) -> Result<Vec<RecentTransaction>> {
        self.conn.ensure_tables(DETAIL_TABLES)?;

        let mut qb = fact_query();
        let mut cols = FACT_COLUMNS.to_vec();
        cols.extend(["c.customer_name", "m.merchant_name"]);
        qb.select(&cols)
            .join("LEFT JOIN core_customer c ON f.customer_id = c.customer_id")
            .join("LEFT JOIN core_merchant m ON f.merchant_id = m.merchant_id")
            .order_by(&["t.full_date DESC", "f.transaction_id DESC"])
            .limit(limit)
            .offset(offset);

        let (sql, params) = qb.build();
        let rows = self.conn.execute(&sql, &params)?;
        rows.iter()
            .map(|r| -> Result<RecentTransaction> { Ok(RecentTransaction::from_record(&to_record(r))?) })
            .collect()
    }

    /// Number of fact rows in the warehouse.
    pub fn count(&self) -> Result<i64> {
        self.conn.ensure_tables(&["transaction_facts"])?;
        let value = self
            .conn
            .execute_scalar("SELECT COUNT(*) FROM transaction_facts", &[])?;
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0))
    }
}

impl RowSource for Connection {
    fn fetch_rows(&self, filter: &RowFilter) -> Result<Vec<TransactionRow>> {
        TransactionQuery::new(self).window(filter)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fact_query() -> SqlBuilder {
    let mut qb = SqlBuilder::new("transaction_facts f");
    qb.select(FACT_COLUMNS)
        .join("JOIN core_time t ON f.time_id = t.time_id")
        .join("LEFT JOIN core_payment p ON f.payment_id = p.payment_id");
    qb
}

fn to_record(row: &HashMap<String, Value>) -> Map<String, Value> {
    row.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}
