//! Merchant directory queries against the `core_merchant` dimension.

use crate::connection::Connection;
use crate::error::Result;
use crate::models::Merchant;
use crate::sql_builder::SqlBuilder;

const MERCHANT_COLUMNS: &[&str] = &[
    "CAST(merchant_id AS VARCHAR) AS merchant_id",
    "merchant_name",
    "business_type",
    "category",
    "CAST(settlement_account AS VARCHAR) AS settlement_account",
    "integration_type",
    "commission_rate",
    "is_active",
];

pub struct MerchantQuery<'a> {
    conn: &'a Connection,
}

impl<'a> MerchantQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Merchants ordered by name.
    pub fn list(&self, limit: usize) -> Result<Vec<Merchant>> {
        self.conn.ensure_tables(&["core_merchant"])?;

        let (sql, params) = SqlBuilder::new("core_merchant")
            .select(MERCHANT_COLUMNS)
            .order_by(&["merchant_name ASC"])
            .limit(limit)
            .build();

        self.conn.execute_into(&sql, &params)
    }

    pub fn get(&self, merchant_id: &str) -> Result<Option<Merchant>> {
        self.conn.ensure_tables(&["core_merchant"])?;

        let (sql, params) = SqlBuilder::new("core_merchant")
            .select(MERCHANT_COLUMNS)
            .where_eq("CAST(merchant_id AS VARCHAR)", merchant_id)
            .limit(1)
            .build();

        let merchants: Vec<Merchant> = self.conn.execute_into(&sql, &params)?;
        Ok(merchants.into_iter().next())
    }

    /// Only merchants flagged active.
    pub fn active(&self) -> Result<Vec<Merchant>> {
        self.conn.ensure_tables(&["core_merchant"])?;

        let (sql, params) = SqlBuilder::new("core_merchant")
            .select(MERCHANT_COLUMNS)
            .where_clause("is_active = TRUE", &[])
            .order_by(&["merchant_name ASC"])
            .build();

        self.conn.execute_into(&sql, &params)
    }
}
