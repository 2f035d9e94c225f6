//! Customer directory queries against the `core_customer` dimension.

use crate::connection::Connection;
use crate::error::Result;
use crate::models::Customer;
use crate::sql_builder::SqlBuilder;

const CUSTOMER_COLUMNS: &[&str] = &[
    "CAST(customer_id AS VARCHAR) AS customer_id",
    "customer_name",
    "CAST(phone_number AS VARCHAR) AS phone_number",
    "email",
    "segment",
    "CAST(kyc_level AS VARCHAR) AS kyc_level",
    "CAST(joined_date AS VARCHAR) AS joined_date",
];

pub struct CustomerQuery<'a> {
    conn: &'a Connection,
}

impl<'a> CustomerQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Most recently joined customers first.
    pub fn list(&self, limit: usize) -> Result<Vec<Customer>> {
        self.conn.ensure_tables(&["core_customer"])?;

        let (sql, params) = SqlBuilder::new("core_customer")
            .select(CUSTOMER_COLUMNS)
            .order_by(&["joined_date DESC", "customer_id ASC"])
            .limit(limit)
            .build();

        self.conn.execute_into(&sql, &params)
    }

    pub fn get(&self, customer_id: &str) -> Result<Option<Customer>> {
        self.conn.ensure_tables(&["core_customer"])?;

        let (sql, params) = SqlBuilder::new("core_customer")
            .select(CUSTOMER_COLUMNS)
            .where_eq("CAST(customer_id AS VARCHAR)", customer_id)
            .limit(1)
            .build();

        let customers: Vec<Customer> = self.conn.execute_into(&sql, &params)?;
        Ok(customers.into_iter().next())
    }

    /// Customers in a segment, by name.
    pub fn by_segment(&self, segment: &str) -> Result<Vec<Customer>> {
        self.conn.ensure_tables(&["core_customer"])?;

        let (sql, params) = SqlBuilder::new("core_customer")
            .select(CUSTOMER_COLUMNS)
            .where_eq("segment", segment)
            .order_by(&["customer_name ASC"])
            .build();

        self.conn.execute_into(&sql, &params)
    }
}
