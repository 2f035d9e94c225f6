//! DuckDB connection wrapper with snapshot table registration and query
//! execution.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, NaiveDate};
use duckdb::types::{TimeUnit, ValueRef};
use duckdb::Connection as DuckDbConnection;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cache::SnapshotCache;
use crate::error::{DashboardError, Result};

/// Wraps an in-memory DuckDB database and registers cached warehouse
/// snapshots as views on first use.
pub struct Connection {
    conn: DuckDbConnection,
    /// The snapshot cache backing the registered views.
    pub cache: RefCell<SnapshotCache>,
    registered_tables: RefCell<HashSet<String>>,
}

impl Connection {
    /// Open an in-memory database backed by the given cache.
    pub fn new(cache: SnapshotCache) -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self {
            conn,
            cache: RefCell::new(cache),
            registered_tables: RefCell::new(HashSet::new()),
        })
    }

    /// Ensure the named warehouse tables are queryable, downloading
    /// snapshots when needed.
    pub fn ensure_tables(&self, tables: &[&str]) -> Result<()> {
        for name in tables {
            if !self.registered_tables.borrow().contains(*name) {
                self.register_snapshot(name)?;
            }
        }
        Ok(())
    }

    /// Execute SQL and return each row as a column-name map.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the query has run.
        let column_names: Vec<String> = {
            let executed = rows_result.as_ref().ok_or_else(|| {
                DashboardError::InvalidArgument("query produced no statement".to_string())
            })?;
            executed
                .column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect()
        };

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, col_name) in column_names.iter().enumerate() {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into `T`.
    pub fn execute_into<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row, if any.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    /// Create a table from a newline-delimited JSON file (plain or `.gz`).
    pub fn register_table_from_ndjson(&self, table_name: &str, ndjson_path: &str) -> Result<()> {
        let path_fwd = ndjson_path.replace('\\', "/");
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {name}; \
             CREATE TABLE {name} AS SELECT * FROM read_json_auto('{path}', format='newline_delimited')",
            name = table_name,
            path = path_fwd
        ))?;
        self.registered_tables
            .borrow_mut()
            .insert(table_name.to_string());
        Ok(())
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.registered_tables.borrow().contains(name)
    }

    /// Names of all registered tables and views.
    pub fn tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registered_tables.borrow().iter().cloned().collect();
        names.sort();
        names
    }

    /// Forget registrations so the next query re-reads the snapshots.
    pub fn reset_tables(&self) {
        self.registered_tables.borrow_mut().clear();
    }

    /// Access the underlying DuckDB connection.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }

    fn register_snapshot(&self, table: &str) -> Result<()> {
        let path = self.cache.borrow_mut().ensure_snapshot(table)?;
        let path_str = path.to_string_lossy().replace('\\', "/");

        self.conn.execute_batch(&format!(
            "CREATE OR REPLACE VIEW {} AS \
             SELECT * FROM read_json_auto('{}', format='newline_delimited')",
            table, path_str
        ))?;
        self.registered_tables.borrow_mut().insert(table.to_string());
        debug!(table, path = %path_str, "registered snapshot view");

        Ok(())
    }
}

/// Convert a DuckDB value to JSON.
///
/// Decimals become strings to keep their exact digits; dates and timestamps
/// become ISO strings.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    use serde_json::Value;

    match val {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(n) => Value::Number(n.into()),
        ValueRef::SmallInt(n) => Value::Number(n.into()),
        ValueRef::Int(n) => Value::Number(n.into()),
        ValueRef::BigInt(n) => Value::Number(n.into()),
        ValueRef::UInt(n) => Value::Number(n.into()),
        ValueRef::UBigInt(n) => Value::Number(n.into()),
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(i) => Value::Number(i.into()),
            Err(_) => Value::String(n.to_string()),
        },
        ValueRef::Float(f) => serde_json::Number::from_f64(f64::from(f))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Decimal(d) => Value::String(d.to_string()),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).to_string()),
        ValueRef::Date32(days) => NaiveDate::from_ymd_opt(1970, 1, 1)
            .and_then(|epoch| epoch.checked_add_signed(Duration::days(i64::from(days))))
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(Value::Null),
        ValueRef::Timestamp(unit, raw) => {
            let micros = match unit {
                TimeUnit::Second => raw.saturating_mul(1_000_000),
                TimeUnit::Millisecond => raw.saturating_mul(1_000),
                TimeUnit::Microsecond => raw,
                TimeUnit::Nanosecond => raw / 1_000,
            };
            DateTime::from_timestamp_micros(micros)
                .map(|ts| Value::String(ts.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string()))
                .unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}
