//! Shared test fixtures for the dashboard SDK integration tests.
//!
//! Provides `setup_sample_db()` which creates an in-memory DuckDB connection
//! populated with a small warehouse (transaction_facts plus the core_time,
//! core_payment, core_customer and core_merchant dimensions) via NDJSON temp
//! files.
//!
//! With `today = 2024-01-10` and the last-7-days preset, the current window
//! (2024-01-04..=2024-01-10) holds tx01..tx05 and the previous window
//! (2023-12-28..=2024-01-03) holds tx06 and tx07.

#![allow(dead_code)]

use std::io::Write;
use std::str::FromStr;

use chrono::NaiveDate;
use paydash_sdk::{Connection, DashboardConfig, SnapshotCache};
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use tempfile::NamedTempFile;

/// Create a `Connection` backed by a temporary offline cache directory with
/// the sample warehouse loaded into DuckDB tables.
///
/// Returns `(Connection, tempfile::TempDir)`. The caller must keep the
/// `TempDir` alive for the duration of the test.
pub fn setup_sample_db() -> (Connection, tempfile::TempDir) {
    let (cache, tmp_dir) = offline_cache();
    let conn = Connection::new(cache).unwrap();

    for (table, rows) in warehouse() {
        write_ndjson_and_register(&conn, table, &rows);
    }

    (conn, tmp_dir)
}

/// An empty snapshot cache in offline mode.
pub fn offline_cache() -> (SnapshotCache, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig {
        cache_dir: Some(tmp_dir.path().to_path_buf()),
        offline: true,
        ..DashboardConfig::default()
    };
    (SnapshotCache::new(config).unwrap(), tmp_dir)
}

/// Reference "today" for the sample warehouse.
pub fn today() -> NaiveDate {
    day(2024, 1, 10)
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub fn as_records(rows: &[Value]) -> Vec<Map<String, Value>> {
    rows.iter()
        .map(|r| r.as_object().unwrap().clone())
        .collect()
}

/// All sample tables, keyed by warehouse table name.
pub fn warehouse() -> Vec<(&'static str, Vec<Value>)> {
    vec![
        ("transaction_facts", transaction_facts()),
        ("core_time", core_time()),
        ("core_payment", core_payment()),
        ("core_customer", core_customer()),
        ("core_merchant", core_merchant()),
    ]
}

fn fact(
    id: &str,
    amount: i64,
    status: &str,
    time_id: &str,
    payment_id: &str,
    customer_id: &str,
    merchant_id: &str,
) -> Value {
    json!({
        "transaction_id": id,
        "amount": amount,
        "fee": 1.5,
        "commission": 0.5,
        "status": status,
        "platform_source": "web",
        "transaction_type": "purchase",
        "time_id": time_id,
        "payment_id": payment_id,
        "customer_id": customer_id,
        "merchant_id": merchant_id
    })
}

pub fn transaction_facts() -> Vec<Value> {
    vec![
        fact("tx01", 100, "successful", "t0105", "pm", "c1", "m1"),
        fact("tx02", 50, "failed", "t0105", "pc", "c2", "m1"),
        fact("tx03", 150, "successful", "t0106", "pm", "c1", "m2"),
        fact("tx04", 30, "pending", "t0108", "pc", "c3", "m1"),
        fact("tx05", 70, "Completed", "t0108", "pb", "c2", "m2"),
        fact("tx06", 200, "successful", "t0102", "pm", "c1", "m1"),
        fact("tx07", 40, "failed", "t0101", "pc", "c3", "m2"),
    ]
}

pub fn core_time() -> Vec<Value> {
    ["01", "02", "05", "06", "08"]
        .iter()
        .map(|d| {
            json!({
                "time_id": format!("t01{d}"),
                "full_date": format!("2024-01-{d}"),
                "month": 1,
                "year": 2024
            })
        })
        .collect()
}

pub fn core_payment() -> Vec<Value> {
    vec![
        json!({"payment_id": "pm", "channel": "mobile_money", "payment_type": "wallet"}),
        json!({"payment_id": "pc", "channel": "card", "payment_type": "debit"}),
        json!({"payment_id": "pb", "channel": "bank_transfer", "payment_type": "transfer"}),
    ]
}

pub fn core_customer() -> Vec<Value> {
    vec![
        json!({
            "customer_id": "c1",
            "customer_name": "Ama Mensah",
            "phone_number": "+233201111111",
            "email": "ama@example.com",
            "segment": "retail",
            "kyc_level": "tier2",
            "joined_date": "2023-03-14"
        }),
        json!({
            "customer_id": "c2",
            "customer_name": "Kofi Boateng",
            "phone_number": "+233202222222",
            "email": "kofi@example.com",
            "segment": "business",
            "kyc_level": "tier3",
            "joined_date": "2023-08-01"
        }),
        json!({
            "customer_id": "c3",
            "customer_name": "Efua Owusu",
            "phone_number": "+233203333333",
            "email": null,
            "segment": "retail",
            "kyc_level": "tier1",
            "joined_date": "2022-11-20"
        }),
    ]
}

pub fn core_merchant() -> Vec<Value> {
    vec![
        json!({
            "merchant_id": "m1",
            "merchant_name": "Accra Mart",
            "business_type": "retail",
            "category": "groceries",
            "settlement_account": "GH-001",
            "integration_type": "api",
            "commission_rate": 2.5,
            "is_active": true
        }),
        json!({
            "merchant_id": "m2",
            "merchant_name": "Kumasi Fuel",
            "business_type": "energy",
            "category": "fuel",
            "settlement_account": "GH-002",
            "integration_type": "pos",
            "commission_rate": 1.0,
            "is_active": true
        }),
        json!({
            "merchant_id": "m3",
            "merchant_name": "Tamale Books",
            "business_type": "retail",
            "category": "books",
            "settlement_account": "GH-003",
            "integration_type": "hosted",
            "commission_rate": null,
            "is_active": false
        }),
    ]
}

pub fn write_ndjson_and_register(conn: &Connection, table_name: &str, rows: &[Value]) {
    let mut file = NamedTempFile::new().unwrap();
    for row in rows {
        writeln!(file, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    file.flush().unwrap();

    let path = file.path().to_str().unwrap();
    conn.register_table_from_ndjson(table_name, path).unwrap();
    // DuckDB copied the rows into an in-memory table, so the temp file can go.
}
