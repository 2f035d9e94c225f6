//! Raw SQL over the warehouse snapshots and snapshot registration.

mod common;

use paydash_sdk::Connection;
use serde_json::json;

// ---------------------------------------------------------------------------
// execute
// ---------------------------------------------------------------------------

#[test]
fn facts_join_through_core_time_to_iso_dates() {
    let (conn, _tmp) = common::setup_sample_db();

    let rows = conn
        .execute(
            "SELECT f.transaction_id, CAST(t.full_date AS DATE) AS occurred_on \
             FROM transaction_facts f JOIN core_time t ON f.time_id = t.time_id \
             WHERE f.merchant_id = ? ORDER BY occurred_on, f.transaction_id",
            &["m1".to_string()],
        )
        .unwrap();

    let got: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| {
            (
                r["transaction_id"].as_str().unwrap(),
                r["occurred_on"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        got,
        vec![
            ("tx06", "2024-01-02"),
            ("tx01", "2024-01-05"),
            ("tx02", "2024-01-05"),
            ("tx04", "2024-01-08"),
        ]
    );
}

#[test]
fn decimal_amounts_come_back_as_exact_strings() {
    let (conn, _tmp) = common::setup_sample_db();

    let rows = conn
        .execute(
            "SELECT CAST(amount AS DECIMAL(18, 2)) AS amount, \
                    CAST(fee AS DECIMAL(18, 2)) AS fee \
             FROM transaction_facts WHERE transaction_id = ?",
            &["tx01".to_string()],
        )
        .unwrap();
    assert_eq!(rows[0]["amount"], "100.00");
    assert_eq!(rows[0]["fee"], "1.50");

    let total = conn
        .execute_scalar(
            "SELECT CAST(SUM(CAST(amount AS DECIMAL(18, 2))) AS DECIMAL(18, 2)) \
             FROM transaction_facts WHERE status = 'successful'",
            &[],
        )
        .unwrap();
    assert_eq!(total, Some(json!("450.00")));
}

#[test]
fn channel_volume_groups_through_core_payment() {
    let (conn, _tmp) = common::setup_sample_db();

    let rows = conn
        .execute(
            "SELECT p.channel, SUM(f.amount) AS volume, COUNT(*) AS n \
             FROM transaction_facts f JOIN core_payment p ON f.payment_id = p.payment_id \
             GROUP BY p.channel ORDER BY volume DESC",
            &[],
        )
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["channel"], "mobile_money");
    assert_eq!(rows[0]["volume"], 450);
    assert_eq!(rows[0]["n"], 3);
    assert_eq!(rows[1]["channel"], "card");
    assert_eq!(rows[1]["volume"], 120);
    assert_eq!(rows[2]["channel"], "bank_transfer");
    assert_eq!(rows[2]["volume"], 70);
}

#[test]
fn timestamps_render_as_naive_datetime() {
    let (conn, _tmp) = common::setup_sample_db();

    let rows = conn
        .execute(
            "SELECT CAST(CAST(full_date AS DATE) AS TIMESTAMP) AS settled_at \
             FROM core_time WHERE time_id = ?",
            &["t0105".to_string()],
        )
        .unwrap();
    assert_eq!(rows[0]["settled_at"], "2024-01-05 00:00:00");
}

#[test]
fn missing_dimension_attribute_is_null() {
    let (conn, _tmp) = common::setup_sample_db();

    let rows = conn
        .execute(
            "SELECT f.transaction_id, c.customer_name, c.email \
             FROM transaction_facts f LEFT JOIN core_customer c ON f.customer_id = c.customer_id \
             WHERE f.transaction_id = ?",
            &["tx04".to_string()],
        )
        .unwrap();
    assert_eq!(rows[0]["customer_name"], "Efua Owusu");
    assert!(rows[0]["email"].is_null());
}

#[test]
fn unknown_table_is_an_error() {
    let (conn, _tmp) = common::setup_sample_db();
    assert!(conn.execute("SELECT * FROM settlements", &[]).is_err());
}

// ---------------------------------------------------------------------------
// execute_scalar
// ---------------------------------------------------------------------------

#[test]
fn scalar_counts_completed_outcomes_case_insensitively() {
    let (conn, _tmp) = common::setup_sample_db();

    let result = conn
        .execute_scalar(
            "SELECT COUNT(*) FROM transaction_facts \
             WHERE lower(status) IN ('successful', 'completed')",
            &[],
        )
        .unwrap();
    assert_eq!(result.unwrap().as_i64().unwrap(), 4);
}

#[test]
fn scalar_is_none_for_a_day_without_facts() {
    let (conn, _tmp) = common::setup_sample_db();

    let result = conn
        .execute_scalar(
            "SELECT amount FROM transaction_facts WHERE time_id = ?",
            &["t0109".to_string()],
        )
        .unwrap();
    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// register_table_from_ndjson
// ---------------------------------------------------------------------------

#[test]
fn registered_snapshot_filters_by_settlement_date() {
    let (cache, _tmp) = common::offline_cache();
    let conn = Connection::new(cache).unwrap();

    common::write_ndjson_and_register(
        &conn,
        "settlements",
        &[
            json!({"settlement_id": "s1", "amount": "12.50", "settled_on": "2024-01-31"}),
            json!({"settlement_id": "s2", "amount": "80.25", "settled_on": "2024-02-01"}),
            json!({"settlement_id": "s3", "amount": "7.00", "settled_on": "2024-02-03"}),
        ],
    );

    let rows = conn
        .execute(
            "SELECT settlement_id, CAST(amount AS DECIMAL(10, 2)) AS amount \
             FROM settlements \
             WHERE CAST(settled_on AS DATE) >= CAST(? AS DATE) \
             ORDER BY settlement_id",
            &["2024-02-01".to_string()],
        )
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["settlement_id"], "s2");
    assert_eq!(rows[0]["amount"], "80.25");
    assert_eq!(rows[1]["amount"], "7.00");
    assert!(conn.has_table("settlements"));
}

#[test]
fn re_registering_a_snapshot_replaces_its_rows() {
    let (conn, _tmp) = common::setup_sample_db();

    common::write_ndjson_and_register(
        &conn,
        "core_payment",
        &[json!({"payment_id": "pq", "channel": "qr", "payment_type": "wallet"})],
    );

    let rows = conn
        .execute(
            "SELECT f.transaction_id, p.channel FROM transaction_facts f \
             LEFT JOIN core_payment p ON f.payment_id = p.payment_id \
             WHERE p.channel IS NOT NULL",
            &[],
        )
        .unwrap();
    assert!(rows.is_empty());

    let channels = conn.execute("SELECT channel FROM core_payment", &[]).unwrap();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0]["channel"], "qr");
}

// ---------------------------------------------------------------------------
// has_table / tables / reset_tables
// ---------------------------------------------------------------------------

#[test]
fn has_table_returns_false_initially() {
    let (cache, _tmp) = common::offline_cache();
    let conn = Connection::new(cache).unwrap();

    assert!(!conn.has_table("transaction_facts"));
    assert!(conn.tables().is_empty());
}

#[test]
fn tables_are_listed_sorted() {
    let (conn, _tmp) = common::setup_sample_db();

    assert_eq!(
        conn.tables(),
        vec![
            "core_customer",
            "core_merchant",
            "core_payment",
            "core_time",
            "transaction_facts"
        ]
    );
}

#[test]
fn reset_tables_clears_registrations() {
    let (conn, _tmp) = common::setup_sample_db();

    conn.reset_tables();

    assert!(conn.tables().is_empty());
    assert!(!conn.has_table("transaction_facts"));
}

#[test]
fn ensure_tables_offline_without_snapshot_fails() {
    let (cache, _tmp) = common::offline_cache();
    let conn = Connection::new(cache).unwrap();

    let err = conn.ensure_tables(&["transaction_facts"]).unwrap_err();
    assert!(matches!(err, paydash_sdk::DashboardError::NotFound(_)));
}
