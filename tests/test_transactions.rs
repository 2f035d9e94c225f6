//! Transaction queries against the sample warehouse.

mod common;

use common::{dec, day, today};
use paydash_sdk::models::{RangePreset, TransactionStatus};
use paydash_sdk::queries::TransactionQuery;
use paydash_sdk::{RowFilter, RowSource};

// ---------------------------------------------------------------------------
// window
// ---------------------------------------------------------------------------

#[test]
fn window_returns_rows_in_range_oldest_first() {
    let (conn, _tmp) = common::setup_sample_db();
    let range = RangePreset::Last7.range(today());

    let rows = TransactionQuery::new(&conn)
        .window(&RowFilter::new(range))
        .unwrap();

    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["tx01", "tx02", "tx03", "tx04", "tx05"]);
    assert_eq!(rows[0].occurred_on, day(2024, 1, 5));
    assert_eq!(rows[4].occurred_on, day(2024, 1, 8));
}

#[test]
fn window_joins_payment_dimension() {
    let (conn, _tmp) = common::setup_sample_db();
    let range = RangePreset::Last7.range(today());

    let rows = TransactionQuery::new(&conn)
        .window(&RowFilter::new(range))
        .unwrap();

    let tx01 = &rows[0];
    assert_eq!(tx01.amount, dec("100"));
    assert_eq!(tx01.fee, Some(dec("1.5")));
    assert_eq!(tx01.payment_channel.as_deref(), Some("mobile_money"));
    assert_eq!(tx01.payment_type.as_deref(), Some("wallet"));
    assert_eq!(tx01.customer_ref.as_deref(), Some("c1"));
    assert_eq!(tx01.merchant_ref.as_deref(), Some("m1"));
}

#[test]
fn capitalized_status_from_warehouse_is_successful() {
    let (conn, _tmp) = common::setup_sample_db();
    let range = RangePreset::Last7.range(today());

    let rows = TransactionQuery::new(&conn)
        .window(&RowFilter::new(range))
        .unwrap();
    let tx05 = rows.iter().find(|r| r.id == "tx05").unwrap();
    assert_eq!(tx05.status, Some(TransactionStatus::Successful));
}

#[test]
fn window_bounds_are_inclusive() {
    let (conn, _tmp) = common::setup_sample_db();
    let range = paydash_sdk::DateRange::new(day(2024, 1, 5), day(2024, 1, 6));

    let rows = TransactionQuery::new(&conn)
        .window(&RowFilter::new(range))
        .unwrap();
    assert_eq!(rows.len(), 3);
}

#[test]
fn window_filters_by_merchant_and_customer() {
    let (conn, _tmp) = common::setup_sample_db();
    let range = RangePreset::Last30.range(today());

    let m1 = conn
        .fetch_rows(&RowFilter::new(range).merchant("m1"))
        .unwrap();
    assert_eq!(m1.len(), 4);

    let c1_m1 = conn
        .fetch_rows(&RowFilter::new(range).merchant("m1").customer("c1"))
        .unwrap();
    let ids: Vec<&str> = c1_m1.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["tx06", "tx01"]);
}

#[test]
fn empty_window_returns_no_rows() {
    let (conn, _tmp) = common::setup_sample_db();
    let range = RangePreset::Today.range(day(2025, 6, 1));

    let rows = conn.fetch_rows(&RowFilter::new(range)).unwrap();
    assert!(rows.is_empty());
}

// ---------------------------------------------------------------------------
// recent / page / count
// ---------------------------------------------------------------------------

#[test]
fn recent_is_newest_first_with_names() {
    let (conn, _tmp) = common::setup_sample_db();

    let recent = TransactionQuery::new(&conn).recent(3).unwrap();
    let ids: Vec<&str> = recent.iter().map(|r| r.row.id.as_str()).collect();
    assert_eq!(ids, vec!["tx05", "tx04", "tx03"]);

    assert_eq!(recent[0].customer_name.as_deref(), Some("Kofi Boateng"));
    assert_eq!(recent[0].merchant_name.as_deref(), Some("Kumasi Fuel"));
}

#[test]
fn page_skips_offset_rows() {
    let (conn, _tmp) = common::setup_sample_db();

    let page = TransactionQuery::new(&conn).page(2, 5).unwrap();
    let ids: Vec<&str> = page.iter().map(|r| r.row.id.as_str()).collect();
    assert_eq!(ids, vec!["tx06", "tx07"]);
}

#[test]
fn count_returns_all_fact_rows() {
    let (conn, _tmp) = common::setup_sample_db();
    assert_eq!(TransactionQuery::new(&conn).count().unwrap(), 7);
}
