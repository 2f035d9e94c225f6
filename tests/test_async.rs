//! Async wrapper: concurrent dashboard load and timeouts.

#![cfg(feature = "async")]

mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{dec, today};
use paydash_sdk::models::RangePreset;
use paydash_sdk::{AsyncDashboardSdk, DashboardError, DashboardSdk};

fn sample_sdk() -> (AsyncDashboardSdk, tempfile::TempDir) {
    let (conn, tmp) = common::setup_sample_db();
    (AsyncDashboardSdk::from_sdk(DashboardSdk::from_connection(conn)), tmp)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn load_dashboard_fans_out() {
    let (sdk, _tmp) = sample_sdk();
    let range = RangePreset::Last7.range(today());

    let data = sdk.load_dashboard(range).await.unwrap();
    assert_eq!(data.range, range);
    assert_eq!(data.metrics.total_count, 5);
    assert_eq!(data.metrics.total_volume, dec("400"));
    assert_eq!(data.trends.len(), 3);
    assert_eq!(data.distribution[0].label, "mobile_money");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn async_load_matches_sync_load() {
    let (sdk, _tmp) = sample_sdk();
    let range = RangePreset::Last7.range(today());

    let concurrent = sdk.load_dashboard(range).await.unwrap();
    let sequential = sdk.run(move |s| s.dashboard().load(&range)).await.unwrap();
    assert_eq!(concurrent, sequential);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sql_and_tables() {
    let (sdk, _tmp) = sample_sdk();

    let rows = sdk
        .sql("SELECT COUNT(*) AS n FROM core_merchant", &[])
        .await
        .unwrap();
    assert_eq!(rows[0]["n"], 3);
    assert_eq!(sdk.tables().await.unwrap().len(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_load_times_out() {
    let (sdk, _tmp) = sample_sdk();
    let sdk = Arc::new(sdk.with_load_timeout(Some(Duration::from_millis(50))));

    // Hold the SDK lock long enough for the load to give up.
    let (locked_tx, locked_rx) = tokio::sync::oneshot::channel::<()>();
    let holder = sdk.clone();
    let blocker = tokio::spawn(async move {
        holder
            .run(move |_| {
                let _ = locked_tx.send(());
                std::thread::sleep(Duration::from_millis(500));
                Ok(())
            })
            .await
    });
    locked_rx.await.unwrap();

    let err = sdk
        .load_dashboard(RangePreset::Last7.range(today()))
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::Timeout(d) if d == Duration::from_millis(50)));

    blocker.await.unwrap().unwrap();

    // The abandoned fetches must not keep the SDK busy once the lock frees up.
    let tables = tokio::time::timeout(Duration::from_secs(5), sdk.tables())
        .await
        .expect("SDK still busy after abandoned load")
        .unwrap();
    assert_eq!(tables.len(), 5);
}

/// Holds the SDK lock until the returned sender fires.
async fn hold_lock(
    sdk: Arc<AsyncDashboardSdk>,
) -> (
    std::sync::mpsc::Sender<()>,
    tokio::task::JoinHandle<paydash_sdk::Result<()>>,
) {
    let (locked_tx, locked_rx) = tokio::sync::oneshot::channel::<()>();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let handle = tokio::spawn(async move {
        sdk.run(move |_| {
            let _ = locked_tx.send(());
            let _ = release_rx.recv();
            Ok(())
        })
        .await
    });
    locked_rx.await.unwrap();
    (release_tx, handle)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_work_queued_behind_the_lock_is_skipped() {
    let (sdk, _tmp) = sample_sdk();
    let sdk = Arc::new(sdk);
    let (release, holder) = hold_lock(sdk.clone()).await;

    let cancelled = Arc::new(AtomicBool::new(false));
    let calls = Arc::new(AtomicUsize::new(0));
    let queued = {
        let sdk = sdk.clone();
        let cancelled = cancelled.clone();
        let calls = calls.clone();
        tokio::spawn(async move {
            sdk.run_cancellable(cancelled, move |s| {
                calls.fetch_add(1, Ordering::SeqCst);
                s.dashboard().metrics(&RangePreset::Last7.range(today()))
            })
            .await
        })
    };

    cancelled.store(true, Ordering::Release);
    release.send(()).unwrap();
    holder.await.unwrap().unwrap();

    let err = queued.await.unwrap().unwrap_err();
    assert!(matches!(err, DashboardError::Cancelled));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn uncancelled_work_runs_after_the_lock_frees() {
    let (sdk, _tmp) = sample_sdk();
    let sdk = Arc::new(sdk);
    let (release, holder) = hold_lock(sdk.clone()).await;

    let queued = {
        let sdk = sdk.clone();
        tokio::spawn(async move {
            sdk.run_cancellable(Arc::new(AtomicBool::new(false)), |s| {
                s.dashboard().metrics(&RangePreset::Last7.range(today()))
            })
            .await
        })
    };

    release.send(()).unwrap();
    holder.await.unwrap().unwrap();

    let metrics = queued.await.unwrap().unwrap();
    assert_eq!(metrics.total_count, 5);
}
