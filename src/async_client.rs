//! Async wrapper around [`DashboardSdk`] for use in Tokio runtimes.
//!
//! SDK calls run on the blocking thread pool via
//! [`tokio::task::spawn_blocking`]. [`AsyncDashboardSdk::load_dashboard`]
//! issues the metrics, trend and distribution fetches concurrently and
//! waits for all three.
//!
//! # Example
//!
//! ```no_run
//! use paydash_sdk::{AsyncDashboardSdk, DashboardConfig, RangePreset};
//!
//! #[tokio::main]
//! async fn main() {
//!     let sdk = AsyncDashboardSdk::builder()
//!         .config(DashboardConfig::from_env().unwrap())
//!         .build()
//!         .await
//!         .unwrap();
//!
//!     let today = chrono::Local::now().date_naive();
//!     let data = sdk.load_dashboard(RangePreset::Last30.range(today)).await.unwrap();
//!     println!("{} transactions", data.metrics.total_count);
//! }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::models::DateRange;
use crate::queries::DashboardData;
use crate::DashboardSdk;

// ---------------------------------------------------------------------------
// AsyncDashboardSdkBuilder
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct AsyncDashboardSdkBuilder {
    config: DashboardConfig,
    load_timeout: Option<Duration>,
}

impl AsyncDashboardSdkBuilder {
    pub fn config(mut self, config: DashboardConfig) -> Self {
        self.config = config;
        self
    }

    /// Give up on a dashboard load after `timeout`. Unbounded by default.
    ///
    /// See [`AsyncDashboardSdk::with_load_timeout`] for what happens to the
    /// abandoned queries.
    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    /// Build the SDK on the blocking pool.
    pub async fn build(self) -> Result<AsyncDashboardSdk> {
        let config = self.config;
        let load_timeout = self.load_timeout;
        tokio::task::spawn_blocking(move || -> Result<AsyncDashboardSdk> {
            let sdk = DashboardSdk::builder().config(config).build()?;
            Ok(AsyncDashboardSdk::from_sdk(sdk).with_load_timeout(load_timeout))
        })
        .await
        .map_err(|e| DashboardError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncDashboardSdk
// ---------------------------------------------------------------------------

/// Async wrapper around [`DashboardSdk`].
///
/// The SDK sits behind a [`Mutex`] since its connection uses `RefCell`
/// internally; concurrent calls are queued on it.
pub struct AsyncDashboardSdk {
    inner: Arc<Mutex<DashboardSdk>>,
    load_timeout: Option<Duration>,
}

impl AsyncDashboardSdk {
    pub fn builder() -> AsyncDashboardSdkBuilder {
        AsyncDashboardSdkBuilder::default()
    }

    /// Wrap an already-built SDK.
    pub fn from_sdk(sdk: DashboardSdk) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sdk)),
            load_timeout: None,
        }
    }

    /// Bound [`load_dashboard`](Self::load_dashboard) by `timeout`.
    ///
    /// Blocking tasks cannot be interrupted. When the timeout fires, a query
    /// already holding the SDK lock runs to completion in the background and
    /// later calls wait for it. Queries of the abandoned load that have not
    /// yet acquired the lock are skipped.
    pub fn with_load_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Run a sync SDK operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&DashboardSdk) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.spawn_locked(None, f).await
    }

    /// Like [`run`](Self::run), but `f` is skipped with
    /// [`DashboardError::Cancelled`] if `cancelled` is set by the time the
    /// SDK lock is acquired.
    pub async fn run_cancellable<F, T>(&self, cancelled: Arc<AtomicBool>, f: F) -> Result<T>
    where
        F: FnOnce(&DashboardSdk) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.spawn_locked(Some(cancelled), f).await
    }

    async fn spawn_locked<F, T>(&self, cancelled: Option<Arc<AtomicBool>>, f: F) -> Result<T>
    where
        F: FnOnce(&DashboardSdk) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sdk = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = sdk
                .lock()
                .map_err(|_| DashboardError::InvalidArgument("SDK lock poisoned".into()))?;
            if cancelled.is_some_and(|flag| flag.load(Ordering::Acquire)) {
                return Err(DashboardError::Cancelled);
            }
            f(&guard)
        })
        .await
        .map_err(|e| DashboardError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Fetch metrics, daily trend and channel distribution concurrently.
    ///
    /// Fails as a whole if any of the three fails or the load timeout
    /// elapses. On timeout the fetches still queued for the SDK lock are
    /// skipped.
    pub async fn load_dashboard(&self, range: DateRange) -> Result<DashboardData> {
        let abandoned = Arc::new(AtomicBool::new(false));
        let fan_out = async {
            let (metrics, trends, distribution) = tokio::try_join!(
                self.run_cancellable(abandoned.clone(), move |s| s.dashboard().metrics(&range)),
                self.run_cancellable(abandoned.clone(), move |s| s.dashboard().trends(&range)),
                self.run_cancellable(abandoned.clone(), move |s| {
                    s.dashboard().payment_distribution(&range)
                }),
            )?;
            Ok::<_, DashboardError>(DashboardData {
                range,
                metrics,
                trends,
                distribution,
            })
        };

        match self.load_timeout {
            Some(limit) => match tokio::time::timeout(limit, fan_out).await {
                Ok(loaded) => loaded,
                Err(_) => {
                    abandoned.store(true, Ordering::Release);
                    tracing::warn!(?limit, "dashboard load timed out");
                    Err(DashboardError::Timeout(limit))
                }
            },
            None => fan_out.await,
        }
    }

    pub async fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let query = query.to_string();
        let params = params.to_vec();
        self.run(move |s| s.sql(&query, &params)).await
    }

    pub async fn refresh(&self) -> Result<bool> {
        self.run(|s| s.refresh()).await
    }

    pub async fn tables(&self) -> Result<Vec<String>> {
        self.run(|s| Ok(s.tables())).await
    }
}
