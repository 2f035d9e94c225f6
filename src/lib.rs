//! Payments dashboard SDK for Rust.
//!
//! Mirrors the warehouse tables of a hosted backend (transaction facts plus
//! time, payment, customer and merchant dimensions) into a local snapshot
//! cache, queries them in-process via DuckDB, and turns transaction windows
//! into dashboard metrics, daily trends and payment distributions.
//!
//! # Quick start
//!
//! ```no_run
//! use chrono::Local;
//! use paydash_sdk::{DashboardConfig, DashboardSdk, RangePreset};
//!
//! let config = DashboardConfig::from_env().unwrap();
//! let sdk = DashboardSdk::builder().config(config).build().unwrap();
//!
//! let today = Local::now().date_naive();
//! let data = sdk.load_dashboard(RangePreset::Last30, today).unwrap();
//! for card in sdk.metric_cards(&data.metrics) {
//!     println!("{}: {} ({})", card.title, card.value, card.trend_label());
//! }
//! ```
//!
//! The aggregation pipeline in [`aggregate`] also works on plain row
//! collections, without any database.

pub mod aggregate;
#[cfg(feature = "async")]
pub mod async_client;
pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod queries;
pub mod source;
pub mod sql_builder;

#[cfg(feature = "async")]
pub use async_client::AsyncDashboardSdk;
pub use cache::SnapshotCache;
pub use config::DashboardConfig;
pub use connection::Connection;
pub use error::{DashboardError, FetchError, MalformedRowError, Result};
pub use models::{DateRange, RangePreset};
pub use source::{RowFilter, RowSource};
pub use sql_builder::SqlBuilder;

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use models::{MerchantPerformancePoint, MetricCard, MetricsSnapshot};
use queries::DashboardData;

// ---------------------------------------------------------------------------
// DashboardSdkBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`DashboardSdk`].
#[derive(Default)]
pub struct DashboardSdkBuilder {
    config: DashboardConfig,
}

impl DashboardSdkBuilder {
    /// Replace the whole configuration.
    pub fn config(mut self, config: DashboardConfig) -> Self {
        self.config = config;
        self
    }

    /// Backend base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Anonymous API key.
    pub fn anon_key(mut self, key: impl Into<String>) -> Self {
        self.config.anon_key = key.into();
        self
    }

    /// Set a custom snapshot directory.
    ///
    /// Defaults to the platform cache directory (e.g. `~/.cache/paydash-sdk`
    /// on Linux).
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use cached snapshots only. Defaults to `false`.
    pub fn offline(mut self, offline: bool) -> Self {
        self.config.offline = offline;
        self
    }

    /// HTTP request timeout. Defaults to 60 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Age after which snapshots are downloaded again. Defaults to 15 minutes.
    pub fn snapshot_max_age(mut self, max_age: Duration) -> Self {
        self.config.snapshot_max_age = max_age;
        self
    }

    /// Build the SDK, preparing the cache directory and DuckDB database.
    ///
    /// No table is downloaded until a query needs it.
    pub fn build(self) -> Result<DashboardSdk> {
        if !self.config.offline && self.config.api_url.is_empty() {
            return Err(DashboardError::InvalidArgument(
                "api_url is required unless offline mode is enabled".to_string(),
            ));
        }
        let cache = SnapshotCache::new(self.config)?;
        let conn = Connection::new(cache)?;
        Ok(DashboardSdk::from_connection(conn))
    }
}

// ---------------------------------------------------------------------------
// DashboardSdk
// ---------------------------------------------------------------------------

/// The main entry point of the SDK.
///
/// Owns a [`Connection`] and hands out borrowing query interfaces.
pub struct DashboardSdk {
    conn: Connection,
}

impl DashboardSdk {
    pub fn builder() -> DashboardSdkBuilder {
        DashboardSdkBuilder::default()
    }

    /// Wrap an existing connection, e.g. one with tables registered by hand.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    // -- Query accessors ---------------------------------------------------

    pub fn transactions(&self) -> queries::TransactionQuery<'_> {
        queries::TransactionQuery::new(&self.conn)
    }

    pub fn customers(&self) -> queries::CustomerQuery<'_> {
        queries::CustomerQuery::new(&self.conn)
    }

    pub fn merchants(&self) -> queries::MerchantQuery<'_> {
        queries::MerchantQuery::new(&self.conn)
    }

    /// Dashboard computations over the warehouse connection.
    pub fn dashboard(&self) -> queries::DashboardQuery<'_> {
        queries::DashboardQuery::new(&self.conn)
    }

    // -- Dashboard shortcuts -----------------------------------------------

    /// Overview data for a preset window ending `today`.
    pub fn load_dashboard(&self, preset: RangePreset, today: NaiveDate) -> Result<DashboardData> {
        self.dashboard().load(&preset.range(today))
    }

    /// Daily performance of a merchant, using its configured commission rate.
    ///
    /// Merchants without a commission rate earn no commission.
    pub fn merchant_performance(
        &self,
        merchant_id: &str,
        preset: RangePreset,
        today: NaiveDate,
    ) -> Result<Vec<MerchantPerformancePoint>> {
        let merchant = self.merchants().get(merchant_id)?.ok_or_else(|| {
            DashboardError::NotFound(format!("Unknown merchant: {}", merchant_id))
        })?;
        let rate = merchant.commission_rate.unwrap_or(Decimal::ZERO);
        self.dashboard()
            .merchant_performance(merchant_id, &preset.range(today), rate)
    }

    /// Display cards for a snapshot, in the configured currency.
    pub fn metric_cards(&self, metrics: &MetricsSnapshot) -> Vec<MetricCard> {
        metrics.cards(self.conn.cache.borrow().currency())
    }

    // -- Utility -----------------------------------------------------------

    /// Names of the warehouse tables registered so far.
    pub fn tables(&self) -> Vec<String> {
        self.conn.tables()
    }

    /// Run raw SQL with `?` placeholders.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Check registered snapshots for staleness and, unless offline, forget
    /// the registrations so the next query downloads fresh data.
    ///
    /// Returns `true` if any registered snapshot was stale.
    pub fn refresh(&self) -> Result<bool> {
        let snapshots = config::snapshot_files();
        let mut stale = false;
        for table in self.conn.tables() {
            if !snapshots.contains_key(table.as_str()) {
                continue;
            }
            if self.conn.cache.borrow().is_stale(&table)? {
                stale = true;
            }
        }
        if stale && !self.conn.cache.borrow().offline {
            self.conn.reset_tables();
            info!("stale snapshots found; tables will be reloaded on next query");
        }
        Ok(stale)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn close(self) {
        drop(self);
    }
}

impl fmt::Display for DashboardSdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.conn.cache.borrow();
        write!(
            f,
            "DashboardSdk(cache_dir={}, tables=[{}], offline={})",
            cache.cache_dir.display(),
            self.conn.tables().join(", "),
            cache.offline
        )
    }
}
