use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DashboardError, Result};

/// Path of the PostgREST endpoint under the backend base URL.
pub const REST_PATH: &str = "rest/v1";

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "SUPABASE_URL";
/// Environment variable holding the anonymous API key.
pub const ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

pub const DEFAULT_CURRENCY: &str = "GHS";

/// Remote tables mirrored into the local snapshot cache, keyed by the
/// DuckDB table name they are registered under.
pub fn snapshot_files() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("transaction_facts", "transaction_facts.ndjson.gz"),
        ("core_time", "core_time.ndjson.gz"),
        ("core_payment", "core_payment.ndjson.gz"),
        ("core_customer", "core_customer.ndjson.gz"),
        ("core_merchant", "core_merchant.ndjson.gz"),
    ])
}

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("paydash-sdk")
    } else {
        PathBuf::from(".paydash-sdk-cache")
    }
}

/// Connection settings for the hosted backend and the local snapshot cache.
///
/// Built by the application and handed to
/// [`DashboardSdkBuilder`](crate::DashboardSdkBuilder); nothing below the
/// builder reads process state.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend base URL, e.g. `https://xyz.supabase.co`.
    pub api_url: String,
    /// Anonymous API key sent as `apikey` and bearer token.
    pub anon_key: String,
    /// Snapshot directory; `None` uses [`default_cache_dir`].
    pub cache_dir: Option<PathBuf>,
    /// Never contact the backend, use cached snapshots only.
    pub offline: bool,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Age after which a snapshot is downloaded again.
    pub snapshot_max_age: Duration,
    /// Rows requested per page when downloading a table.
    pub page_size: usize,
    /// Currency code used when rendering volumes.
    pub currency: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            anon_key: String::new(),
            cache_dir: None,
            offline: false,
            timeout: Duration::from_secs(60),
            snapshot_max_age: Duration::from_secs(15 * 60),
            page_size: 1000,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Read the backend URL and key from `SUPABASE_URL` / `SUPABASE_ANON_KEY`.
    ///
    /// Meant for binaries; library code receives the resulting struct.
    pub fn from_env() -> Result<Self> {
        let api_url = env::var(API_URL_ENV)
            .map_err(|_| DashboardError::InvalidArgument(format!("{} is not set", API_URL_ENV)))?;
        let anon_key = env::var(ANON_KEY_ENV)
            .map_err(|_| DashboardError::InvalidArgument(format!("{} is not set", ANON_KEY_ENV)))?;
        Ok(Self {
            api_url,
            anon_key,
            ..Self::default()
        })
    }

    /// URL of a table's REST resource.
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/{}/{}", self.api_url.trim_end_matches('/'), REST_PATH, table)
    }

    pub fn resolved_cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(default_cache_dir)
    }
}
