use std::time::Duration;

/// Failure reported by the remote backend or the transport reaching it.
///
/// Produced only by the data-access layer; the aggregation pipeline never
/// constructs or rewraps one.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status} for {table}: {body}")]
    Status {
        table: String,
        status: u16,
        body: String,
    },

    #[error("backend returned an undecodable body for {table}: {reason}")]
    Decode { table: String, reason: String },
}

/// A fetched record that cannot be turned into a `TransactionRow`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed row {row_id}: field `{field}` {reason}")]
pub struct MalformedRowError {
    pub row_id: String,
    pub field: &'static str,
    pub reason: String,
}

impl MalformedRowError {
    pub fn new(row_id: impl Into<String>, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            row_id: row_id.into(),
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    MalformedRow(#[from] MalformedRowError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Cancelled before it started")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DashboardError>;
