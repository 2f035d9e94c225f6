//! Local snapshot cache of the backend's warehouse tables.
//!
//! Each remote table is downloaded page by page from the REST API and kept
//! as a gzip-compressed NDJSON file, which DuckDB reads directly. Snapshots
//! older than the configured maximum age are downloaded again on next use.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Duration;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::blocking::Client;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::{self, DashboardConfig};
use crate::error::{DashboardError, FetchError, Result};

/// Downloads warehouse tables and keeps them as local snapshot files.
pub struct SnapshotCache {
    /// Directory holding the snapshot files.
    pub cache_dir: PathBuf,
    /// If true, never contact the backend.
    pub offline: bool,
    config: DashboardConfig,
    client: Option<Client>,
}

impl SnapshotCache {
    /// Create the cache, creating its directory if needed.
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let dir = config.resolved_cache_dir();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            cache_dir: dir,
            offline: config.offline,
            config,
            client: None,
        })
    }

    /// Lazy HTTP client, created on first download.
    fn client(&mut self) -> Result<Client> {
        if let Some(client) = &self.client {
            return Ok(client.clone());
        }
        let client = Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(FetchError::from)?;
        self.client = Some(client.clone());
        Ok(client)
    }

    /// Local path of a table's snapshot, whether or not it exists yet.
    pub fn snapshot_path(&self, table: &str) -> Result<PathBuf> {
        let files = config::snapshot_files();
        let filename = files.get(table).ok_or_else(|| {
            DashboardError::NotFound(format!("Unknown warehouse table: {}", table))
        })?;
        Ok(self.cache_dir.join(filename))
    }

    /// Whether a snapshot is missing or older than `snapshot_max_age`.
    pub fn is_stale(&self, table: &str) -> Result<bool> {
        let path = self.snapshot_path(table)?;
        let age = fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|modified| modified.elapsed().ok());
        Ok(match age {
            None => true,
            Some(age) => age > self.config.snapshot_max_age,
        })
    }

    /// Ensure a fresh snapshot of `table` exists, downloading if needed.
    ///
    /// In offline mode an existing snapshot is used regardless of age and a
    /// missing one is an error.
    pub fn ensure_snapshot(&mut self, table: &str) -> Result<PathBuf> {
        let path = self.snapshot_path(table)?;

        if self.offline {
            if path.exists() {
                return Ok(path);
            }
            return Err(DashboardError::NotFound(format!(
                "Snapshot of {} not cached and offline mode is enabled",
                table
            )));
        }

        if self.is_stale(table)? {
            if path.exists() {
                info!(table, "snapshot is stale, downloading again");
            }
            let rows = self.download_table(table)?;
            self.write_snapshot(table, &rows)?;
        }

        Ok(path)
    }

    /// Fetch every row of a remote table, following `limit`/`offset` pages.
    pub fn download_table(&mut self, table: &str) -> Result<Vec<Map<String, Value>>> {
        let client = self.client()?;
        let url = self.config.table_url(table);
        let page_size = self.config.page_size.max(1);
        let mut rows: Vec<Map<String, Value>> = Vec::new();

        info!(table, %url, "downloading table");

        loop {
            let query = [
                ("select", "*".to_string()),
                ("limit", page_size.to_string()),
                ("offset", rows.len().to_string()),
            ];
            let resp = client
                .get(&url)
                .query(&query)
                .header("apikey", &self.config.anon_key)
                .bearer_auth(&self.config.anon_key)
                .send()
                .map_err(FetchError::from)?;

            let status = resp.status();
            let body = resp.text().map_err(FetchError::from)?;
            if !status.is_success() {
                return Err(FetchError::Status {
                    table: table.to_string(),
                    status: status.as_u16(),
                    body,
                }
                .into());
            }

            let page: Vec<Map<String, Value>> =
                serde_json::from_str(&body).map_err(|e| FetchError::Decode {
                    table: table.to_string(),
                    reason: e.to_string(),
                })?;
            let page_len = page.len();
            rows.extend(page);
            debug!(table, fetched = rows.len(), "page received");

            if page_len < page_size {
                break;
            }
        }

        Ok(rows)
    }

    /// Write caller-supplied records as the snapshot of `table`.
    ///
    /// Useful for seeding a cache from an export or for offline use.
    pub fn import_rows(&self, table: &str, rows: &[Map<String, Value>]) -> Result<PathBuf> {
        self.write_snapshot(table, rows)
    }

    /// Write a snapshot atomically: compress into a temp file in the cache
    /// directory, then rename over the previous snapshot.
    fn write_snapshot(&self, table: &str, rows: &[Map<String, Value>]) -> Result<PathBuf> {
        let dest = self.snapshot_path(table)?;
        let tmp = NamedTempFile::new_in(&self.cache_dir)?;

        let mut encoder = GzEncoder::new(tmp, Compression::default());
        for row in rows {
            serde_json::to_writer(&mut encoder, row)?;
            encoder.write_all(b"\n")?;
        }
        let tmp = encoder.finish()?;
        tmp.persist(&dest).map_err(|e| e.error)?;

        debug!(table, rows = rows.len(), path = %dest.display(), "snapshot written");
        Ok(dest)
    }

    /// Read a snapshot back into records.
    ///
    /// A corrupt snapshot is deleted so the next access downloads it again.
    pub fn read_snapshot(&mut self, table: &str) -> Result<Vec<Map<String, Value>>> {
        let path = self.ensure_snapshot(table)?;

        let parse = || -> Result<Vec<Map<String, Value>>> {
            let reader = BufReader::new(GzDecoder::new(File::open(&path)?));
            let mut rows = Vec::new();
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                rows.push(serde_json::from_str(&line)?);
            }
            Ok(rows)
        };

        match parse() {
            Ok(rows) => Ok(rows),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt snapshot, removing");
                let _ = fs::remove_file(&path);
                Err(DashboardError::NotFound(format!(
                    "Snapshot of {} was corrupt and has been removed. \
                     Retry to download it again. Original error: {}",
                    table, e
                )))
            }
        }
    }

    /// Remove all snapshots and recreate the cache directory.
    pub fn clear(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
            fs::create_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    pub fn max_age(&self) -> Duration {
        self.config.snapshot_max_age
    }

    /// Currency code used when rendering volumes.
    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    /// Drop the HTTP client, if open.
    pub fn close(&mut self) {
        self.client = None;
    }
}
