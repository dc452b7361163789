// LogPulse - app/fetcher.rs
//
// REST snapshot fetching: a filtered, paginated page of records and the
// rolling-window stats object.
//
// Architecture:
//   - `SnapshotSource` is the seam between the dashboard and the backend.
//     `HttpSnapshotSource` is the real implementation (blocking reqwest).
//   - `FetchManager` lives on the UI thread and runs each request on a
//     short-lived background thread. Results come back as `FetchOutcome`
//     messages over an mpsc channel drained once per frame, so the state
//     container is only ever touched by the UI thread.
//   - Log requests carry the sequence number the controller assigned, which
//     lets it discard responses overtaken by a newer request.
//
// Failures are never fatal: they travel back as `Err` and the controller
// keeps the previously displayed data.

use crate::core::filter::FilterSpec;
use crate::core::model::{LogPage, StatsSnapshot};
use crate::core::wire::{self, RawLogPage};
use crate::util::constants::{LOGS_PATH, STATS_PATH};
use crate::util::error::FetchError;
use serde::de::DeserializeOwned;
use std::sync::{mpsc, Arc};
use std::time::Duration;

// =============================================================================
// SnapshotSource
// =============================================================================

/// Pull-based access to the backend's snapshot endpoints.
pub trait SnapshotSource: Send + Sync {
    /// Fetch one page of records matching `filter`.
    fn fetch_logs(&self, filter: &FilterSpec) -> Result<LogPage, FetchError>;

    /// Fetch aggregate stats over the last `window_secs` seconds.
    fn fetch_stats(&self, window_secs: u64) -> Result<StatsSnapshot, FetchError>;
}

/// `SnapshotSource` backed by the REST API under `base_url`.
pub struct HttpSnapshotSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpSnapshotSource {
    /// Build a source for `base_url` (e.g. `http://localhost:3001/api`).
    /// A trailing slash on the base address is ignored.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client { source: e })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{path}", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| FetchError::Http {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .map_err(|e| FetchError::Decode { url, source: e })
    }
}

impl SnapshotSource for HttpSnapshotSource {
    fn fetch_logs(&self, filter: &FilterSpec) -> Result<LogPage, FetchError> {
        let raw: RawLogPage = self.get_json(LOGS_PATH, &filter.query_pairs())?;
        Ok(wire::decode_page(raw))
    }

    fn fetch_stats(&self, window_secs: u64) -> Result<StatsSnapshot, FetchError> {
        self.get_json(STATS_PATH, &[("seconds", window_secs.to_string())])
    }
}

// =============================================================================
// FetchManager
// =============================================================================

/// Result of a background request, delivered to the UI thread.
#[derive(Debug)]
pub enum FetchOutcome {
    Logs {
        seq: u64,
        result: Result<LogPage, FetchError>,
    },
    Stats {
        seq: u64,
        result: Result<StatsSnapshot, FetchError>,
    },
}

/// Runs snapshot requests on background threads.
pub struct FetchManager {
    source: Arc<dyn SnapshotSource>,
    tx: mpsc::Sender<FetchOutcome>,
    rx: mpsc::Receiver<FetchOutcome>,
}

impl FetchManager {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { source, tx, rx }
    }

    /// Start a log page request. Returns immediately.
    pub fn request_logs(&self, seq: u64, filter: FilterSpec) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let result = source.fetch_logs(&filter);
            match &result {
                Ok(page) => tracing::debug!(
                    seq,
                    count = page.records.len(),
                    rejected = page.rejected,
                    "Log page fetched"
                ),
                Err(e) => tracing::warn!(seq, error = %e, "Log page fetch failed"),
            }
            // Receiver gone means the UI has shut down; nothing to report to.
            let _ = tx.send(FetchOutcome::Logs { seq, result });
        });
    }

    /// Start a stats request. Returns immediately.
    pub fn request_stats(&self, seq: u64, window_secs: u64) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let result = source.fetch_stats(window_secs);
            if let Err(ref e) = result {
                tracing::warn!(seq, error = %e, "Stats fetch failed");
            }
            let _ = tx.send(FetchOutcome::Stats { seq, result });
        });
    }

    /// Drain up to `max` pending outcomes without blocking.
    pub fn poll_results(&self, max: usize) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::new();
        while outcomes.len() < max {
            match self.rx.try_recv() {
                Ok(outcome) => outcomes.push(outcome),
                Err(_) => break,
            }
        }
        outcomes
    }
}
