// LogPulse - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Log Record
// =============================================================================

/// A single log record as produced by the backend.
///
/// Records are immutable once received: nothing in the dashboard edits them,
/// they are only dropped by local truncation or history eviction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    /// Backend-assigned identifier, unique and opaque.
    #[serde(rename = "_id")]
    pub id: String,

    /// Instant the backend stamped the record with, normalised to UTC.
    pub timestamp: DateTime<Utc>,

    pub level: Level,

    /// Name of the emitting service.
    pub service: String,

    pub message: String,
}

// =============================================================================
// Level
// =============================================================================

/// Log level as carried on the wire. Matching is exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    /// All variants in display order.
    pub fn all() -> &'static [Level] {
        &[Level::Info, Level::Warn, Level::Error]
    }

    /// Wire representation (also used as the query parameter value).
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    /// Parse the exact wire representation. Lower-case or padded input is
    /// rejected; the backend contract is upper-case only.
    pub fn from_wire(value: &str) -> Option<Level> {
        match value {
            "INFO" => Some(Level::Info),
            "WARN" => Some(Level::Warn),
            "ERROR" => Some(Level::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Pagination metadata as reported by the last REST response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page (1-based).
    #[serde(default)]
    pub page: u32,

    /// Total number of pages for the active filter.
    #[serde(default)]
    pub pages: u32,

    /// Total number of records matching the active filter.
    #[serde(default)]
    pub total: u64,
}

/// One page of records returned by the snapshot endpoint, already validated.
#[derive(Debug, Clone, Default)]
pub struct LogPage {
    pub records: Vec<LogRecord>,
    pub pagination: Pagination,
    /// Number of records in the response that failed validation and were
    /// dropped.
    pub rejected: usize,
}

// =============================================================================
// Stats
// =============================================================================

/// Per-level counts inside a stats snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LevelCounts {
    #[serde(rename = "INFO", alias = "info", default)]
    pub info: u64,
    #[serde(rename = "WARN", alias = "warn", default)]
    pub warn: u64,
    #[serde(rename = "ERROR", alias = "error", default)]
    pub error: u64,
}

impl LevelCounts {
    /// Count for a single level.
    pub fn get(&self, level: Level) -> u64 {
        match level {
            Level::Info => self.info,
            Level::Warn => self.warn,
            Level::Error => self.error,
        }
    }
}

/// Aggregate counts over the backend's rolling window.
///
/// Owned by the backend: the dashboard displays the latest value it received
/// and never recomputes it from local records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(default)]
    pub total: u64,

    #[serde(default, alias = "byLevel", alias = "levels")]
    pub counts: LevelCounts,

    /// Error percentage as computed by the backend. Opaque to the client;
    /// `None` when the backend omitted it.
    #[serde(default, rename = "errorRate", alias = "error_rate")]
    pub error_rate: Option<f64>,
}

// =============================================================================
// Progress messages (background threads -> UI thread)
// =============================================================================

/// Connection state of the push channel, as shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    /// Waiting before the given reconnect attempt.
    Reconnecting { attempt: u32, delay_ms: u64 },
    Stopped,
}

/// Messages sent from the event-stream thread to the UI thread.
#[derive(Debug, Clone)]
pub enum StreamProgress {
    /// The stream is open and delivering events.
    Connected,

    /// A validated `newLog` event.
    NewLog { record: LogRecord },

    /// A validated `statsUpdate` event.
    StatsUpdate { stats: StatsSnapshot },

    /// An event was received but could not be decoded.
    Malformed { event: String, reason: String },

    /// The stream dropped; another attempt follows after `delay_ms`.
    Disconnected {
        error: String,
        attempt: u32,
        delay_ms: u64,
    },

    /// The subscriber exited after being stopped.
    Stopped,
}
