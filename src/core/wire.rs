// LogPulse - core/wire.rs
//
// Validation of inbound payloads and event-stream framing.
//
// Records arrive as loosely typed JSON from two paths (REST page, pushed
// event). Both go through `decode_record`, so a malformed record is rejected
// the same way wherever it comes from and never reaches the store.
//
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::model::{Level, LogPage, LogRecord, Pagination, StatsSnapshot};
use crate::util::constants::MAX_EVENT_DATA_BYTES;
use crate::util::error::RecordError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

// =============================================================================
// Records
// =============================================================================

/// Validate a single record object.
///
/// Required: `_id` (string or integer), `timestamp` (RFC 3339 string or
/// integer epoch milliseconds), `level` (exactly INFO, WARN or ERROR),
/// `service` and `message` (strings).
pub fn decode_record(value: &Value) -> Result<LogRecord, RecordError> {
    let obj = value.as_object().ok_or(RecordError::NotAnObject)?;

    let id = match field(obj, "_id")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => {
            return Err(RecordError::WrongType {
                field: "_id",
                expected: "a string or number",
            })
        }
    };

    let timestamp = decode_timestamp(field(obj, "timestamp")?)?;

    let level_text = string_field(obj, "level")?;
    let level = Level::from_wire(level_text).ok_or_else(|| RecordError::UnknownLevel {
        value: level_text.to_string(),
    })?;

    let service = string_field(obj, "service")?.to_string();
    let message = string_field(obj, "message")?.to_string();

    Ok(LogRecord {
        id,
        timestamp,
        level,
        service,
        message,
    })
}

/// Parse and validate a record from raw JSON text (event-stream payload).
pub fn decode_record_str(text: &str) -> Result<LogRecord, RecordError> {
    let value: Value = serde_json::from_str(text).map_err(|e| RecordError::Json { source: e })?;
    decode_record(&value)
}

/// Parse a stats snapshot from raw JSON text (event-stream payload).
pub fn decode_stats_str(text: &str) -> Result<StatsSnapshot, RecordError> {
    let value: Value = serde_json::from_str(text).map_err(|e| RecordError::Json { source: e })?;
    if !value.is_object() {
        return Err(RecordError::NotAnObject);
    }
    serde_json::from_value(value).map_err(|e| RecordError::Json { source: e })
}

fn field<'a>(obj: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, RecordError> {
    match obj.get(name) {
        None | Some(Value::Null) => Err(RecordError::MissingField { field: name }),
        Some(v) => Ok(v),
    }
}

fn string_field<'a>(
    obj: &'a Map<String, Value>,
    name: &'static str,
) -> Result<&'a str, RecordError> {
    field(obj, name)?.as_str().ok_or(RecordError::WrongType {
        field: name,
        expected: "a string",
    })
}

fn decode_timestamp(value: &Value) -> Result<DateTime<Utc>, RecordError> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| RecordError::InvalidTimestamp { value: s.clone() }),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| RecordError::InvalidTimestamp {
                value: n.to_string(),
            }),
        other => Err(RecordError::InvalidTimestamp {
            value: other.to_string(),
        }),
    }
}

// =============================================================================
// Snapshot page
// =============================================================================

/// Raw shape of the `/logs` response before per-record validation.
#[derive(Debug, Deserialize)]
pub struct RawLogPage {
    #[serde(default)]
    pub logs: Vec<Value>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Validate every record of a page, dropping (and counting) malformed ones.
pub fn decode_page(raw: RawLogPage) -> LogPage {
    let mut records = Vec::with_capacity(raw.logs.len());
    let mut rejected = 0;
    for value in &raw.logs {
        match decode_record(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                rejected += 1;
                tracing::warn!(
                    error = %e,
                    payload = crate::util::logging::preview(&value.to_string()),
                    "Dropping malformed record from snapshot"
                );
            }
        }
    }
    LogPage {
        records,
        pagination: raw.pagination,
        rejected,
    }
}

// =============================================================================
// Event-stream framing
// =============================================================================

/// One dispatched event-stream frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Event name (`message` when the frame carried no `event:` line).
    pub event: String,
    /// Data lines joined with `\n`.
    pub data: String,
}

/// Line-oriented decoder for `text/event-stream` bodies.
///
/// Feed it one line at a time (without the trailing newline); a blank line
/// dispatches the accumulated frame. Comment lines (leading `:`), `id:` and
/// `retry:` fields are ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    event: Option<String>,
    data: String,
    has_data: bool,
    oversized: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one line. Returns a frame when the line completes one.
    pub fn push_line(&mut self, line: &str) -> Option<SseEvent> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (name, value) = match line.split_once(':') {
            Some((name, value)) => (name, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match name {
            "event" => self.event = Some(value.to_string()),
            "data" => {
                if self.data.len() + value.len() + 1 > MAX_EVENT_DATA_BYTES {
                    self.oversized = true;
                } else {
                    if self.has_data {
                        self.data.push('\n');
                    }
                    self.data.push_str(value);
                    self.has_data = true;
                }
            }
            _ => {}
        }
        None
    }

    /// Drop the frame being accumulated. Used when a line was too long to
    /// read; the frame is discarded at its terminating blank line.
    pub fn discard_current(&mut self) {
        self.oversized = true;
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = self.event.take();
        let data = std::mem::take(&mut self.data);
        let has_data = std::mem::replace(&mut self.has_data, false);

        if std::mem::replace(&mut self.oversized, false) {
            tracing::warn!(
                event = event.as_deref().unwrap_or("message"),
                max_bytes = MAX_EVENT_DATA_BYTES,
                "Discarding oversized event-stream frame"
            );
            return None;
        }
        if !has_data {
            return None;
        }
        Some(SseEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}
