// LogPulse - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation: every variant keeps its cause so the
// full chain can be logged.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogPulse operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogPulseError {
    /// REST snapshot request failed.
    Fetch(FetchError),

    /// Push event stream failed.
    Stream(StreamError),

    /// An inbound record or stats payload was malformed.
    Record(RecordError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LogPulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "Fetch error: {e}"),
            Self::Stream(e) => write!(f, "Event stream error: {e}"),
            Self::Record(e) => write!(f, "Malformed payload: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogPulseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Stream(e) => Some(e),
            Self::Record(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Fetch errors
// ---------------------------------------------------------------------------

/// Errors from the REST snapshot endpoints.
#[derive(Debug)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    Client { source: reqwest::Error },

    /// Transport-level failure (DNS, connect, timeout, invalid URL).
    Http { url: String, source: reqwest::Error },

    /// The server answered with a non-2xx status.
    Status { url: String, status: u16 },

    /// The response body was not the expected JSON shape.
    Decode { url: String, source: reqwest::Error },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client { source } => write!(f, "cannot build HTTP client: {source}"),
            Self::Http { url, source } => write!(f, "request to '{url}' failed: {source}"),
            Self::Status { url, status } => {
                write!(f, "'{url}' answered with HTTP status {status}")
            }
            Self::Decode { url, source } => {
                write!(f, "cannot decode response from '{url}': {source}")
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Client { source } => Some(source),
            Self::Http { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::Status { .. } => None,
        }
    }
}

impl From<FetchError> for LogPulseError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

// ---------------------------------------------------------------------------
// Stream errors
// ---------------------------------------------------------------------------

/// Errors from the push event stream.
#[derive(Debug)]
pub enum StreamError {
    /// The HTTP client could not be constructed.
    Client { source: reqwest::Error },

    /// Connection could not be established.
    Connect { url: String, source: reqwest::Error },

    /// The server refused the stream with a non-2xx status.
    Status { url: String, status: u16 },

    /// Reading from an established stream failed.
    Read { url: String, source: io::Error },

    /// The server closed the stream cleanly.
    Closed { url: String },
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client { source } => write!(f, "cannot build HTTP client: {source}"),
            Self::Connect { url, source } => write!(f, "cannot connect to '{url}': {source}"),
            Self::Status { url, status } => {
                write!(f, "'{url}' refused the event stream with HTTP status {status}")
            }
            Self::Read { url, source } => write!(f, "read from '{url}' failed: {source}"),
            Self::Closed { url } => write!(f, "'{url}' closed the event stream"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Client { source } => Some(source),
            Self::Connect { source, .. } => Some(source),
            Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StreamError> for LogPulseError {
    fn from(e: StreamError) -> Self {
        Self::Stream(e)
    }
}

// ---------------------------------------------------------------------------
// Record errors
// ---------------------------------------------------------------------------

/// Validation failures for inbound record and stats payloads.
#[derive(Debug)]
pub enum RecordError {
    /// Payload text is not valid JSON.
    Json { source: serde_json::Error },

    /// Payload is valid JSON but not an object.
    NotAnObject,

    /// A required field is absent or null.
    MissingField { field: &'static str },

    /// A field is present but has the wrong JSON type.
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    /// The level string is not one of INFO, WARN, ERROR.
    UnknownLevel { value: String },

    /// The timestamp is neither RFC 3339 nor epoch milliseconds.
    InvalidTimestamp { value: String },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json { source } => write!(f, "invalid JSON: {source}"),
            Self::NotAnObject => f.write_str("expected a JSON object"),
            Self::MissingField { field } => write!(f, "missing required field '{field}'"),
            Self::WrongType { field, expected } => {
                write!(f, "field '{field}' must be {expected}")
            }
            Self::UnknownLevel { value } => write!(
                f,
                "level '{value}' is not recognised (expected INFO, WARN or ERROR)"
            ),
            Self::InvalidTimestamp { value } => write!(
                f,
                "timestamp '{value}' is neither RFC 3339 nor epoch milliseconds"
            ),
        }
    }
}

impl std::error::Error for RecordError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json { source } => Some(source),
            _ => None,
        }
    }
}

impl From<RecordError> for LogPulseError {
    fn from(e: RecordError) -> Self {
        Self::Record(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for LogPulseError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogPulseError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogPulse results.
pub type Result<T> = std::result::Result<T, LogPulseError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_record_error_names_field() {
        let err = RecordError::MissingField { field: "service" };
        assert_eq!(err.to_string(), "missing required field 'service'");
    }

    #[test]
    fn test_top_level_error_preserves_source_chain() {
        let inner = StreamError::Read {
            url: "http://localhost/events".to_string(),
            source: io::Error::new(io::ErrorKind::ConnectionReset, "reset"),
        };
        let err: LogPulseError = inner.into();
        assert!(err.to_string().starts_with("Event stream error:"));
        let level1 = err.source().expect("stream error is the first source");
        let level2 = level1.source().expect("io error is the second source");
        assert_eq!(level2.to_string(), "reset");
    }

    #[test]
    fn test_status_error_has_no_source() {
        let err = FetchError::Status {
            url: "http://localhost/logs".to_string(),
            status: 503,
        };
        assert!(err.source().is_none());
        assert!(err.to_string().contains("503"));
    }
}
