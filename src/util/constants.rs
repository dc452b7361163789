// LogPulse - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogPulse";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogPulse";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Backend endpoints
// =============================================================================

/// Backend base address used when neither config nor CLI provides one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

/// Path (relative to the base address) of the paginated log listing.
pub const LOGS_PATH: &str = "/logs";

/// Path (relative to the base address) of the rolling-window stats endpoint.
pub const STATS_PATH: &str = "/logs/stats";

/// Default path of the server-sent event stream.
pub const DEFAULT_EVENTS_PATH: &str = "/events";

/// Push event carrying a single new log record.
pub const EVENT_NEW_LOG: &str = "newLog";

/// Push event carrying a full stats snapshot.
pub const EVENT_STATS_UPDATE: &str = "statsUpdate";

// =============================================================================
// Polling and stats
// =============================================================================

/// Default polling interval while real-time mode is off (seconds).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Minimum configurable polling interval (seconds).
pub const MIN_POLL_INTERVAL_SECS: u64 = 1;

/// Maximum configurable polling interval (seconds).
pub const MAX_POLL_INTERVAL_SECS: u64 = 300;

/// Rolling window the backend aggregates stats over (seconds).
pub const DEFAULT_STATS_WINDOW_SECS: u64 = 60;

/// Minimum configurable stats window (seconds).
pub const MIN_STATS_WINDOW_SECS: u64 = 1;

/// Maximum configurable stats window (seconds).
pub const MAX_STATS_WINDOW_SECS: u64 = 3_600;

/// Default timeout for a single REST request (seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Minimum configurable REST request timeout (seconds).
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;

/// Maximum configurable REST request timeout (seconds).
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Connect timeout for the event stream (seconds). The stream itself has no
/// overall deadline because it is expected to stay open indefinitely.
pub const STREAM_CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Page size and history
// =============================================================================

/// Default page size (records per page and visible slice length).
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Smallest accepted page size.
pub const MIN_PAGE_SIZE: u32 = 1;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: u32 = 1_000;

/// Page size choices offered in the filter panel.
pub const PAGE_SIZE_CHOICES: &[u32] = &[10, 25, 50, 100, 250, 500];

/// Default cap on records held in the session history.
pub const DEFAULT_MAX_HISTORY: usize = 5_000;

/// Smallest accepted history cap. Never below the largest page size so a
/// full visible slice always fits inside the history.
pub const MIN_MAX_HISTORY: usize = MAX_PAGE_SIZE as usize;

/// Largest accepted history cap.
pub const ABSOLUTE_MAX_HISTORY: usize = 1_000_000;

// =============================================================================
// Event stream reconnection
// =============================================================================

/// First reconnect delay after the event stream drops (ms).
pub const RECONNECT_INITIAL_DELAY_MS: u64 = 500;

/// Upper bound on the reconnect delay (ms).
pub const RECONNECT_MAX_DELAY_MS: u64 = 30_000;

/// How often the cancel flag is checked within a reconnect sleep (ms).
pub const STREAM_CANCEL_CHECK_INTERVAL_MS: u64 = 100;

/// Maximum accepted size of a single event-stream frame's data (bytes).
/// Larger frames are discarded to keep a misbehaving server from growing the
/// decoder buffer without bound.
pub const MAX_EVENT_DATA_BYTES: usize = 1024 * 1024; // 1 MiB

/// Longest event-stream line read into memory (bytes): the data cap plus
/// room for the field name. Longer lines are skipped up to the next newline.
pub const MAX_EVENT_LINE_BYTES: usize = MAX_EVENT_DATA_BYTES + 64;

/// Default silence allowed on an open event stream before it is treated as
/// dead and reconnected (seconds). Several multiples of a typical 15 s
/// keep-alive comment.
pub const DEFAULT_STREAM_IDLE_TIMEOUT_SECS: u64 = 45;

/// Minimum accepted stream idle timeout (seconds).
pub const MIN_STREAM_IDLE_TIMEOUT_SECS: u64 = 5;

/// Maximum accepted stream idle timeout (seconds).
pub const MAX_STREAM_IDLE_TIMEOUT_SECS: u64 = 600;

// =============================================================================
// Per-frame UI message budgets
// =============================================================================

/// Maximum number of fetch results processed per UI frame.
pub const MAX_FETCH_MESSAGES_PER_FRAME: usize = 50;

/// Maximum number of push-stream messages processed per UI frame.
pub const MAX_STREAM_MESSAGES_PER_FRAME: usize = 500;

/// Repaint cadence while real-time mode is active (ms).
pub const REALTIME_REPAINT_INTERVAL_MS: u64 = 250;

/// Maximum number of non-fatal warnings retained for display.
pub const MAX_WARNINGS: usize = 200;

// =============================================================================
// UI defaults
// =============================================================================

/// Default UI body font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 14.5;

/// Minimum user-configurable UI font size (points).
pub const MIN_FONT_SIZE: f32 = 10.0;

/// Maximum user-configurable UI font size (points).
pub const MAX_FONT_SIZE: f32 = 24.0;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a payload excerpt included in warning logs.
pub const DEBUG_MAX_PAYLOAD_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Session persistence file name (stored in the platform data directory).
pub const SESSION_FILE_NAME: &str = "session.json";
