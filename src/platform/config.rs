// LogPulse - platform/config.rs
//
// Platform directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved platform paths for LogPulse configuration and data.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logpulse/ or %APPDATA%\LogPulse\config\)
    pub config_dir: PathBuf,

    /// Data directory for the session file.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to the current directory if platform dirs cannot be
    /// determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self::in_dir(PathBuf::from("."))
        }
    }

    /// Keep config and session side by side in `dir` (`--config-dir`).
    pub fn in_dir(dir: PathBuf) -> Self {
        Self {
            config_dir: dir.clone(),
            data_dir: dir,
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored so a newer config file works with an
/// older binary.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub backend: BackendSection,
    pub view: ViewSection,
    pub store: StoreSection,
    pub ui: UiSection,
    pub logging: LoggingSection,
}

/// `[backend]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct BackendSection {
    /// REST base address, e.g. `http://localhost:3001/api`.
    pub base_url: Option<String>,
    /// Event-stream path relative to `base_url`.
    pub events_path: Option<String>,
    pub poll_interval_secs: Option<u64>,
    /// Rolling window requested from the stats endpoint.
    pub stats_window_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    /// Silence allowed on the event stream before reconnecting.
    pub stream_idle_timeout_secs: Option<u64>,
}

/// `[view]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ViewSection {
    pub page_size: Option<u32>,
    /// Start in real-time mode (true) or polling mode (false).
    pub start_realtime: Option<bool>,
}

/// `[store]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Maximum records kept in the local history.
    pub max_history: Option<usize>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Theme: "dark" or "light".
    pub theme: Option<String>,
    /// Body font size in points.
    pub font_size: Option<f32>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Backend --
    pub base_url: String,
    pub events_path: String,
    pub poll_interval_secs: u64,
    pub stats_window_secs: u64,
    pub request_timeout_secs: u64,
    pub stream_idle_timeout_secs: u64,

    // -- View --
    pub page_size: u32,
    pub start_realtime: bool,

    // -- Store --
    pub max_history: usize,

    // -- UI --
    /// Dark mode (true) or light mode (false).
    pub dark_mode: bool,
    /// Body font size in points.
    pub font_size: f32,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            events_path: constants::DEFAULT_EVENTS_PATH.to_string(),
            poll_interval_secs: constants::DEFAULT_POLL_INTERVAL_SECS,
            stats_window_secs: constants::DEFAULT_STATS_WINDOW_SECS,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT_SECS,
            stream_idle_timeout_secs: constants::DEFAULT_STREAM_IDLE_TIMEOUT_SECS,
            page_size: constants::DEFAULT_PAGE_SIZE,
            start_realtime: true,
            max_history: constants::DEFAULT_MAX_HISTORY,
            dark_mode: true,
            font_size: constants::DEFAULT_FONT_SIZE,
            log_level: None,
        }
    }
}

impl AppConfig {
    /// Full URL of the event stream.
    pub fn events_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.events_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn stream_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_idle_timeout_secs)
    }
}

/// Returns true for an absolute http(s) address with a host part.
pub fn is_valid_base_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unreadable or unparseable, returns defaults with a warning;
/// the application still starts but the user is informed.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            let err = ConfigError::Io {
                path: config_path,
                source: e,
            };
            tracing::warn!(error = %err, "Using default configuration");
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let err = ConfigError::TomlParse {
                path: config_path,
                source: e,
            };
            tracing::warn!(error = %err, "Using default configuration");
            warnings.push(format!(
                "{err}. Using defaults. See config.example.toml for the expected format."
            ));
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");
    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    (config, warnings)
}

/// Validate each field, accumulating every problem rather than stopping at
/// the first one.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    // -- Backend: base_url --
    if let Some(url) = raw.backend.base_url {
        let url = url.trim();
        if is_valid_base_url(url) {
            config.base_url = url.trim_end_matches('/').to_string();
        } else {
            reject(
                warnings,
                "[backend] base_url",
                url,
                "an http:// or https:// address",
                constants::DEFAULT_BASE_URL,
            );
        }
    }

    // -- Backend: events_path --
    if let Some(path) = raw.backend.events_path {
        if path.starts_with('/') && !path.contains(char::is_whitespace) {
            config.events_path = path;
        } else {
            reject(
                warnings,
                "[backend] events_path",
                &path,
                "a path starting with '/'",
                constants::DEFAULT_EVENTS_PATH,
            );
        }
    }

    // -- Backend: intervals --
    range_u64(
        warnings,
        "[backend] poll_interval_secs",
        raw.backend.poll_interval_secs,
        constants::MIN_POLL_INTERVAL_SECS..=constants::MAX_POLL_INTERVAL_SECS,
        &mut config.poll_interval_secs,
    );
    range_u64(
        warnings,
        "[backend] stats_window_secs",
        raw.backend.stats_window_secs,
        constants::MIN_STATS_WINDOW_SECS..=constants::MAX_STATS_WINDOW_SECS,
        &mut config.stats_window_secs,
    );
    range_u64(
        warnings,
        "[backend] request_timeout_secs",
        raw.backend.request_timeout_secs,
        constants::MIN_REQUEST_TIMEOUT_SECS..=constants::MAX_REQUEST_TIMEOUT_SECS,
        &mut config.request_timeout_secs,
    );
    range_u64(
        warnings,
        "[backend] stream_idle_timeout_secs",
        raw.backend.stream_idle_timeout_secs,
        constants::MIN_STREAM_IDLE_TIMEOUT_SECS..=constants::MAX_STREAM_IDLE_TIMEOUT_SECS,
        &mut config.stream_idle_timeout_secs,
    );

    // -- View --
    if let Some(size) = raw.view.page_size {
        if (constants::MIN_PAGE_SIZE..=constants::MAX_PAGE_SIZE).contains(&size) {
            config.page_size = size;
        } else {
            reject(
                warnings,
                "[view] page_size",
                &size.to_string(),
                &format!("{}-{}", constants::MIN_PAGE_SIZE, constants::MAX_PAGE_SIZE),
                &constants::DEFAULT_PAGE_SIZE.to_string(),
            );
        }
    }
    if let Some(realtime) = raw.view.start_realtime {
        config.start_realtime = realtime;
    }

    // -- Store: max_history --
    if let Some(max) = raw.store.max_history {
        if (constants::MIN_MAX_HISTORY..=constants::ABSOLUTE_MAX_HISTORY).contains(&max) {
            config.max_history = max;
        } else {
            reject(
                warnings,
                "[store] max_history",
                &max.to_string(),
                &format!(
                    "{}-{}",
                    constants::MIN_MAX_HISTORY,
                    constants::ABSOLUTE_MAX_HISTORY
                ),
                &constants::DEFAULT_MAX_HISTORY.to_string(),
            );
        }
    }

    // -- UI: theme --
    if let Some(ref theme) = raw.ui.theme {
        match theme.to_lowercase().as_str() {
            "dark" => config.dark_mode = true,
            "light" => config.dark_mode = false,
            other => reject(warnings, "[ui] theme", other, "\"dark\" or \"light\"", "dark"),
        }
    }

    // -- UI: font_size --
    if let Some(size) = raw.ui.font_size {
        if (constants::MIN_FONT_SIZE..=constants::MAX_FONT_SIZE).contains(&size) {
            config.font_size = size;
        } else {
            reject(
                warnings,
                "[ui] font_size",
                &size.to_string(),
                &format!("{}-{}", constants::MIN_FONT_SIZE, constants::MAX_FONT_SIZE),
                &constants::DEFAULT_FONT_SIZE.to_string(),
            );
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            reject(
                warnings,
                "[logging] level",
                level,
                "one of error, warn, info, debug, trace",
                constants::DEFAULT_LOG_LEVEL,
            );
        }
    }

    config
}

fn range_u64(
    warnings: &mut Vec<String>,
    field: &str,
    value: Option<u64>,
    range: std::ops::RangeInclusive<u64>,
    target: &mut u64,
) {
    let Some(value) = value else {
        return;
    };
    if range.contains(&value) {
        *target = value;
    } else {
        let default = target.to_string();
        reject(
            warnings,
            field,
            &value.to_string(),
            &format!("{}-{}", range.start(), range.end()),
            &default,
        );
    }
}

fn reject(warnings: &mut Vec<String>, field: &str, value: &str, expected: &str, default: &str) {
    let err = ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    };
    warnings.push(format!("{err}. Using default ({default})."));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) {
        std::fs::write(dir.path().join(constants::CONFIG_FILE_NAME), body).unwrap();
    }

    #[test]
    fn test_missing_file_yields_defaults_without_warnings() {
        let dir = TempDir::new().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
        assert_eq!(config.base_url, constants::DEFAULT_BASE_URL);
        assert_eq!(config.poll_interval_secs, 5);
        assert!(config.start_realtime);
    }

    #[test]
    fn test_valid_values_are_applied() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            r#"
[backend]
base_url = "https://logs.example.com/api/"
events_path = "/stream"
poll_interval_secs = 15
stats_window_secs = 300
stream_idle_timeout_secs = 90

[view]
page_size = 100
start_realtime = false

[store]
max_history = 20000

[ui]
theme = "Light"
font_size = 16.0

[logging]
level = "DEBUG"
"#,
        );
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.base_url, "https://logs.example.com/api");
        assert_eq!(config.events_url(), "https://logs.example.com/api/stream");
        assert_eq!(config.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.stats_window_secs, 300);
        assert_eq!(config.stream_idle_timeout(), Duration::from_secs(90));
        assert_eq!(config.page_size, 100);
        assert!(!config.start_realtime);
        assert_eq!(config.max_history, 20_000);
        assert!(!config.dark_mode);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_each_invalid_value_warns_and_falls_back() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir,
            r#"
[backend]
base_url = "localhost:3001"
events_path = "events"
poll_interval_secs = 0
request_timeout_secs = 9999
stream_idle_timeout_secs = 1

[view]
page_size = 5000

[store]
max_history = 10

[ui]
theme = "solarized"

[logging]
level = "verbose"
"#,
        );
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 9, "{warnings:?}");
        assert!(warnings.iter().any(|w| w.contains("poll_interval_secs")));
        assert_eq!(config.base_url, constants::DEFAULT_BASE_URL);
        assert_eq!(config.events_path, constants::DEFAULT_EVENTS_PATH);
        assert_eq!(config.poll_interval_secs, constants::DEFAULT_POLL_INTERVAL_SECS);
        assert_eq!(config.request_timeout_secs, constants::DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(
            config.stream_idle_timeout_secs,
            constants::DEFAULT_STREAM_IDLE_TIMEOUT_SECS
        );
        assert_eq!(config.page_size, constants::DEFAULT_PAGE_SIZE);
        assert_eq!(config.max_history, constants::DEFAULT_MAX_HISTORY);
        assert!(config.dark_mode);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unparseable_file_warns_and_uses_defaults() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[backend\nbase_url = ");
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Config parse error"));
        assert_eq!(config.page_size, constants::DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "[future]\nflag = true\n[view]\npage_size = 25\n");
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn test_base_url_validation() {
        assert!(is_valid_base_url("http://localhost:3001/api"));
        assert!(is_valid_base_url("https://example.com"));
        assert!(!is_valid_base_url("ftp://example.com"));
        assert!(!is_valid_base_url("http://"));
        assert!(!is_valid_base_url("example.com"));
    }
}
