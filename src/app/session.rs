// LogPulse - app/session.rs
//
// Session persistence: save and restore the filter selection and display
// mode between application restarts.
//
// Design principles:
// - Session is saved atomically (write to temp, rename to final) so a crash
//   during save never corrupts the previous good session.
// - Load errors are silently discarded; a corrupt or incompatible session
//   starts the app fresh.
// - The data directory is created on first save.
// - Log records are NOT persisted. The history is refetched from the backend
//   on every launch.

use crate::core::filter::FilterSpec;
use crate::core::model::Level;
use crate::util::constants::SESSION_FILE_NAME;
use crate::util::error::LogPulseError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Version stamp for forward-compatibility checks.
///
/// Version mismatches silently discard the session.
pub const SESSION_VERSION: u32 = 1;

// =============================================================================
// On-disk data structures
// =============================================================================

/// Complete persistent session snapshot.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionData {
    /// Schema version; must equal `SESSION_VERSION` to be accepted.
    pub version: u32,

    pub filter: PersistedFilter,

    /// Whether the dashboard was in real-time mode on exit.
    #[serde(default = "default_realtime")]
    pub realtime: bool,
}

fn default_realtime() -> bool {
    true
}

/// Serialisable subset of `FilterSpec`. The page is not persisted; a
/// restored session always starts on page 1.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedFilter {
    #[serde(default)]
    pub level: Option<Level>,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub limit: u32,
}

impl PersistedFilter {
    pub fn from_filter(filter: &FilterSpec) -> Self {
        Self {
            level: filter.level(),
            service: filter.service().unwrap_or_default().to_string(),
            search: filter.search().unwrap_or_default().to_string(),
            limit: filter.limit(),
        }
    }

    /// Rebuild a filter. A zero or out-of-range limit falls back to
    /// `default_limit` via the usual clamping.
    pub fn to_filter(&self, default_limit: u32) -> FilterSpec {
        let limit = if self.limit == 0 {
            default_limit
        } else {
            self.limit
        };
        let mut filter = FilterSpec::new(limit);
        filter.set_level(self.level);
        filter.set_service(Some(&self.service));
        filter.set_search(Some(&self.search));
        filter
    }
}

impl SessionData {
    pub fn capture(filter: &FilterSpec, realtime: bool) -> Self {
        Self {
            version: SESSION_VERSION,
            filter: PersistedFilter::from_filter(filter),
            realtime,
        }
    }
}

// =============================================================================
// I/O helpers
// =============================================================================

/// Resolve the session file path from the platform data directory.
pub fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE_NAME)
}

/// Save `data` to `path` atomically (write temp, then rename).
///
/// Creates all parent directories as needed. The caller typically logs the
/// error and carries on.
pub fn save(data: &SessionData, path: &Path) -> Result<(), LogPulseError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LogPulseError::Io {
            path: parent.to_path_buf(),
            operation: "create session directory",
            source: e,
        })?;
    }

    let json = serde_json::to_string_pretty(data).map_err(|e| LogPulseError::Io {
        path: path.to_path_buf(),
        operation: "serialise session",
        source: e.into(),
    })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json.as_bytes()).map_err(|e| LogPulseError::Io {
        path: tmp.clone(),
        operation: "write session temp file",
        source: e,
    })?;

    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        LogPulseError::Io {
            path: path.to_path_buf(),
            operation: "finalise session file",
            source: e,
        }
    })?;

    tracing::debug!(path = %path.display(), "Session saved");
    Ok(())
}

/// Load and validate a `SessionData` from `path`.
///
/// Returns `None` on any error (file not found, JSON parse failure, version
/// mismatch). The caller should treat `None` as "start fresh".
pub fn load(path: &Path) -> Option<SessionData> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), error = %e, "Cannot read session file");
            }
        })
        .ok()?;

    let data: SessionData = serde_json::from_str(&content)
        .map_err(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Session file is malformed; starting fresh"
            );
        })
        .ok()?;

    if data.version != SESSION_VERSION {
        tracing::warn!(
            found = data.version,
            expected = SESSION_VERSION,
            "Session file version mismatch; starting fresh"
        );
        return None;
    }

    tracing::info!(path = %path.display(), "Session file loaded");
    Some(data)
}
