// LogPulse - app/state.rs
//
// Dashboard state owned by the eframe::App implementation.
//
// Wraps the view controller with the presentation-only state the panels
// need: text-input buffers, selection, dialogs, status line and warnings.
// Panels never mutate the controller directly; they queue `Action`s with
// `dispatch`, and the GUI shell applies them once per frame through
// `process`, which is also where the poll timer is ticked.

use crate::app::controller::{Action, Command, ViewController};
use crate::app::session::{self, SessionData};
use crate::core::model::LogRecord;
use crate::util::constants::MAX_WARNINGS;
use std::path::PathBuf;
use std::time::Instant;

/// Top-level application state.
#[derive(Debug)]
pub struct DashboardState {
    pub controller: ViewController,

    /// Actions queued by panels during the current frame.
    pending_actions: Vec<Action>,

    /// Text buffer behind the service input. Committed on Enter or focus loss.
    pub service_input: String,

    /// Text buffer behind the search input.
    pub search_input: String,

    /// Id of the selected record. Tracked by id rather than row index so
    /// the selection follows its record as pushed records shift the rows.
    pub selected_id: Option<String>,

    /// Status message for user-initiated operations (export, copy).
    pub status_message: String,

    /// Non-fatal warnings (config validation, rejected payloads).
    pub warnings: Vec<String>,

    pub show_about: bool,
    pub show_summary: bool,

    pub dark_mode: bool,
    pub font_size: f32,

    /// Whether debug mode is enabled.
    pub debug_mode: bool,

    /// Where the session is saved on exit; `None` disables persistence.
    pub session_path: Option<PathBuf>,
}

impl DashboardState {
    pub fn new(controller: ViewController, debug_mode: bool) -> Self {
        let service_input = controller.filter().service().unwrap_or_default().to_string();
        let search_input = controller.filter().search().unwrap_or_default().to_string();
        Self {
            controller,
            pending_actions: Vec::new(),
            service_input,
            search_input,
            selected_id: None,
            status_message: "Connecting to backend...".to_string(),
            warnings: Vec::new(),
            show_about: false,
            show_summary: false,
            dark_mode: true,
            font_size: crate::util::constants::DEFAULT_FONT_SIZE,
            debug_mode,
            session_path: None,
        }
    }

    /// Queue an action for the next `process` call.
    pub fn dispatch(&mut self, action: Action) {
        self.pending_actions.push(action);
    }

    /// Apply every queued action plus a timer tick at `now`, returning the
    /// commands the shell must execute.
    pub fn process(&mut self, now: Instant) -> Vec<Command> {
        let mut commands = Vec::new();
        for action in std::mem::take(&mut self.pending_actions) {
            commands.extend(self.controller.apply(action, now));
        }
        commands.extend(self.controller.apply(Action::Tick, now));
        self.drop_stale_selection();
        commands
    }

    /// Apply one externally produced action (fetch result, stream message)
    /// immediately.
    pub fn apply(&mut self, action: Action, now: Instant) -> Vec<Command> {
        let commands = self.controller.apply(action, now);
        self.drop_stale_selection();
        commands
    }

    /// The selected record, if it is still visible.
    pub fn selected_record(&self) -> Option<&LogRecord> {
        let id = self.selected_id.as_deref()?;
        self.controller.visible().iter().find(|r| r.id == id)
    }

    /// Record a warning, keeping at most `MAX_WARNINGS` (oldest dropped).
    pub fn push_warning(&mut self, message: String) {
        if self.warnings.len() >= MAX_WARNINGS {
            self.warnings.remove(0);
        }
        self.warnings.push(message);
    }

    /// Plain-text report of the visible slice, one record per line.
    pub fn visible_report(&self) -> String {
        let mut out = String::new();
        for r in self.controller.visible().iter() {
            out.push_str(&format!(
                "{} [{}] {}: {}\n",
                r.timestamp.format("%Y-%m-%d %H:%M:%S"),
                r.level,
                r.service,
                r.message
            ));
        }
        out
    }

    /// Persist the filter selection and mode. Failures are logged only.
    pub fn save_session(&self) {
        let Some(ref path) = self.session_path else {
            return;
        };
        let data = SessionData::capture(self.controller.filter(), self.controller.is_realtime());
        if let Err(e) = session::save(&data, path) {
            tracing::warn!(error = %e, "Failed to save session");
        }
    }

    fn drop_stale_selection(&mut self) {
        if self.selected_id.is_some() && self.selected_record().is_none() {
            self.selected_id = None;
        }
    }
}
