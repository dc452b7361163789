// LogPulse - app/controller.rs
//
// View controller: the single state container of the dashboard and the one
// entry point through which it changes.
//
// Every input (user edits, timer ticks, fetch results, stream messages) is
// an `Action` passed to `ViewController::apply`. The controller performs no
// I/O itself; it returns `Command`s that the GUI shell executes with the
// fetch manager. With time supplied as an explicit `Instant`, the whole
// reconciliation engine runs deterministically under test.
//
// Invariant maintained after every action:
//
//     visible == store.visible_slice(filter)
//
// Pushed records take the incremental path (`VisibleSlice::on_prepend`);
// every other change rebuilds the slice. Debug builds assert the invariant.

use crate::core::filter::FilterSpec;
use crate::core::model::{
    ConnectionStatus, Level, LogPage, LogRecord, Pagination, StatsSnapshot, StreamProgress,
};
use crate::core::store::{LogStore, VisibleSlice};
use crate::util::constants;
use crate::util::error::FetchError;
use std::time::{Duration, Instant};

// =============================================================================
// Public types
// =============================================================================

/// Input to the controller.
#[derive(Debug)]
pub enum Action {
    SetLevel(Option<Level>),
    SetService(Option<String>),
    SetSearch(Option<String>),
    SetLimit(u32),
    SetPage(u32),
    /// Toggle between push-driven (true) and polling (false) modes.
    SetRealtime(bool),
    /// User asked for an immediate snapshot.
    Refresh,
    /// Timer check; issues a poll when one is due.
    Tick,
    /// A log page request completed.
    LogsFetched {
        seq: u64,
        result: Result<LogPage, FetchError>,
    },
    /// A stats request completed.
    StatsFetched {
        seq: u64,
        result: Result<StatsSnapshot, FetchError>,
    },
    /// A message from the event stream.
    Stream(StreamProgress),
}

/// Side effect requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchLogs { seq: u64, filter: FilterSpec },
    FetchStats { seq: u64, window_secs: u64 },
}

/// Tunables for the controller, taken from the validated app config.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub poll_interval: Duration,
    pub stats_window_secs: u64,
    pub max_history: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(constants::DEFAULT_POLL_INTERVAL_SECS),
            stats_window_secs: constants::DEFAULT_STATS_WINDOW_SECS,
            max_history: constants::DEFAULT_MAX_HISTORY,
        }
    }
}

/// Counters shown in the status bar and summary window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounters {
    /// Pushed records accepted into the history.
    pub pushed: u64,
    /// Pushed records dropped because real-time mode was off.
    pub dropped_while_polling: u64,
    /// Records or stream events rejected by validation.
    pub rejected: u64,
    /// Responses discarded because newer data had been requested or pushed.
    pub stale_responses: u64,
}

// =============================================================================
// ViewController
// =============================================================================

#[derive(Debug)]
pub struct ViewController {
    config: ControllerConfig,
    filter: FilterSpec,
    store: LogStore,
    visible: VisibleSlice,
    stats: Option<StatsSnapshot>,
    realtime: bool,
    /// Next poll deadline; `None` while real-time mode is active.
    next_poll_at: Option<Instant>,
    /// Pagination was reported before real-time mode began and no longer
    /// describes what is shown.
    pagination_stale: bool,
    /// Sequence number of the most recently issued log request.
    issued_seq: u64,
    /// Sequence number of the most recently issued stats request.
    stats_seq: u64,
    /// Stats requests up to this sequence number were overtaken by a
    /// pushed `statsUpdate`.
    stats_pushed_through: u64,
    loading: bool,
    last_error: Option<String>,
    connection: ConnectionStatus,
    counters: SessionCounters,
}

impl ViewController {
    pub fn new(config: ControllerConfig, filter: FilterSpec, realtime: bool) -> Self {
        let store = LogStore::new(config.max_history);
        let mut visible = VisibleSlice::new();
        visible.recompute(&store, &filter);
        Self {
            config,
            filter,
            store,
            visible,
            stats: None,
            realtime,
            next_poll_at: None,
            pagination_stale: false,
            issued_seq: 0,
            stats_seq: 0,
            stats_pushed_through: 0,
            loading: false,
            last_error: None,
            connection: ConnectionStatus::default(),
            counters: SessionCounters::default(),
        }
    }

    /// Initial load: one snapshot of logs and stats in either mode, and the
    /// poll timer when starting in polling mode.
    pub fn start(&mut self, now: Instant) -> Vec<Command> {
        tracing::info!(realtime = self.realtime, "Dashboard session starting");
        let commands = self.snapshot_commands();
        if !self.realtime {
            self.next_poll_at = Some(now + self.config.poll_interval);
        }
        commands
    }

    /// Apply one action and return the commands it triggers.
    pub fn apply(&mut self, action: Action, now: Instant) -> Vec<Command> {
        let commands = match action {
            Action::SetLevel(level) => {
                let changed = self.filter.set_level(level);
                self.on_filter_changed(changed, now)
            }
            Action::SetService(service) => {
                let changed = self.filter.set_service(service.as_deref());
                self.on_filter_changed(changed, now)
            }
            Action::SetSearch(search) => {
                let changed = self.filter.set_search(search.as_deref());
                self.on_filter_changed(changed, now)
            }
            Action::SetLimit(limit) => {
                let changed = self.filter.set_limit(limit);
                self.on_filter_changed(changed, now)
            }
            Action::SetPage(page) => {
                let changed = self.filter.set_page(page);
                self.on_filter_changed(changed, now)
            }
            Action::SetRealtime(enabled) => self.set_realtime(enabled, now),
            Action::Refresh => {
                if !self.realtime {
                    self.next_poll_at = Some(now + self.config.poll_interval);
                }
                self.snapshot_commands()
            }
            Action::Tick => self.tick(now),
            Action::LogsFetched { seq, result } => {
                self.on_logs_fetched(seq, result);
                Vec::new()
            }
            Action::StatsFetched { seq, result } => {
                self.on_stats_fetched(seq, result);
                Vec::new()
            }
            Action::Stream(progress) => {
                self.on_stream(progress);
                Vec::new()
            }
        };

        debug_assert!(
            self.visible.is_consistent_with(&self.store, &self.filter),
            "visible slice diverged from a full recompute"
        );
        commands
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    fn on_filter_changed(&mut self, changed: bool, now: Instant) -> Vec<Command> {
        if !changed {
            return Vec::new();
        }
        self.recompute();
        if self.realtime {
            // The history only holds what was fetched or pushed; nothing to
            // re-request for a new page or filter while push-driven.
            return Vec::new();
        }
        self.next_poll_at = Some(now + self.config.poll_interval);
        vec![self.issue_logs_fetch()]
    }

    fn set_realtime(&mut self, enabled: bool, now: Instant) -> Vec<Command> {
        if self.realtime == enabled {
            return Vec::new();
        }
        self.realtime = enabled;
        if enabled {
            tracing::info!("Switched to real-time mode; polling stopped");
            self.next_poll_at = None;
            self.pagination_stale = self.store.pagination().is_some();
            Vec::new()
        } else {
            tracing::info!(
                interval_secs = self.config.poll_interval.as_secs(),
                "Switched to polling mode"
            );
            self.next_poll_at = Some(now + self.config.poll_interval);
            self.snapshot_commands()
        }
    }

    fn tick(&mut self, now: Instant) -> Vec<Command> {
        match self.next_poll_at {
            Some(due) if !self.realtime && now >= due => {
                self.next_poll_at = Some(now + self.config.poll_interval);
                tracing::trace!("Poll timer fired");
                self.snapshot_commands()
            }
            _ => Vec::new(),
        }
    }

    fn on_logs_fetched(&mut self, seq: u64, result: Result<LogPage, FetchError>) {
        if seq < self.issued_seq {
            self.counters.stale_responses += 1;
            tracing::debug!(
                seq,
                latest = self.issued_seq,
                "Discarding log response overtaken by a newer request"
            );
            return;
        }
        self.loading = false;

        match result {
            Ok(page) => {
                tracing::debug!(
                    seq,
                    count = page.records.len(),
                    replaced = self.store.len(),
                    "Applying log snapshot"
                );
                self.counters.rejected += page.rejected as u64;
                self.store.replace_all(page.records, page.pagination);
                self.pagination_stale = false;
                self.last_error = None;
                self.recompute();
            }
            Err(e) => {
                tracing::warn!(seq, error = %e, "Log fetch failed; keeping previous data");
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn on_stats_fetched(&mut self, seq: u64, result: Result<StatsSnapshot, FetchError>) {
        if seq < self.stats_seq || seq <= self.stats_pushed_through {
            self.counters.stale_responses += 1;
            tracing::debug!(
                seq,
                latest = self.stats_seq,
                pushed_through = self.stats_pushed_through,
                "Discarding stats response overtaken by newer stats"
            );
            return;
        }
        match result {
            Ok(stats) => self.stats = Some(stats),
            Err(e) => {
                tracing::warn!(error = %e, "Stats fetch failed; keeping previous stats");
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn on_stream(&mut self, progress: StreamProgress) {
        match progress {
            StreamProgress::Connected => {
                self.connection = ConnectionStatus::Connected;
            }
            StreamProgress::NewLog { record } => self.on_new_log(record),
            StreamProgress::StatsUpdate { stats } => {
                self.stats = Some(stats);
                self.stats_pushed_through = self.stats_seq;
            }
            StreamProgress::Malformed { .. } => {
                self.counters.rejected += 1;
            }
            StreamProgress::Disconnected {
                attempt, delay_ms, ..
            } => {
                self.connection = ConnectionStatus::Reconnecting { attempt, delay_ms };
            }
            StreamProgress::Stopped => {
                self.connection = ConnectionStatus::Stopped;
            }
        }
    }

    fn on_new_log(&mut self, record: LogRecord) {
        if !self.realtime {
            self.counters.dropped_while_polling += 1;
            tracing::trace!(id = %record.id, "Dropping pushed record while polling");
            return;
        }
        self.counters.pushed += 1;
        let evicted = self.store.prepend(record.clone());
        self.visible
            .on_prepend(&record, evicted.as_ref(), &self.filter);
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn recompute(&mut self) {
        self.visible.recompute(&self.store, &self.filter);
    }

    fn issue_logs_fetch(&mut self) -> Command {
        self.issued_seq += 1;
        self.loading = true;
        Command::FetchLogs {
            seq: self.issued_seq,
            filter: self.filter.clone(),
        }
    }

    fn issue_stats_fetch(&mut self) -> Command {
        self.stats_seq += 1;
        Command::FetchStats {
            seq: self.stats_seq,
            window_secs: self.config.stats_window_secs,
        }
    }

    fn snapshot_commands(&mut self) -> Vec<Command> {
        vec![
            self.issue_logs_fetch(),
            self.issue_stats_fetch(),
        ]
    }

    // -------------------------------------------------------------------------
    // Read access for rendering
    // -------------------------------------------------------------------------

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn visible(&self) -> &VisibleSlice {
        &self.visible
    }

    pub fn store(&self) -> &LogStore {
        &self.store
    }

    pub fn stats(&self) -> Option<&StatsSnapshot> {
        self.stats.as_ref()
    }

    pub fn is_realtime(&self) -> bool {
        self.realtime
    }

    /// Pagination from the last snapshot, with a flag telling whether it
    /// predates the current real-time session.
    pub fn pagination(&self) -> Option<(Pagination, bool)> {
        self.store
            .pagination()
            .map(|p| (p, self.pagination_stale))
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn connection(&self) -> &ConnectionStatus {
        &self.connection
    }

    pub fn counters(&self) -> SessionCounters {
        self.counters
    }

    pub fn next_poll_at(&self) -> Option<Instant> {
        self.next_poll_at
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn rec(id: &str, level: Level) -> LogRecord {
        LogRecord {
            id: id.to_string(),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            level,
            service: "api".to_string(),
            message: format!("message {id}"),
        }
    }

    fn page(records: Vec<LogRecord>) -> LogPage {
        let total = records.len() as u64;
        LogPage {
            records,
            pagination: Pagination {
                page: 1,
                pages: 1,
                total,
            },
            rejected: 0,
        }
    }

    fn last_seq(commands: &[Command]) -> u64 {
        commands
            .iter()
            .find_map(|c| match c {
                Command::FetchLogs { seq, .. } => Some(*seq),
                _ => None,
            })
            .expect("a log fetch was issued")
    }

    #[test]
    fn test_start_in_polling_mode_fetches_and_arms_timer() {
        let now = Instant::now();
        let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), false);
        let commands = ctl.start(now);
        assert_eq!(commands.len(), 2);
        assert!(matches!(
            commands[1],
            Command::FetchStats {
                seq: 1,
                window_secs: 60
            }
        ));
        assert!(ctl.is_loading());
        assert_eq!(ctl.next_poll_at(), Some(now + Duration::from_secs(5)));
    }

    #[test]
    fn test_tick_polls_only_when_due() {
        let now = Instant::now();
        let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), false);
        ctl.start(now);
        assert!(ctl.apply(Action::Tick, now + Duration::from_secs(4)).is_empty());
        let commands = ctl.apply(Action::Tick, now + Duration::from_secs(5));
        assert_eq!(commands.len(), 2);
        assert_eq!(ctl.next_poll_at(), Some(now + Duration::from_secs(10)));
    }

    #[test]
    fn test_filter_change_in_polling_mode_fetches_page_one() {
        let now = Instant::now();
        let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), false);
        ctl.start(now);
        ctl.apply(Action::SetPage(3), now);
        let commands = ctl.apply(Action::SetLevel(Some(Level::Warn)), now);
        match &commands[..] {
            [Command::FetchLogs { filter, .. }] => {
                assert_eq!(filter.page(), 1);
                assert_eq!(filter.level(), Some(Level::Warn));
            }
            other => panic!("unexpected commands {other:?}"),
        }
    }

    #[test]
    fn test_unchanged_filter_issues_nothing() {
        let now = Instant::now();
        let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), false);
        assert!(ctl.apply(Action::SetLevel(None), now).is_empty());
        assert!(ctl.apply(Action::SetSearch(Some(String::new())), now).is_empty());
    }

    #[test]
    fn test_realtime_mode_never_fetches_on_filter_or_page_change() {
        let now = Instant::now();
        let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), true);
        ctl.start(now);
        assert!(ctl.apply(Action::SetPage(2), now).is_empty());
        assert!(ctl.apply(Action::SetService(Some("api".into())), now).is_empty());
        assert!(ctl.apply(Action::Tick, now + Duration::from_secs(60)).is_empty());
    }

    #[test]
    fn test_toggle_modes_controls_timer_and_staleness() {
        let now = Instant::now();
        let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), false);
        let seq = last_seq(&ctl.start(now));
        ctl.apply(
            Action::LogsFetched {
                seq,
                result: Ok(page(vec![rec("1", Level::Info)])),
            },
            now,
        );
        assert_eq!(ctl.pagination().map(|(_, stale)| stale), Some(false));

        assert!(ctl.apply(Action::SetRealtime(true), now).is_empty());
        assert!(ctl.next_poll_at().is_none());
        assert_eq!(ctl.pagination().map(|(_, stale)| stale), Some(true));

        let commands = ctl.apply(Action::SetRealtime(false), now);
        assert_eq!(commands.len(), 2);
        assert!(ctl.next_poll_at().is_some());
    }

    #[test]
    fn test_fetch_failure_keeps_previous_data() {
        let now = Instant::now();
        let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), false);
        let seq = last_seq(&ctl.start(now));
        ctl.apply(
            Action::LogsFetched {
                seq,
                result: Ok(page(vec![rec("1", Level::Info), rec("2", Level::Warn)])),
            },
            now,
        );

        let seq = last_seq(&ctl.apply(Action::Refresh, now));
        ctl.apply(
            Action::LogsFetched {
                seq,
                result: Err(FetchError::Status {
                    url: "http://backend/logs".into(),
                    status: 500,
                }),
            },
            now,
        );
        assert_eq!(ctl.visible().len(), 2);
        assert!(!ctl.is_loading());
        assert!(ctl.last_error().unwrap().contains("500"));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let now = Instant::now();
        let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), false);
        let first = last_seq(&ctl.start(now));
        let second = last_seq(&ctl.apply(Action::SetLevel(Some(Level::Error)), now));
        assert!(second > first);

        // Newer response lands first, then the older one.
        ctl.apply(
            Action::LogsFetched {
                seq: second,
                result: Ok(page(vec![rec("e1", Level::Error)])),
            },
            now,
        );
        ctl.apply(
            Action::LogsFetched {
                seq: first,
                result: Ok(page(vec![rec("i1", Level::Info), rec("i2", Level::Info)])),
            },
            now,
        );
        let ids: Vec<_> = ctl.store().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["e1"]);
        assert_eq!(ctl.counters().stale_responses, 1);
    }

    fn stats_seq(commands: &[Command]) -> u64 {
        commands
            .iter()
            .find_map(|c| match c {
                Command::FetchStats { seq, .. } => Some(*seq),
                _ => None,
            })
            .unwrap()
    }

    fn totals(total: u64) -> StatsSnapshot {
        StatsSnapshot {
            total,
            ..StatsSnapshot::default()
        }
    }

    #[test]
    fn test_slow_stats_response_does_not_overwrite_newer_stats() {
        let now = Instant::now();
        let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), true);
        let first = stats_seq(&ctl.start(now));

        // A push arrives while the request is in flight.
        ctl.apply(
            Action::Stream(StreamProgress::StatsUpdate { stats: totals(10) }),
            now,
        );
        ctl.apply(
            Action::StatsFetched {
                seq: first,
                result: Ok(totals(3)),
            },
            now,
        );
        assert_eq!(ctl.stats().unwrap().total, 10);
        assert_eq!(ctl.counters().stale_responses, 1);

        // Two refreshes answered out of order: only the newer one sticks.
        let second = stats_seq(&ctl.apply(Action::Refresh, now));
        let third = stats_seq(&ctl.apply(Action::Refresh, now));
        ctl.apply(
            Action::StatsFetched {
                seq: third,
                result: Ok(totals(30)),
            },
            now,
        );
        ctl.apply(
            Action::StatsFetched {
                seq: second,
                result: Ok(totals(20)),
            },
            now,
        );
        assert_eq!(ctl.stats().unwrap().total, 30);
        assert_eq!(ctl.counters().stale_responses, 2);
    }

    #[test]
    fn test_stream_status_tracking() {
        let now = Instant::now();
        let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), true);
        ctl.apply(Action::Stream(StreamProgress::Connected), now);
        assert_eq!(ctl.connection(), &ConnectionStatus::Connected);
        ctl.apply(
            Action::Stream(StreamProgress::Disconnected {
                error: "closed".into(),
                attempt: 2,
                delay_ms: 1_000,
            }),
            now,
        );
        assert_eq!(
            ctl.connection(),
            &ConnectionStatus::Reconnecting {
                attempt: 2,
                delay_ms: 1_000
            }
        );
        ctl.apply(
            Action::Stream(StreamProgress::Malformed {
                event: "newLog".into(),
                reason: "missing field".into(),
            }),
            now,
        );
        assert_eq!(ctl.counters().rejected, 1);
    }
}
