// LogPulse - tests/e2e_reconciliation.rs
//
// End-to-end tests for merging pushed records with fetched snapshots.
//
// These drive the public controller API the way the GUI shell does:
// actions in, commands out, commands executed against a snapshot source.
// Time is passed explicitly so poll timing is deterministic.

use logpulse::app::controller::{Action, Command, ControllerConfig, ViewController};
use logpulse::app::fetcher::{FetchManager, FetchOutcome, SnapshotSource};
use logpulse::core::filter::{matches, FilterSpec};
use logpulse::core::model::{
    Level, LevelCounts, LogPage, LogRecord, Pagination, StatsSnapshot, StreamProgress,
};
use logpulse::util::error::FetchError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// =============================================================================
// Helpers
// =============================================================================

fn record(id: &str, level: Level, service: &str, message: &str) -> LogRecord {
    LogRecord {
        id: id.to_string(),
        timestamp: chrono::DateTime::from_timestamp(1_710_000_000, 0).unwrap(),
        level,
        service: service.to_string(),
        message: message.to_string(),
    }
}

fn push(id: &str, level: Level) -> Action {
    Action::Stream(StreamProgress::NewLog {
        record: record(id, level, "api", "pushed"),
    })
}

/// Snapshot source that filters a fixed server-side data set, like the
/// real backend would, and counts requests.
struct FakeBackend {
    data: Mutex<Vec<LogRecord>>,
    log_requests: AtomicUsize,
}

impl FakeBackend {
    fn new(data: Vec<LogRecord>) -> Self {
        Self {
            data: Mutex::new(data),
            log_requests: AtomicUsize::new(0),
        }
    }
}

impl SnapshotSource for FakeBackend {
    fn fetch_logs(&self, filter: &FilterSpec) -> Result<LogPage, FetchError> {
        self.log_requests.fetch_add(1, Ordering::SeqCst);
        let data = self.data.lock().unwrap();
        let all: Vec<_> = data.iter().filter(|r| matches(r, filter)).cloned().collect();
        let limit = filter.limit() as usize;
        let start = (filter.page() as usize - 1) * limit;
        let records: Vec<_> = all.iter().skip(start).take(limit).cloned().collect();
        Ok(LogPage {
            records,
            pagination: Pagination {
                page: filter.page(),
                pages: all.len().div_ceil(limit) as u32,
                total: all.len() as u64,
            },
            rejected: 0,
        })
    }

    fn fetch_stats(&self, _window_secs: u64) -> Result<StatsSnapshot, FetchError> {
        let data = self.data.lock().unwrap();
        let count = |l: Level| data.iter().filter(|r| r.level == l).count() as u64;
        Ok(StatsSnapshot {
            total: data.len() as u64,
            counts: LevelCounts {
                info: count(Level::Info),
                warn: count(Level::Warn),
                error: count(Level::Error),
            },
            error_rate: None,
        })
    }
}

/// Execute commands synchronously and feed the results back.
fn run(ctl: &mut ViewController, backend: &FakeBackend, commands: Vec<Command>, now: Instant) {
    let mut queue = commands;
    while !queue.is_empty() {
        let mut next = Vec::new();
        for command in queue {
            let action = match command {
                Command::FetchLogs { seq, filter } => Action::LogsFetched {
                    seq,
                    result: backend.fetch_logs(&filter),
                },
                Command::FetchStats { seq, window_secs } => Action::StatsFetched {
                    seq,
                    result: backend.fetch_stats(window_secs),
                },
            };
            next.extend(ctl.apply(action, now));
        }
        queue = next;
    }
}

fn visible_ids(ctl: &ViewController) -> Vec<String> {
    ctl.visible().iter().map(|r| r.id.clone()).collect()
}

fn history_ids(ctl: &ViewController) -> Vec<String> {
    ctl.store().iter().map(|r| r.id.clone()).collect()
}

fn assert_consistent(ctl: &ViewController) {
    assert!(ctl.visible().is_consistent_with(ctl.store(), ctl.filter()));
    assert!(ctl.visible().len() <= ctl.filter().limit() as usize);
}

fn server_data() -> Vec<LogRecord> {
    vec![
        record("s1", Level::Info, "api", "request served"),
        record("s2", Level::Error, "auth", "Auth failed"),
        record("s3", Level::Warn, "api", "slow request"),
        record("s4", Level::Info, "billing", "invoice created"),
        record("s5", Level::Error, "billing", "charge declined"),
    ]
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn e2e_pushed_record_outside_filter_is_kept_but_hidden() {
    let now = Instant::now();
    let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), true);
    ctl.apply(Action::SetLevel(Some(Level::Info)), now);

    ctl.apply(push("e1", Level::Error), now);

    assert_eq!(history_ids(&ctl), vec!["e1"]);
    assert!(ctl.visible().is_empty());
    assert_consistent(&ctl);

    // Clearing the filter reveals it without any fetch.
    assert!(ctl.apply(Action::SetLevel(None), now).is_empty());
    assert_eq!(visible_ids(&ctl), vec!["e1"]);
}

#[test]
fn e2e_push_while_polling_is_dropped() {
    let now = Instant::now();
    let backend = FakeBackend::new(server_data());
    let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), false);
    let commands = ctl.start(now);
    run(&mut ctl, &backend, commands, now);
    let before = history_ids(&ctl);

    ctl.apply(push("late", Level::Error), now);

    assert_eq!(history_ids(&ctl), before);
    assert_eq!(ctl.counters().dropped_while_polling, 1);
    assert_eq!(ctl.counters().pushed, 0);
}

#[test]
fn e2e_fetch_replaces_pushed_history() {
    let now = Instant::now();
    let backend = FakeBackend::new(vec![
        record("f1", Level::Info, "api", "one"),
        record("f2", Level::Warn, "api", "two"),
    ]);
    let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), true);
    for id in ["p1", "p2", "p3"] {
        ctl.apply(push(id, Level::Info), now);
    }
    assert_eq!(ctl.store().len(), 3);

    let commands = ctl.apply(Action::Refresh, now);
    run(&mut ctl, &backend, commands, now);

    assert_eq!(history_ids(&ctl), vec!["f1", "f2"]);
    assert_eq!(visible_ids(&ctl), vec!["f1", "f2"]);
    assert_consistent(&ctl);
}

#[test]
fn e2e_search_is_case_insensitive_across_sources() {
    let now = Instant::now();
    let backend = FakeBackend::new(server_data());
    let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), false);
    let commands = ctl.apply(Action::SetSearch(Some("auth".into())), now);
    run(&mut ctl, &backend, commands, now);
    assert_eq!(visible_ids(&ctl), vec!["s2"]);

    // Same predicate for pushed records once real-time is on.
    ctl.apply(Action::SetRealtime(true), now);
    ctl.apply(
        Action::Stream(StreamProgress::NewLog {
            record: record("p1", Level::Warn, "gateway", "AUTHORIZATION header missing"),
        }),
        now,
    );
    ctl.apply(
        Action::Stream(StreamProgress::NewLog {
            record: record("p2", Level::Info, "gateway", "ok"),
        }),
        now,
    );
    assert_eq!(visible_ids(&ctl), vec!["p1", "s2"]);
    assert_consistent(&ctl);
}

#[test]
fn e2e_polling_cycle_and_mode_toggle() {
    let start = Instant::now();
    let backend = FakeBackend::new(server_data());
    let config = ControllerConfig {
        poll_interval: Duration::from_secs(5),
        ..ControllerConfig::default()
    };
    let mut ctl = ViewController::new(config, FilterSpec::new(2), false);
    let commands = ctl.start(start);
    run(&mut ctl, &backend, commands, start);
    assert_eq!(backend.log_requests.load(Ordering::SeqCst), 1);
    assert_eq!(visible_ids(&ctl), vec!["s1", "s2"]);
    assert_eq!(ctl.stats().map(|s| s.total), Some(5));

    // Two intervals elapse: one poll per tick that is due.
    for secs in [1, 5, 6, 10] {
        let now = start + Duration::from_secs(secs);
        let commands = ctl.apply(Action::Tick, now);
        run(&mut ctl, &backend, commands, now);
    }
    assert_eq!(backend.log_requests.load(Ordering::SeqCst), 3);

    // Page change in polling mode fetches the next page.
    let now = start + Duration::from_secs(11);
    let commands = ctl.apply(Action::SetPage(2), now);
    run(&mut ctl, &backend, commands, now);
    assert_eq!(visible_ids(&ctl), vec!["s3", "s4"]);
    let (pagination, stale) = ctl.pagination().unwrap();
    assert_eq!((pagination.page, pagination.pages, stale), (2, 3, false));

    // Real-time: no polling, pagination stale, page changes do not fetch.
    ctl.apply(Action::SetRealtime(true), now);
    assert!(ctl.pagination().unwrap().1);
    let later = now + Duration::from_secs(60);
    assert!(ctl.apply(Action::Tick, later).is_empty());
    assert!(ctl.apply(Action::SetPage(3), later).is_empty());
    assert_eq!(backend.log_requests.load(Ordering::SeqCst), 4);

    // Back to polling: immediate logs and stats fetch.
    let commands = ctl.apply(Action::SetRealtime(false), later);
    assert_eq!(commands.len(), 2);
    run(&mut ctl, &backend, commands, later);
    assert_eq!(backend.log_requests.load(Ordering::SeqCst), 5);
    assert!(!ctl.pagination().unwrap().1);
}

#[test]
fn e2e_out_of_order_responses_keep_latest_filter() {
    let now = Instant::now();
    let backend = FakeBackend::new(server_data());
    let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), false);

    // Three quick filter edits; responses come back newest first.
    let mut pending = Vec::new();
    for level in [Level::Info, Level::Warn, Level::Error] {
        pending.extend(ctl.apply(Action::SetLevel(Some(level)), now));
    }
    pending.reverse();
    for command in pending {
        if let Command::FetchLogs { seq, filter } = command {
            ctl.apply(
                Action::LogsFetched {
                    seq,
                    result: backend.fetch_logs(&filter),
                },
                now,
            );
        }
    }

    assert_eq!(visible_ids(&ctl), vec!["s2", "s5"]);
    assert_eq!(ctl.counters().stale_responses, 2);
    assert!(!ctl.is_loading());
}

#[test]
fn e2e_interleaved_pushes_and_edits_stay_consistent() {
    let now = Instant::now();
    let config = ControllerConfig {
        max_history: 7,
        ..ControllerConfig::default()
    };
    let mut ctl = ViewController::new(config, FilterSpec::new(3), true);
    let levels = [Level::Info, Level::Error, Level::Warn, Level::Error];

    for i in 0..60 {
        let level = levels[i % levels.len()];
        ctl.apply(push(&format!("r{i}"), level), now);
        match i % 9 {
            2 => {
                ctl.apply(Action::SetLevel(Some(Level::Error)), now);
            }
            5 => {
                ctl.apply(Action::SetLimit(if i % 2 == 0 { 2 } else { 4 }), now);
            }
            7 => {
                ctl.apply(Action::SetLevel(None), now);
            }
            _ => {}
        }
        assert_consistent(&ctl);
        assert!(ctl.store().len() <= 7);
    }
}

#[test]
fn e2e_stats_update_accepted_in_both_modes() {
    let now = Instant::now();
    let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), false);
    let stats = StatsSnapshot {
        total: 9,
        counts: LevelCounts {
            info: 5,
            warn: 3,
            error: 1,
        },
        error_rate: Some(11.1),
    };
    ctl.apply(
        Action::Stream(StreamProgress::StatsUpdate {
            stats: stats.clone(),
        }),
        now,
    );
    assert_eq!(ctl.stats(), Some(&stats));
}

#[test]
fn e2e_stats_push_wins_over_slower_snapshot() {
    let now = Instant::now();
    let backend = FakeBackend::new(server_data());
    let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::default(), true);

    // Hold the startup requests back while a statsUpdate is pushed.
    let startup = ctl.start(now);
    let pushed = StatsSnapshot {
        total: 1_000,
        counts: LevelCounts {
            info: 900,
            warn: 90,
            error: 10,
        },
        error_rate: Some(1.0),
    };
    ctl.apply(
        Action::Stream(StreamProgress::StatsUpdate {
            stats: pushed.clone(),
        }),
        now,
    );
    run(&mut ctl, &backend, startup, now);
    assert_eq!(ctl.stats(), Some(&pushed));

    // A snapshot requested after the push is newer and replaces it.
    let commands = ctl.apply(Action::Refresh, now);
    run(&mut ctl, &backend, commands, now);
    assert_eq!(ctl.stats(), Some(&backend.fetch_stats(60).unwrap()));
}

#[test]
fn e2e_fetch_manager_round_trip() {
    let now = Instant::now();
    let backend = Arc::new(FakeBackend::new(server_data()));
    let manager = FetchManager::new(backend.clone());
    let mut ctl = ViewController::new(ControllerConfig::default(), FilterSpec::new(3), false);

    for command in ctl.start(now) {
        match command {
            Command::FetchLogs { seq, filter } => manager.request_logs(seq, filter),
            Command::FetchStats { seq, window_secs } => manager.request_stats(seq, window_secs),
        }
    }

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut received = 0;
    while received < 2 && Instant::now() < deadline {
        for outcome in manager.poll_results(10) {
            received += 1;
            let action = match outcome {
                FetchOutcome::Logs { seq, result } => Action::LogsFetched { seq, result },
                FetchOutcome::Stats { seq, result } => Action::StatsFetched { seq, result },
            };
            ctl.apply(action, now);
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(received, 2);
    assert_eq!(visible_ids(&ctl), vec!["s1", "s2", "s3"]);
    assert_eq!(ctl.stats().map(|s| s.counts.error), Some(2));
}
