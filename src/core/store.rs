// LogPulse - core/store.rs
//
// Session history of log records and the derived visible slice.
//
// Two sources feed the history: REST snapshots (bulk replace) and pushed
// events (prepend). The visible slice is always defined as
//
//     visible = first `limit` records of history filtered by FilterSpec
//
// `LogStore::visible_slice` is the one authoritative derivation.
// `VisibleSlice` caches its result and offers an incremental update for
// pushed records that yields exactly what a full recompute would.
//
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::filter::{matches, FilterSpec};
use crate::core::model::{LogRecord, Pagination};
use std::collections::VecDeque;

// =============================================================================
// LogStore
// =============================================================================

/// Newest-first record history with oldest-eviction at a fixed capacity.
#[derive(Debug, Clone)]
pub struct LogStore {
    history: VecDeque<LogRecord>,
    capacity: usize,
    /// Pagination reported alongside the last snapshot, if any.
    pagination: Option<Pagination>,
}

impl LogStore {
    /// Create an empty store holding at most `capacity` records (min 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::new(),
            capacity: capacity.max(1),
            pagination: None,
        }
    }

    /// Replace the whole history (and pagination context) with a snapshot.
    ///
    /// Records pushed since the previous snapshot are discarded. If the
    /// snapshot exceeds the capacity only the newest records are kept.
    pub fn replace_all(&mut self, records: Vec<LogRecord>, pagination: Pagination) {
        let mut history: VecDeque<LogRecord> = records.into();
        if history.len() > self.capacity {
            tracing::warn!(
                received = history.len(),
                capacity = self.capacity,
                "Snapshot larger than history capacity; keeping newest records"
            );
            history.truncate(self.capacity);
        }
        self.history = history;
        self.pagination = Some(pagination);
    }

    /// Insert a pushed record at the front, regardless of any filter.
    ///
    /// Returns the oldest record if the insert pushed the history over
    /// capacity.
    pub fn prepend(&mut self, record: LogRecord) -> Option<LogRecord> {
        self.history.push_front(record);
        if self.history.len() > self.capacity {
            self.history.pop_back()
        } else {
            None
        }
    }

    /// Authoritative visible slice: matching records in newest-first order,
    /// truncated to `filter.limit()`.
    pub fn visible_slice(&self, filter: &FilterSpec) -> Vec<LogRecord> {
        self.history
            .iter()
            .filter(|r| matches(r, filter))
            .take(filter.limit() as usize)
            .cloned()
            .collect()
    }

    /// Number of records in the whole history that match `filter`.
    pub fn count_matching(&self, filter: &FilterSpec) -> usize {
        self.history.iter().filter(|r| matches(r, filter)).count()
    }

    /// Full history, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogRecord> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pagination from the last snapshot (`None` before the first one).
    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }
}

// =============================================================================
// VisibleSlice
// =============================================================================

/// Cached visible slice with an incremental path for pushed records.
///
/// Alongside the cached records it keeps the number of history records that
/// match the filter in use. That count is what makes the incremental path
/// exact when eviction removes a record that is also the last visible one.
#[derive(Debug, Clone, Default)]
pub struct VisibleSlice {
    records: VecDeque<LogRecord>,
    matching: usize,
}

impl VisibleSlice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from scratch. Required after any filter change or snapshot.
    pub fn recompute(&mut self, store: &LogStore, filter: &FilterSpec) {
        self.records = store.visible_slice(filter).into();
        self.matching = store.count_matching(filter);
    }

    /// Update after `store.prepend(record)` returned `evicted`, with `filter`
    /// unchanged since the last recompute.
    ///
    /// A prepended record is always the first element of the filtered
    /// history, and an evicted record matching the filter is always its last
    /// element, so the new slice is the old one with `record` in front,
    /// truncated to `min(limit, matching)`.
    pub fn on_prepend(
        &mut self,
        record: &LogRecord,
        evicted: Option<&LogRecord>,
        filter: &FilterSpec,
    ) {
        if matches(record, filter) {
            self.records.push_front(record.clone());
            self.matching += 1;
        }
        if let Some(old) = evicted {
            if matches(old, filter) {
                self.matching = self.matching.saturating_sub(1);
            }
        }
        let bound = (filter.limit() as usize).min(self.matching);
        self.records.truncate(bound);
    }

    /// True if the cached slice equals a full recompute. Used by tests and
    /// debug builds to guard the incremental path.
    pub fn is_consistent_with(&self, store: &LogStore, filter: &FilterSpec) -> bool {
        let expected = store.visible_slice(filter);
        self.records.len() == expected.len() && self.records.iter().eq(expected.iter())
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogRecord> {
        self.records.iter()
    }

    pub fn get(&self, index: usize) -> Option<&LogRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Owned copy of the slice, e.g. for export.
    pub fn to_vec(&self) -> Vec<LogRecord> {
        self.records.iter().cloned().collect()
    }
}
