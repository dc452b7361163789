// LogPulse - core/filter.rs
//
// Filter specification and the record predicate.
// All set constraints are AND-combined; unset fields impose no constraint.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::model::{Level, LogRecord};
use crate::util::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};

/// Active filter and pagination selection.
///
/// Fields are private so the page-reset rule cannot be bypassed: any change
/// to level, service, search or limit moves back to page 1, because page
/// numbers are only meaningful for a fixed filter set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    level: Option<Level>,
    service: Option<String>,
    search: Option<String>,
    /// Lower-cased copy of `search`, computed once per change.
    search_folded: Option<String>,
    limit: u32,
    page: u32,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FilterSpec {
    /// No constraints, page 1 with the given page size (clamped).
    pub fn new(limit: u32) -> Self {
        Self {
            level: None,
            service: None,
            search: None,
            search_folded: None,
            limit: clamp_limit(limit),
            page: 1,
        }
    }

    pub fn level(&self) -> Option<Level> {
        self.level
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Page size and upper bound on the visible slice length.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Current page, 1-based.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Returns true if no record constraint is set.
    pub fn is_unfiltered(&self) -> bool {
        self.level.is_none() && self.service.is_none() && self.search.is_none()
    }

    /// Set the level constraint. Returns true if the filter changed.
    pub fn set_level(&mut self, level: Option<Level>) -> bool {
        if self.level == level {
            return false;
        }
        self.level = level;
        self.page = 1;
        true
    }

    /// Set the service constraint. Blank input clears it.
    /// Returns true if the filter changed.
    pub fn set_service(&mut self, service: Option<&str>) -> bool {
        let service = normalise(service);
        if self.service == service {
            return false;
        }
        self.service = service;
        self.page = 1;
        true
    }

    /// Set the message search. Empty input clears it; the text is otherwise
    /// kept verbatim, surrounding whitespace included.
    /// Returns true if the filter changed.
    pub fn set_search(&mut self, search: Option<&str>) -> bool {
        let search = search.filter(|s| !s.is_empty()).map(str::to_string);
        if self.search == search {
            return false;
        }
        self.search_folded = search.as_ref().map(|s| s.to_lowercase());
        self.search = search;
        self.page = 1;
        true
    }

    /// Set the page size (clamped to the accepted range).
    /// Returns true if the filter changed.
    pub fn set_limit(&mut self, limit: u32) -> bool {
        let limit = clamp_limit(limit);
        if self.limit == limit {
            return false;
        }
        self.limit = limit;
        self.page = 1;
        true
    }

    /// Move to another page. Page 0 is treated as page 1.
    /// Returns true if the filter changed.
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if self.page == page {
            return false;
        }
        self.page = page;
        true
    }

    /// Query parameters for the snapshot endpoint.
    ///
    /// Only non-empty fields are sent. Numeric fields equal to zero are
    /// omitted by the same rule, although the setters never produce them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(5);
        if let Some(level) = self.level {
            pairs.push(("level", level.as_str().to_string()));
        }
        if let Some(ref service) = self.service {
            pairs.push(("service", service.clone()));
        }
        if let Some(ref search) = self.search {
            pairs.push(("search", search.clone()));
        }
        if self.limit != 0 {
            pairs.push(("limit", self.limit.to_string()));
        }
        if self.page != 0 {
            pairs.push(("page", self.page.to_string()));
        }
        pairs
    }
}

/// Decide whether `record` satisfies every set constraint of `filter`.
///
/// Level and service compare exactly; search is a case-insensitive substring
/// match against the message.
pub fn matches(record: &LogRecord, filter: &FilterSpec) -> bool {
    if let Some(level) = filter.level {
        if record.level != level {
            return false;
        }
    }

    if let Some(ref service) = filter.service {
        if record.service != *service {
            return false;
        }
    }

    if let Some(ref needle) = filter.search_folded {
        if !record.message.to_lowercase().contains(needle.as_str()) {
            return false;
        }
    }

    true
}

fn normalise(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn make_record(id: &str, level: Level, service: &str, message: &str) -> LogRecord {
        LogRecord {
            id: id.to_string(),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            level,
            service: service.to_string(),
            message: message.to_string(),
        }
    }

    /// Every subset of {level, service, search} is checked against records
    /// that satisfy all, some, or none of the constraints: `matches` must be
    /// true exactly when each set field is satisfied.
    #[test]
    fn test_all_field_combinations_are_conjunctive() {
        let records = [
            make_record("1", Level::Error, "auth", "Login failed"),
            make_record("2", Level::Error, "billing", "Login failed"),
            make_record("3", Level::Info, "auth", "Login failed"),
            make_record("4", Level::Error, "auth", "Token refreshed"),
            make_record("5", Level::Warn, "billing", "Slow query"),
        ];

        for mask in 0u8..8 {
            let use_level = mask & 0b001 != 0;
            let use_service = mask & 0b010 != 0;
            let use_search = mask & 0b100 != 0;

            let mut filter = FilterSpec::default();
            if use_level {
                filter.set_level(Some(Level::Error));
            }
            if use_service {
                filter.set_service(Some("auth"));
            }
            if use_search {
                filter.set_search(Some("LOGIN"));
            }

            for record in &records {
                let expected = (!use_level || record.level == Level::Error)
                    && (!use_service || record.service == "auth")
                    && (!use_search || record.message.to_lowercase().contains("login"));
                assert_eq!(
                    matches(record, &filter),
                    expected,
                    "mask {mask:03b}, record {}",
                    record.id
                );
            }
        }
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let record = make_record("1", Level::Error, "auth", "Auth failed");
        let mut filter = FilterSpec::default();
        filter.set_search(Some("auth"));
        assert!(matches(&record, &filter));
        filter.set_search(Some("FAIL"));
        assert!(matches(&record, &filter));
        filter.set_search(Some("denied"));
        assert!(!matches(&record, &filter));
    }

    #[test]
    fn test_service_match_is_exact() {
        let record = make_record("1", Level::Info, "auth-service", "ok");
        let mut filter = FilterSpec::default();
        filter.set_service(Some("auth"));
        assert!(!matches(&record, &filter));
        filter.set_service(Some("Auth-Service"));
        assert!(!matches(&record, &filter));
        filter.set_service(Some("auth-service"));
        assert!(matches(&record, &filter));
    }

    #[test]
    fn test_blank_fields_impose_no_constraint() {
        let record = make_record("1", Level::Warn, "api", "anything");
        let mut filter = FilterSpec::default();
        filter.set_service(Some("   "));
        filter.set_search(Some(""));
        assert!(filter.is_unfiltered());
        assert!(matches(&record, &filter));
    }

    #[test]
    fn test_changing_constraints_resets_page() {
        let mut filter = FilterSpec::default();
        assert!(filter.set_page(4));
        assert!(filter.set_level(Some(Level::Warn)));
        assert_eq!(filter.page(), 1);

        filter.set_page(3);
        filter.set_service(Some("api"));
        assert_eq!(filter.page(), 1);

        filter.set_page(3);
        filter.set_search(Some("timeout"));
        assert_eq!(filter.page(), 1);

        filter.set_page(3);
        filter.set_limit(10);
        assert_eq!(filter.page(), 1);
    }

    #[test]
    fn test_unchanged_value_does_not_reset_page() {
        let mut filter = FilterSpec::default();
        filter.set_level(Some(Level::Info));
        filter.set_page(2);
        assert!(!filter.set_level(Some(Level::Info)));
        assert_eq!(filter.page(), 2);
    }

    #[test]
    fn test_limit_and_page_are_clamped() {
        let mut filter = FilterSpec::new(0);
        assert_eq!(filter.limit(), MIN_PAGE_SIZE);
        filter.set_limit(u32::MAX);
        assert_eq!(filter.limit(), MAX_PAGE_SIZE);
        filter.set_page(0);
        assert_eq!(filter.page(), 1);
    }

    #[test]
    fn test_query_pairs_omit_unset_fields() {
        let filter = FilterSpec::new(25);
        assert_eq!(
            filter.query_pairs(),
            vec![("limit", "25".to_string()), ("page", "1".to_string())]
        );

        let mut filter = FilterSpec::new(25);
        filter.set_level(Some(Level::Error));
        filter.set_service(Some("auth"));
        filter.set_search(Some("token"));
        filter.set_page(3);
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("level", "ERROR".to_string()),
                ("service", "auth".to_string()),
                ("search", "token".to_string()),
                ("limit", "25".to_string()),
                ("page", "3".to_string()),
            ]
        );
    }
}
