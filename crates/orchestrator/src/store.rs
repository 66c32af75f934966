//! Reactive state store
//!
//! Holds everything the view reads. Derived views (`is_saved`,
//! `can_compare`) are computed from the current state on every read, and
//! every mutation publishes an [`Event`] so views can re-read on change.
//!
//! Each query kind hands out monotonically increasing request tickets.
//! Results, failures and flag resets carrying a ticket older than the
//! latest of their kind are discarded, so the state always reflects the
//! most recently started request of each kind.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use compass_core::{College, ComparisonAnalysis, SavedSelection};
use events::{Event, EventBus};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::QueryKind;

/// Read-only copy of the store for the view boundary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct StoreSnapshot {
    pub colleges: Vec<College>,
    pub comparison: Option<ComparisonAnalysis>,
    pub saved: Vec<College>,
    pub saved_names: Vec<String>,
    pub can_compare: bool,
    pub searching: bool,
    pub comparing: bool,
    pub error: Option<String>,
    pub show_comparison: bool,
}

#[derive(Debug, Default)]
struct StoreState {
    colleges: Vec<College>,
    comparison: Option<ComparisonAnalysis>,
    saved: SavedSelection,
    searching: bool,
    comparing: bool,
    error: Option<String>,
    show_comparison: bool,
    search_ticket: u64,
    compare_ticket: u64,
}

impl StoreState {
    fn ticket(&self, kind: QueryKind) -> u64 {
        match kind {
            QueryKind::Search => self.search_ticket,
            QueryKind::Compare => self.compare_ticket,
        }
    }

    fn in_flight_mut(&mut self, kind: QueryKind) -> &mut bool {
        match kind {
            QueryKind::Search => &mut self.searching,
            QueryKind::Compare => &mut self.comparing,
        }
    }
}

/// Shared handle to the application state
#[derive(Clone)]
pub struct StateStore {
    state: Arc<RwLock<StoreState>>,
    events: EventBus,
}

impl StateStore {
    pub fn new(events: EventBus) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            events,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // Reads

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.read();
        StoreSnapshot {
            colleges: state.colleges.clone(),
            comparison: state.comparison.clone(),
            saved: state.saved.as_slice().to_vec(),
            saved_names: state.saved.names(),
            can_compare: state.saved.can_compare(),
            searching: state.searching,
            comparing: state.comparing,
            error: state.error.clone(),
            show_comparison: state.show_comparison,
        }
    }

    pub fn colleges(&self) -> Vec<College> {
        self.read().colleges.clone()
    }

    pub fn comparison(&self) -> Option<ComparisonAnalysis> {
        self.read().comparison.clone()
    }

    pub fn saved(&self) -> SavedSelection {
        self.read().saved.clone()
    }

    pub fn is_saved(&self, college: &College) -> bool {
        self.read().saved.is_saved(college)
    }

    pub fn can_compare(&self) -> bool {
        self.read().saved.can_compare()
    }

    pub fn is_searching(&self) -> bool {
        self.read().searching
    }

    pub fn is_comparing(&self) -> bool {
        self.read().comparing
    }

    pub fn is_in_flight(&self, kind: QueryKind) -> bool {
        let state = self.read();
        match kind {
            QueryKind::Search => state.searching,
            QueryKind::Compare => state.comparing,
        }
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn show_comparison(&self) -> bool {
        self.read().show_comparison
    }

    /// Latest ticket handed out for `kind`, 0 before the first request
    pub fn current_ticket(&self, kind: QueryKind) -> u64 {
        self.read().ticket(kind)
    }

    // View mutations

    /// Save the college, or unsave it if its name is already saved.
    ///
    /// Returns whether the college is saved afterwards.
    pub fn toggle_save(&self, college: College) -> bool {
        let mut state = self.write();
        let name = college.name.clone();
        let saved = state.saved.toggle(college);
        debug!(name = %name, saved, "Toggled saved college");

        self.events.emit(Event::SelectionChanged {
            name,
            saved,
            count: state.saved.len(),
        });
        saved
    }

    pub fn set_show_comparison(&self, visible: bool) {
        let mut state = self.write();
        Self::apply_show_comparison(&mut state, &self.events, visible);
    }

    fn apply_show_comparison(state: &mut StoreState, events: &EventBus, visible: bool) {
        if state.show_comparison != visible {
            state.show_comparison = visible;
            events.emit(Event::ComparisonVisibility { visible });
        }
    }

    // Request lifecycle

    /// Start a search: clear results, comparison, error and the comparison
    /// panel, raise the searching flag and return the new ticket.
    ///
    /// A comparison still in flight is superseded, so its result or failure
    /// never lands on the new results.
    pub(crate) fn begin_search(&self, job: &str, location: &str) -> u64 {
        let mut state = self.write();
        if state.comparing {
            let stale = state.compare_ticket;
            state.compare_ticket += 1;
            state.comparing = false;
            debug!(ticket = stale, "Search supersedes in-flight comparison");
            self.events.emit(Event::CompareSuperseded { request_id: stale });
        }

        state.search_ticket += 1;
        state.searching = true;
        state.error = None;
        state.colleges.clear();
        state.comparison = None;
        Self::apply_show_comparison(&mut state, &self.events, false);

        let request_id = state.search_ticket;
        self.events.emit(Event::SearchStarted {
            request_id,
            job: job.to_string(),
            location: location.to_string(),
        });
        request_id
    }

    /// Start a comparison: clear the analysis and error, raise the
    /// comparing flag and return the new ticket.
    pub(crate) fn begin_compare(&self, colleges: &[College]) -> u64 {
        let mut state = self.write();
        state.compare_ticket += 1;
        state.comparing = true;
        state.error = None;
        state.comparison = None;

        let request_id = state.compare_ticket;
        self.events.emit(Event::CompareStarted {
            request_id,
            colleges: colleges.iter().map(|c| c.name.clone()).collect(),
        });
        request_id
    }

    /// Publish search results and lower the searching flag. Returns false if
    /// the ticket was superseded.
    pub(crate) fn complete_search(&self, ticket: u64, colleges: Vec<College>) -> bool {
        let mut state = self.write();
        if state.search_ticket != ticket {
            debug!(ticket, current = state.search_ticket, "Discarding superseded search result");
            self.events.emit(Event::SearchSuperseded { request_id: ticket });
            return false;
        }

        let count = colleges.len();
        state.colleges = colleges;
        state.searching = false;
        self.events.emit(Event::SearchCompleted {
            request_id: ticket,
            count,
        });
        true
    }

    /// Publish a comparison. Returns false if the ticket was superseded.
    pub(crate) fn complete_compare(&self, ticket: u64, analysis: ComparisonAnalysis) -> bool {
        let mut state = self.write();
        if state.compare_ticket != ticket {
            debug!(ticket, current = state.compare_ticket, "Discarding superseded comparison");
            self.events.emit(Event::CompareSuperseded { request_id: ticket });
            return false;
        }

        let entries = analysis.len();
        state.comparison = Some(analysis);
        state.comparing = false;
        self.events.emit(Event::CompareCompleted {
            request_id: ticket,
            entries,
        });
        true
    }

    /// Publish the user-facing failure message for `kind`. Returns false if
    /// the ticket was superseded.
    pub(crate) fn fail(&self, kind: QueryKind, ticket: u64) -> bool {
        let mut state = self.write();
        if state.ticket(kind) != ticket {
            debug!(kind = %kind, ticket, "Discarding superseded failure");
            let superseded = match kind {
                QueryKind::Search => Event::SearchSuperseded { request_id: ticket },
                QueryKind::Compare => Event::CompareSuperseded { request_id: ticket },
            };
            self.events.emit(superseded);
            return false;
        }

        let message = kind.user_message().to_string();
        state.error = Some(message.clone());
        *state.in_flight_mut(kind) = false;
        let failed = match kind {
            QueryKind::Search => {
                state.colleges.clear();
                Event::SearchFailed {
                    request_id: ticket,
                    message,
                }
            }
            QueryKind::Compare => Event::CompareFailed {
                request_id: ticket,
                message,
            },
        };
        self.events.emit(failed);
        true
    }

    /// Lower the in-flight flag for `kind` if `ticket` is still the latest.
    ///
    /// Completion and failure already lower it; this covers every other exit.
    pub(crate) fn finish(&self, kind: QueryKind, ticket: u64) {
        let mut state = self.write();
        if state.ticket(kind) == ticket {
            *state.in_flight_mut(kind) = false;
        }
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("StateStore")
            .field("colleges", &state.colleges.len())
            .field("saved", &state.saved.len())
            .field("searching", &state.searching)
            .field("comparing", &state.comparing)
            .field("error", &state.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compass_core::ComparisonEntry;

    fn college(name: &str) -> College {
        College {
            name: name.to_string(),
            city: "Boston".to_string(),
            state: "MA".to_string(),
            acceptance_rate: 40.0,
            annual_cost: 25000.0,
            description: String::new(),
            reason_for_fit: String::new(),
        }
    }

    fn analysis() -> ComparisonAnalysis {
        ComparisonAnalysis {
            comparison: vec![ComparisonEntry {
                name: "A".to_string(),
                pros: vec![],
                cons: vec![],
            }],
            recommendation: "A".to_string(),
        }
    }

    #[test]
    fn test_initial_state() {
        let store = StateStore::new(EventBus::new());
        let snapshot = store.snapshot();

        assert_eq!(snapshot, StoreSnapshot::default());
        assert!(!store.is_searching());
        assert!(!store.is_comparing());
        assert_eq!(store.current_ticket(QueryKind::Search), 0);
    }

    #[test]
    fn test_derived_views_follow_selection() {
        let store = StateStore::new(EventBus::new());
        let a = college("A");

        assert!(!store.is_saved(&a));
        assert!(store.toggle_save(a.clone()));
        assert!(store.is_saved(&a));
        assert!(!store.can_compare());

        store.toggle_save(college("B"));
        assert!(store.can_compare());
        assert_eq!(store.snapshot().saved_names, vec!["A", "B"]);

        assert!(!store.toggle_save(a.clone()));
        assert!(!store.is_saved(&a));
        assert!(!store.snapshot().can_compare);
    }

    #[test]
    fn test_begin_search_clears_previous_state() {
        let store = StateStore::new(EventBus::new());
        let first = store.begin_search("nurse", "Boston");
        store.complete_search(first, vec![college("A")]);
        store.finish(QueryKind::Search, first);

        let compare = store.begin_compare(&[college("A"), college("B")]);
        store.complete_compare(compare, analysis());
        store.fail(QueryKind::Compare, compare);
        store.finish(QueryKind::Compare, compare);
        store.set_show_comparison(true);
        store.toggle_save(college("A"));

        store.begin_search("architect", "Denver");
        let snapshot = store.snapshot();
        assert!(snapshot.colleges.is_empty());
        assert!(snapshot.comparison.is_none());
        assert!(snapshot.error.is_none());
        assert!(!snapshot.show_comparison);
        assert!(snapshot.searching);
        assert_eq!(snapshot.saved_names, vec!["A"]);
    }

    #[test]
    fn test_search_discards_in_flight_comparison_failure() {
        let store = StateStore::new(EventBus::new());
        let compare = store.begin_compare(&[college("A"), college("B")]);
        let search = store.begin_search("nurse", "Boston");

        assert!(!store.is_comparing());
        assert!(!store.fail(QueryKind::Compare, compare));
        assert!(!store.complete_compare(compare, analysis()));
        store.finish(QueryKind::Compare, compare);

        assert!(store.complete_search(search, vec![college("A")]));
        assert!(store.error().is_none());
        assert!(store.comparison().is_none());
        assert!(!store.is_comparing());
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let store = StateStore::new(EventBus::new());
        let old = store.begin_search("nurse", "Boston");
        let new = store.begin_search("nurse", "Denver");

        assert!(store.complete_search(new, vec![college("Denver U")]));
        store.finish(QueryKind::Search, new);
        assert!(!store.is_searching());

        assert!(!store.complete_search(old, vec![college("Boston U")]));
        assert!(!store.fail(QueryKind::Search, old));
        store.finish(QueryKind::Search, old);

        assert_eq!(store.colleges()[0].name, "Denver U");
        assert!(store.error().is_none());
        assert!(!store.is_searching());
    }

    #[test]
    fn test_stale_finish_keeps_flag_raised() {
        let store = StateStore::new(EventBus::new());
        let old = store.begin_compare(&[]);
        let _new = store.begin_compare(&[]);

        store.finish(QueryKind::Compare, old);
        assert!(store.is_comparing());
    }

    #[test]
    fn test_fail_sets_kind_message() {
        let store = StateStore::new(EventBus::new());
        let ticket = store.begin_compare(&[]);

        assert!(store.fail(QueryKind::Compare, ticket));
        assert_eq!(
            store.error().as_deref(),
            Some(QueryKind::Compare.user_message())
        );

        store.begin_search("nurse", "Boston");
        assert!(store.error().is_none());
    }

    #[tokio::test]
    async fn test_mutations_emit_events() {
        let store = StateStore::new(EventBus::new());
        let mut rx = store.events().subscribe();

        store.set_show_comparison(true);
        store.set_show_comparison(true);
        store.toggle_save(college("A"));
        let ticket = store.begin_search("nurse", "Boston");
        store.complete_search(ticket, vec![]);

        let mut types = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            types.push(envelope.event.event_type());
        }

        assert_eq!(
            types,
            vec![
                "comparison.visibility",
                "selection.changed",
                "comparison.visibility",
                "search.started",
                "search.completed",
            ]
        );
    }
}
