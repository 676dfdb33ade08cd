//! Filter draft store.
//!
//! Holds the committed filters and an optional draft. The first edit clones
//! the committed record into a private draft; later edits overwrite fields of
//! that draft in place. `save_filters` replaces the committed record with the
//! draft wholesale and `clear_draft` throws the draft away. Every transition
//! is published synchronously to subscribers.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::accessor;
use super::diff::DraftDiff;
use super::path::FieldPath;
use crate::error::PathError;
use crate::types::criteria::FilterCriteria;


/// Whether edits are pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftPhase {
    NoDraft,
    HasDraft,
}


/// Committed filters plus the pending draft, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub current_filters: Value,
    pub draft_filters: Option<Value>,
}

impl AppState {
    pub fn new(current_filters: Value) -> Self {
        AppState {
            current_filters,
            draft_filters: None,
        }
    }

    pub fn has_draft(&self) -> bool {
        self.draft_filters.is_some()
    }

    pub fn phase(&self) -> DraftPhase {
        if self.has_draft() {
            DraftPhase::HasDraft
        } else {
            DraftPhase::NoDraft
        }
    }

    /// The draft when one exists, otherwise the committed filters.
    pub fn effective_filters(&self) -> &Value {
        self.draft_filters.as_ref().unwrap_or(&self.current_filters)
    }

    /// Typed view of the committed filters.
    pub fn current_criteria(&self) -> Result<FilterCriteria, serde_json::Error> {
        FilterCriteria::from_value(&self.current_filters)
    }

    /// Typed view of the draft, `None` when no edits are pending.
    pub fn draft_criteria(&self) -> Option<Result<FilterCriteria, serde_json::Error>> {
        self.draft_filters.as_ref().map(FilterCriteria::from_value)
    }
}


/// Handle returned by [`FilterStore::subscribe`]; pass it to
/// [`FilterStore::unsubscribe`] to stop delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Listener {
    id: SubscriptionId,
    callback: Box<dyn FnMut(&AppState)>,
}


/// Owner of the filter [`AppState`]. Construct one per session and hand it
/// to the widget layer by `&mut`.
pub struct FilterStore {
    state: AppState,
    /// Paths written in the current draft generation.
    edited: BTreeSet<String>,
    listeners: Vec<Listener>,
    next_subscription: u64,
    revision: u64,
}

impl FilterStore {
    /// Create a store whose committed filters start as `initial`.
    pub fn new(initial: Value) -> Self {
        FilterStore {
            state: AppState::new(initial),
            edited: BTreeSet::new(),
            listeners: Vec::new(),
            next_subscription: 0,
            revision: 0,
        }
    }

    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        FilterStore::new(criteria.to_value())
    }

    // -------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------

    /// Latest state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Owned copy of the latest state.
    pub fn snapshot(&self) -> AppState {
        self.state.clone()
    }

    /// Read a field of the effective filters.
    pub fn read_filter(&self, path: &str) -> Option<&Value> {
        accessor::read(self.state.effective_filters(), &FieldPath::parse(path))
    }

    pub fn edited_paths(&self) -> &BTreeSet<String> {
        &self.edited
    }

    /// Field-level changes the draft would commit.
    pub fn pending_diff(&self) -> DraftDiff {
        match &self.state.draft_filters {
            Some(draft) => DraftDiff::compute(&self.state.current_filters, draft),
            None => DraftDiff::default(),
        }
    }

    /// Number of transitions published so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // -------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------

    /// Register a listener called with the new state after every transition.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&AppState) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push(Listener {
            id,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    // -------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------

    /// Set the field at a dotted `path` in the draft.
    pub fn update_filter(&mut self, path: &str, value: Value) -> Result<(), PathError> {
        self.update_filter_at(&FieldPath::parse(path), value)
    }

    /// Set the field at `path` in the draft, creating the draft from the
    /// committed filters first if needed.
    ///
    /// On error the store is left as it was and nobody is notified.
    pub fn update_filter_at(&mut self, path: &FieldPath, value: Value) -> Result<(), PathError> {
        let created = self.state.draft_filters.is_none();
        let current = &self.state.current_filters;
        let draft = self
            .state
            .draft_filters
            .get_or_insert_with(|| current.clone());

        if let Err(e) = accessor::write(draft, path, value).map(|_| ()) {
            if created {
                self.state.draft_filters = None;
            }
            warn!(path = %path, error = %e, "rejected filter edit");
            return Err(e);
        }

        if created {
            debug!(path = %path, "draft created");
        } else {
            debug!(path = %path, "draft updated");
        }
        self.edited.insert(path.to_dotted());
        self.publish();
        Ok(())
    }

    /// Commit the draft. A no-op on the filters when there is none.
    pub fn save_filters(&mut self) {
        if let Some(draft) = self.state.draft_filters.take() {
            self.state.current_filters = draft;
            debug!(fields = self.edited.len(), "draft committed");
        } else {
            debug!("save with no pending draft");
        }
        self.edited.clear();
        self.publish();
    }

    /// Drop any pending edits.
    pub fn clear_draft(&mut self) {
        if self.state.draft_filters.take().is_some() {
            debug!(fields = self.edited.len(), "draft discarded");
        }
        self.edited.clear();
        self.publish();
    }

    fn publish(&mut self) {
        self.revision += 1;
        let state = &self.state;
        for listener in self.listeners.iter_mut() {
            (listener.callback)(state);
        }
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        FilterStore::from_criteria(&FilterCriteria::default())
    }
}

impl fmt::Debug for FilterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterStore")
            .field("state", &self.state)
            .field("edited", &self.edited)
            .field("listeners", &self.listeners.len())
            .field("revision", &self.revision)
            .finish()
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store() -> FilterStore {
        FilterStore::default()
    }

    fn recorder(store: &mut FilterStore) -> (SubscriptionId, Rc<RefCell<Vec<AppState>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = store.subscribe(move |s| sink.borrow_mut().push(s.clone()));
        (id, seen)
    }

    #[test]
    fn starts_without_draft() {
        let s = store();
        assert_eq!(s.state().phase(), DraftPhase::NoDraft);
        assert_eq!(s.state().current_filters, FilterCriteria::default().to_value());
        assert_eq!(s.revision(), 0);
    }

    #[test]
    fn income_types_then_name_then_save() {
        let mut s = store();

        s.update_filter("income.types", json!(["1"])).unwrap();
        assert_eq!(s.state().draft_filters.as_ref().unwrap()["income"]["types"], json!(["1"]));
        assert_eq!(s.state().current_filters["income"]["types"], json!([]));

        s.update_filter("name", json!("Gifts")).unwrap();
        let draft = s.state().draft_filters.clone().unwrap();
        assert_eq!(draft["name"], json!("Gifts"));
        assert_eq!(draft["income"]["types"], json!(["1"]));

        s.save_filters();
        assert_eq!(s.state().current_filters, draft);
        assert_eq!(s.state().current_filters["name"], json!("Gifts"));
        assert_eq!(s.state().current_filters["income"]["exclude"], json!("yes"));
        assert!(s.state().draft_filters.is_none());
    }

    #[test]
    fn numeric_segment_materializes_sequence() {
        let mut s = FilterStore::new(json!({ "name": "" }));
        s.update_filter("allocation.location.0", json!("loc-9")).unwrap();
        let draft = s.state().draft_filters.as_ref().unwrap();
        assert_eq!(draft["allocation"]["location"], json!(["loc-9"]));
    }

    #[test]
    fn numeric_segment_into_existing_empty_sequence() {
        let mut s = store();
        s.update_filter("allocation.location.0", json!("loc-9")).unwrap();
        assert_eq!(
            s.read_filter("allocation.location"),
            Some(&json!(["loc-9"]))
        );
    }

    #[test]
    fn first_edit_clones_everything_else() {
        let mut s = store();
        let before = s.state().current_filters.clone();
        s.update_filter("dateRange.preset", json!("7")).unwrap();

        let draft = s.state().draft_filters.clone().unwrap();
        assert_eq!(s.state().current_filters, before);
        assert_ne!(draft, before);

        let mut expected = before.clone();
        expected["dateRange"]["preset"] = json!("7");
        assert_eq!(draft, expected);
    }

    #[test]
    fn nested_draft_edits_never_reach_current() {
        let mut s = store();
        let before = s.state().current_filters.clone();
        s.update_filter("income.types", json!(["1"])).unwrap();
        s.update_filter("income.types.1", json!("2")).unwrap();
        s.update_filter("allocation.donationItem.0", json!("blankets")).unwrap();
        s.update_filter("income.exclude", json!("no")).unwrap();
        assert_eq!(s.state().current_filters, before);
        assert_eq!(s.read_filter("income.types"), Some(&json!(["1", "2"])));
    }

    #[test]
    fn save_replaces_wholesale() {
        let mut s = store();
        s.update_filter("allocation", json!({ "location": ["x"] })).unwrap();
        let draft = s.state().draft_filters.clone().unwrap();
        s.save_filters();
        assert_eq!(s.state().current_filters, draft);
        // no merge: donationItem went away with the replaced record
        assert_eq!(s.state().current_filters["allocation"], json!({ "location": ["x"] }));
    }

    #[test]
    fn clear_discards_edits() {
        let mut s = store();
        let before = s.state().current_filters.clone();
        s.update_filter("name", json!("Temp")).unwrap();
        s.update_filter("income.types", json!(["2"])).unwrap();
        s.clear_draft();
        assert!(!s.state().has_draft());
        assert_eq!(s.state().current_filters, before);
        assert!(s.edited_paths().is_empty());
    }

    #[test]
    fn save_and_clear_without_draft_are_noops() {
        let mut s = store();
        let before = s.state().current_filters.clone();
        s.save_filters();
        assert_eq!(s.state().current_filters, before);
        assert!(!s.state().has_draft());
        s.clear_draft();
        assert_eq!(s.state().current_filters, before);
        assert!(!s.state().has_draft());
    }

    #[test]
    fn edit_after_save_starts_from_committed() {
        let mut s = store();
        s.update_filter("name", json!("First")).unwrap();
        s.save_filters();
        s.update_filter("income.exclude", json!("no")).unwrap();
        let draft = s.state().draft_filters.as_ref().unwrap();
        assert_eq!(draft["name"], json!("First"));
        assert_eq!(draft["income"]["exclude"], json!("no"));
        assert_eq!(s.state().current_filters["income"]["exclude"], json!("yes"));
    }

    #[test]
    fn wrongly_typed_values_are_stored() {
        let mut s = store();
        s.update_filter("income.types", json!(42)).unwrap();
        assert_eq!(s.read_filter("income.types"), Some(&json!(42)));
        let typed = s.state().draft_criteria().unwrap();
        assert!(typed.is_err());
    }

    #[test]
    fn read_filter_prefers_draft() {
        let mut s = store();
        assert_eq!(s.read_filter("name"), Some(&json!("")));
        s.update_filter("name", json!("Draft")).unwrap();
        assert_eq!(s.read_filter("name"), Some(&json!("Draft")));
        assert_eq!(s.read_filter("missing.field"), None);
    }

    // --- failure atomicity ---

    #[test]
    fn conflicting_first_edit_leaves_no_draft() {
        let mut s = store();
        let (_, seen) = recorder(&mut s);
        let err = s.update_filter("name.first", json!("x")).unwrap_err();
        assert!(matches!(err, PathError::Conflict { .. }));
        assert!(!s.state().has_draft());
        assert!(seen.borrow().is_empty());
        assert_eq!(s.revision(), 0);
    }

    #[test]
    fn conflicting_later_edit_keeps_draft() {
        let mut s = store();
        s.update_filter("name", json!("Kept")).unwrap();
        let before = s.snapshot();
        assert!(s.update_filter("income.types.label", json!("x")).is_err());
        assert_eq!(s.snapshot(), before);
        assert_eq!(s.edited_paths().len(), 1);
    }

    #[test]
    fn root_path_edit_is_rejected() {
        let mut s = store();
        assert_eq!(s.update_filter("", json!({})), Err(PathError::EmptyPath));
        assert!(!s.state().has_draft());
    }

    // --- subscriptions ---

    #[test]
    fn every_transition_notifies_with_full_state() {
        let mut s = store();
        let (_, seen) = recorder(&mut s);

        s.update_filter("name", json!("A")).unwrap();
        s.save_filters();
        s.clear_draft();
        s.save_filters();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0].draft_filters.as_ref().unwrap()["name"], json!("A"));
        assert_eq!(seen[1].current_filters["name"], json!("A"));
        assert!(seen[1].draft_filters.is_none());
        assert_eq!(seen[3], *s.state());
        assert_eq!(s.revision(), 4);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let mut s = store();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            s.subscribe(move |_| order.borrow_mut().push(tag));
        }
        s.clear_draft();
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut s = store();
        let (id, seen) = recorder(&mut s);
        s.update_filter("name", json!("one")).unwrap();
        assert!(s.unsubscribe(id));
        s.update_filter("name", json!("two")).unwrap();
        assert_eq!(seen.borrow().len(), 1);
        assert!(!s.unsubscribe(id));
        assert_eq!(s.subscriber_count(), 0);
    }

    // --- bookkeeping ---

    #[test]
    fn edited_paths_track_the_generation() {
        let mut s = store();
        s.update_filter(".name", json!("A")).unwrap();
        s.update_filter("income.types", json!(["1"])).unwrap();
        s.update_filter("name", json!("B")).unwrap();
        let edited: Vec<&str> = s.edited_paths().iter().map(|p| p.as_str()).collect();
        assert_eq!(edited, vec!["income.types", "name"]);
        s.save_filters();
        assert!(s.edited_paths().is_empty());
    }

    #[test]
    fn pending_diff_follows_draft() {
        let mut s = store();
        assert!(s.pending_diff().is_empty());
        s.update_filter("name", json!("Gifts")).unwrap();
        s.update_filter("income.types", json!(["1"])).unwrap();
        let diff = s.pending_diff();
        assert_eq!(diff.change_count(), 2);
        s.save_filters();
        assert!(s.pending_diff().is_empty());
    }

    #[test]
    fn state_serializes_camel_case() {
        let s = FilterStore::new(json!({ "name": "" }));
        let out = serde_json::to_value(s.state()).unwrap();
        assert_eq!(out, json!({ "currentFilters": { "name": "" }, "draftFilters": null }));
    }
}
