//! Store subscription feeding the status line.
//!
//! The runner registers [`StateFeed::observe`] with the store. Each published
//! state is compared with the previous one to name what happened. A save and a
//! discard of an unchanged draft publish the same state, so the runner
//! announces which one it is about to apply with [`StateFeed::expect`].

use filter_draft_core::draft::AppState;
use tracing::info;


/// How the runner is about to end the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closing {
    Save,
    Discard,
}


#[derive(Debug)]
pub struct StateFeed {
    previous: AppState,
    transitions: u64,
    pending: Option<String>,
    closing: Option<Closing>,
}

impl StateFeed {
    pub fn new(initial: &AppState) -> Self {
        StateFeed {
            previous: initial.clone(),
            transitions: 0,
            pending: None,
            closing: None,
        }
    }

    /// Name the kind of the next published transition. Consumed by it.
    pub fn expect(&mut self, closing: Closing) {
        self.closing = Some(closing);
    }

    pub fn observe(&mut self, state: &AppState) {
        self.transitions += 1;
        let closing = self.closing.take();
        if let Some(event) = describe(&self.previous, state, closing) {
            info!(event, "filter state changed");
            self.pending = Some(event.to_string());
        }
        self.previous = state.clone();
    }

    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// The latest unseen event, if any.
    pub fn take_event(&mut self) -> Option<String> {
        self.pending.take()
    }
}

fn describe(prev: &AppState, next: &AppState, closing: Option<Closing>) -> Option<&'static str> {
    match (prev.has_draft(), next.has_draft()) {
        (false, true) => Some("Draft started"),
        (true, false) => Some(match closing {
            Some(Closing::Discard) => "Draft discarded",
            _ if prev.current_filters != next.current_filters => "Filters applied",
            Some(Closing::Save) => "No changes to apply",
            None => "Draft closed",
        }),
        _ => None,
    }
}
