//! Bounded, incrementally-revealable view over a selection set.
//!
//! Used when presenting the final review list before submission: show the
//! first `page_size` rows, let the user expand to the full set, and forward
//! per-row deletion back into the backing store. The window owns no state
//! beyond its configured size; the expanded flag belongs to the caller, and
//! the selection itself always stays in the store, so the windowed view can
//! never diverge from the source of truth.

use cohort_types::{SelectedRow, SelectionAction, SelectionKey, SelectionSet};

use crate::selection::store::SelectionStore;

/// Default number of rows shown before the user expands the list.
pub const DEFAULT_REVIEW_PAGE_SIZE: usize = 25;

/// Read-only window over a [`SelectionSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewWindow {
    page_size: usize,
}

impl Default for ReviewWindow {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_REVIEW_PAGE_SIZE,
        }
    }
}

impl ReviewWindow {
    /// Creates a window capped at `page_size` rows when collapsed.
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    /// Configured cap.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The visible sub-sequence: the first `page_size` rows, or all of them
    /// when expanded. Strictly "first N vs all", never reordered.
    pub fn visible<'a>(&self, selection: &'a SelectionSet, is_expanded: bool) -> Vec<&'a SelectedRow> {
        if is_expanded {
            selection.rows().collect()
        } else {
            selection.rows().take(self.page_size).collect()
        }
    }

    /// Rows hidden behind the "show all" affordance.
    pub fn hidden_count(&self, selection: &SelectionSet, is_expanded: bool) -> usize {
        if is_expanded {
            0
        } else {
            selection.len().saturating_sub(self.page_size)
        }
    }

    /// Whether expanding would reveal anything.
    pub fn is_expandable(&self, selection: &SelectionSet) -> bool {
        selection.len() > self.page_size
    }

    /// Forwards a per-row deletion intent to the backing store.
    pub fn remove(&self, store: &SelectionStore, id: &SelectionKey) {
        store.dispatch(SelectionAction::Remove(id.clone()));
    }
}
