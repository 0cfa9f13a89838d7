//! Bridges a [`SelectionStore`] to an externally-owned, paginated row source.
//!
//! The source (a results table, a search-result page) owns pagination and
//! filtering; the store owns the selection. This adapter translates UI
//! intents ("select all shown below", "select all matching", row toggles)
//! into store actions, derives the tri-state select-all checkbox, and keeps
//! the source's page index converged with the locally-tracked one. The store
//! never learns about pages, and pagination correction never touches the
//! selection.

use std::sync::Arc;

use cohort_types::{PageIndexBase, PageInfo, SelectionAction, SourceRow};
use tracing::debug;

use crate::selection::store::SelectionStore;

/// Read-only paging surface of the external row source.
///
/// The adapter never re-requests pages or mutates rows; `go_to_page` is the
/// single corrective control it may exercise, and only during
/// reconciliation.
pub trait PageSource {
    /// Index base this source reports pages in.
    fn index_base(&self) -> PageIndexBase {
        PageIndexBase::Zero
    }

    /// Paging facts for the source's current page, in its own index base.
    fn page_info(&self) -> PageInfo;

    /// Navigates the source to `page_index`, given in the source's own base.
    fn go_to_page(&mut self, page_index: usize);
}

/// Rendering state for the three-state "select all" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckboxState {
    /// No row on the page is selected.
    Unchecked,
    /// Some but not all rows on the page are selected.
    Indeterminate,
    /// Every row on the page is selected.
    Checked,
}

/// Mediates between one [`SelectionStore`] and one paginated row source.
#[derive(Debug)]
pub struct SelectionSyncAdapter {
    store: Arc<SelectionStore>,
    local_page: usize,
}

impl SelectionSyncAdapter {
    /// Creates an adapter over `store`, starting on page 0.
    pub fn new(store: Arc<SelectionStore>) -> Self {
        Self { store, local_page: 0 }
    }

    /// The backing store handle.
    pub fn store(&self) -> &Arc<SelectionStore> {
        &self.store
    }

    /// Replaces the selection with every row matching the current filter.
    ///
    /// The source already narrowed `rows`; the adapter performs no fetch of
    /// its own, so "all matching" can only span what the source supplied.
    pub fn select_all_matching(&self, rows: &[SourceRow]) {
        let selected = rows.iter().map(SourceRow::to_selected).collect();
        self.store.dispatch(SelectionAction::SetAll(selected));
    }

    /// Adds every row currently visible on the page, keeping prior pages'
    /// selections ("select all shown below" semantics).
    pub fn select_all_on_page(&self, rows: &[SourceRow]) {
        for row in rows {
            self.store.dispatch(SelectionAction::Add(row.to_selected()));
        }
    }

    /// Empties the selection.
    pub fn clear_selection(&self) {
        self.store.dispatch(SelectionAction::Clear);
    }

    /// Toggles one row: removes it when selected, adds it otherwise.
    pub fn toggle_row(&self, row: &SourceRow, is_currently_selected: bool) {
        if is_currently_selected {
            self.store.dispatch(SelectionAction::Remove(row.id.clone()));
        } else {
            self.store.dispatch(SelectionAction::Add(row.to_selected()));
        }
    }

    /// True iff `page_rows` is non-empty and every row's id is selected.
    pub fn is_all_selected(&self, page_rows: &[SourceRow]) -> bool {
        if page_rows.is_empty() {
            return false;
        }
        self.store.read(|set| page_rows.iter().all(|row| set.contains(&row.id)))
    }

    /// True iff some but not all of `page_rows` are selected.
    pub fn is_indeterminate(&self, page_rows: &[SourceRow]) -> bool {
        let (any, all) = self.store.read(|set| {
            let mut any = false;
            let mut all = !page_rows.is_empty();
            for row in page_rows {
                if set.contains(&row.id) {
                    any = true;
                } else {
                    all = false;
                }
            }
            (any, all)
        });
        any && !all
    }

    /// Tri-state derived from the two predicates above.
    pub fn checkbox_state(&self, page_rows: &[SourceRow]) -> CheckboxState {
        if self.is_all_selected(page_rows) {
            CheckboxState::Checked
        } else if self.is_indeterminate(page_rows) {
            CheckboxState::Indeterminate
        } else {
            CheckboxState::Unchecked
        }
    }

    /// Records the locally-intended page (zero-based). No source call and no
    /// selection action result from this.
    pub fn set_local_page(&mut self, page_index: usize) {
        self.local_page = page_index;
    }

    /// The locally-tracked zero-based page index.
    pub fn local_page(&self) -> usize {
        self.local_page
    }

    /// Converges the source's page index with the local one.
    ///
    /// Issues at most one corrective `go_to_page`, and only when the
    /// normalized indices actually diverge (a debounced URL-driven update
    /// landing after a local page click, or a 1-indexed source behind a
    /// 0-indexed consumer). Never dispatches a selection action: pagination
    /// correction and selection mutation are independent concerns. Returns
    /// whether a correction was issued.
    pub fn reconcile_page(&self, source: &mut dyn PageSource) -> bool {
        let base = source.index_base();
        let source_page = base.to_zero_based(source.page_info().page_index);
        if source_page == self.local_page {
            return false;
        }

        debug!(source_page, local_page = self.local_page, "correcting diverged page index");
        source.go_to_page(base.from_zero_based(self.local_page));
        true
    }
}
