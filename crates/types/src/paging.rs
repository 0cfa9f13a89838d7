//! Contracts for externally-owned, paginated row sources.
//!
//! The portal never fetches pages itself; a search client or collection API
//! owns pagination and filtering, and hands the core one ordered page of
//! rows at a time together with the paging facts in [`PageInfo`]. These
//! types describe that read-only boundary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::selection::{SelectedRow, SelectionKey};

/// One row as supplied by the external source, `{ id, ...fields }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    /// Identity of the row; must be stable across pagination.
    pub id: SelectionKey,
    /// Remaining fields of the row, untouched by the core.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SourceRow {
    /// Creates a row with the given fields.
    pub fn new(id: impl Into<SelectionKey>, fields: Map<String, Value>) -> Self {
        Self { id: id.into(), fields }
    }

    /// Converts the source row into a selection entry, carrying its fields.
    pub fn to_selected(&self) -> SelectedRow {
        SelectedRow::new(self.id.clone(), self.fields.clone())
    }
}

/// Paging facts the external source reports alongside each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Index of the current page, in the source's own index base.
    pub page_index: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Total rows matching the active filter.
    pub total_count: usize,
}

impl PageInfo {
    /// Total number of pages implied by `total_count` and `page_size`.
    pub fn page_count(&self) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size)
    }
}

/// Index base a row source uses when reporting page indices.
///
/// Search libraries are commonly 1-indexed while table widgets are
/// 0-indexed; the sync adapter normalizes through this before comparing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageIndexBase {
    /// Pages are numbered from 0.
    #[default]
    Zero,
    /// Pages are numbered from 1.
    One,
}

impl PageIndexBase {
    /// Normalizes a source-reported index to zero-based.
    pub fn to_zero_based(self, index: usize) -> usize {
        match self {
            PageIndexBase::Zero => index,
            PageIndexBase::One => index.saturating_sub(1),
        }
    }

    /// Converts a zero-based index into the source's own base.
    pub fn from_zero_based(self, index: usize) -> usize {
        match self {
            PageIndexBase::Zero => index,
            PageIndexBase::One => index + 1,
        }
    }
}
