//! In-memory paged row source over a JSON fixture.
//!
//! Stands in for the search/collection API during scripted sessions: it owns
//! pagination the way a real source would, and the adapter only ever talks
//! to it through the [`PageSource`] surface.

use cohort_engine::PageSource;
use cohort_types::{PageInfo, SourceRow};

/// Pages a fixed row list at a configured page size, zero-indexed.
#[derive(Debug)]
pub struct FixturePageSource {
    rows: Vec<SourceRow>,
    page_size: usize,
    page_index: usize,
}

impl FixturePageSource {
    /// Creates a source positioned on page 0.
    pub fn new(rows: Vec<SourceRow>, page_size: usize) -> Self {
        Self {
            rows,
            page_size: page_size.max(1),
            page_index: 0,
        }
    }

    /// Number of pages the fixture spans.
    pub fn page_count(&self) -> usize {
        self.page_info().page_count().max(1)
    }

    /// Rows visible on the current page.
    pub fn page_rows(&self) -> &[SourceRow] {
        let start = self.page_index * self.page_size;
        let end = (start + self.page_size).min(self.rows.len());
        if start >= self.rows.len() {
            return &[];
        }
        &self.rows[start..end]
    }
}

impl PageSource for FixturePageSource {
    fn page_info(&self) -> PageInfo {
        PageInfo {
            page_index: self.page_index,
            page_size: self.page_size,
            total_count: self.rows.len(),
        }
    }

    fn go_to_page(&mut self, page_index: usize) {
        self.page_index = page_index.min(self.page_count().saturating_sub(1));
    }
}
