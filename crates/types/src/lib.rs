//! Shared type definitions for the Cohort admin portal core.
//!
//! This crate carries the data model the selection and workflow engines agree
//! on: selection keys and rows, the insertion-ordered [`SelectionSet`], the
//! pure [`reduce`] algebra, paging facts reported by external row sources,
//! and the closed set of [`FlowContext`] variants the flow resolver accepts.
//! Nothing in here performs I/O or depends on a rendering concern.

pub mod flow;
pub mod paging;
pub mod selection;

pub use flow::{FlowContext, FlowKey, events};
pub use paging::{PageIndexBase, PageInfo, SourceRow};
pub use selection::{SelectedRow, SelectionAction, SelectionKey, SelectionSet, reduce};
