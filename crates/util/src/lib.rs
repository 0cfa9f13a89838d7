//! Ambient helpers for the Cohort portal: persisted preferences and the
//! checkpoint-overlay geometry used by tour highlights.

pub mod geometry;
pub mod preferences;

pub use geometry::{Rect, union_rect};
pub use preferences::{PortalPreferences, PreferencesError, PreferencesPayload};
