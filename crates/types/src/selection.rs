//! Selection-set primitives shared across the portal core.
//!
//! A selection set is the de-duplicated collection of items an admin has
//! marked as chosen across one or more paginated views. The set is owned by
//! exactly one store instance at a time; this module only defines the value
//! types and the pure [`reduce`] function, so the algebra can be tested
//! without any store or UI attached.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable identifier for a selectable item.
///
/// Derivable from the row data the UI shows: a backend aggregation key, a
/// user email, a row UUID. Selection correctness depends entirely on this
/// being unique and stable across pagination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionKey(String);

impl SelectionKey {
    /// Returns the key's textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extracts a key from a JSON id value.
    ///
    /// Accepts strings and numbers (numeric ids keep their decimal
    /// rendering); anything else yields `None` so callers can skip rows the
    /// source failed to key.
    pub fn from_value(value: &Value) -> Option<SelectionKey> {
        match value {
            Value::String(text) => Some(SelectionKey(text.clone())),
            Value::Number(number) => Some(SelectionKey(number.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SelectionKey {
    fn from(value: &str) -> Self {
        SelectionKey(value.to_string())
    }
}

impl From<String> for SelectionKey {
    fn from(value: String) -> Self {
        SelectionKey(value)
    }
}

impl From<i64> for SelectionKey {
    fn from(value: i64) -> Self {
        SelectionKey(value.to_string())
    }
}

impl From<u64> for SelectionKey {
    fn from(value: u64) -> Self {
        SelectionKey(value.to_string())
    }
}

/// A selected item plus the display/business fields later workflow steps
/// need (for example `userEmail`, `title`, or an advertised course run key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedRow {
    /// Identity of the row within its logical collection.
    pub id: SelectionKey,
    /// Carried fields, opaque to the selection machinery.
    #[serde(default)]
    pub values: Map<String, Value>,
}

impl SelectedRow {
    /// Creates a row with the given carried fields.
    pub fn new(id: impl Into<SelectionKey>, values: Map<String, Value>) -> Self {
        Self { id: id.into(), values }
    }

    /// Creates a row with no carried fields.
    pub fn bare(id: impl Into<SelectionKey>) -> Self {
        Self {
            id: id.into(),
            values: Map::new(),
        }
    }
}

/// Insertion-ordered, id-unique collection of [`SelectedRow`]s.
///
/// Order means *first*-insertion order: re-adding a present id replaces its
/// values but never moves the row. Review lists rely on this for stable
/// ordering across repeated toggles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    entries: IndexMap<SelectionKey, SelectedRow>,
}

impl SelectionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from rows, deduplicating by id.
    ///
    /// On duplicate input ids the last occurrence's values win while the
    /// first occurrence's position is kept. Duplicates are a defensive
    /// normalization, not expected in normal input.
    pub fn from_rows(rows: Vec<SelectedRow>) -> Self {
        let mut entries = IndexMap::with_capacity(rows.len());
        for row in rows {
            entries.insert(row.id.clone(), row);
        }
        Self { entries }
    }

    /// Number of distinct selected ids.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is selected. Downstream guards treat this as a
    /// legitimate, expected state.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when `id` is currently selected.
    pub fn contains(&self, id: &SelectionKey) -> bool {
        self.entries.contains_key(id)
    }

    /// Looks up the row selected under `id`.
    pub fn get(&self, id: &SelectionKey) -> Option<&SelectedRow> {
        self.entries.get(id)
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = &SelectedRow> {
        self.entries.values()
    }

    /// Selected ids in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &SelectionKey> {
        self.entries.keys()
    }
}

/// Mutation applied to a [`SelectionSet`] through the pure [`reduce`]
/// function.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionAction {
    /// Replace the set wholesale, still deduplicating by id.
    SetAll(Vec<SelectedRow>),
    /// Set-union insert; a present id keeps its position and takes the new
    /// values.
    Add(SelectedRow),
    /// Set-difference removal; an absent id is a no-op.
    Remove(SelectionKey),
    /// Empty the set.
    Clear,
}

/// Applies `action` to `state` and returns the next selection set.
///
/// Pure and total: no side effects, no I/O, and no panic for any input. The
/// UI may race (a row deselected from two different views milliseconds
/// apart), so unknown-id removals and duplicate adds must stay benign.
pub fn reduce(state: SelectionSet, action: SelectionAction) -> SelectionSet {
    match action {
        SelectionAction::SetAll(rows) => SelectionSet::from_rows(rows),
        SelectionAction::Add(row) => {
            let mut next = state;
            next.entries.insert(row.id.clone(), row);
            next
        }
        SelectionAction::Remove(id) => {
            let mut next = state;
            next.entries.shift_remove(&id);
            next
        }
        SelectionAction::Clear => SelectionSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: &str, title: &str) -> SelectedRow {
        let mut values = Map::new();
        values.insert("title".into(), json!(title));
        SelectedRow::new(id, values)
    }

    fn ids(set: &SelectionSet) -> Vec<&str> {
        set.keys().map(SelectionKey::as_str).collect()
    }

    #[test]
    fn add_then_remove_round_trips() {
        let base = reduce(SelectionSet::new(), SelectionAction::Add(row("c1", "Intro")));
        let added = reduce(base.clone(), SelectionAction::Add(row("c9", "Extra")));
        let removed = reduce(added, SelectionAction::Remove("c9".into()));
        assert_eq!(removed, base);
    }

    #[test]
    fn add_of_present_id_keeps_position_and_takes_values() {
        let mut set = SelectionSet::new();
        for (id, title) in [("c1", "Intro"), ("c2", "Advanced"), ("c3", "Expert")] {
            set = reduce(set, SelectionAction::Add(row(id, title)));
        }
        set = reduce(set, SelectionAction::Add(row("c1", "Intro (updated)")));

        assert_eq!(ids(&set), vec!["c1", "c2", "c3"]);
        let updated = set.get(&"c1".into()).expect("row c1 present");
        assert_eq!(updated.values.get("title"), Some(&json!("Intro (updated)")));
    }

    #[test]
    fn remove_of_absent_id_is_noop() {
        let set = reduce(SelectionSet::new(), SelectionAction::Add(row("c1", "Intro")));
        let next = reduce(set.clone(), SelectionAction::Remove("missing".into()));
        assert_eq!(next, set);
    }

    #[test]
    fn set_all_deduplicates_last_values_first_position() {
        let set = reduce(
            SelectionSet::new(),
            SelectionAction::SetAll(vec![row("a", "first"), row("b", "middle"), row("a", "second")]),
        );
        assert_eq!(set.len(), 2);
        assert_eq!(ids(&set), vec!["a", "b"]);
        let winner = set.get(&"a".into()).expect("row a present");
        assert_eq!(winner.values.get("title"), Some(&json!("second")));
    }

    #[test]
    fn clear_matches_set_all_empty() {
        let populated = reduce(SelectionSet::new(), SelectionAction::Add(row("c1", "Intro")));
        let cleared = reduce(populated.clone(), SelectionAction::Clear);
        let set_all_empty = reduce(populated, SelectionAction::SetAll(Vec::new()));
        assert_eq!(cleared, set_all_empty);
        assert!(cleared.is_empty());
    }

    #[test]
    fn removing_only_item_leaves_legitimate_empty_set() {
        let set = reduce(SelectionSet::new(), SelectionAction::Add(row("c1", "Intro")));
        let emptied = reduce(set, SelectionAction::Remove("c1".into()));
        assert!(emptied.is_empty());
        assert_eq!(emptied.len(), 0);
    }

    #[test]
    fn enrollment_scenario_add_add_remove() {
        let mut set = SelectionSet::new();
        set = reduce(set, SelectionAction::Add(row("c1", "Intro")));
        set = reduce(set, SelectionAction::Add(row("c2", "Advanced")));
        set = reduce(set, SelectionAction::Remove("c1".into()));

        assert_eq!(ids(&set), vec!["c2"]);
        assert!(!set.contains(&"c1".into()));
    }

    #[test]
    fn numeric_and_string_ids_extract_from_json() {
        assert_eq!(SelectionKey::from_value(&json!("user@example.com")), Some("user@example.com".into()));
        assert_eq!(SelectionKey::from_value(&json!(42)), Some("42".into()));
        assert_eq!(SelectionKey::from_value(&json!(null)), None);
        assert_eq!(SelectionKey::from_value(&json!({"nested": true})), None);
    }
}
