//! Cursor state machine over an ordered list of workflow steps.
//!
//! States are indices into the step array; the cursor is the only mutable
//! field. Forward transitions consult the active step's guard; backward
//! navigation is always permitted. There is no implicit terminal state:
//! advancing at the final index fires that step's completion effect and
//! leaves the cursor in place, so termination is a caller-observable event
//! rather than a fourth state. The engine never throws: refusals are status
//! values the UI reflects as a disabled control.

use tracing::debug;

use crate::workflow::step::WorkflowStep;

/// Outcome of a transition attempt. Informational, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The cursor moved forward one step.
    Advanced,
    /// The active step's guard refused, or a jump target was out of range;
    /// the cursor is unchanged and no side effect ran.
    Refused,
    /// The final step's completion effect fired; the cursor is unchanged.
    Completed,
    /// The cursor moved back one step.
    Retreated,
    /// `retreat` at index 0; the cursor is unchanged.
    AtStart,
    /// The cursor was set directly by `jump_to`.
    Jumped,
}

/// Finite sequence of steps with a guarded forward cursor.
///
/// The step array is immutable for the engine's lifetime; when the owning
/// context changes, a fresh engine is constructed (cursor reset to 0) rather
/// than patching this one, since step identities are not stable across
/// variants.
#[derive(Debug)]
pub struct WorkflowEngine {
    steps: Vec<WorkflowStep>,
    current: usize,
}

impl WorkflowEngine {
    /// Builds an engine positioned at the first step.
    ///
    /// Returns `None` for an empty step array: the cursor invariant
    /// `current < len` must hold unconditionally, and the resolver is total,
    /// so a flow with zero checkpoints never legitimately occurs.
    pub fn new(steps: Vec<WorkflowStep>) -> Option<Self> {
        if steps.is_empty() {
            return None;
        }
        Some(Self { steps, current: 0 })
    }

    /// Attempts a forward transition from the active step.
    ///
    /// When the guard refuses, nothing changes and nothing fires. When it
    /// permits: before the final index the step's advance effect runs with
    /// the target index and the cursor increments; at the final index the
    /// completion effect runs instead and the cursor stays put.
    pub fn advance(&mut self) -> Transition {
        let step = &self.steps[self.current];
        if !step.can_advance() {
            debug!(step = step.key(), index = self.current, "advance refused by guard");
            return Transition::Refused;
        }

        if self.current + 1 < self.steps.len() {
            let target = self.current + 1;
            step.run_advance(target);
            self.current = target;
            Transition::Advanced
        } else {
            step.run_end();
            Transition::Completed
        }
    }

    /// Moves the cursor back one step. No guard is consulted going
    /// backward.
    pub fn retreat(&mut self) -> Transition {
        if self.current == 0 {
            return Transition::AtStart;
        }
        self.current -= 1;
        Transition::Retreated
    }

    /// Sets the cursor directly, bypassing guards.
    ///
    /// A trusted escape hatch for external events (a sidebar link forcing a
    /// particular checkpoint); in-flow UI must not use it for forward
    /// progress. Out-of-range targets are a logged no-op.
    pub fn jump_to(&mut self, index: usize) -> Transition {
        if index >= self.steps.len() {
            debug!(index, len = self.steps.len(), "jump target out of range");
            return Transition::Refused;
        }
        self.current = index;
        Transition::Jumped
    }

    /// Index of the active step.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The active step.
    pub fn active_step(&self) -> &WorkflowStep {
        &self.steps[self.current]
    }

    /// Number of steps in the flow.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; the constructor rejects empty flows.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether the cursor sits on the final step.
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.steps.len()
    }

    /// Step keys in order, for display and determinism checks.
    pub fn step_keys(&self) -> Vec<&str> {
        self.steps.iter().map(WorkflowStep::key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::selection::store::SelectionStore;
    use cohort_types::{SelectedRow, SelectionAction};

    fn three_steps() -> Vec<WorkflowStep> {
        vec![
            WorkflowStep::new("one", "One"),
            WorkflowStep::new("two", "Two"),
            WorkflowStep::new("three", "Three"),
        ]
    }

    #[test]
    fn refused_advance_changes_nothing_and_fires_nothing() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let steps = vec![
            WorkflowStep::new("gated", "Gated")
                .guard(|| false)
                .on_advance(move |_| {
                    counter.fetch_add(1, Ordering::Relaxed);
                }),
            WorkflowStep::new("next", "Next"),
        ];
        let mut engine = WorkflowEngine::new(steps).expect("non-empty flow");

        assert_eq!(engine.advance(), Transition::Refused);
        assert_eq!(engine.current_index(), 0);
        assert_eq!(fired.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn retreat_at_start_is_a_noop() {
        let mut engine = WorkflowEngine::new(three_steps()).expect("non-empty flow");
        assert_eq!(engine.retreat(), Transition::AtStart);
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn retreat_ignores_guards() {
        let steps = vec![
            WorkflowStep::new("one", "One"),
            WorkflowStep::new("gated", "Gated").guard(|| false),
        ];
        let mut engine = WorkflowEngine::new(steps).expect("non-empty flow");
        engine.jump_to(1);

        assert_eq!(engine.retreat(), Transition::Retreated);
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn advance_at_final_index_completes_without_moving() {
        let completed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&completed);
        let steps = vec![
            WorkflowStep::new("one", "One"),
            WorkflowStep::new("last", "Last").on_end(move || flag.store(true, Ordering::Relaxed)),
        ];
        let mut engine = WorkflowEngine::new(steps).expect("non-empty flow");

        assert_eq!(engine.advance(), Transition::Advanced);
        assert!(engine.is_last());
        assert_eq!(engine.advance(), Transition::Completed);
        assert_eq!(engine.current_index(), 1);
        assert!(completed.load(Ordering::Relaxed));
    }

    #[test]
    fn jump_bypasses_guards_but_rejects_out_of_range() {
        let steps = vec![
            WorkflowStep::new("one", "One").guard(|| false),
            WorkflowStep::new("two", "Two"),
            WorkflowStep::new("three", "Three"),
        ];
        let mut engine = WorkflowEngine::new(steps).expect("non-empty flow");

        assert_eq!(engine.jump_to(2), Transition::Jumped);
        assert_eq!(engine.current_index(), 2);
        assert_eq!(engine.jump_to(9), Transition::Refused);
        assert_eq!(engine.current_index(), 2);
    }

    #[test]
    fn empty_flow_is_rejected_at_construction() {
        assert!(WorkflowEngine::new(Vec::new()).is_none());
    }

    #[test]
    fn guard_over_selection_store_gates_until_populated() {
        let courses = SelectionStore::shared();
        let gate = Arc::clone(&courses);
        let steps = vec![
            WorkflowStep::new("pick-courses", "Pick courses").guard(move || !gate.state().is_empty()),
            WorkflowStep::new("pick-learners", "Pick learners"),
            WorkflowStep::new("review", "Review"),
        ];
        let mut engine = WorkflowEngine::new(steps).expect("non-empty flow");

        assert_eq!(engine.advance(), Transition::Refused);
        assert_eq!(engine.current_index(), 0);

        courses.dispatch(SelectionAction::Add(SelectedRow::bare("course-1")));
        assert_eq!(engine.advance(), Transition::Advanced);
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn advance_fires_callback_with_target_index() {
        let targets = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&targets);
        let steps = vec![
            WorkflowStep::new("one", "One").on_advance(move |index| sink.lock().unwrap().push(index)),
            WorkflowStep::new("two", "Two"),
        ];
        let mut engine = WorkflowEngine::new(steps).expect("non-empty flow");

        engine.advance();
        assert_eq!(*targets.lock().unwrap(), vec![1]);
    }
}
