//! A single checkpoint of a guided multi-stage workflow.
//!
//! Steps are immutable once constructed for a given flow instance. The guard
//! closes over live state (typically a `SelectionStore` handle), not a
//! snapshot, and is re-evaluated on every attempted forward transition. The
//! step owns *why* it cannot advance; the engine only refuses.

use std::fmt;

type GuardFn = Box<dyn Fn() -> bool + Send + Sync>;
type AdvanceFn = Box<dyn Fn(usize) + Send + Sync>;
type EndFn = Box<dyn Fn() + Send + Sync>;

/// One stage of a wizard or onboarding tour.
pub struct WorkflowStep {
    key: String,
    title: String,
    guard: GuardFn,
    on_advance: Option<AdvanceFn>,
    on_end: Option<EndFn>,
}

impl WorkflowStep {
    /// Creates a step whose guard always permits advancing.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            guard: Box::new(|| true),
            on_advance: None,
            on_end: None,
        }
    }

    /// Sets the forward-guard predicate.
    pub fn guard(mut self, guard: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.guard = Box::new(guard);
        self
    }

    /// Sets the side effect fired on a successful forward transition. The
    /// callback receives the *target* step index, not the source.
    pub fn on_advance(mut self, callback: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_advance = Some(Box::new(callback));
        self
    }

    /// Sets the completion side effect. Only a flow's final step carries
    /// one; its presence is what signals "reaching the end".
    pub fn on_end(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_end = Some(Box::new(callback));
        self
    }

    /// Stable identifier of the step within its flow.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Human-readable title the UI shows for this checkpoint.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Re-evaluates the guard against live state.
    pub fn can_advance(&self) -> bool {
        (self.guard)()
    }

    /// Whether this step carries the flow-completed effect.
    pub fn has_end_effect(&self) -> bool {
        self.on_end.is_some()
    }

    pub(crate) fn run_advance(&self, target_index: usize) {
        if let Some(callback) = &self.on_advance {
            callback(target_index);
        }
    }

    pub(crate) fn run_end(&self) {
        if let Some(callback) = &self.on_end {
            callback();
        }
    }
}

impl fmt::Debug for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowStep")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("has_on_advance", &self.on_advance.is_some())
            .field("has_on_end", &self.on_end.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[test]
    fn guard_reads_live_state_not_a_snapshot() {
        let open = Arc::new(AtomicBool::new(false));
        let gate = Arc::clone(&open);
        let step = WorkflowStep::new("review", "Review").guard(move || gate.load(Ordering::Relaxed));

        assert!(!step.can_advance());
        open.store(true, Ordering::Relaxed);
        assert!(step.can_advance());
    }

    #[test]
    fn advance_callback_receives_target_index() {
        let target = Arc::new(AtomicUsize::new(usize::MAX));
        let seen = Arc::clone(&target);
        let step = WorkflowStep::new("pick", "Pick").on_advance(move |index| seen.store(index, Ordering::Relaxed));

        step.run_advance(3);
        assert_eq!(target.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn end_effect_presence_marks_final_step() {
        let plain = WorkflowStep::new("middle", "Middle");
        let last = WorkflowStep::new("last", "Last").on_end(|| {});
        assert!(!plain.has_end_effect());
        assert!(last.has_end_effect());
    }
}
