//! Side-effect boundaries for analytics and flow-completion persistence.
//!
//! Step callbacks fire through these traits and never observe the result:
//! the calls are fire-and-forget, and implementations are responsible for
//! catching and logging their own failures. Blocking an admin's workflow on
//! a non-critical tracking call is explicitly the wrong behavior, so nothing
//! here returns a `Result` to the engine.

use std::sync::Mutex;

use cohort_types::FlowKey;
use serde_json::Value;

/// Observational event tracking. Never affects control flow.
pub trait EventSink: Send + Sync {
    /// Records `event_name` for `subject_id` with optional metadata.
    fn track(&self, subject_id: &str, event_name: &str, metadata: Option<Value>);
}

/// Persistence of a completed flow, `{ subjectId, flowKey }`.
pub trait CompletionSink: Send + Sync {
    /// Marks `flow_key` complete for `subject_id`.
    fn mark_complete(&self, subject_id: &str, flow_key: &FlowKey);
}

/// Sink that drops everything. Useful for offline runs and previews.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn track(&self, _subject_id: &str, _event_name: &str, _metadata: Option<Value>) {}
}

impl CompletionSink for NoopSink {
    fn mark_complete(&self, _subject_id: &str, _flow_key: &FlowKey) {}
}

/// An event recorded by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// Subject the event was recorded for.
    pub subject_id: String,
    /// Stable event name.
    pub event_name: String,
    /// Metadata supplied at the call site, if any.
    pub metadata: Option<Value>,
}

/// A completion recorded by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCompletion {
    /// Subject the completion was persisted for.
    pub subject_id: String,
    /// Flow that completed.
    pub flow_key: FlowKey,
}

/// Sink that records calls in memory, for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RecordedEvent>>,
    completions: Mutex<Vec<RecordedCompletion>>,
}

impl RecordingSink {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far, in call order.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().expect("recording sink lock poisoned").clone()
    }

    /// Snapshot of the completions recorded so far, in call order.
    pub fn completions(&self) -> Vec<RecordedCompletion> {
        self.completions.lock().expect("recording sink lock poisoned").clone()
    }
}

impl EventSink for RecordingSink {
    fn track(&self, subject_id: &str, event_name: &str, metadata: Option<Value>) {
        self.events.lock().expect("recording sink lock poisoned").push(RecordedEvent {
            subject_id: subject_id.to_string(),
            event_name: event_name.to_string(),
            metadata,
        });
    }
}

impl CompletionSink for RecordingSink {
    fn mark_complete(&self, subject_id: &str, flow_key: &FlowKey) {
        self.completions
            .lock()
            .expect("recording sink lock poisoned")
            .push(RecordedCompletion {
                subject_id: subject_id.to_string(),
                flow_key: flow_key.clone(),
            });
    }
}
