//! The canonical bulk-enrollment wizard.
//!
//! Four checkpoints (pick courses, pick learners, review, confirm) gated
//! on the live contents of two independent selection stores. The stores are
//! injected, never ambient, so a page can run several enrollment sessions
//! without them clobbering each other.

use std::sync::Arc;

use cohort_types::{FlowKey, events};
use serde_json::json;

use crate::selection::store::SelectionStore;
use crate::workflow::resolver::FlowHandles;
use crate::workflow::step::WorkflowStep;

/// Persistence key the completed wizard is recorded under.
pub const ENROLLMENT_FLOW_KEY: &str = "enrollment.bulk";

/// The two selection sets a bulk-enrollment session is built on.
#[derive(Debug, Clone)]
pub struct EnrollmentStores {
    /// Courses chosen on the catalog step.
    pub courses: Arc<SelectionStore>,
    /// Learner emails chosen on the learners step.
    pub learners: Arc<SelectionStore>,
}

impl EnrollmentStores {
    /// Creates a pair of empty stores for a fresh session.
    pub fn new() -> Self {
        Self {
            courses: SelectionStore::shared(),
            learners: SelectionStore::shared(),
        }
    }
}

impl Default for EnrollmentStores {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the wizard's step array.
///
/// Guards: the course step requires at least one course, the learner step at
/// least one learner, and review/confirm both. Advancing past a step fires
/// the advance-tracking event with the target index; the confirm step's
/// completion effect persists the flow key and fires the submitted event
/// with the final selection counts.
pub fn enrollment_steps(stores: &EnrollmentStores, handles: &FlowHandles) -> Vec<WorkflowStep> {
    let flow = FlowKey::from(ENROLLMENT_FLOW_KEY);

    let courses = Arc::clone(&stores.courses);
    let pick_courses = WorkflowStep::new("pick-courses", "Choose courses")
        .guard(move || courses.read(|set| !set.is_empty()))
        .on_advance(advance_tracker(handles, &flow, "pick-courses"));

    let learners = Arc::clone(&stores.learners);
    let pick_learners = WorkflowStep::new("pick-learners", "Choose learners")
        .guard(move || learners.read(|set| !set.is_empty()))
        .on_advance(advance_tracker(handles, &flow, "pick-learners"));

    let courses = Arc::clone(&stores.courses);
    let learners = Arc::clone(&stores.learners);
    let review = WorkflowStep::new("review", "Review your selections")
        .guard(move || courses.read(|set| !set.is_empty()) && learners.read(|set| !set.is_empty()))
        .on_advance(advance_tracker(handles, &flow, "review"));

    let courses = Arc::clone(&stores.courses);
    let learners = Arc::clone(&stores.learners);
    let events_sink = Arc::clone(&handles.events);
    let completions = Arc::clone(&handles.completions);
    let subject = handles.subject_id.clone();
    let guard_courses = Arc::clone(&courses);
    let guard_learners = Arc::clone(&learners);
    let confirm = WorkflowStep::new("confirm", "Confirm enrollment")
        .guard(move || guard_courses.read(|set| !set.is_empty()) && guard_learners.read(|set| !set.is_empty()))
        .on_end(move || {
            completions.mark_complete(&subject, &flow);
            events_sink.track(
                &subject,
                events::ENROLLMENT_SUBMITTED,
                Some(json!({
                    "flowKey": flow.as_str(),
                    "courseCount": courses.read(cohort_types::SelectionSet::len),
                    "learnerCount": learners.read(cohort_types::SelectionSet::len),
                })),
            );
        });

    vec![pick_courses, pick_learners, review, confirm]
}

fn advance_tracker(handles: &FlowHandles, flow: &FlowKey, step_key: &str) -> impl Fn(usize) + Send + Sync + 'static {
    let events_sink = Arc::clone(&handles.events);
    let subject = handles.subject_id.clone();
    let flow = flow.clone();
    let step_key = step_key.to_string();
    move |target_index| {
        events_sink.track(
            &subject,
            events::ENROLLMENT_STEP_ADVANCED,
            Some(json!({
                "flowKey": flow.as_str(),
                "stepKey": step_key,
                "targetIndex": target_index,
            })),
        );
    }
}
