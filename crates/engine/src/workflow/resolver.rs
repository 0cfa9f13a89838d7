//! Chooses the concrete checkpoint list for a page context.
//!
//! Resolution is a pure function of the [`FlowContext`]: the page family
//! selects the step family, server-reported facts select one of a few fully
//! enumerated variants within it, and a single feature flag may splice one
//! extra checkpoint in at a fixed position. Facts never combine
//! combinatorially. The match is over a closed enum, so totality (every
//! context maps to *some* non-empty array) is checked by the compiler, and
//! an unrecognized route falls back to the default welcome flow rather than
//! failing.
//!
//! The resolved array's final element is the one that fires the
//! flow-completed effect; all earlier elements carry advance tracking only.
//! Output must be treated as immutable once handed to a
//! [`WorkflowEngine`](crate::workflow::engine::WorkflowEngine): on any
//! context change the owner resolves again and starts a fresh engine at
//! index 0, because step identities are not stable across variants.

use std::sync::Arc;

use cohort_types::{FlowContext, FlowKey, events};
use serde_json::json;

use crate::sinks::{CompletionSink, EventSink, NoopSink};
use crate::workflow::step::WorkflowStep;

/// Dependencies the resolved steps close over.
#[derive(Clone)]
pub struct FlowHandles {
    /// Admin the flow runs for; forwarded to both sinks.
    pub subject_id: String,
    /// Analytics sink for advance/completion events.
    pub events: Arc<dyn EventSink>,
    /// Persistence sink for the flow-completed marker.
    pub completions: Arc<dyn CompletionSink>,
}

impl FlowHandles {
    /// Creates handles over the given sinks.
    pub fn new(subject_id: impl Into<String>, events: Arc<dyn EventSink>, completions: Arc<dyn CompletionSink>) -> Self {
        Self {
            subject_id: subject_id.into(),
            events,
            completions,
        }
    }

    /// Handles that drop every side effect; for previews and tests.
    pub fn noop(subject_id: impl Into<String>) -> Self {
        let sink = Arc::new(NoopSink);
        Self::new(subject_id, sink.clone(), sink)
    }
}

impl std::fmt::Debug for FlowHandles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowHandles").field("subject_id", &self.subject_id).finish()
    }
}

/// Stable persistence key for the flow a context resolves to.
///
/// Keyed by family and variant; the feature-flag splice does not change the
/// key, since it decorates a variant rather than defining one.
pub fn flow_key(context: &FlowContext) -> FlowKey {
    match context {
        FlowContext::SubscriptionPlans { subscription_count } if *subscription_count > 1 => "tour.subscription-plans.multi".into(),
        FlowContext::SubscriptionPlans { .. } => "tour.subscription-plans.single".into(),
        FlowContext::SubscriptionDetail { has_accepted_members: true } => "tour.subscription-detail.active".into(),
        FlowContext::SubscriptionDetail { .. } => "tour.subscription-detail.empty".into(),
        FlowContext::LearnerCredit {
            has_spent_transactions: true,
            ..
        } => "tour.learner-credit.spending".into(),
        FlowContext::LearnerCredit { .. } => "tour.learner-credit.fresh".into(),
        FlowContext::Unknown => "tour.default".into(),
    }
}

/// Resolves `context` to the ordered checkpoint list for its page.
///
/// Deterministic: structurally equal contexts always yield step arrays with
/// identical keys in identical order. The result is never empty.
pub fn resolve(context: &FlowContext, handles: &FlowHandles) -> Vec<WorkflowStep> {
    let flow = flow_key(context);

    let mut outline: Vec<(&str, &str)> = match context {
        FlowContext::SubscriptionPlans { subscription_count } if *subscription_count > 1 => vec![
            ("plans-overview", "Your subscription plans"),
            ("choose-plan", "Pick the plan to work in"),
            ("manage-requests", "Manage enrollment requests"),
            ("track-usage", "Track license usage"),
        ],
        FlowContext::SubscriptionPlans { .. } => vec![
            ("plans-overview", "Your subscription plan"),
            ("invite-learners", "Invite your learners"),
            ("track-usage", "Track license usage"),
        ],
        FlowContext::SubscriptionDetail { has_accepted_members: true } => vec![
            ("license-summary", "License summary"),
            ("manage-learners", "Manage enrolled learners"),
            ("review-activity", "Review learner activity"),
        ],
        FlowContext::SubscriptionDetail { .. } => vec![
            ("license-summary", "License summary"),
            ("invite-first-learner", "Invite your first learner"),
        ],
        FlowContext::LearnerCredit {
            has_spent_transactions: true,
            ..
        } => vec![
            ("budget-overview", "Budget overview"),
            ("spend-activity", "Review spend activity"),
            ("budget-detail", "Budget detail"),
        ],
        FlowContext::LearnerCredit { .. } => vec![
            ("budget-overview", "Budget overview"),
            ("allocate-budget", "Allocate your budget"),
            ("invite-spenders", "Invite learners to spend"),
        ],
        FlowContext::Unknown => vec![("welcome", "Welcome to your admin portal")],
    };

    // The one composition point: a flag splices a single checkpoint at a
    // fixed position, preserving the relative order of everything else.
    if let FlowContext::LearnerCredit {
        assignments_enabled: true, ..
    } = context
    {
        outline.insert(1, ("assign-credit", "Assign credit to learners"));
    }

    build_tour(handles, &flow, &outline)
}

fn build_tour(handles: &FlowHandles, flow: &FlowKey, outline: &[(&str, &str)]) -> Vec<WorkflowStep> {
    let last = outline.len() - 1;
    outline
        .iter()
        .enumerate()
        .map(|(index, (key, title))| {
            if index == last {
                final_checkpoint(handles, flow, key, title)
            } else {
                checkpoint(handles, flow, key, title)
            }
        })
        .collect()
}

fn checkpoint(handles: &FlowHandles, flow: &FlowKey, key: &str, title: &str) -> WorkflowStep {
    let events = Arc::clone(&handles.events);
    let subject = handles.subject_id.clone();
    let flow = flow.clone();
    let step_key = key.to_string();
    WorkflowStep::new(key, title).on_advance(move |target_index| {
        events.track(
            &subject,
            events::TOUR_STEP_ADVANCED,
            Some(json!({
                "flowKey": flow.as_str(),
                "stepKey": step_key,
                "targetIndex": target_index,
            })),
        );
    })
}

fn final_checkpoint(handles: &FlowHandles, flow: &FlowKey, key: &str, title: &str) -> WorkflowStep {
    let events = Arc::clone(&handles.events);
    let completions = Arc::clone(&handles.completions);
    let subject = handles.subject_id.clone();
    let flow = flow.clone();
    WorkflowStep::new(key, title).on_end(move || {
        completions.mark_complete(&subject, &flow);
        events.track(&subject, events::TOUR_COMPLETED, Some(json!({ "flowKey": flow.as_str() })));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::RecordingSink;
    use crate::workflow::engine::{Transition, WorkflowEngine};

    fn keys(steps: &[WorkflowStep]) -> Vec<&str> {
        steps.iter().map(WorkflowStep::key).collect()
    }

    #[test]
    fn resolution_is_deterministic() {
        let handles = FlowHandles::noop("admin-1");
        let context = FlowContext::LearnerCredit {
            has_spent_transactions: true,
            assignments_enabled: true,
        };
        let first = resolve(&context, &handles);
        let second = resolve(&context, &handles);
        assert_eq!(keys(&first), keys(&second));
    }

    #[test]
    fn subscription_count_selects_between_variants() {
        let handles = FlowHandles::noop("admin-1");
        let single = resolve(&FlowContext::SubscriptionPlans { subscription_count: 1 }, &handles);
        let multi = resolve(&FlowContext::SubscriptionPlans { subscription_count: 2 }, &handles);

        assert_eq!(single.len(), 3);
        assert_eq!(multi.len(), 4);
        assert!(keys(&multi).contains(&"manage-requests"));
        assert!(!keys(&single).contains(&"manage-requests"));
    }

    #[test]
    fn detail_variants_are_structurally_different() {
        let handles = FlowHandles::noop("admin-1");
        let empty = resolve(&FlowContext::SubscriptionDetail { has_accepted_members: false }, &handles);
        let active = resolve(&FlowContext::SubscriptionDetail { has_accepted_members: true }, &handles);

        assert_eq!(keys(&empty), vec!["license-summary", "invite-first-learner"]);
        assert_eq!(keys(&active), vec!["license-summary", "manage-learners", "review-activity"]);
    }

    #[test]
    fn assignments_flag_splices_at_fixed_position() {
        let handles = FlowHandles::noop("admin-1");
        let without = resolve(
            &FlowContext::LearnerCredit {
                has_spent_transactions: false,
                assignments_enabled: false,
            },
            &handles,
        );
        let with = resolve(
            &FlowContext::LearnerCredit {
                has_spent_transactions: false,
                assignments_enabled: true,
            },
            &handles,
        );

        assert_eq!(with.len(), without.len() + 1);
        assert_eq!(with[1].key(), "assign-credit");
        // Everything else keeps its relative order.
        let mut spliced = keys(&with);
        spliced.remove(1);
        assert_eq!(spliced, keys(&without));
    }

    #[test]
    fn unknown_context_falls_back_to_welcome() {
        let handles = FlowHandles::noop("admin-1");
        let steps = resolve(&FlowContext::Unknown, &handles);
        assert_eq!(keys(&steps), vec!["welcome"]);
        assert!(steps[0].has_end_effect());
    }

    #[test]
    fn only_the_final_step_carries_the_end_effect() {
        let handles = FlowHandles::noop("admin-1");
        for context in [
            FlowContext::SubscriptionPlans { subscription_count: 3 },
            FlowContext::SubscriptionDetail { has_accepted_members: true },
            FlowContext::LearnerCredit {
                has_spent_transactions: false,
                assignments_enabled: true,
            },
            FlowContext::Unknown,
        ] {
            let steps = resolve(&context, &handles);
            let (last, earlier) = steps.split_last().expect("resolver output is never empty");
            assert!(last.has_end_effect(), "final step of {context:?} must complete the flow");
            for step in earlier {
                assert!(!step.has_end_effect(), "non-final step {} must not complete", step.key());
            }
        }
    }

    #[test]
    fn flow_keys_distinguish_variants_but_not_the_splice() {
        let spending = FlowContext::LearnerCredit {
            has_spent_transactions: true,
            assignments_enabled: false,
        };
        let spending_with_flag = FlowContext::LearnerCredit {
            has_spent_transactions: true,
            assignments_enabled: true,
        };
        let fresh = FlowContext::LearnerCredit {
            has_spent_transactions: false,
            assignments_enabled: false,
        };

        assert_eq!(flow_key(&spending), flow_key(&spending_with_flag));
        assert_ne!(flow_key(&spending), flow_key(&fresh));
    }

    #[test]
    fn walking_a_tour_records_advances_then_completion() {
        let sink = Arc::new(RecordingSink::new());
        let handles = FlowHandles::new("admin-1", sink.clone(), sink.clone());
        let steps = resolve(&FlowContext::SubscriptionPlans { subscription_count: 1 }, &handles);
        let flow = flow_key(&FlowContext::SubscriptionPlans { subscription_count: 1 });
        let mut engine = WorkflowEngine::new(steps).expect("non-empty flow");

        assert_eq!(engine.advance(), Transition::Advanced);
        assert_eq!(engine.advance(), Transition::Advanced);
        assert_eq!(engine.advance(), Transition::Completed);

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].event_name, events::TOUR_STEP_ADVANCED);
        assert_eq!(events[0].metadata.as_ref().and_then(|m| m.get("targetIndex")), Some(&json!(1)));
        assert_eq!(events[2].event_name, events::TOUR_COMPLETED);

        let completions = sink.completions();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].flow_key, flow);
        assert_eq!(completions[0].subject_id, "admin-1");
    }

    #[test]
    fn context_swap_means_a_fresh_engine_at_zero() {
        let handles = FlowHandles::noop("admin-1");
        let mut engine =
            WorkflowEngine::new(resolve(&FlowContext::SubscriptionPlans { subscription_count: 1 }, &handles)).expect("non-empty flow");
        engine.advance();
        assert_eq!(engine.current_index(), 1);

        // Navigating list -> detail swaps the array; position is never
        // carried over because step identities differ between variants.
        let swapped =
            WorkflowEngine::new(resolve(&FlowContext::SubscriptionDetail { has_accepted_members: false }, &handles)).expect("non-empty flow");
        assert_eq!(swapped.current_index(), 0);
    }
}
