//! Flow contexts and the tracking vocabulary shared by the portal flows.
//!
//! `FlowContext` is a closed set on purpose: the resolver must be total, so
//! every page the portal can be on maps to exactly one variant here and the
//! match in the resolver is statically checkable. Contexts are read-only
//! facts; when a route or its underlying data changes, the owner builds a
//! fresh context rather than mutating one in place.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Read-only facts used to pick the concrete checkpoint list for a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowContext {
    /// Subscription plans list page.
    SubscriptionPlans {
        /// Number of subscription plans on the account.
        subscription_count: usize,
    },
    /// Single subscription detail page.
    SubscriptionDetail {
        /// Whether any learner has accepted an invitation on this plan.
        has_accepted_members: bool,
    },
    /// Learner credit budget page.
    LearnerCredit {
        /// Whether the budget has any spent transactions.
        has_spent_transactions: bool,
        /// Feature flag splicing the credit-assignment checkpoint in.
        assignments_enabled: bool,
    },
    /// Any route without a dedicated tour.
    Unknown,
}

/// Stable identifier a completed flow is persisted under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowKey(String);

impl FlowKey {
    /// Returns the key's textual form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FlowKey {
    fn from(value: &str) -> Self {
        FlowKey(value.to_string())
    }
}

impl From<String> for FlowKey {
    fn from(value: String) -> Self {
        FlowKey(value)
    }
}

/// Stable analytics event names, shared so callers and tests agree on one
/// vocabulary.
pub mod events {
    /// An enrollment wizard step advanced; metadata carries the target index.
    pub const ENROLLMENT_STEP_ADVANCED: &str = "enrollment.step.advanced";
    /// The enrollment wizard's final step ran its completion effect.
    pub const ENROLLMENT_SUBMITTED: &str = "enrollment.submitted";
    /// An onboarding tour checkpoint advanced; metadata carries the target index.
    pub const TOUR_STEP_ADVANCED: &str = "tour.step.advanced";
    /// An onboarding tour reached and completed its final checkpoint.
    pub const TOUR_COMPLETED: &str = "tour.completed";
}
