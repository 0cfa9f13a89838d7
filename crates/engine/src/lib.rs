//! # Cohort Engine
//!
//! State machinery behind the portal's bulk-enrollment wizard and admin
//! onboarding tours: selection sets that survive pagination and page
//! refresh, and step-gated workflows whose forward transitions depend on the
//! live contents of those sets.
//!
//! Everything in this crate is synchronous, in-memory, and free of rendering
//! concerns. Network side effects (analytics, flow-completion persistence)
//! are reached only through the [`EventSink`] and [`CompletionSink`] traits
//! fired from step callbacks; implementations catch and log their own
//! failures so workflow navigation is never blocked on a tracking call.
//!
//! ## Architecture
//!
//! - **`selection`**: the [`SelectionStore`] reducer-style store plus the
//!   [`SelectionSyncAdapter`] bridging it to an externally-paginated source
//! - **`workflow`**: [`WorkflowEngine`] step cursor with forward guards, and
//!   the [`resolve`](workflow::resolver::resolve) context-to-steps resolver
//! - **`enrollment`**: the canonical four-step bulk-enrollment wizard
//! - **`review`**: the bounded, expandable [`ReviewWindow`] over a selection
//! - **`sinks`**: side-effect boundaries and their no-op/recording stand-ins

pub mod enrollment;
pub mod review;
pub mod selection;
pub mod sinks;
pub mod workflow;

pub use enrollment::{EnrollmentStores, enrollment_steps};
pub use review::ReviewWindow;
pub use selection::store::{SelectionStore, SubscriptionId, selection_cap_watch};
pub use selection::sync::{CheckboxState, PageSource, SelectionSyncAdapter};
pub use sinks::{CompletionSink, EventSink, NoopSink, RecordingSink};
pub use workflow::engine::{Transition, WorkflowEngine};
pub use workflow::resolver::{FlowHandles, flow_key, resolve};
pub use workflow::step::WorkflowStep;
