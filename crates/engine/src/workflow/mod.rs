//! Step-gated workflow machinery: steps, the cursor engine, and the
//! context-to-steps resolver.

pub mod engine;
pub mod resolver;
pub mod step;

pub use engine::{Transition, WorkflowEngine};
pub use resolver::{FlowHandles, flow_key, resolve};
pub use step::WorkflowStep;
