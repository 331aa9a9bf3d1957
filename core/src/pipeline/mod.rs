// stepflow/src/pipeline/mod.rs

//! Defines the `Workflow` type, its construction through `WorkflowBuilder`, and its execution.

pub mod definition;
pub mod execution;

pub use definition::{Workflow, WorkflowBuilder};
