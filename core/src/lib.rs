// src/lib.rs

//! Stepflow: an async, schema-checked workflow engine for Rust.
//!
//! Stepflow lets you define multi-stage processes (workflows) with:
//!  - Named async steps with declared input and output schemas, validated at every boundary.
//!  - Pure mapper stages that reshape data between steps.
//!  - Branch stages that pick a step by a condition over the current data.
//!  - A capability-scoped runtime context shared by every stage of an invocation.
//!  - An id-keyed registry of tools and workflows for agent hosts.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod schema;

// --- Re-exports for the Public API ---

pub use crate::core::context::{CapabilityKey, MissingCapability, RuntimeContext};
pub use crate::core::control::{FailureKind, RunState, StageFailure};
pub use crate::core::stage::{BranchArm, MapContext, NoMatch, Stage};
pub use crate::core::step::StepDef;

pub use crate::pipeline::definition::{Workflow, WorkflowBuilder};

pub use crate::registry::{Callable, CallableInfo, CallableKind, Registry};

pub use crate::schema::{validate, Field, ObjectSchema, Schema, ValidationError};

pub use crate::error::{Boundary, StepflowError, StepflowResult};

/*
    Core Workflow:
    1. Describe the data with `Schema` values.
    2. Define steps with `StepDef::new` (raw JSON) or `StepDef::typed` (serde types).
       Declare capabilities they read with `.requires::<T>()`.
    3. Assemble them with `WorkflowBuilder::new(id, input, output)`, chaining
       `.then(step)`, `.map(|m| ...)` and `.branch([BranchArm::when(cond, step), ...])`.
    4. `commit()` the builder to get an immutable, shareable `Workflow`.
    5. Create a `RuntimeContext`, insert the capabilities, and call
       `workflow.run(input, ctx).await` (or `invoke` for a `RunState`).
    6. Optionally register steps and workflows in a `Registry` and call them by id.
*/
