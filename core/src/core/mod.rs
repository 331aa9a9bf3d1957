pub mod context;
pub mod control;
pub mod stage;
pub mod step;

// Re-export key types for easier access from other stepflow modules (and lib.rs)
pub use context::{CapabilityKey, MissingCapability, RuntimeContext};
pub use control::{FailureKind, RunState, StageFailure};
pub use stage::{Branch, BranchArm, Condition, MapContext, MapFn, Mapper, NoMatch, Stage};
pub use step::{StepDef, StepExecutor, StepFuture};
