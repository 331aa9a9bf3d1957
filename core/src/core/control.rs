// stepflow/src/core/control.rs

//! Execution states of a workflow invocation and the record of a failed stage.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Lifecycle of a single workflow invocation.
///
/// `NotStarted -> Running -> (Completed | Failed)`. `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
  NotStarted,
  Running { stage_index: usize, stage_id: String },
  Completed(Value),
  Failed(StageFailure),
}

impl RunState {
  pub fn is_terminal(&self) -> bool {
    matches!(self, RunState::Completed(_) | RunState::Failed(_))
  }

  /// The final data of a completed run.
  pub fn output(&self) -> Option<&Value> {
    match self {
      RunState::Completed(value) => Some(value),
      _ => None,
    }
  }

  pub fn failure(&self) -> Option<&StageFailure> {
    match self {
      RunState::Failed(failure) => Some(failure),
      _ => None,
    }
  }
}

/// Category of a stage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
  Validation,
  Execution,
  MissingCapability,
  NoBranchMatched,
  Configuration,
}

/// Cloneable summary of why an invocation stopped: which stage, what kind, and the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailure {
  pub stage_id: String,
  pub kind: FailureKind,
  pub message: String,
}

impl fmt::Display for StageFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "stage '{}' failed: {}", self.stage_id, self.message)
  }
}
