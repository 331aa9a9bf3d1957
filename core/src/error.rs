// stepflow/src/error.rs
use crate::core::control::{FailureKind, StageFailure};
use crate::schema::ValidationError;
use anyhow::Error as AnyhowError;
use std::fmt;
use thiserror::Error;

/// Which side of a stage a validation ran on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
  Input,
  Output,
}

impl fmt::Display for Boundary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Boundary::Input => f.write_str("input"),
      Boundary::Output => f.write_str("output"),
    }
  }
}

#[derive(Debug, Error)]
pub enum StepflowError {
  #[error("Invalid {boundary} for stage '{stage_id}': {source}")]
  Validation {
    stage_id: String,
    boundary: Boundary,
    #[source]
    source: ValidationError,
  },

  #[error("Stage '{stage_id}' failed: {source:#}")]
  StepExecution {
    stage_id: String,
    #[source]
    source: AnyhowError,
  },

  #[error("Stage '{stage_id}' requires capability '{capability}', which the runtime context does not provide")]
  MissingCapability { stage_id: String, capability: String },

  #[error("No branch condition matched in stage '{stage_id}'")]
  NoBranchMatched { stage_id: String },

  #[error("Configuration error: {message}")]
  Configuration { message: String },

  #[error("No tool or workflow registered under id '{id}'")]
  UnknownCallable { id: String },
}

impl StepflowError {
  /// The id of the stage the failure is attributed to, if it happened while running one.
  pub fn stage_id(&self) -> Option<&str> {
    match self {
      StepflowError::Validation { stage_id, .. }
      | StepflowError::StepExecution { stage_id, .. }
      | StepflowError::MissingCapability { stage_id, .. }
      | StepflowError::NoBranchMatched { stage_id } => Some(stage_id),
      StepflowError::Configuration { .. } | StepflowError::UnknownCallable { .. } => None,
    }
  }

  pub fn kind(&self) -> FailureKind {
    match self {
      StepflowError::Validation { .. } => FailureKind::Validation,
      StepflowError::StepExecution { .. } => FailureKind::Execution,
      StepflowError::MissingCapability { .. } => FailureKind::MissingCapability,
      StepflowError::NoBranchMatched { .. } => FailureKind::NoBranchMatched,
      StepflowError::Configuration { .. } | StepflowError::UnknownCallable { .. } => FailureKind::Configuration,
    }
  }

  /// Flattens the error into the cloneable record surfaced to callers of `Workflow::invoke`.
  ///
  /// Errors raised outside any stage (registry lookups, commit-time configuration) are
  /// attributed to `fallback_stage_id`.
  pub fn to_failure(&self, fallback_stage_id: &str) -> StageFailure {
    let message = match self {
      StepflowError::Validation { boundary, source, .. } => format!("invalid {}: {}", boundary, source),
      StepflowError::StepExecution { source, .. } => format!("{:#}", source),
      other => other.to_string(),
    };
    StageFailure {
      stage_id: self.stage_id().unwrap_or(fallback_stage_id).to_string(),
      kind: self.kind(),
      message,
    }
  }
}

pub type StepflowResult<T, E = StepflowError> = std::result::Result<T, E>;
