// review_agent/src/errors.rs

use stepflow::StepflowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  /// Non-2xx answer from the GitHub API. `message` is GitHub's own `message` field when present.
  #[error("GitHub API Error ({status}): {message}")]
  GitHub { status: u16, message: String },

  #[error("HTTP Error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("JSON Error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Decoding Error: {0}")]
  Decode(String),

  #[error("Invalid Input: {0}")]
  InvalidInput(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from] // Allows conversion from stepflow::StepflowError
    source: StepflowError,
  },
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
