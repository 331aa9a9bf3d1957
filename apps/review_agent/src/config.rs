// review_agent/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_MODEL_NAME: &str = "qwen2.5:1.5b";
pub const DEFAULT_MODEL_BASE_URL: &str = "http://127.0.0.1:11434/api";

/// Model/provider selection. Opaque to the engine; carried in the runtime context for
/// whichever host drives the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
  pub model_name: String,
  pub base_url: String,
}

impl Default for ModelConfig {
  fn default() -> Self {
    Self {
      model_name: DEFAULT_MODEL_NAME.to_string(),
      base_url: DEFAULT_MODEL_BASE_URL.to_string(),
    }
  }
}

#[derive(Clone)]
pub struct AppConfig {
  pub github_token: Option<String>,
  pub github_api_url: String,
  pub github_user_agent: String,
  pub request_timeout: Duration,
  pub model: ModelConfig,
}

impl AppConfig {
  /// Loads `.env` if present, then reads the process environment.
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|var_name| env::var(var_name).ok())
  }

  /// Builds the configuration from any variable source.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get_env = |var_name: &str| lookup(var_name).filter(|value| !value.trim().is_empty());

    let github_token = get_env("GITHUB_TOKEN");
    let github_api_url = get_env("GITHUB_API_URL")
      .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string())
      .trim_end_matches('/')
      .to_string();
    if !github_api_url.starts_with("http://") && !github_api_url.starts_with("https://") {
      return Err(AppError::Config(format!(
        "Invalid GITHUB_API_URL '{}': expected an http(s) URL",
        github_api_url
      )));
    }
    let github_user_agent = get_env("GITHUB_USER_AGENT").unwrap_or_else(|| "review-agent".to_string());
    let request_timeout = get_env("GITHUB_TIMEOUT_SECS")
      .unwrap_or_else(|| "30".to_string())
      .parse::<u64>()
      .map(Duration::from_secs)
      .map_err(|e| AppError::Config(format!("Invalid GITHUB_TIMEOUT_SECS: {}", e)))?;

    let model = ModelConfig {
      model_name: get_env("MODEL_NAME_AT_ENDPOINT").unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
      base_url: get_env("API_BASE_URL").unwrap_or_else(|| DEFAULT_MODEL_BASE_URL.to_string()),
    };

    tracing::info!(
      model_name = %model.model_name,
      base_url = %model.base_url,
      github_api_url = %github_api_url,
      authenticated = github_token.is_some(),
      "Application configuration loaded successfully."
    );

    Ok(Self {
      github_token,
      github_api_url,
      github_user_agent,
      request_timeout,
      model,
    })
  }
}

// The token stays out of logs.
impl std::fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AppConfig")
      .field("github_token", &self.github_token.as_ref().map(|_| "[REDACTED]"))
      .field("github_api_url", &self.github_api_url)
      .field("github_user_agent", &self.github_user_agent)
      .field("request_timeout", &self.request_timeout)
      .field("model", &self.model)
      .finish()
  }
}
