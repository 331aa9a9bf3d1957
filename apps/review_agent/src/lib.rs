// review_agent/src/lib.rs

pub mod agent;
pub mod analysis;
pub mod config;
pub mod errors;
pub mod github;
pub mod tools;
pub mod workflows;

pub use agent::{build_agent, CodeReviewAgent};
pub use config::{AppConfig, ModelConfig};
pub use errors::{AppError, Result};
pub use github::{GitHubApi, GitHubClient};
