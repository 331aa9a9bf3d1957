// review_agent/src/tools/mod.rs

//! Agent-facing GitHub tools.
//!
//! Every tool is a `StepDef` that reads the `dyn GitHubApi` capability from the runtime
//! context. GitHub failures never raise out of a tool: they come back as the modeled
//! `{ "ok": false, "message": .. }` value, which is why each output schema is a union
//! with [`failure_schema`]. A missing capability or malformed input still raises.

pub mod files;
pub mod issues;
pub mod pulls;
pub mod repos;
pub mod users;

use crate::errors::AppError;
use crate::github::GitHubApi;
use serde_json::{json, Value};
use std::sync::Arc;
use stepflow::{ObjectSchema, RuntimeContext, Schema, StepDef};
use tracing::{event, Level};

/// The modeled failure value.
pub fn failure(message: impl Into<String>) -> Value {
  json!({ "ok": false, "message": message.into() })
}

pub fn failure_schema() -> Schema {
  Schema::object()
    .field("ok", Schema::literal(false))
    .field("message", Schema::string())
    .describe("Error message")
    .build()
}

/// `success | { ok: false, message }`.
pub fn or_failure(success: impl Into<Schema>) -> Schema {
  Schema::union([success.into(), failure_schema()])
}

/// Output of every "create something" tool.
pub fn url_result_schema() -> Schema {
  or_failure(
    Schema::object()
      .field("ok", Schema::literal(true))
      .field("url", Schema::string()),
  )
}

pub fn created(url: impl Into<String>) -> Value {
  json!({ "ok": true, "url": url.into() })
}

/// `owner` and `repo`, the start of most tool inputs.
pub fn repo_input() -> ObjectSchema {
  Schema::object()
    .field("owner", Schema::string())
    .describe("The owner of the repository. As facebook in facebook/react")
    .field("repo", Schema::string())
    .describe("The name of the repository. As react in facebook/react")
}

pub fn state_filter() -> Schema {
  Schema::enumeration(["open", "closed", "all"])
}

/// Fetches the GitHub capability for a step body.
pub fn github(ctx: &RuntimeContext) -> anyhow::Result<Arc<dyn GitHubApi>> {
  Ok(ctx.require::<dyn GitHubApi>()?)
}

/// Logs a failed GitHub call and turns it into the modeled failure value.
pub(crate) fn modeled_failure(tool: &'static str, error: AppError) -> Value {
  event!(Level::WARN, tool, error = %error, "GitHub call failed, returning modeled failure.");
  failure(error.to_string())
}

/// Every tool the agent exposes, in registration order.
pub fn all_tools() -> Vec<StepDef> {
  vec![
    repos::get_repository_commits(),
    files::get_file_content(),
    files::get_file_paths(),
    issues::get_repository_issues(),
    pulls::get_repository_pull_requests(),
    issues::create_issue(),
    pulls::summarize_pull_requests(),
    pulls::review_pull_request(),
    pulls::comment_on_pull_request(),
    pulls::create_pull_request(),
    issues::summarize_issues(),
    issues::comment_on_issue(),
    repos::fork_repository(),
    repos::create_repository(),
    users::get_github_user(),
    users::get_user_contribution_activity(),
  ]
}
