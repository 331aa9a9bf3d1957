// review_agent/src/workflows/gh_profile.rs

use crate::github::GitHubApi;
use crate::tools::github;
use crate::tools::users::{fetch_profile, username_input};
use serde::Deserialize;
use serde_json::{json, Value};
use stepflow::{RuntimeContext, Schema, StepDef, StepflowResult, Workflow, WorkflowBuilder};

pub const WORKFLOW_ID: &str = "gh-profile-workflow";

fn profile_output() -> Schema {
  Schema::object().field("profile", Schema::any()).build()
}

#[derive(Debug, Deserialize)]
struct ProfileInput {
  username: String,
}

// Inside a workflow a failed lookup fails the run instead of returning a modeled failure.
async fn fetch(input: ProfileInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  let profile = fetch_profile(api.as_ref(), &input.username).await?;
  Ok(json!({ "profile": profile }))
}

pub fn fetch_profile_step() -> StepDef {
  StepDef::typed(
    "fetchProfile",
    "Fetch a GitHub user's profile and repositories",
    username_input(),
    profile_output(),
    fetch,
  )
  .requires::<dyn GitHubApi>()
}

pub fn workflow() -> StepflowResult<Workflow> {
  WorkflowBuilder::new(WORKFLOW_ID, username_input(), profile_output())
    .description("Fetch a GitHub user's profile")
    .then(fetch_profile_step())
    .map(|m| json!({ "profile": m.input()["profile"] }))
    .commit()
}
