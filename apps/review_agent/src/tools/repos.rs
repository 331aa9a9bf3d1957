// review_agent/src/tools/repos.rs

use super::{created, github, modeled_failure, or_failure, repo_input, url_result_schema};
use crate::github::models::{CommitEntry, CommitQuery, ForkOptions, GitActor, NewRepository};
use crate::github::GitHubApi;
use serde::Deserialize;
use serde_json::{json, Value};
use stepflow::{RuntimeContext, Schema, StepDef};

fn actor_json(actor: Option<&GitActor>) -> Value {
  json!({
    "name": actor.and_then(|a| a.name.clone()),
    "email": actor.and_then(|a| a.email.clone()),
    "date": actor.and_then(|a| a.date.clone()),
  })
}

fn actor_schema() -> Schema {
  Schema::object()
    .field("name", Schema::string().nullable())
    .field("email", Schema::string().nullable())
    .field("date", Schema::string().nullable())
    .build()
}

fn commit_json(entry: &CommitEntry) -> Value {
  json!({
    "sha": entry.sha,
    "message": entry.commit.message,
    "url": entry.html_url,
    "author": actor_json(entry.commit.author.as_ref()),
    "committer": actor_json(entry.commit.committer.as_ref()),
    "username": entry.author.as_ref().and_then(|a| a.login.clone()),
    "verified": entry.commit.verification.as_ref().map_or(false, |v| v.verified),
  })
}

fn commit_schema() -> Schema {
  Schema::object()
    .field("sha", Schema::string())
    .field("message", Schema::string())
    .field("url", Schema::string())
    .field("author", actor_schema())
    .field("committer", actor_schema())
    .field("username", Schema::string().nullable())
    .describe("The GitHub login of the author, when the commit is linked to an account")
    .field("verified", Schema::boolean())
    .build()
}

// --- getRepositoryCommits ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListCommitsInput {
  owner: String,
  repo: String,
  sha: Option<String>,
  path: Option<String>,
  author: Option<String>,
  since: Option<String>,
  until: Option<String>,
  page: u32,
  per_page: u32,
}

async fn list_commits(input: ListCommitsInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  let query = CommitQuery {
    sha: input.sha,
    path: input.path,
    author: input.author,
    since: input.since,
    until: input.until,
    page: input.page,
    per_page: input.per_page,
  };
  Ok(match api.list_commits(&input.owner, &input.repo, &query).await {
    Ok(commits) => Value::Array(commits.iter().map(commit_json).collect()),
    Err(e) => modeled_failure("getRepositoryCommits", e),
  })
}

pub fn get_repository_commits() -> StepDef {
  let input = repo_input()
    .optional("sha", Schema::string())
    .describe("Branch name or commit SHA to start listing from")
    .optional("path", Schema::string())
    .describe("Only commits touching this file path")
    .optional("author", Schema::string())
    .describe("GitHub login or email address of the author")
    .optional("since", Schema::string())
    .describe("ISO 8601 timestamp; only commits after this date")
    .optional("until", Schema::string())
    .describe("ISO 8601 timestamp; only commits before this date")
    .with_default("page", Schema::integer(), 1)
    .with_default("perPage", Schema::integer().max(100), 30)
    .describe("The number of results per page (max 100)");
  StepDef::typed(
    "getRepositoryCommits",
    "Get the commit history of a repository",
    input,
    or_failure(Schema::array(commit_schema())),
    list_commits,
  )
  .requires::<dyn GitHubApi>()
}

// --- createRepository ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRepositoryInput {
  name: String,
  description: Option<String>,
  private: bool,
  auto_init: bool,
}

async fn new_repository(input: CreateRepositoryInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  let repo = NewRepository {
    name: input.name,
    description: input.description,
    private: input.private,
    auto_init: input.auto_init,
  };
  Ok(match api.create_repository(&repo).await {
    Ok(repository) => created(repository.html_url),
    Err(e) => modeled_failure("createRepository", e),
  })
}

pub fn create_repository() -> StepDef {
  let input = Schema::object()
    .field("name", Schema::string())
    .describe("The name of the new repository")
    .optional("description", Schema::string())
    .with_default("private", Schema::boolean(), false)
    .describe("Whether the repository is private")
    .with_default("autoInit", Schema::boolean(), false)
    .describe("Create an initial commit with an empty README");
  StepDef::typed(
    "createRepository",
    "Create a new repository for the authenticated user",
    input,
    url_result_schema(),
    new_repository,
  )
  .requires::<dyn GitHubApi>()
}

// --- forkRepository ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForkInput {
  owner: String,
  repo: String,
  organization: Option<String>,
  name: Option<String>,
  default_branch_only: bool,
}

async fn fork(input: ForkInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  let options = ForkOptions {
    organization: input.organization,
    name: input.name,
    default_branch_only: input.default_branch_only,
  };
  Ok(match api.fork_repository(&input.owner, &input.repo, &options).await {
    Ok(repository) => created(repository.html_url),
    Err(e) => modeled_failure("forkRepository", e),
  })
}

pub fn fork_repository() -> StepDef {
  let input = repo_input()
    .optional("organization", Schema::string())
    .describe("Organization to fork into; defaults to the authenticated user")
    .optional("name", Schema::string())
    .describe("Name for the fork")
    .with_default("defaultBranchOnly", Schema::boolean(), false)
    .describe("Fork only the default branch");
  StepDef::typed(
    "forkRepository",
    "Fork a repository into the authenticated user's account or an organization",
    input,
    url_result_schema(),
    fork,
  )
  .requires::<dyn GitHubApi>()
}
