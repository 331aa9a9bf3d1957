// review_agent/src/tools/pulls.rs

use super::issues::{account_json, account_schema, counts_failure, counts_json, counts_schema, RepoRef};
use super::{created, github, modeled_failure, or_failure, repo_input, state_filter, url_result_schema};
use crate::github::models::{NewPullRequest, NewReview, PullQuery, PullRequest, ReviewEvent};
use crate::github::GitHubApi;
use serde::Deserialize;
use serde_json::{json, Value};
use stepflow::{RuntimeContext, Schema, StepDef};

fn pull_json(pull: &PullRequest) -> Value {
  json!({
    "body": pull.body,
    "number": pull.number,
    "state": pull.state,
    "title": pull.title,
    "url": pull.html_url,
    "user": account_json(pull.user.as_ref()),
  })
}

fn pull_schema() -> Schema {
  Schema::object()
    .field("body", Schema::string().nullable())
    .describe("The body content of the pr")
    .field("number", Schema::integer())
    .field("state", Schema::enumeration(["open", "closed"]))
    .field("title", Schema::string())
    .field("url", Schema::string())
    .field("user", account_schema())
    .build()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPullsInput {
  owner: String,
  repo: String,
  state: String,
  page: u32,
  per_page: u32,
}

async fn list_pulls(input: ListPullsInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  let query = PullQuery {
    state: input.state,
    page: input.page,
    per_page: input.per_page,
  };
  Ok(match api.list_pulls(&input.owner, &input.repo, &query).await {
    Ok(pulls) => Value::Array(pulls.iter().map(pull_json).collect()),
    Err(e) => modeled_failure("getRepositoryPullRequests", e),
  })
}

pub fn get_repository_pull_requests() -> StepDef {
  let input = repo_input()
    .with_default("state", state_filter(), "all")
    .describe("The state of the pull request")
    .with_default("page", Schema::integer(), 1)
    .describe("The page number of the results to fetch.")
    .with_default("perPage", Schema::integer().max(100), 30)
    .describe("The number of results per page (max 100).");
  StepDef::typed(
    "getRepositoryPullRequests",
    "Get pull requests for a repository",
    input,
    or_failure(Schema::array(pull_schema())),
    list_pulls,
  )
  .requires::<dyn GitHubApi>()
}

// Pull request conversation comments live on the issues endpoint.
#[derive(Debug, Deserialize)]
struct PullCommentInput {
  owner: String,
  repo: String,
  pull_number: u64,
  body: String,
}

async fn comment(input: PullCommentInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  Ok(
    match api
      .comment_on_issue(&input.owner, &input.repo, input.pull_number, &input.body)
      .await
    {
      Ok(resource) => created(resource.html_url),
      Err(e) => modeled_failure("commentOnPullRequest", e),
    },
  )
}

pub fn comment_on_pull_request() -> StepDef {
  let input = repo_input()
    .field("pull_number", Schema::integer())
    .describe("The number of the pull request")
    .field("body", Schema::string())
    .describe("The comment body");
  StepDef::typed(
    "commentOnPullRequest",
    "Add a comment to a pull request in a repository",
    input,
    url_result_schema(),
    comment,
  )
  .requires::<dyn GitHubApi>()
}

#[derive(Debug, Deserialize)]
struct CreatePullInput {
  owner: String,
  repo: String,
  title: String,
  head: String,
  base: String,
  body: Option<String>,
}

async fn open_pull(input: CreatePullInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  let pull = NewPullRequest {
    title: input.title,
    head: input.head,
    base: input.base,
    body: input.body,
  };
  Ok(match api.create_pull(&input.owner, &input.repo, &pull).await {
    Ok(resource) => created(resource.html_url),
    Err(e) => modeled_failure("createPullRequest", e),
  })
}

pub fn create_pull_request() -> StepDef {
  let input = repo_input()
    .field("title", Schema::string())
    .describe("The title of the pull request")
    .field("head", Schema::string())
    .describe("The name of the branch where changes are implemented")
    .field("base", Schema::string())
    .describe("The name of the branch you want the changes pulled into")
    .optional("body", Schema::string())
    .describe("The body content of the pull request");
  StepDef::typed(
    "createPullRequest",
    "Create a new pull request in a repository",
    input,
    url_result_schema(),
    open_pull,
  )
  .requires::<dyn GitHubApi>()
}

#[derive(Debug, Deserialize)]
struct ReviewInput {
  owner: String,
  repo: String,
  pull_number: u64,
  event: ReviewEvent,
  body: Option<String>,
}

async fn review(input: ReviewInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  let review = NewReview {
    event: input.event,
    body: input.body,
  };
  Ok(
    match api
      .review_pull(&input.owner, &input.repo, input.pull_number, &review)
      .await
    {
      Ok(resource) => created(resource.html_url),
      Err(e) => modeled_failure("reviewPullRequest", e),
    },
  )
}

pub fn review_pull_request() -> StepDef {
  let input = repo_input()
    .field("pull_number", Schema::integer())
    .describe("The number of the pull request")
    .field("event", Schema::enumeration(["APPROVE", "REQUEST_CHANGES", "COMMENT"]))
    .describe("The type of review event")
    .optional("body", Schema::string())
    .describe("The body of the review comment");
  StepDef::typed(
    "reviewPullRequest",
    "Submit a review for a pull request (approve, request changes, or comment)",
    input,
    url_result_schema(),
    review,
  )
  .requires::<dyn GitHubApi>()
}

async fn summarize(input: RepoRef, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  let query = PullQuery {
    state: "all".to_string(),
    page: 1,
    per_page: 100,
  };
  Ok(match api.list_pulls(&input.owner, &input.repo, &query).await {
    Ok(pulls) => counts_json(pulls.iter().map(|p| p.state.as_str()), "pull requests"),
    Err(e) => counts_failure("summarizePullRequests", e),
  })
}

pub fn summarize_pull_requests() -> StepDef {
  StepDef::typed(
    "summarizePullRequests",
    "Summarize pull requests for a repository, returning counts and a summary string.",
    repo_input(),
    counts_schema(),
    summarize,
  )
  .requires::<dyn GitHubApi>()
}
