// review_agent/src/tools/issues.rs

use super::{created, github, modeled_failure, or_failure, repo_input, state_filter, url_result_schema};
use crate::github::models::{Account, Issue, IssueQuery, NewIssue};
use crate::github::GitHubApi;
use serde::Deserialize;
use serde_json::{json, Value};
use stepflow::{RuntimeContext, Schema, StepDef};

pub(crate) fn account_json(account: Option<&Account>) -> Value {
  json!({
    "avatarUrl": account.and_then(|a| a.avatar_url.clone()),
    "url": account.and_then(|a| a.html_url.clone()),
    "username": account.and_then(|a| a.login.clone()),
  })
}

pub(crate) fn account_schema() -> Schema {
  Schema::object()
    .field("avatarUrl", Schema::string().nullable())
    .field("url", Schema::string().nullable())
    .field("username", Schema::string().nullable())
    .build()
}

fn issue_json(issue: &Issue) -> Value {
  let labels: Vec<Value> = issue
    .labels
    .iter()
    .map(|l| {
      json!({
        "name": l.name.clone().unwrap_or_default(),
        "color": l.color.clone().unwrap_or_default(),
      })
    })
    .collect();
  let assignees: Vec<Value> = issue.assignees.iter().map(|a| account_json(Some(a))).collect();
  json!({
    "body": issue.body,
    "number": issue.number,
    "state": issue.state,
    "title": issue.title,
    "url": issue.html_url,
    "labels": labels,
    "assignees": assignees,
    "user": account_json(issue.user.as_ref()),
    "createdAt": issue.created_at,
    "updatedAt": issue.updated_at,
    "closedAt": issue.closed_at,
  })
}

fn issue_schema() -> Schema {
  Schema::object()
    .field("body", Schema::string().nullable())
    .describe("The body content of the issue")
    .field("number", Schema::integer())
    .field("state", Schema::enumeration(["open", "closed"]))
    .field("title", Schema::string())
    .field("url", Schema::string())
    .field(
      "labels",
      Schema::array(
        Schema::object()
          .field("name", Schema::string())
          .field("color", Schema::string())
          .build(),
      ),
    )
    .field("assignees", Schema::array(account_schema()))
    .field("user", account_schema())
    .describe("The user details of the issue creator")
    .field("createdAt", Schema::string())
    .field("updatedAt", Schema::string())
    .field("closedAt", Schema::string().nullable())
    .build()
}

// --- getRepositoryIssues ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListIssuesInput {
  owner: String,
  repo: String,
  state: String,
  labels: Option<Vec<String>>,
  assignee: Option<String>,
  creator: Option<String>,
  page: u32,
  per_page: u32,
}

async fn list_issues(input: ListIssuesInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  let query = IssueQuery {
    state: input.state,
    labels: input.labels.map(|labels| labels.join(",")),
    assignee: input.assignee,
    creator: input.creator,
    page: input.page,
    per_page: input.per_page,
  };
  Ok(match api.list_issues(&input.owner, &input.repo, &query).await {
    Ok(issues) => Value::Array(issues.iter().filter(|i| !i.is_pull_request()).map(issue_json).collect()),
    Err(e) => modeled_failure("getRepositoryIssues", e),
  })
}

pub fn get_repository_issues() -> StepDef {
  let input = repo_input()
    .with_default("state", state_filter(), "all")
    .describe("The state of the issue")
    .optional("labels", Schema::array(Schema::string()))
    .describe("List of label names to filter issues by")
    .optional("assignee", Schema::string())
    .describe("GitHub username of the assignee to filter issues by")
    .optional("creator", Schema::string())
    .describe("GitHub username of the issue creator to filter by")
    .with_default("page", Schema::integer(), 1)
    .describe("The page number of the results to fetch")
    .with_default("perPage", Schema::integer().max(100), 30)
    .describe("The number of results per page (max 100)");
  StepDef::typed(
    "getRepositoryIssues",
    "Get issues (excluding pull requests) for a repository",
    input,
    or_failure(Schema::array(issue_schema())),
    list_issues,
  )
  .requires::<dyn GitHubApi>()
}

// --- createIssue ---

#[derive(Debug, Deserialize)]
struct CreateIssueInput {
  owner: String,
  repo: String,
  title: String,
  body: Option<String>,
  assignees: Option<Vec<String>>,
  labels: Option<Vec<String>>,
}

async fn open_issue(input: CreateIssueInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  let issue = NewIssue {
    title: input.title,
    body: input.body,
    assignees: input.assignees,
    labels: input.labels,
  };
  Ok(match api.create_issue(&input.owner, &input.repo, &issue).await {
    Ok(resource) => created(resource.html_url),
    Err(e) => modeled_failure("createIssue", e),
  })
}

pub fn create_issue() -> StepDef {
  let input = repo_input()
    .field("title", Schema::string())
    .describe("The title of the issue")
    .optional("body", Schema::string())
    .describe("The body content of the issue")
    .optional("assignees", Schema::array(Schema::string()))
    .describe("Usernames to assign the issue to")
    .optional("labels", Schema::array(Schema::string()))
    .describe("Labels to assign to the issue");
  StepDef::typed(
    "createIssue",
    "Create a new issue in a repository",
    input,
    url_result_schema(),
    open_issue,
  )
  .requires::<dyn GitHubApi>()
}

// --- commentOnIssue ---

#[derive(Debug, Deserialize)]
struct CommentInput {
  owner: String,
  repo: String,
  issue_number: u64,
  body: String,
}

async fn comment(input: CommentInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  Ok(
    match api
      .comment_on_issue(&input.owner, &input.repo, input.issue_number, &input.body)
      .await
    {
      Ok(resource) => created(resource.html_url),
      Err(e) => modeled_failure("commentOnIssue", e),
    },
  )
}

pub fn comment_on_issue() -> StepDef {
  let input = repo_input()
    .field("issue_number", Schema::integer())
    .describe("The number of the issue")
    .field("body", Schema::string())
    .describe("The comment body");
  StepDef::typed(
    "commentOnIssue",
    "Add a comment to an issue in a repository",
    input,
    url_result_schema(),
    comment,
  )
  .requires::<dyn GitHubApi>()
}

// --- summarizeIssues ---

#[derive(Debug, Deserialize)]
pub(crate) struct RepoRef {
  pub owner: String,
  pub repo: String,
}

/// `{openCount, closedCount, totalCount, summary}`. On a GitHub failure the counts are
/// zero and `summary` carries the error text.
pub(crate) fn counts_schema() -> Schema {
  Schema::object()
    .field("openCount", Schema::integer())
    .field("closedCount", Schema::integer())
    .field("totalCount", Schema::integer())
    .field("summary", Schema::string())
    .build()
}

pub(crate) fn counts_json<'a, I>(states: I, noun: &str) -> Value
where
  I: IntoIterator<Item = &'a str>,
{
  let (mut open, mut closed, mut total) = (0usize, 0usize, 0usize);
  for state in states {
    total += 1;
    match state {
      "open" => open += 1,
      "closed" => closed += 1,
      _ => {}
    }
  }
  json!({
    "openCount": open,
    "closedCount": closed,
    "totalCount": total,
    "summary": format!("There are {} open and {} closed {} (total: {}).", open, closed, noun, total),
  })
}

pub(crate) fn counts_failure(tool: &'static str, error: crate::errors::AppError) -> Value {
  let message = modeled_failure(tool, error)["message"].clone();
  json!({ "openCount": 0, "closedCount": 0, "totalCount": 0, "summary": message })
}

async fn summarize(input: RepoRef, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  let query = IssueQuery {
    state: "all".to_string(),
    page: 1,
    per_page: 100,
    ..IssueQuery::default()
  };
  Ok(match api.list_issues(&input.owner, &input.repo, &query).await {
    Ok(issues) => counts_json(
      issues.iter().filter(|i| !i.is_pull_request()).map(|i| i.state.as_str()),
      "issues",
    ),
    Err(e) => counts_failure("summarizeIssues", e),
  })
}

pub fn summarize_issues() -> StepDef {
  StepDef::typed(
    "summarizeIssues",
    "Summarize issues for a repository, returning counts and a summary string.",
    repo_input(),
    counts_schema(),
    summarize,
  )
  .requires::<dyn GitHubApi>()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn counts_render_the_summary_sentence() {
    let value = counts_json(["open", "closed", "open"], "issues");
    assert_eq!(value["openCount"], 2);
    assert_eq!(value["totalCount"], 3);
    assert_eq!(value["summary"], "There are 2 open and 1 closed issues (total: 3).");
  }

  #[test]
  fn missing_account_fields_render_as_null() {
    let value = account_json(None);
    assert_eq!(value, json!({ "avatarUrl": null, "url": null, "username": null }));
    assert!(stepflow::validate(&account_schema(), &value).is_ok());
  }
}
