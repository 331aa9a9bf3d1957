// review_agent/src/tools/users.rs

use super::{github, modeled_failure, or_failure};
use crate::errors::{AppError, Result};
use crate::github::models::RepoListQuery;
use crate::github::GitHubApi;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use stepflow::{RuntimeContext, Schema, StepDef};
use tracing::{event, Level};

// --- getGitHubUser ---

/// Profile plus public repositories, tagged `ok: true`.
pub async fn fetch_profile(api: &dyn GitHubApi, username: &str) -> Result<Value> {
  let user = api.get_user(username).await?;
  let repos = api.list_user_repos(username, &RepoListQuery::default()).await?;
  let repositories: Vec<Value> = repos
    .iter()
    .map(|r| {
      json!({
        "name": r.name,
        "description": r.description.clone().unwrap_or_default(),
        "url": r.html_url,
      })
    })
    .collect();
  let blog = user.blog.unwrap_or_default();
  Ok(json!({
    "ok": true,
    "username": user.login,
    "followers": user.followers,
    "following": user.following,
    "public_repos": user.public_repos,
    "bio": user.bio.unwrap_or_default(),
    "email": user.email.unwrap_or_default(),
    "location": user.location.unwrap_or_default(),
    "company": user.company.unwrap_or_default(),
    "website": blog,
    "twitter_username": user.twitter_username.unwrap_or_default(),
    "avatar_url": user.avatar_url,
    "url": user.url,
    "blog": blog,
    "repositories": repositories,
  }))
}

pub fn profile_schema() -> Schema {
  Schema::object()
    .field("ok", Schema::literal(true))
    .field("username", Schema::string())
    .field("followers", Schema::integer())
    .field("following", Schema::integer())
    .field("public_repos", Schema::integer())
    .field("bio", Schema::string())
    .field("email", Schema::string())
    .field("location", Schema::string())
    .field("company", Schema::string())
    .field("website", Schema::string())
    .field("twitter_username", Schema::string())
    .field("avatar_url", Schema::string())
    .field("url", Schema::string())
    .field("blog", Schema::string())
    .field(
      "repositories",
      Schema::array(
        Schema::object()
          .field("name", Schema::string())
          .field("description", Schema::string())
          .field("url", Schema::string())
          .build(),
      ),
    )
    .build()
}

pub fn username_input() -> Schema {
  Schema::object()
    .field("username", Schema::string())
    .describe("GitHub username")
    .build()
}

#[derive(Debug, Deserialize)]
struct UserInput {
  username: String,
}

async fn user_profile(input: UserInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  Ok(match fetch_profile(api.as_ref(), &input.username).await {
    Ok(profile) => profile,
    Err(e) => modeled_failure("getGitHubUser", e),
  })
}

pub fn get_github_user() -> StepDef {
  StepDef::typed(
    "getGitHubUser",
    "Get GitHub user information",
    username_input(),
    or_failure(profile_schema()),
    user_profile,
  )
  .requires::<dyn GitHubApi>()
}

// --- getUserContributionActivity ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Period {
  #[default]
  #[serde(rename = "7d")]
  Week,
  #[serde(rename = "14d")]
  Fortnight,
  #[serde(rename = "30d")]
  Month,
}

impl Period {
  pub fn days(self) -> i64 {
    match self {
      Period::Week => 7,
      Period::Fortnight => 14,
      Period::Month => 30,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Period::Week => "7d",
      Period::Fortnight => "14d",
      Period::Month => "30d",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionSummary {
  pub commits: usize,
  pub pull_requests: usize,
  pub issues: usize,
  pub repos_created: usize,
  pub forks: usize,
  pub summary: String,
}

// Letters, digits and hyphens, not starting with a hyphen, at most 39 characters.
static LOGIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]{0,38}$").expect("login pattern compiles"));

/// Rejects anything that is not a GitHub login, so it cannot add search qualifiers.
pub fn check_login(username: &str) -> Result<()> {
  if LOGIN.is_match(username) {
    Ok(())
  } else {
    Err(AppError::InvalidInput(format!("'{}' is not a valid GitHub username", username)))
  }
}

/// Counts a user's activity in the `period` before `now`.
///
/// Issues and pull requests come from the search API, commits from recent `PushEvent`s,
/// and repositories from the user's list filtered on creation date. `forks` counts the
/// repositories created in the window that have been forked at least once.
pub async fn contribution_activity(
  api: &dyn GitHubApi,
  username: &str,
  period: Period,
  now: DateTime<Utc>,
) -> Result<ContributionSummary> {
  check_login(username)?;
  let since = now - Duration::days(period.days());
  let since_iso = since.to_rfc3339_opts(SecondsFormat::Millis, true);

  let issues = api
    .search_issues(&format!("type:issue author:{} created:>{}", username, since_iso), 100)
    .await?
    .items
    .len();
  let pull_requests = api
    .search_issues(&format!("type:pr author:{} created:>{}", username, since_iso), 100)
    .await?
    .items
    .len();

  let repo_query = RepoListQuery {
    sort: Some("created".to_string()),
    direction: Some("desc".to_string()),
    per_page: 100,
  };
  let new_repos: Vec<_> = api
    .list_user_repos(username, &repo_query)
    .await?
    .into_iter()
    .filter(|r| r.created_at.map_or(false, |created| created > since))
    .collect();
  let forks = new_repos.iter().filter(|r| r.forks_count > 0).count();

  let commits: usize = api
    .list_user_events(username, 100)
    .await?
    .iter()
    .filter(|e| e.created_at.map_or(false, |created| created > since))
    .map(|e| e.pushed_commits())
    .sum();

  event!(Level::DEBUG, username, period = period.label(), commits, pull_requests, issues, "Contribution activity counted.");
  Ok(ContributionSummary {
    commits,
    pull_requests,
    issues,
    repos_created: new_repos.len(),
    forks,
    summary: format!(
      "In the last {}, {} made {} commits, opened {} PRs, {} issues, created {} repos.",
      period.label(),
      username,
      commits,
      pull_requests,
      issues,
      new_repos.len()
    ),
  })
}

pub fn contribution_input() -> Schema {
  Schema::object()
    .field("username", Schema::string())
    .describe("The GitHub username to analyze")
    .with_default("period", Schema::enumeration(["7d", "14d", "30d"]), "7d")
    .describe("Time period for contribution analysis")
    .build()
}

pub fn contribution_schema() -> Schema {
  or_failure(
    Schema::object()
      .field("commits", Schema::integer())
      .field("pullRequests", Schema::integer())
      .field("issues", Schema::integer())
      .field("reposCreated", Schema::integer())
      .field("forks", Schema::integer())
      .field("summary", Schema::string()),
  )
}

#[derive(Debug, Deserialize)]
struct ContributionInput {
  username: String,
  #[serde(default)]
  period: Period,
}

async fn contributions(input: ContributionInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  Ok(
    match contribution_activity(api.as_ref(), &input.username, input.period, Utc::now()).await {
      Ok(summary) => serde_json::to_value(summary)?,
      Err(e) => modeled_failure("getUserContributionActivity", e),
    },
  )
}

pub fn get_user_contribution_activity() -> StepDef {
  StepDef::typed(
    "getUserContributionActivity",
    "Fetch user contribution activity summary (commits, PRs, issues, repos, forks) for a given time period (7d, 14d, 30d)",
    contribution_input(),
    contribution_schema(),
    contributions,
  )
  .requires::<dyn GitHubApi>()
}
