// review_agent/src/github/models.rs

//! Wire types for the subset of the GitHub REST API the agent uses.
//!
//! Only the fields the tools read are declared; serde ignores the rest.

use crate::errors::{AppError, Result};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- Responses ---

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Account {
  pub login: Option<String>,
  pub html_url: Option<String>,
  pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Label {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Issue {
  pub number: u64,
  pub title: String,
  pub body: Option<String>,
  pub state: String,
  pub html_url: String,
  #[serde(default)]
  pub labels: Vec<Label>,
  #[serde(default)]
  pub assignees: Vec<Account>,
  pub user: Option<Account>,
  pub created_at: String,
  pub updated_at: String,
  pub closed_at: Option<String>,
  /// Present when the "issue" is really a pull request.
  #[serde(default)]
  pub pull_request: Option<Value>,
}

impl Issue {
  pub fn is_pull_request(&self) -> bool {
    self.pull_request.is_some()
  }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PullRequest {
  pub number: u64,
  pub title: String,
  pub body: Option<String>,
  pub state: String,
  pub html_url: String,
  pub user: Option<Account>,
}

/// Any created resource (issue, comment, pull request, review, repository).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Created {
  pub html_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct User {
  pub login: String,
  #[serde(default)]
  pub followers: u64,
  #[serde(default)]
  pub following: u64,
  #[serde(default)]
  pub public_repos: u64,
  pub bio: Option<String>,
  pub email: Option<String>,
  pub location: Option<String>,
  pub company: Option<String>,
  pub blog: Option<String>,
  pub twitter_username: Option<String>,
  #[serde(default)]
  pub avatar_url: String,
  #[serde(default)]
  pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Repository {
  pub name: String,
  #[serde(default)]
  pub full_name: String,
  pub description: Option<String>,
  pub html_url: String,
  pub created_at: Option<DateTime<Utc>>,
  pub language: Option<String>,
  #[serde(default)]
  pub stargazers_count: u64,
  #[serde(default)]
  pub forks_count: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EventRepo {
  pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Event {
  #[serde(rename = "type")]
  pub kind: String,
  pub repo: Option<EventRepo>,
  #[serde(default)]
  pub payload: Value,
  pub created_at: Option<DateTime<Utc>>,
}

impl Event {
  /// Number of commits carried by a `PushEvent`; zero for every other event type.
  pub fn pushed_commits(&self) -> usize {
    if self.kind != "PushEvent" {
      return 0;
    }
    self.payload.get("commits").and_then(Value::as_array).map_or(0, Vec::len)
  }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SearchResults {
  #[serde(default)]
  pub total_count: u64,
  #[serde(default)]
  pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SearchItem {
  pub title: String,
  pub html_url: String,
  pub state: String,
  pub created_at: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct GitActor {
  pub name: Option<String>,
  pub email: Option<String>,
  pub date: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Verification {
  pub verified: bool,
  pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CommitDetail {
  pub message: String,
  pub author: Option<GitActor>,
  pub committer: Option<GitActor>,
  pub verification: Option<Verification>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct CommitEntry {
  pub sha: String,
  pub html_url: String,
  pub commit: CommitDetail,
  pub author: Option<Account>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TreeEntry {
  pub path: String,
  /// `blob`, `tree` or `commit` (submodule).
  #[serde(rename = "type")]
  pub kind: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Tree {
  pub sha: String,
  #[serde(default)]
  pub tree: Vec<TreeEntry>,
  #[serde(default)]
  pub truncated: bool,
}

impl Tree {
  pub fn blob_paths(&self) -> Vec<String> {
    self.tree.iter().filter(|e| e.kind == "blob").map(|e| e.path.clone()).collect()
  }
}

/// Raw answer of the contents endpoint for a single file.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentResponse {
  pub path: String,
  #[serde(default)]
  pub content: Option<String>,
  #[serde(default)]
  pub encoding: Option<String>,
}

/// A decoded text file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileContent {
  pub path: String,
  pub content: String,
}

/// Decodes the contents endpoint's base64 payload, which GitHub wraps at 60 columns.
pub fn decode_content(encoded: &str) -> Result<String> {
  let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
  let bytes = base64::engine::general_purpose::STANDARD
    .decode(compact)
    .map_err(|e| AppError::Decode(format!("invalid base64 content: {}", e)))?;
  String::from_utf8(bytes).map_err(|e| AppError::Decode(format!("file is not UTF-8 text: {}", e)))
}

// --- Requests ---

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct IssueQuery {
  pub state: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub labels: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub assignee: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub creator: Option<String>,
  pub page: u32,
  pub per_page: u32,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct NewIssue {
  pub title: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub body: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub assignees: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PullQuery {
  pub state: String,
  pub page: u32,
  pub per_page: u32,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct NewPullRequest {
  pub title: String,
  pub head: String,
  pub base: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub body: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewEvent {
  Approve,
  RequestChanges,
  Comment,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewReview {
  pub event: ReviewEvent,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub body: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RepoListQuery {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sort: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub direction: Option<String>,
  pub per_page: u32,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CommitQuery {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sha: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub path: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub since: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub until: Option<String>,
  pub page: u32,
  pub per_page: u32,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct NewRepository {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub private: bool,
  pub auto_init: bool,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ForkOptions {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub organization: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  pub default_branch_only: bool,
}
