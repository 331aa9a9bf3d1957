// review_agent/src/github/mod.rs

//! GitHub access. Tools and workflow steps only ever see the [`GitHubApi`] trait,
//! fetched from the runtime context; [`GitHubClient`] is the HTTP implementation.

pub mod client;
pub mod models;

pub use client::GitHubClient;

use crate::errors::Result;
use async_trait::async_trait;
use models::*;

#[async_trait]
pub trait GitHubApi: Send + Sync {
  async fn list_issues(&self, owner: &str, repo: &str, query: &IssueQuery) -> Result<Vec<Issue>>;

  async fn create_issue(&self, owner: &str, repo: &str, issue: &NewIssue) -> Result<Created>;

  /// Comments on an issue or a pull request (they share the issues endpoint).
  async fn comment_on_issue(&self, owner: &str, repo: &str, number: u64, body: &str) -> Result<Created>;

  async fn list_pulls(&self, owner: &str, repo: &str, query: &PullQuery) -> Result<Vec<PullRequest>>;

  async fn create_pull(&self, owner: &str, repo: &str, pull: &NewPullRequest) -> Result<Created>;

  async fn review_pull(&self, owner: &str, repo: &str, number: u64, review: &NewReview) -> Result<Created>;

  async fn get_user(&self, username: &str) -> Result<User>;

  async fn list_user_repos(&self, username: &str, query: &RepoListQuery) -> Result<Vec<Repository>>;

  async fn list_user_events(&self, username: &str, per_page: u32) -> Result<Vec<Event>>;

  async fn search_issues(&self, query: &str, per_page: u32) -> Result<SearchResults>;

  async fn list_commits(&self, owner: &str, repo: &str, query: &CommitQuery) -> Result<Vec<CommitEntry>>;

  /// Creates a repository for the authenticated user.
  async fn create_repository(&self, repo: &NewRepository) -> Result<Repository>;

  async fn fork_repository(&self, owner: &str, repo: &str, options: &ForkOptions) -> Result<Repository>;

  /// The recursive tree at `tree_sha` (a branch name or commit sha).
  async fn get_tree(&self, owner: &str, repo: &str, tree_sha: &str) -> Result<Tree>;

  async fn get_file_content(&self, owner: &str, repo: &str, path: &str) -> Result<FileContent>;
}
