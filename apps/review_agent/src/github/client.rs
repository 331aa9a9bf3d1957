// review_agent/src/github/client.rs

use super::models::*;
use super::GitHubApi;
use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{event, instrument, Level};

const API_VERSION: &str = "2022-11-28";
const NO_QUERY: &[(&str, &str)] = &[];

/// `GitHubApi` over HTTPS with reqwest.
#[derive(Clone)]
pub struct GitHubClient {
  http: reqwest::Client,
  base: Url,
}

impl GitHubClient {
  pub fn new(config: &AppConfig) -> Result<Self> {
    let base = Url::parse(&config.github_api_url)
      .map_err(|e| AppError::Config(format!("Invalid GITHUB_API_URL: {}", e)))?;
    if base.cannot_be_a_base() {
      return Err(AppError::Config(format!("Invalid GITHUB_API_URL: '{}' cannot carry a path", base)));
    }

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
    headers.insert(
      USER_AGENT,
      HeaderValue::from_str(&config.github_user_agent)
        .map_err(|e| AppError::Config(format!("Invalid GITHUB_USER_AGENT: {}", e)))?,
    );
    if let Some(token) = &config.github_token {
      let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| AppError::Config(format!("Invalid GITHUB_TOKEN: {}", e)))?;
      value.set_sensitive(true);
      headers.insert(AUTHORIZATION, value);
    }

    let http = reqwest::Client::builder()
      .default_headers(headers)
      .timeout(config.request_timeout)
      .build()?;

    Ok(Self { http, base })
  }

  pub fn base_url(&self) -> &str {
    self.base.as_str().trim_end_matches('/')
  }

  /// The API base followed by `segments`, each percent-encoded as a single path segment.
  fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|_| AppError::Config(format!("Invalid GITHUB_API_URL: '{}' cannot carry a path", self.base)))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  fn repo_endpoint<'a>(&self, owner: &'a str, repo: &'a str, rest: impl IntoIterator<Item = &'a str>) -> Result<Url> {
    self.endpoint(["repos", owner, repo].into_iter().chain(rest))
  }

  /// `/repos/{owner}/{repo}/contents/{path}`, with `path` split on `/`.
  fn contents_endpoint(&self, owner: &str, repo: &str, path: &str) -> Result<Url> {
    self.repo_endpoint(owner, repo, std::iter::once("contents").chain(split_path(path)))
  }

  /// `/repos/{owner}/{repo}/git/trees/{tree_sha}`; a ref such as `release/1.0` keeps its slashes.
  fn tree_endpoint(&self, owner: &str, repo: &str, tree_sha: &str) -> Result<Url> {
    self.repo_endpoint(owner, repo, ["git", "trees"].into_iter().chain(split_path(tree_sha)))
  }

  fn request(&self, method: Method, url: Url) -> RequestBuilder {
    self.http.request(method, url)
  }

  /// Sends the request and decodes a 2xx body; anything else becomes `AppError::GitHub`.
  async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
      return Ok(response.json::<T>().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
      .ok()
      .and_then(|body| body.get("message").and_then(|m| m.as_str()).map(str::to_string))
      .unwrap_or_else(|| {
        if text.is_empty() {
          status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
          text
        }
      });
    event!(Level::WARN, status = status.as_u16(), %message, "GitHub API request failed.");
    Err(AppError::GitHub {
      status: status.as_u16(),
      message,
    })
  }

  async fn get<T: DeserializeOwned, Q: Serialize + ?Sized>(&self, url: Url, query: &Q) -> Result<T> {
    self.send(self.request(Method::GET, url).query(query)).await
  }

  async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<T> {
    self.send(self.request(Method::POST, url).json(body)).await
  }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
  path.split('/').filter(|segment| !segment.is_empty())
}

impl std::fmt::Debug for GitHubClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("GitHubClient").field("base_url", &self.base_url()).finish()
  }
}

#[async_trait]
impl GitHubApi for GitHubClient {
  #[instrument(skip(self, query), err(Display))]
  async fn list_issues(&self, owner: &str, repo: &str, query: &IssueQuery) -> Result<Vec<Issue>> {
    self.get(self.repo_endpoint(owner, repo, ["issues"])?, query).await
  }

  #[instrument(skip(self, issue), fields(title = %issue.title), err(Display))]
  async fn create_issue(&self, owner: &str, repo: &str, issue: &NewIssue) -> Result<Created> {
    self.post(self.repo_endpoint(owner, repo, ["issues"])?, issue).await
  }

  #[instrument(skip(self, body), err(Display))]
  async fn comment_on_issue(&self, owner: &str, repo: &str, number: u64, body: &str) -> Result<Created> {
    let payload = serde_json::json!({ "body": body });
    let number = number.to_string();
    let url = self.repo_endpoint(owner, repo, ["issues", number.as_str(), "comments"])?;
    self.post(url, &payload).await
  }

  #[instrument(skip(self, query), err(Display))]
  async fn list_pulls(&self, owner: &str, repo: &str, query: &PullQuery) -> Result<Vec<PullRequest>> {
    self.get(self.repo_endpoint(owner, repo, ["pulls"])?, query).await
  }

  #[instrument(skip(self, pull), fields(head = %pull.head, base = %pull.base), err(Display))]
  async fn create_pull(&self, owner: &str, repo: &str, pull: &NewPullRequest) -> Result<Created> {
    self.post(self.repo_endpoint(owner, repo, ["pulls"])?, pull).await
  }

  #[instrument(skip(self, review), fields(event = ?review.event), err(Display))]
  async fn review_pull(&self, owner: &str, repo: &str, number: u64, review: &NewReview) -> Result<Created> {
    let number = number.to_string();
    let url = self.repo_endpoint(owner, repo, ["pulls", number.as_str(), "reviews"])?;
    self.post(url, review).await
  }

  #[instrument(skip(self), err(Display))]
  async fn get_user(&self, username: &str) -> Result<User> {
    self.get(self.endpoint(["users", username])?, NO_QUERY).await
  }

  #[instrument(skip(self, query), err(Display))]
  async fn list_user_repos(&self, username: &str, query: &RepoListQuery) -> Result<Vec<Repository>> {
    self.get(self.endpoint(["users", username, "repos"])?, query).await
  }

  #[instrument(skip(self), err(Display))]
  async fn list_user_events(&self, username: &str, per_page: u32) -> Result<Vec<Event>> {
    self
      .get(self.endpoint(["users", username, "events"])?, &[("per_page", per_page)])
      .await
  }

  #[instrument(skip(self), err(Display))]
  async fn search_issues(&self, query: &str, per_page: u32) -> Result<SearchResults> {
    let per_page = per_page.to_string();
    self
      .get(
        self.endpoint(["search", "issues"])?,
        &[("q", query), ("sort", "created"), ("order", "desc"), ("per_page", per_page.as_str())],
      )
      .await
  }

  #[instrument(skip(self, query), err(Display))]
  async fn list_commits(&self, owner: &str, repo: &str, query: &CommitQuery) -> Result<Vec<CommitEntry>> {
    self.get(self.repo_endpoint(owner, repo, ["commits"])?, query).await
  }

  #[instrument(skip(self, repo), fields(name = %repo.name), err(Display))]
  async fn create_repository(&self, repo: &NewRepository) -> Result<Repository> {
    self.post(self.endpoint(["user", "repos"])?, repo).await
  }

  #[instrument(skip(self, options), err(Display))]
  async fn fork_repository(&self, owner: &str, repo: &str, options: &ForkOptions) -> Result<Repository> {
    self.post(self.repo_endpoint(owner, repo, ["forks"])?, options).await
  }

  #[instrument(skip(self), err(Display))]
  async fn get_tree(&self, owner: &str, repo: &str, tree_sha: &str) -> Result<Tree> {
    let tree: Tree = self
      .get(self.tree_endpoint(owner, repo, tree_sha)?, &[("recursive", "1")])
      .await?;
    if tree.truncated {
      event!(Level::WARN, entries = tree.tree.len(), "Tree listing was truncated by GitHub.");
    }
    Ok(tree)
  }

  #[instrument(skip(self), err(Display))]
  async fn get_file_content(&self, owner: &str, repo: &str, path: &str) -> Result<FileContent> {
    let raw: ContentResponse = self
      .get(self.contents_endpoint(owner, repo, path)?, NO_QUERY)
      .await?;
    let encoded = raw
      .content
      .ok_or_else(|| AppError::Decode(format!("'{}' has no inline content", raw.path)))?;
    match raw.encoding.as_deref() {
      Some("base64") | None => Ok(FileContent {
        path: raw.path,
        content: decode_content(&encoded)?,
      }),
      Some(other) => Err(AppError::Decode(format!("unsupported content encoding '{}'", other))),
    }
  }
}
