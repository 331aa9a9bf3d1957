// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use review_agent::errors::{AppError, Result};
use review_agent::github::models::*;
use review_agent::{CodeReviewAgent, GitHubApi, ModelConfig};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::Level;

#[derive(Default)]
pub struct FakeState {
  /// path -> content. Every path also appears in the tree.
  pub files: BTreeMap<String, String>,
  /// In the tree, but reading them fails.
  pub unreadable: Vec<String>,
  pub fail_tree: bool,
  /// When set, every read endpoint answers with this status.
  pub fail_reads: Option<u16>,
  /// Issue titles containing any of these are rejected.
  pub reject_titles: Vec<String>,
  pub issues: Vec<Issue>,
  pub pulls: Vec<PullRequest>,
  pub user: Option<User>,
  pub repos: Vec<Repository>,
  pub events: Vec<Event>,
  pub searched_issues: Vec<SearchItem>,
  pub searched_pulls: Vec<SearchItem>,
  pub issue_queries: Vec<IssueQuery>,
  pub search_queries: Vec<String>,
  pub created_issues: Vec<NewIssue>,
  pub comments: Vec<(u64, String)>,
  pub reviews: Vec<(u64, NewReview)>,
}

/// In-memory `GitHubApi`.
#[derive(Default)]
pub struct FakeGitHub {
  pub state: Mutex<FakeState>,
}

impl FakeGitHub {
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  pub fn with_files(files: &[(&str, &str)]) -> Arc<Self> {
    let fake = Self::default();
    {
      let mut state = fake.state.lock();
      for (path, content) in files {
        state.files.insert(path.to_string(), content.to_string());
      }
    }
    Arc::new(fake)
  }

  pub fn created_issues(&self) -> Vec<NewIssue> {
    self.state.lock().created_issues.clone()
  }

  fn check_reads(&self) -> Result<()> {
    match self.state.lock().fail_reads {
      Some(status) => Err(AppError::GitHub {
        status,
        message: "Bad credentials".to_string(),
      }),
      None => Ok(()),
    }
  }
}

fn not_found(what: &str) -> AppError {
  AppError::GitHub {
    status: 404,
    message: format!("{} Not Found", what),
  }
}

pub fn issue(number: u64, state: &str, is_pull: bool) -> Issue {
  Issue {
    number,
    title: format!("Issue {}", number),
    body: None,
    state: state.to_string(),
    html_url: format!("https://github.com/acme/widgets/issues/{}", number),
    labels: vec![Label {
      name: Some("bug".to_string()),
      color: Some("d73a4a".to_string()),
    }],
    assignees: vec![],
    user: Some(Account {
      login: Some("octocat".to_string()),
      html_url: Some("https://github.com/octocat".to_string()),
      avatar_url: None,
    }),
    created_at: "2026-10-01T00:00:00Z".to_string(),
    updated_at: "2026-10-02T00:00:00Z".to_string(),
    closed_at: None,
    pull_request: if is_pull { Some(json!({ "url": "x" })) } else { None },
  }
}

pub fn pull(number: u64, state: &str) -> PullRequest {
  PullRequest {
    number,
    title: format!("PR {}", number),
    body: Some("body".to_string()),
    state: state.to_string(),
    html_url: format!("https://github.com/acme/widgets/pull/{}", number),
    user: None,
  }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
  async fn list_issues(&self, _owner: &str, _repo: &str, query: &IssueQuery) -> Result<Vec<Issue>> {
    self.check_reads()?;
    let mut state = self.state.lock();
    state.issue_queries.push(query.clone());
    Ok(state.issues.clone())
  }

  async fn create_issue(&self, owner: &str, repo: &str, issue: &NewIssue) -> Result<Created> {
    let mut state = self.state.lock();
    if state.reject_titles.iter().any(|t| issue.title.contains(t.as_str())) {
      return Err(AppError::GitHub {
        status: 422,
        message: "Validation Failed".to_string(),
      });
    }
    state.created_issues.push(issue.clone());
    Ok(Created {
      html_url: format!("https://github.com/{}/{}/issues/{}", owner, repo, state.created_issues.len()),
    })
  }

  async fn comment_on_issue(&self, owner: &str, repo: &str, number: u64, body: &str) -> Result<Created> {
    let mut state = self.state.lock();
    state.comments.push((number, body.to_string()));
    Ok(Created {
      html_url: format!("https://github.com/{}/{}/issues/{}#issuecomment-1", owner, repo, number),
    })
  }

  async fn list_pulls(&self, _owner: &str, _repo: &str, _query: &PullQuery) -> Result<Vec<PullRequest>> {
    self.check_reads()?;
    Ok(self.state.lock().pulls.clone())
  }

  async fn create_pull(&self, owner: &str, repo: &str, _pull: &NewPullRequest) -> Result<Created> {
    Ok(Created {
      html_url: format!("https://github.com/{}/{}/pull/1", owner, repo),
    })
  }

  async fn review_pull(&self, owner: &str, repo: &str, number: u64, review: &NewReview) -> Result<Created> {
    self.state.lock().reviews.push((number, review.clone()));
    Ok(Created {
      html_url: format!("https://github.com/{}/{}/pull/{}#pullrequestreview-1", owner, repo, number),
    })
  }

  async fn get_user(&self, username: &str) -> Result<User> {
    self.check_reads()?;
    self.state.lock().user.clone().ok_or_else(|| not_found(username))
  }

  async fn list_user_repos(&self, _username: &str, _query: &RepoListQuery) -> Result<Vec<Repository>> {
    self.check_reads()?;
    Ok(self.state.lock().repos.clone())
  }

  async fn list_user_events(&self, _username: &str, _per_page: u32) -> Result<Vec<Event>> {
    self.check_reads()?;
    Ok(self.state.lock().events.clone())
  }

  async fn search_issues(&self, query: &str, _per_page: u32) -> Result<SearchResults> {
    self.check_reads()?;
    let mut state = self.state.lock();
    state.search_queries.push(query.to_string());
    let items = if query.starts_with("type:pr") {
      state.searched_pulls.clone()
    } else {
      state.searched_issues.clone()
    };
    Ok(SearchResults {
      total_count: items.len() as u64,
      items,
    })
  }

  async fn list_commits(&self, _owner: &str, _repo: &str, _query: &CommitQuery) -> Result<Vec<CommitEntry>> {
    self.check_reads()?;
    Ok(vec![])
  }

  async fn create_repository(&self, repo: &NewRepository) -> Result<Repository> {
    Ok(Repository {
      name: repo.name.clone(),
      full_name: format!("octocat/{}", repo.name),
      description: repo.description.clone(),
      html_url: format!("https://github.com/octocat/{}", repo.name),
      created_at: None,
      language: None,
      stargazers_count: 0,
      forks_count: 0,
    })
  }

  async fn fork_repository(&self, owner: &str, repo: &str, _options: &ForkOptions) -> Result<Repository> {
    Err(not_found(&format!("{}/{}", owner, repo)))
  }

  async fn get_tree(&self, owner: &str, repo: &str, tree_sha: &str) -> Result<Tree> {
    let state = self.state.lock();
    if state.fail_tree {
      return Err(not_found(&format!("{}/{}@{}", owner, repo, tree_sha)));
    }
    let mut tree: Vec<TreeEntry> = state
      .files
      .keys()
      .chain(state.unreadable.iter())
      .map(|path| TreeEntry {
        path: path.clone(),
        kind: "blob".to_string(),
      })
      .collect();
    tree.push(TreeEntry {
      path: "src".to_string(),
      kind: "tree".to_string(),
    });
    Ok(Tree {
      sha: tree_sha.to_string(),
      tree,
      truncated: false,
    })
  }

  async fn get_file_content(&self, _owner: &str, _repo: &str, path: &str) -> Result<FileContent> {
    let state = self.state.lock();
    match state.files.get(path) {
      Some(content) => Ok(FileContent {
        path: path.to_string(),
        content: content.clone(),
      }),
      None => Err(not_found(path)),
    }
  }
}

pub fn agent_with(fake: Arc<FakeGitHub>) -> CodeReviewAgent {
  CodeReviewAgent::new(ModelConfig::default(), fake).expect("agent registers")
}

// Helper to initialize tracing for tests (call once per test module or test)
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
