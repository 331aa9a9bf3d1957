// tests/tools_tests.rs
mod common;
use chrono::{Duration, Utc};
use common::*;
use review_agent::github::models::{Event, EventRepo, Repository, ReviewEvent, SearchItem, User};
use review_agent::tools::users::{contribution_activity, Period};
use serde_json::json;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_repository_issues_exclude_pull_requests_and_apply_defaults() {
  setup_tracing();
  let fake = FakeGitHub::new();
  fake.state.lock().issues = vec![issue(1, "open", false), issue(2, "open", true), issue(3, "closed", false)];
  let agent = agent_with(fake.clone());

  let output = agent
    .call("getRepositoryIssues", json!({ "owner": "acme", "repo": "widgets", "labels": ["bug", "ui"] }))
    .await
    .unwrap();

  let numbers: Vec<u64> = output.as_array().unwrap().iter().filter_map(|i| i["number"].as_u64()).collect();
  assert_eq!(numbers, vec![1, 3]);
  assert_eq!(output[0]["labels"], json!([{ "name": "bug", "color": "d73a4a" }]));
  assert_eq!(output[0]["user"]["username"], "octocat");
  assert_eq!(output[0]["closedAt"], json!(null));

  let query = fake.state.lock().issue_queries[0].clone();
  assert_eq!(query.state, "all");
  assert_eq!(query.page, 1);
  assert_eq!(query.per_page, 30);
  assert_eq!(query.labels.as_deref(), Some("bug,ui"));
}

#[tokio::test]
#[serial]
async fn test_per_page_above_limit_is_rejected() {
  setup_tracing();
  let agent = agent_with(FakeGitHub::new());

  let err = agent
    .call("getRepositoryIssues", json!({ "owner": "acme", "repo": "widgets", "perPage": 101 }))
    .await
    .unwrap_err();
  assert!(err.to_string().contains("$.perPage"));
}

#[tokio::test]
#[serial]
async fn test_github_errors_become_modeled_failures() {
  setup_tracing();
  let fake = FakeGitHub::new();
  fake.state.lock().fail_reads = Some(401);
  let agent = agent_with(fake);

  let output = agent
    .call("getRepositoryPullRequests", json!({ "owner": "acme", "repo": "widgets" }))
    .await
    .unwrap();
  assert_eq!(output, json!({ "ok": false, "message": "GitHub API Error (401): Bad credentials" }));

  let forked = agent
    .call("forkRepository", json!({ "owner": "acme", "repo": "gone" }))
    .await
    .unwrap();
  assert_eq!(forked["ok"], false);
  assert!(forked["message"].as_str().unwrap().contains("404"));
}

#[tokio::test]
#[serial]
async fn test_summaries_count_states() {
  setup_tracing();
  let fake = FakeGitHub::new();
  {
    let mut state = fake.state.lock();
    state.issues = vec![issue(1, "open", false), issue(2, "closed", false), issue(3, "open", true)];
    state.pulls = vec![pull(3, "open"), pull(4, "closed"), pull(5, "closed")];
  }
  let agent = agent_with(fake);

  let issues = agent
    .call("summarizeIssues", json!({ "owner": "acme", "repo": "widgets" }))
    .await
    .unwrap();
  assert_eq!(
    issues,
    json!({
      "openCount": 1,
      "closedCount": 1,
      "totalCount": 2,
      "summary": "There are 1 open and 1 closed issues (total: 2)."
    })
  );

  let pulls = agent
    .call("summarizePullRequests", json!({ "owner": "acme", "repo": "widgets" }))
    .await
    .unwrap();
  assert_eq!(pulls["summary"], "There are 1 open and 2 closed pull requests (total: 3).");
}

#[tokio::test]
#[serial]
async fn test_summary_failure_reports_zero_counts() {
  setup_tracing();
  let fake = FakeGitHub::new();
  fake.state.lock().fail_reads = Some(404);
  let agent = agent_with(fake);

  let output = agent
    .call("summarizeIssues", json!({ "owner": "acme", "repo": "missing" }))
    .await
    .unwrap();
  assert_eq!(output["totalCount"], 0);
  assert_eq!(output["summary"], "GitHub API Error (404): Bad credentials");
}

#[tokio::test]
#[serial]
async fn test_comments_and_reviews_target_the_right_number() {
  setup_tracing();
  let fake = FakeGitHub::new();
  let agent = agent_with(fake.clone());

  let comment = agent
    .call(
      "commentOnPullRequest",
      json!({ "owner": "acme", "repo": "widgets", "pull_number": 7, "body": "LGTM" }),
    )
    .await
    .unwrap();
  assert_eq!(comment["ok"], true);
  assert_eq!(comment["url"], "https://github.com/acme/widgets/issues/7#issuecomment-1");

  let review = agent
    .call(
      "reviewPullRequest",
      json!({ "owner": "acme", "repo": "widgets", "pull_number": 7, "event": "REQUEST_CHANGES" }),
    )
    .await
    .unwrap();
  assert_eq!(review["ok"], true);

  let state = fake.state.lock();
  assert_eq!(state.comments, vec![(7, "LGTM".to_string())]);
  assert_eq!(state.reviews[0].1.event, ReviewEvent::RequestChanges);
}

#[tokio::test]
#[serial]
async fn test_unknown_review_event_is_rejected() {
  setup_tracing();
  let agent = agent_with(FakeGitHub::new());

  let err = agent
    .call(
      "reviewPullRequest",
      json!({ "owner": "acme", "repo": "widgets", "pull_number": 7, "event": "MERGE" }),
    )
    .await
    .unwrap_err();
  assert!(err.to_string().contains("$.event"));
}

#[tokio::test]
#[serial]
async fn test_file_tools_list_blobs_and_decode_content() {
  setup_tracing();
  let fake = FakeGitHub::with_files(&[("README.md", "# widgets\n"), ("src/lib.rs", "pub fn f() {}\n")]);
  let agent = agent_with(fake);

  let paths = agent
    .call("getFilePaths", json!({ "owner": "acme", "repo": "widgets" }))
    .await
    .unwrap();
  assert_eq!(paths, json!(["README.md", "src/lib.rs"]));

  let file = agent
    .call("getFileContent", json!({ "owner": "acme", "repo": "widgets", "path": "README.md" }))
    .await
    .unwrap();
  assert_eq!(file, json!({ "ok": true, "path": "README.md", "content": "# widgets\n" }));

  let missing = agent
    .call("getFileContent", json!({ "owner": "acme", "repo": "widgets", "path": "nope" }))
    .await
    .unwrap();
  assert_eq!(missing["ok"], false);
}

fn repo(name: &str, days_ago: i64, forks: u64) -> Repository {
  Repository {
    name: name.to_string(),
    full_name: format!("octocat/{}", name),
    description: None,
    html_url: format!("https://github.com/octocat/{}", name),
    created_at: Some(Utc::now() - Duration::days(days_ago)),
    language: Some("Rust".to_string()),
    stargazers_count: 0,
    forks_count: forks,
  }
}

fn push(days_ago: i64, commits: usize) -> Event {
  let commits: Vec<_> = (0..commits).map(|i| json!({ "sha": format!("{:040}", i) })).collect();
  Event {
    kind: "PushEvent".to_string(),
    repo: Some(EventRepo {
      name: "octocat/widgets".to_string(),
    }),
    payload: json!({ "commits": commits }),
    created_at: Some(Utc::now() - Duration::days(days_ago)),
  }
}

fn found(title: &str) -> SearchItem {
  SearchItem {
    title: title.to_string(),
    html_url: "https://github.com/acme/widgets/issues/1".to_string(),
    state: "open".to_string(),
    created_at: Utc::now().to_rfc3339(),
  }
}

#[tokio::test]
#[serial]
async fn test_contribution_activity_counts_within_window() {
  setup_tracing();
  let fake = FakeGitHub::new();
  {
    let mut state = fake.state.lock();
    state.repos = vec![repo("new-forked", 2, 3), repo("new", 5, 0), repo("old", 40, 9)];
    state.events = vec![push(1, 2), push(3, 1), push(20, 5)];
    state.searched_issues = vec![found("bug")];
    state.searched_pulls = vec![found("fix"), found("feat")];
  }

  let summary = contribution_activity(fake.as_ref(), "octocat", Period::Week, Utc::now())
    .await
    .unwrap();
  assert_eq!(summary.commits, 3);
  assert_eq!(summary.pull_requests, 2);
  assert_eq!(summary.issues, 1);
  assert_eq!(summary.repos_created, 2);
  assert_eq!(summary.forks, 1);
  assert_eq!(
    summary.summary,
    "In the last 7d, octocat made 3 commits, opened 2 PRs, 1 issues, created 2 repos."
  );

  let queries = fake.state.lock().search_queries.clone();
  assert!(queries[0].starts_with("type:issue author:octocat created:>"));
  assert!(queries[1].starts_with("type:pr author:octocat created:>"));
  assert!(queries[0].ends_with('Z'));

  let month = contribution_activity(fake.as_ref(), "octocat", Period::Month, Utc::now())
    .await
    .unwrap();
  assert_eq!(month.commits, 8);
  assert_eq!(month.repos_created, 2);
}

#[tokio::test]
#[serial]
async fn test_contribution_activity_rejects_usernames_with_search_qualifiers() {
  setup_tracing();
  let fake = FakeGitHub::new();
  fake.state.lock().searched_pulls = vec![found("fix")];

  let err = contribution_activity(fake.as_ref(), "octocat type:pr", Period::Week, Utc::now())
    .await
    .unwrap_err();
  assert!(matches!(err, review_agent::AppError::InvalidInput(_)));
  assert!(fake.state.lock().search_queries.is_empty());

  let agent = agent_with(fake.clone());
  let output = agent
    .call("getUserContributionActivity", json!({ "username": "octocat type:pr" }))
    .await
    .unwrap();
  assert_eq!(output["ok"], false);
  assert_eq!(
    output["message"],
    "Invalid Input: 'octocat type:pr' is not a valid GitHub username"
  );
  assert!(fake.state.lock().search_queries.is_empty());
}

#[tokio::test]
#[serial]
async fn test_profile_tool_and_contribution_workflow() {
  setup_tracing();
  let fake = FakeGitHub::new();
  {
    let mut state = fake.state.lock();
    state.user = Some(User {
      login: "octocat".to_string(),
      followers: 10,
      following: 1,
      public_repos: 2,
      bio: None,
      email: None,
      location: Some("Earth".to_string()),
      company: None,
      blog: Some("https://octo.blog".to_string()),
      twitter_username: None,
      avatar_url: "https://avatars/octocat".to_string(),
      url: "https://api.github.com/users/octocat".to_string(),
    });
    state.repos = vec![repo("widgets", 100, 0)];
  }
  let agent = agent_with(fake);

  let profile = agent.call("getGitHubUser", json!({ "username": "octocat" })).await.unwrap();
  assert_eq!(profile["ok"], true);
  assert_eq!(profile["website"], "https://octo.blog");
  assert_eq!(profile["bio"], "");
  assert_eq!(profile["repositories"][0]["name"], "widgets");

  let wrapped = agent.call("gh-profile-workflow", json!({ "username": "octocat" })).await.unwrap();
  assert_eq!(wrapped["profile"], profile);

  let activity = agent.call("ContributionWorkflow", json!({ "username": "octocat" })).await.unwrap();
  assert_eq!(
    activity["summary"],
    "In the last 7d, octocat made 0 commits, opened 0 PRs, 0 issues, created 0 repos."
  );
}

#[tokio::test]
#[serial]
async fn test_unknown_user_fails_profile_workflow_but_not_tool() {
  setup_tracing();
  let agent = agent_with(FakeGitHub::new());

  let tool = agent.call("getGitHubUser", json!({ "username": "ghost" })).await.unwrap();
  assert_eq!(tool, json!({ "ok": false, "message": "GitHub API Error (404): ghost Not Found" }));

  let err = agent
    .call("gh-profile-workflow", json!({ "username": "ghost" }))
    .await
    .unwrap_err();
  match err {
    review_agent::AppError::Workflow { source } => {
      assert_eq!(source.stage_id(), Some("fetchProfile"));
    }
    other => panic!("unexpected error: {}", other),
  }
}
