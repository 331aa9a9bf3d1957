// review_agent/src/workflows/create_issues.rs

//! The review pipeline: fetch files, flag suspicious lines, open one issue per finding,
//! then summarize. Steps raise on GitHub failures, except issue creation, where a
//! rejected issue is logged and skipped so one bad call does not lose the others.

use crate::analysis::{find_problems, Problem, SourceFile};
use crate::github::models::NewIssue;
use crate::github::GitHubApi;
use crate::tools::github;
use anyhow::Context as _;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use stepflow::{RuntimeContext, Schema, StepDef, StepflowResult, Workflow, WorkflowBuilder};
use tracing::{event, Level};

pub const WORKFLOW_ID: &str = "create-address-issue-from-review";
const MAX_FILES: usize = 10;

fn file_schema() -> Schema {
  Schema::object()
    .field("path", Schema::string())
    .optional("content", Schema::string())
    .build()
}

fn problem_schema() -> Schema {
  Schema::object()
    .field("path", Schema::string())
    .field("line", Schema::integer())
    .field("code", Schema::string())
    .field("suggestion", Schema::string())
    .build()
}

fn issue_schema() -> Schema {
  Schema::object()
    .field("url", Schema::string())
    .field("title", Schema::string())
    .field("body", Schema::string())
    .build()
}

fn review_input() -> stepflow::ObjectSchema {
  Schema::object()
    .field("owner", Schema::string())
    .field("repo", Schema::string())
    .with_default("tree_sha", Schema::string(), "main")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
  pub url: String,
  pub title: String,
  pub body: String,
}

pub fn issue_title(problem: &Problem) -> String {
  format!("Code Issue in {} at line {}", problem.path, problem.line)
}

pub fn issue_body(problem: &Problem) -> String {
  format!(
    "**File:** {}\n**Line:** {}\n\n**Problem:**\n\n{}\n\n**Suggestion:**\n{}",
    problem.path, problem.line, problem.code, problem.suggestion
  )
}

pub fn summary_for(created: usize) -> String {
  format!("Created {} issues for faulty code found during review.", created)
}

// --- fetch-files ---

#[derive(Debug, Deserialize)]
struct FetchInput {
  owner: String,
  repo: String,
  tree_sha: String,
}

async fn fetch_files(input: FetchInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  let tree = api
    .get_tree(&input.owner, &input.repo, &input.tree_sha)
    .await
    .with_context(|| format!("could not list files of {}/{}@{}", input.owner, input.repo, input.tree_sha))?;

  let paths: Vec<String> = tree
    .blob_paths()
    .into_iter()
    .filter(|p| !p.ends_with('/'))
    .take(MAX_FILES)
    .collect();
  let fetches = paths.iter().map(|path| {
    let api = api.clone();
    let (owner, repo) = (input.owner.as_str(), input.repo.as_str());
    async move {
      match api.get_file_content(owner, repo, path).await {
        Ok(file) => SourceFile {
          path: path.clone(),
          content: Some(file.content),
        },
        Err(e) => {
          event!(Level::WARN, path = %path, error = %e, "File could not be read; reviewing without content.");
          SourceFile {
            path: path.clone(),
            content: None,
          }
        }
      }
    }
  });
  let files = join_all(fetches).await;
  event!(Level::INFO, files = files.len(), "Fetched files for review.");

  Ok(json!({ "files": files, "owner": input.owner, "repo": input.repo }))
}

pub fn fetch_files_step() -> StepDef {
  let output = Schema::object()
    .field("files", Schema::array(file_schema()))
    .field("owner", Schema::string())
    .field("repo", Schema::string());
  StepDef::typed(
    "fetch-files",
    "Fetch all file paths and contents from the repo (first 10 files).",
    review_input(),
    output,
    fetch_files,
  )
  .requires::<dyn GitHubApi>()
}

// --- analyze-faulty-code ---

#[derive(Debug, Deserialize)]
struct AnalyzeInput {
  files: Vec<SourceFile>,
  owner: String,
  repo: String,
  tree_sha: String,
}

async fn analyze(input: AnalyzeInput, _ctx: RuntimeContext) -> anyhow::Result<Value> {
  let problems = find_problems(&input.files);
  event!(Level::INFO, problems = problems.len(), "Analyzed files.");
  Ok(json!({
    "problems": problems,
    "owner": input.owner,
    "repo": input.repo,
    "tree_sha": input.tree_sha,
  }))
}

pub fn analyze_step() -> StepDef {
  let input = review_input().field("files", Schema::array(file_schema()));
  let output = review_input().field("problems", Schema::array(problem_schema()));
  StepDef::typed(
    "analyze-faulty-code",
    "Analyze files for TODO, FIXME, console.log, or any.",
    input,
    output,
    analyze,
  )
}

// --- create-issues-for-problems ---

#[derive(Debug, Deserialize)]
struct CreateIssuesInput {
  owner: String,
  repo: String,
  tree_sha: String,
  problems: Vec<Problem>,
}

async fn create_issues(input: CreateIssuesInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  let mut issues = Vec::with_capacity(input.problems.len());
  // One at a time, in problem order.
  for problem in &input.problems {
    let title = issue_title(problem);
    let body = issue_body(problem);
    let request = NewIssue {
      title: title.clone(),
      body: Some(body.clone()),
      ..NewIssue::default()
    };
    match api.create_issue(&input.owner, &input.repo, &request).await {
      Ok(created) => issues.push(CreatedIssue {
        url: created.html_url,
        title,
        body,
      }),
      Err(e) => event!(Level::WARN, %title, error = %e, "Issue creation failed; skipping."),
    }
  }
  Ok(json!({
    "issues": issues,
    "owner": input.owner,
    "repo": input.repo,
    "tree_sha": input.tree_sha,
  }))
}

pub fn create_issues_step() -> StepDef {
  let input = review_input().field("problems", Schema::array(problem_schema()));
  let output = review_input().field("issues", Schema::array(issue_schema()));
  StepDef::typed(
    "create-issues-for-problems",
    "Create a GitHub issue for each faulty code snippet.",
    input,
    output,
    create_issues,
  )
  .requires::<dyn GitHubApi>()
}

// --- generate-summary ---

#[derive(Debug, Deserialize)]
struct SummaryInput {
  issues: Vec<CreatedIssue>,
}

async fn summarize(input: SummaryInput, _ctx: RuntimeContext) -> anyhow::Result<Value> {
  Ok(json!({ "summary": summary_for(input.issues.len()), "issues": input.issues }))
}

fn summary_schema() -> Schema {
  Schema::object()
    .field("summary", Schema::string())
    .field("issues", Schema::array(issue_schema()))
    .build()
}

pub fn summary_step() -> StepDef {
  let input = review_input().field("issues", Schema::array(issue_schema()));
  StepDef::typed(
    "generate-summary",
    "Summarize the issues created.",
    input,
    summary_schema(),
    summarize,
  )
}

pub fn workflow() -> StepflowResult<Workflow> {
  WorkflowBuilder::new(WORKFLOW_ID, review_input(), summary_schema())
    .description("Run a code review, highlight faulty code, and create an issue with a suggested fix.")
    .then(fetch_files_step())
    .map(|m| {
      json!({
        "files": m.input()["files"],
        "owner": m.init_data()["owner"],
        "repo": m.init_data()["repo"],
        "tree_sha": m.init_data()["tree_sha"],
      })
    })
    .then(analyze_step())
    .map(|m| {
      let data = m.input();
      json!({
        "owner": data["owner"],
        "repo": data["repo"],
        "tree_sha": data["tree_sha"],
        "problems": data["problems"],
      })
    })
    .then(create_issues_step())
    .map(|m| {
      let data = m.input();
      json!({
        "issues": data["issues"],
        "owner": data["owner"],
        "repo": data["repo"],
        "tree_sha": data["tree_sha"],
      })
    })
    .then(summary_step())
    .commit()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn issue_text_names_file_and_line() {
    let problem = Problem {
      path: "src/app.ts".to_string(),
      line: 4,
      code: "// TODO: retry".to_string(),
      suggestion: "Resolve the TODO/FIXME with proper implementation.".to_string(),
    };
    assert_eq!(issue_title(&problem), "Code Issue in src/app.ts at line 4");
    assert_eq!(
      issue_body(&problem),
      "**File:** src/app.ts\n**Line:** 4\n\n**Problem:**\n\n// TODO: retry\n\n**Suggestion:**\nResolve the TODO/FIXME with proper implementation."
    );
  }

  #[test]
  fn workflow_commits_with_review_stages_in_order() {
    let workflow = workflow().unwrap();
    assert_eq!(
      workflow.stage_ids(),
      vec![
        "fetch-files",
        "map-1",
        "analyze-faulty-code",
        "map-2",
        "create-issues-for-problems",
        "map-3",
        "generate-summary"
      ]
    );
  }
}
