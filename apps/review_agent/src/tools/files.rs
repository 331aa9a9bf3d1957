// review_agent/src/tools/files.rs

use super::{github, modeled_failure, or_failure, repo_input};
use crate::github::GitHubApi;
use serde::Deserialize;
use serde_json::{json, Value};
use stepflow::{RuntimeContext, Schema, StepDef};

#[derive(Debug, Deserialize)]
struct TreeInput {
  owner: String,
  repo: String,
  tree_sha: String,
}

async fn file_paths(input: TreeInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  Ok(match api.get_tree(&input.owner, &input.repo, &input.tree_sha).await {
    Ok(tree) => json!(tree.blob_paths()),
    Err(e) => modeled_failure("getFilePaths", e),
  })
}

pub fn get_file_paths() -> StepDef {
  let input = repo_input()
    .with_default("tree_sha", Schema::string(), "main")
    .describe("Branch name or commit SHA of the tree");
  StepDef::typed(
    "getFilePaths",
    "List every file path in a repository tree",
    input,
    or_failure(Schema::array(Schema::string())),
    file_paths,
  )
  .requires::<dyn GitHubApi>()
}

#[derive(Debug, Deserialize)]
struct FileInput {
  owner: String,
  repo: String,
  path: String,
}

async fn file_content(input: FileInput, ctx: RuntimeContext) -> anyhow::Result<Value> {
  let api = github(&ctx)?;
  Ok(match api.get_file_content(&input.owner, &input.repo, &input.path).await {
    Ok(file) => json!({ "ok": true, "path": file.path, "content": file.content }),
    Err(e) => modeled_failure("getFileContent", e),
  })
}

pub fn get_file_content() -> StepDef {
  let input = repo_input()
    .field("path", Schema::string())
    .describe("Path of the file inside the repository");
  let output = Schema::object()
    .field("ok", Schema::literal(true))
    .field("path", Schema::string())
    .field("content", Schema::string());
  StepDef::typed(
    "getFileContent",
    "Get the decoded text content of a file in a repository",
    input,
    or_failure(output),
    file_content,
  )
  .requires::<dyn GitHubApi>()
}
