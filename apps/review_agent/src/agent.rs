// review_agent/src/agent.rs

//! The code review agent: a named registry of GitHub tools and workflows plus the
//! model selection an agent host needs to drive it.

use crate::config::{AppConfig, ModelConfig};
use crate::errors::Result;
use crate::github::{GitHubApi, GitHubClient};
use crate::tools::all_tools;
use crate::workflows::all_workflows;
use serde_json::{json, Value};
use std::sync::Arc;
use stepflow::{Registry, RuntimeContext};

pub const AGENT_NAME: &str = "Code Review Agent";

pub const INSTRUCTIONS: &str = "You review GitHub repositories. Use the repository, issue, \
pull request and user tools to gather facts before answering. Prefer the \
create-address-issue-from-review workflow for whole-repository reviews. When a tool \
returns ok: false, report its message instead of guessing.";

pub struct CodeReviewAgent {
  pub name: String,
  pub instructions: String,
  pub model: ModelConfig,
  registry: Registry,
  api: Arc<dyn GitHubApi>,
}

impl CodeReviewAgent {
  /// Registers every tool and workflow against `api`.
  pub fn new(model: ModelConfig, api: Arc<dyn GitHubApi>) -> Result<Self> {
    tracing::info!("Registering agent tools and workflows...");
    let registry = Registry::new();
    for tool in all_tools() {
      registry.register_tool(tool)?;
    }
    for workflow in all_workflows()? {
      registry.register_workflow(workflow)?;
    }
    tracing::info!(callables = registry.len(), "Agent registry ready.");

    Ok(Self {
      name: AGENT_NAME.to_string(),
      instructions: INSTRUCTIONS.to_string(),
      model,
      registry,
      api,
    })
  }

  pub fn registry(&self) -> &Registry {
    &self.registry
  }

  /// A fresh context per invocation, carrying the GitHub client and model selection.
  pub fn new_context(&self) -> RuntimeContext {
    RuntimeContext::new()
      .with_arc::<dyn GitHubApi>(Arc::clone(&self.api))
      .with(self.model.clone())
  }

  /// Invokes a tool or workflow by id.
  pub async fn call(&self, id: &str, input: Value) -> Result<Value> {
    let ctx = self.new_context();
    tracing::debug!(trace_id = %ctx.trace_id(), id, "Invoking callable.");
    Ok(self.registry.call(id, input, ctx).await?)
  }

  /// The agent description an agent host consumes.
  pub fn catalog_json(&self) -> Value {
    json!({
      "name": self.name,
      "instructions": self.instructions,
      "model": { "name": self.model.model_name, "baseUrl": self.model.base_url },
      "tools": self.registry.manifest(),
    })
  }
}

impl std::fmt::Debug for CodeReviewAgent {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CodeReviewAgent")
      .field("name", &self.name)
      .field("model", &self.model)
      .field("registry", &self.registry)
      .finish_non_exhaustive()
  }
}

/// Builds the agent with the real HTTP client.
pub fn build_agent(config: &AppConfig) -> Result<CodeReviewAgent> {
  let client = GitHubClient::new(config)?;
  CodeReviewAgent::new(config.model.clone(), Arc::new(client))
}
