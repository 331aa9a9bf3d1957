// stepflow/src/registry.rs

//! Defines the `Registry`, an id-keyed collection of everything an agent host may call:
//! single steps ("tools") and committed workflows.

use crate::core::context::RuntimeContext;
use crate::core::step::StepDef;
use crate::error::{StepflowError, StepflowResult};
use crate::pipeline::definition::Workflow;
use crate::pipeline::execution::run_step;
use crate::schema::Schema;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{event, instrument, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallableKind {
  Tool,
  Workflow,
}

/// Public description of a callable, as advertised to an agent host.
#[derive(Debug, Clone, PartialEq)]
pub struct CallableInfo {
  pub id: String,
  pub description: String,
  pub kind: CallableKind,
  pub input_schema: Schema,
  pub output_schema: Schema,
}

impl CallableInfo {
  /// JSON manifest entry with JSON-Schema renderings of both boundaries.
  pub fn manifest(&self) -> Value {
    json!({
      "id": self.id,
      "description": self.description,
      "kind": self.kind,
      "inputSchema": self.input_schema.to_json_schema(),
      "outputSchema": self.output_schema.to_json_schema(),
    })
  }
}

/// Something the registry can run by id.
///
/// Implementations validate their own input and output.
#[async_trait]
pub trait Callable: Send + Sync {
  fn info(&self) -> CallableInfo;

  async fn call(&self, input: Value, ctx: RuntimeContext) -> StepflowResult<Value>;
}

#[async_trait]
impl Callable for StepDef {
  fn info(&self) -> CallableInfo {
    CallableInfo {
      id: self.id().to_string(),
      description: self.description().to_string(),
      kind: CallableKind::Tool,
      input_schema: self.input_schema().clone(),
      output_schema: self.output_schema().clone(),
    }
  }

  async fn call(&self, input: Value, ctx: RuntimeContext) -> StepflowResult<Value> {
    run_step(self, input, &ctx).await
  }
}

#[async_trait]
impl Callable for Workflow {
  fn info(&self) -> CallableInfo {
    CallableInfo {
      id: self.id().to_string(),
      description: self.description().to_string(),
      kind: CallableKind::Workflow,
      input_schema: self.input_schema().clone(),
      output_schema: self.output_schema().clone(),
    }
  }

  async fn call(&self, input: Value, ctx: RuntimeContext) -> StepflowResult<Value> {
    self.run_nested(input, ctx).await
  }
}

/// The callable registry. Ids are unique; iteration order is by id.
#[derive(Default)]
pub struct Registry {
  entries: RwLock<BTreeMap<String, Arc<dyn Callable>>>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers `callable` under its own id. A second registration of the same id
  /// is a configuration error and leaves the first in place.
  pub fn register(&self, callable: Arc<dyn Callable>) -> StepflowResult<()> {
    let info = callable.info();
    let mut entries = self.entries.write();
    if entries.contains_key(&info.id) {
      return Err(StepflowError::Configuration {
        message: format!("a callable with id '{}' is already registered", info.id),
      });
    }
    event!(Level::DEBUG, id = %info.id, kind = ?info.kind, "Registering callable.");
    entries.insert(info.id, callable);
    Ok(())
  }

  pub fn register_tool(&self, step: StepDef) -> StepflowResult<()> {
    self.register(Arc::new(step))
  }

  pub fn register_workflow(&self, workflow: Workflow) -> StepflowResult<()> {
    self.register(Arc::new(workflow))
  }

  pub fn get(&self, id: &str) -> Option<Arc<dyn Callable>> {
    self.entries.read().get(id).cloned()
  }

  pub fn contains(&self, id: &str) -> bool {
    self.entries.read().contains_key(id)
  }

  pub fn len(&self) -> usize {
    self.entries.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.read().is_empty()
  }

  /// Descriptions of every registered callable, sorted by id.
  pub fn catalog(&self) -> Vec<CallableInfo> {
    self.entries.read().values().map(|callable| callable.info()).collect()
  }

  /// The catalog rendered as a JSON array of manifest entries.
  pub fn manifest(&self) -> Value {
    Value::Array(self.catalog().iter().map(CallableInfo::manifest).collect())
  }

  /// Runs the callable registered under `id`. A failure is logged here, once.
  #[instrument(name = "Registry::call", skip(self, input, ctx), fields(trace_id = %ctx.trace_id()))]
  pub async fn call(&self, id: &str, input: Value, ctx: RuntimeContext) -> StepflowResult<Value> {
    let result = match self.get(id) {
      Some(callable) => callable.call(input, ctx).await,
      None => Err(StepflowError::UnknownCallable { id: id.to_string() }),
    };
    if let Err(err) = &result {
      event!(Level::ERROR, error = %err, "Call failed.");
    }
    result
  }
}

impl std::fmt::Debug for Registry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let ids: Vec<String> = self.entries.read().keys().cloned().collect();
    f.debug_struct("Registry").field("ids", &ids).finish()
  }
}
