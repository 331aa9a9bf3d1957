// stepflow/src/core/step.rs

//! Defines the unit of work: a named async operation with declared input and output shapes.

use super::context::{CapabilityKey, RuntimeContext};
use crate::schema::Schema;
use anyhow::Context as _;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by a step executor.
pub type StepFuture = Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send>>;

/// Type alias for a step body.
///
/// Receives the validated input and the invocation's runtime context. Returning `Err`
/// is the only way a step fails; a tagged `{ "ok": false, .. }` value is a normal result.
pub type StepExecutor = Arc<dyn Fn(Value, RuntimeContext) -> StepFuture + Send + Sync>;

/// An immutable step definition. Cheap to clone; the executor is shared.
#[derive(Clone)]
pub struct StepDef {
  id: String,
  description: String,
  input_schema: Schema,
  output_schema: Schema,
  requires: Vec<CapabilityKey>,
  executor: StepExecutor,
}

impl StepDef {
  /// Builds a step over raw JSON values.
  pub fn new<F, Fut>(
    id: impl Into<String>,
    description: impl Into<String>,
    input_schema: impl Into<Schema>,
    output_schema: impl Into<Schema>,
    executor: F,
  ) -> Self
  where
    F: Fn(Value, RuntimeContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
  {
    Self {
      id: id.into(),
      description: description.into(),
      input_schema: input_schema.into(),
      output_schema: output_schema.into(),
      requires: Vec::new(),
      executor: Arc::new(move |input, ctx| Box::pin(executor(input, ctx))),
    }
  }

  /// Builds a step whose body works on serde types.
  ///
  /// The input is deserialized after schema validation (so defaults are already in
  /// place) and the output is serialized before output validation.
  pub fn typed<I, O, F, Fut>(
    id: impl Into<String>,
    description: impl Into<String>,
    input_schema: impl Into<Schema>,
    output_schema: impl Into<Schema>,
    executor: F,
  ) -> Self
  where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
    F: Fn(I, RuntimeContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
  {
    let executor = Arc::new(executor);
    let type_name = std::any::type_name::<I>();
    Self::new(id, description, input_schema, output_schema, move |input: Value, ctx| {
      let executor = Arc::clone(&executor);
      async move {
        let typed: I = serde_json::from_value(input)
          .with_context(|| format!("input does not deserialize into {}", type_name))?;
        let output = executor(typed, ctx).await?;
        serde_json::to_value(output).context("output does not serialize to JSON")
      }
    })
  }

  /// Declares that the step reads a `T` from the runtime context. The executor refuses
  /// to run the step when it is absent.
  pub fn requires<T: ?Sized + 'static>(mut self) -> Self {
    let key = CapabilityKey::of::<T>();
    if !self.requires.contains(&key) {
      self.requires.push(key);
    }
    self
  }

  pub(crate) fn with_requirements<I>(mut self, keys: I) -> Self
  where
    I: IntoIterator<Item = CapabilityKey>,
  {
    for key in keys {
      if !self.requires.contains(&key) {
        self.requires.push(key);
      }
    }
    self
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn description(&self) -> &str {
    &self.description
  }

  pub fn input_schema(&self) -> &Schema {
    &self.input_schema
  }

  pub fn output_schema(&self) -> &Schema {
    &self.output_schema
  }

  pub fn required_capabilities(&self) -> &[CapabilityKey] {
    &self.requires
  }

  /// Invokes the body directly, without validation or capability checks.
  pub(crate) fn execute(&self, input: Value, ctx: RuntimeContext) -> StepFuture {
    (self.executor)(input, ctx)
  }
}

// The executor closure has no Debug impl.
impl std::fmt::Debug for StepDef {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("id", &self.id)
      .field("description", &self.description)
      .field("requires", &self.requires)
      .finish_non_exhaustive()
  }
}
