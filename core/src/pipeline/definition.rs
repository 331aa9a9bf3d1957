// stepflow/src/pipeline/definition.rs

//! Contains the `WorkflowBuilder` used to assemble a workflow stage by stage, and the
//! immutable `Workflow` it produces on `commit()`.

use crate::core::context::CapabilityKey;
use crate::core::stage::{Branch, BranchArm, MapContext, Mapper, NoMatch, Stage};
use crate::core::step::StepDef;
use crate::error::{StepflowError, StepflowResult};
use crate::schema::Schema;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{event, Level};

/// Mutable, incremental definition of a workflow.
///
/// Stages run in the order they are added. Nothing here can be executed; call
/// [`commit`](Self::commit) to obtain a runnable [`Workflow`].
#[derive(Debug)]
pub struct WorkflowBuilder {
  id: String,
  description: String,
  input_schema: Schema,
  output_schema: Schema,
  stages: Vec<Stage>,
  map_count: usize,
  branch_count: usize,
}

impl WorkflowBuilder {
  pub fn new(id: impl Into<String>, input_schema: impl Into<Schema>, output_schema: impl Into<Schema>) -> Self {
    Self {
      id: id.into(),
      description: String::new(),
      input_schema: input_schema.into(),
      output_schema: output_schema.into(),
      stages: Vec::new(),
      map_count: 0,
      branch_count: 0,
    }
  }

  pub fn description(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }

  /// Appends a step.
  pub fn then(mut self, step: StepDef) -> Self {
    self.stages.push(Stage::Step(step));
    self
  }

  /// Appends a mapper. Mappers get the synthetic ids `map-1`, `map-2`, ...
  pub fn map<F>(mut self, transform: F) -> Self
  where
    F: Fn(MapContext<'_>) -> Value + Send + Sync + 'static,
  {
    self.map_count += 1;
    self.stages.push(Stage::Map(Mapper {
      id: format!("map-{}", self.map_count),
      transform: Arc::new(transform),
    }));
    self
  }

  /// Appends a branch whose unmatched data flows through unchanged.
  pub fn branch<I>(self, arms: I) -> Self
  where
    I: IntoIterator<Item = BranchArm>,
  {
    self.push_branch(arms, NoMatch::PassThrough)
  }

  /// Appends a branch that fails the invocation when no arm matches.
  pub fn branch_or_fail<I>(self, arms: I) -> Self
  where
    I: IntoIterator<Item = BranchArm>,
  {
    self.push_branch(arms, NoMatch::Fail)
  }

  fn push_branch<I>(mut self, arms: I, on_no_match: NoMatch) -> Self
  where
    I: IntoIterator<Item = BranchArm>,
  {
    self.branch_count += 1;
    self.stages.push(Stage::Branch(Branch {
      id: format!("branch-{}", self.branch_count),
      arms: arms.into_iter().collect(),
      on_no_match,
    }));
    self
  }

  /// Seals the definition.
  ///
  /// Fails when there are no stages, when a branch has no arms, or when a stage id is
  /// used twice (including a clash with the workflow id), since failures are reported
  /// by stage id.
  pub fn commit(self) -> StepflowResult<Workflow> {
    if self.stages.is_empty() {
      return Err(StepflowError::Configuration {
        message: format!("workflow '{}' has no stages", self.id),
      });
    }

    let mut seen: HashSet<&str> = HashSet::new();
    seen.insert(self.id.as_str());
    for stage in &self.stages {
      let ids: Vec<&str> = match stage {
        Stage::Step(step) => vec![step.id()],
        Stage::Map(mapper) => vec![mapper.id()],
        Stage::Branch(branch) => {
          if branch.arms.is_empty() {
            return Err(StepflowError::Configuration {
              message: format!("{} of workflow '{}' has no arms", branch.id, self.id),
            });
          }
          // The same step may sit behind several arms of one branch.
          let mut arm_ids: Vec<&str> = branch.arms.iter().map(|arm| arm.step.id()).collect();
          arm_ids.sort_unstable();
          arm_ids.dedup();
          arm_ids.push(branch.id());
          arm_ids
        }
      };
      for id in ids {
        if !seen.insert(id) {
          return Err(StepflowError::Configuration {
            message: format!("stage id '{}' is used more than once in workflow '{}'", id, self.id),
          });
        }
      }
    }

    event!(Level::DEBUG, workflow_id = %self.id, num_stages = self.stages.len(), "Workflow committed.");
    Ok(Workflow {
      inner: Arc::new(WorkflowInner {
        id: self.id,
        description: self.description,
        input_schema: self.input_schema,
        output_schema: self.output_schema,
        stages: self.stages,
      }),
    })
  }
}

#[derive(Debug)]
pub(crate) struct WorkflowInner {
  pub(crate) id: String,
  pub(crate) description: String,
  pub(crate) input_schema: Schema,
  pub(crate) output_schema: Schema,
  pub(crate) stages: Vec<Stage>,
}

/// A committed, immutable workflow. Clones share the definition, and any number of
/// invocations may run concurrently.
#[derive(Debug, Clone)]
pub struct Workflow {
  pub(crate) inner: Arc<WorkflowInner>,
}

impl Workflow {
  pub fn id(&self) -> &str {
    &self.inner.id
  }

  pub fn description(&self) -> &str {
    &self.inner.description
  }

  pub fn input_schema(&self) -> &Schema {
    &self.inner.input_schema
  }

  pub fn output_schema(&self) -> &Schema {
    &self.inner.output_schema
  }

  pub fn stages(&self) -> &[Stage] {
    &self.inner.stages
  }

  /// Ids of every stage in order (branch arms are not listed).
  pub fn stage_ids(&self) -> Vec<&str> {
    self.inner.stages.iter().map(Stage::id).collect()
  }

  /// Every capability any step of this workflow declares.
  pub fn required_capabilities(&self) -> Vec<CapabilityKey> {
    let mut keys: Vec<CapabilityKey> = Vec::new();
    let mut push = |step: &StepDef| {
      for key in step.required_capabilities() {
        if !keys.contains(key) {
          keys.push(*key);
        }
      }
    };
    for stage in &self.inner.stages {
      match stage {
        Stage::Step(step) => push(step),
        Stage::Branch(branch) => branch.arms.iter().for_each(|arm| push(&arm.step)),
        Stage::Map(_) => {}
      }
    }
    keys
  }

  /// Wraps the workflow as a step, so it can be nested in another workflow.
  ///
  /// A failure inside the nested run surfaces as an execution failure of the outer
  /// stage, whose message names the inner stage.
  pub fn as_step(&self) -> StepDef {
    let workflow = self.clone();
    StepDef::new(
      self.id(),
      self.description(),
      self.input_schema().clone(),
      self.output_schema().clone(),
      move |input, ctx| {
        let workflow = workflow.clone();
        async move { workflow.run_nested(input, ctx).await.map_err(anyhow::Error::from) }
      },
    )
    .with_requirements(self.required_capabilities())
  }
}
