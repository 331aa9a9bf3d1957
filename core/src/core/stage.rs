// stepflow/src/core/stage.rs

//! The three kinds of stage a workflow is made of: steps, mappers and branches.

use super::step::StepDef;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// What a mapper sees: the previous stage's output and the workflow's normalized input.
#[derive(Debug, Clone, Copy)]
pub struct MapContext<'a> {
  input: &'a Value,
  init_data: &'a Value,
}

impl<'a> MapContext<'a> {
  pub(crate) fn new(input: &'a Value, init_data: &'a Value) -> Self {
    Self { input, init_data }
  }

  /// Output of the stage immediately before this mapper.
  pub fn input(&self) -> &'a Value {
    self.input
  }

  /// The workflow input after validation and defaults.
  pub fn init_data(&self) -> &'a Value {
    self.init_data
  }
}

/// A pure reshaping function between two stages.
pub type MapFn = Arc<dyn Fn(MapContext<'_>) -> Value + Send + Sync>;

/// Predicate over the current data, used to pick a branch arm.
pub type Condition = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct Mapper {
  pub(crate) id: String,
  pub(crate) transform: MapFn,
}

impl Mapper {
  pub fn id(&self) -> &str {
    &self.id
  }

  pub(crate) fn apply(&self, ctx: MapContext<'_>) -> Value {
    (self.transform)(ctx)
  }
}

impl fmt::Debug for Mapper {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Mapper").field("id", &self.id).finish_non_exhaustive()
  }
}

/// Behavior of a branch when none of its conditions hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatch {
  /// The data flows on unchanged.
  PassThrough,
  /// The invocation fails with `NoBranchMatched`.
  Fail,
}

#[derive(Clone)]
pub struct BranchArm {
  pub(crate) condition: Condition,
  pub(crate) step: StepDef,
}

impl BranchArm {
  /// An arm that runs `step` when `condition` holds for the current data.
  pub fn when<C>(condition: C, step: StepDef) -> Self
  where
    C: Fn(&Value) -> bool + Send + Sync + 'static,
  {
    Self {
      condition: Arc::new(condition),
      step,
    }
  }

  pub fn step(&self) -> &StepDef {
    &self.step
  }
}

/// Runs the step of the first arm whose condition holds for the current data.
#[derive(Clone)]
pub struct Branch {
  pub(crate) id: String,
  pub(crate) arms: Vec<BranchArm>,
  pub(crate) on_no_match: NoMatch,
}

impl Branch {
  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn arms(&self) -> &[BranchArm] {
    &self.arms
  }

  pub fn on_no_match(&self) -> NoMatch {
    self.on_no_match
  }

  /// The first arm whose condition holds for `data`.
  pub(crate) fn select(&self, data: &Value) -> Option<&BranchArm> {
    self.arms.iter().find(|arm| (arm.condition)(data))
  }
}

impl fmt::Debug for Branch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let steps: Vec<&str> = self.arms.iter().map(|arm| arm.step.id()).collect();
    f.debug_struct("Branch")
      .field("id", &self.id)
      .field("arms", &steps)
      .field("on_no_match", &self.on_no_match)
      .finish()
  }
}

#[derive(Debug, Clone)]
pub enum Stage {
  Step(StepDef),
  Map(Mapper),
  Branch(Branch),
}

impl Stage {
  pub fn id(&self) -> &str {
    match self {
      Stage::Step(step) => step.id(),
      Stage::Map(mapper) => mapper.id(),
      Stage::Branch(branch) => branch.id(),
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      Stage::Step(_) => "step",
      Stage::Map(_) => "map",
      Stage::Branch(_) => "branch",
    }
  }
}
