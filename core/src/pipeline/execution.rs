// stepflow/src/pipeline/execution.rs

//! Contains `Workflow::run()` and friends, which drive a committed workflow through
//! its stages.

use crate::core::context::RuntimeContext;
use crate::core::control::RunState;
use crate::core::stage::{MapContext, NoMatch, Stage};
use crate::core::step::StepDef;
use crate::error::{Boundary, StepflowError, StepflowResult};
use crate::pipeline::definition::Workflow;
use crate::schema::validate;
use serde_json::Value;
use tracing::{event, instrument, span, Instrument, Level};

type Observer<'a> = dyn FnMut(&RunState) + Send + 'a;

impl Workflow {
  /// Executes the workflow once.
  ///
  /// The input is validated against the workflow input schema, every stage runs in
  /// order, and the final data is validated against the workflow output schema.
  /// The first failing stage ends the invocation; later stages never run.
  pub async fn run(&self, input: Value, ctx: RuntimeContext) -> StepflowResult<Value> {
    let trace_id = ctx.trace_id().to_string();
    let result = self.run_nested(input, ctx).await;
    if let Err(err) = &result {
      event!(Level::ERROR, workflow_id = %self.id(), %trace_id, error = %err, "Workflow failed.");
    }
    result
  }

  /// Runs without reporting a failure; the caller owns that. Used for workflows
  /// nested as a step and for registry dispatch.
  pub(crate) async fn run_nested(&self, input: Value, ctx: RuntimeContext) -> StepflowResult<Value> {
    self.drive(input, ctx, &mut |_: &RunState| {}).await
  }

  /// Like [`run`](Self::run), but reports the outcome as a terminal [`RunState`].
  pub async fn invoke(&self, input: Value, ctx: RuntimeContext) -> RunState {
    self.invoke_observed(input, ctx, |_: &RunState| {}).await
  }

  /// Executes the workflow, calling `observer` on every state transition:
  /// `NotStarted`, one `Running` per stage, then `Completed` or `Failed`.
  pub async fn invoke_observed<F>(&self, input: Value, ctx: RuntimeContext, mut observer: F) -> RunState
  where
    F: FnMut(&RunState) + Send,
  {
    observer(&RunState::NotStarted);
    let trace_id = ctx.trace_id().to_string();
    let state = match self.drive(input, ctx, &mut observer).await {
      Ok(output) => RunState::Completed(output),
      Err(err) => {
        event!(Level::ERROR, workflow_id = %self.id(), %trace_id, error = %err, "Workflow failed.");
        RunState::Failed(err.to_failure(self.id()))
      }
    };
    observer(&state);
    state
  }

  #[instrument(
    name = "Workflow::run",
    skip_all,
    fields(
      workflow_id = %self.id(),
      trace_id = %ctx.trace_id(),
      num_stages = self.stages().len(),
    )
  )]
  async fn drive(&self, input: Value, ctx: RuntimeContext, observer: &mut Observer<'_>) -> StepflowResult<Value> {
    event!(Level::DEBUG, "Workflow execution starting.");

    let init_data = validate(self.input_schema(), &input).map_err(|source| StepflowError::Validation {
      stage_id: self.id().to_string(),
      boundary: Boundary::Input,
      source,
    })?;

    let mut data = init_data.clone();
    for (stage_index, stage) in self.stages().iter().enumerate() {
      observer(&RunState::Running {
        stage_index,
        stage_id: stage.id().to_string(),
      });
      let stage_span = span!(
        Level::INFO,
        "workflow_stage",
        stage_id = stage.id(),
        stage_index = stage_index,
        kind = stage.kind()
      );
      data = run_stage(stage, data, &init_data, &ctx).instrument(stage_span).await?;
    }

    let output = validate(self.output_schema(), &data).map_err(|source| StepflowError::Validation {
      stage_id: self.id().to_string(),
      boundary: Boundary::Output,
      source,
    })?;

    event!(Level::DEBUG, "Workflow execution completed successfully.");
    Ok(output)
  }
}

async fn run_stage(stage: &Stage, data: Value, init_data: &Value, ctx: &RuntimeContext) -> StepflowResult<Value> {
  match stage {
    Stage::Step(step) => run_step(step, data, ctx).await,
    Stage::Map(mapper) => {
      let mapped = mapper.apply(MapContext::new(&data, init_data));
      event!(Level::TRACE, "Mapper applied.");
      Ok(mapped)
    }
    Stage::Branch(branch) => match branch.select(&data) {
      Some(arm) => {
        event!(Level::DEBUG, selected = arm.step().id(), "Branch arm selected.");
        run_step(arm.step(), data, ctx).await
      }
      None => match branch.on_no_match() {
        NoMatch::PassThrough => {
          event!(Level::DEBUG, "No branch arm matched, passing data through.");
          Ok(data)
        }
        NoMatch::Fail => {
          event!(Level::DEBUG, "No branch arm matched.");
          Err(StepflowError::NoBranchMatched {
            stage_id: branch.id().to_string(),
          })
        }
      },
    },
  }
}

/// Runs one step with its full boundary contract: declared capabilities, input
/// validation, the body, output validation.
pub(crate) async fn run_step(step: &StepDef, input: Value, ctx: &RuntimeContext) -> StepflowResult<Value> {
  for key in step.required_capabilities() {
    if !ctx.has(key) {
      event!(Level::DEBUG, step_id = step.id(), capability = key.type_name(), "Required capability missing.");
      return Err(StepflowError::MissingCapability {
        stage_id: step.id().to_string(),
        capability: key.type_name().to_string(),
      });
    }
  }

  let input = validate(step.input_schema(), &input).map_err(|source| StepflowError::Validation {
    stage_id: step.id().to_string(),
    boundary: Boundary::Input,
    source,
  })?;

  let output = match step.execute(input, ctx.clone()).await {
    Ok(output) => output,
    Err(source) => {
      event!(Level::DEBUG, step_id = step.id(), error = %format!("{:#}", source), "Step failed.");
      return Err(StepflowError::StepExecution {
        stage_id: step.id().to_string(),
        source,
      });
    }
  };

  if output.get("ok") == Some(&Value::Bool(false)) {
    let failure_message = output.get("message").and_then(Value::as_str).unwrap_or_default();
    event!(Level::WARN, step_id = step.id(), failure_message, "Step returned a failure result.");
  }

  validate(step.output_schema(), &output).map_err(|source| StepflowError::Validation {
    stage_id: step.id().to_string(),
    boundary: Boundary::Output,
    source,
  })
}
