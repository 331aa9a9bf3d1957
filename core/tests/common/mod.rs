// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use stepflow::{RuntimeContext, Schema, StepDef};
use tracing::Level;

// --- Capability used to observe which steps ran ---
#[derive(Debug, Default)]
pub struct ExecutionLog {
  entries: Mutex<Vec<String>>,
}

impl ExecutionLog {
  pub fn record(&self, step_id: &str) {
    self.entries.lock().push(step_id.to_string());
  }

  pub fn entries(&self) -> Vec<String> {
    self.entries.lock().clone()
  }
}

/// A fresh context carrying an `ExecutionLog`, plus a handle to that log.
pub fn context_with_log() -> (RuntimeContext, Arc<ExecutionLog>) {
  let log = Arc::new(ExecutionLog::default());
  let ctx = RuntimeContext::new().with_arc(Arc::clone(&log));
  (ctx, log)
}

fn record(ctx: &RuntimeContext, step_id: &str) {
  if let Some(log) = ctx.get::<ExecutionLog>() {
    log.record(step_id);
  }
}

// --- Common Schemas ---
pub fn counter_schema() -> Schema {
  Schema::object().field("value", Schema::integer()).build()
}

pub fn text_schema() -> Schema {
  Schema::object().field("text", Schema::string()).build()
}

/// `{ok: true, value}` or `{ok: false, message}`.
pub fn outcome_schema() -> Schema {
  Schema::union([
    Schema::object()
      .field("ok", Schema::literal(true))
      .field("value", Schema::integer())
      .build(),
    Schema::object()
      .field("ok", Schema::literal(false))
      .field("message", Schema::string())
      .build(),
  ])
}

// --- Common Step Creators ---
pub fn create_increment_step(id: &'static str, by: i64) -> StepDef {
  StepDef::new(
    id,
    format!("Adds {} to value", by),
    counter_schema(),
    counter_schema(),
    move |input: Value, ctx: RuntimeContext| async move {
      record(&ctx, id);
      let value = input["value"].as_i64().unwrap_or_default();
      tracing::debug!(target: "test_steps", step = id, value, "incrementing");
      Ok::<_, anyhow::Error>(json!({ "value": value + by }))
    },
  )
}

pub fn create_failing_step(id: &'static str, error_message: &'static str) -> StepDef {
  StepDef::new(
    id,
    "Always raises",
    Schema::any(),
    Schema::any(),
    move |_input: Value, ctx: RuntimeContext| async move {
      record(&ctx, id);
      tracing::warn!(target: "test_steps", step = id, "failing with: '{}'", error_message);
      Err::<Value, _>(anyhow::anyhow!(error_message))
    },
  )
}

/// Step that reports a domain failure as data instead of raising.
pub fn create_modeled_failure_step(id: &'static str, message: &'static str) -> StepDef {
  StepDef::new(
    id,
    "Returns ok: false",
    counter_schema(),
    outcome_schema(),
    move |_input: Value, ctx: RuntimeContext| async move {
      record(&ctx, id);
      Ok::<_, anyhow::Error>(json!({ "ok": false, "message": message }))
    },
  )
}

/// Step that returns `output` verbatim, whatever its input.
pub fn create_constant_step(id: &'static str, output_schema: Schema, output: Value) -> StepDef {
  StepDef::new(id, "Returns a constant", Schema::any(), output_schema, move |_input: Value, ctx: RuntimeContext| {
    let output = output.clone();
    async move {
      record(&ctx, id);
      Ok::<_, anyhow::Error>(output)
    }
  })
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counter for checking execution counts ---
pub static STEP_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  STEP_EXEC_COUNTER.store(0, Ordering::SeqCst);
}

pub fn create_counting_step(id: &'static str) -> StepDef {
  StepDef::new(id, "Counts executions", Schema::any(), Schema::any(), move |input: Value, _ctx| async move {
    STEP_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
    Ok::<_, anyhow::Error>(input)
  })
}
