// tests/pipeline_execution_tests.rs
mod common;
use common::*;
use parking_lot::Mutex;
use serde_json::{json, Value};
use serial_test::serial;
use std::sync::Arc;
use stepflow::{RunState, RuntimeContext, Schema, StepDef, Workflow, WorkflowBuilder};

fn doubling_workflow() -> Workflow {
  WorkflowBuilder::new("double-then-add", counter_schema(), counter_schema())
    .description("adds one, doubles, adds ten")
    .then(create_increment_step("add-one", 1))
    .map(|m| json!({ "value": m.input()["value"].as_i64().unwrap_or_default() * 2 }))
    .then(create_increment_step("add-ten", 10))
    .commit()
    .expect("valid workflow")
}

#[tokio::test]
#[serial]
async fn test_stages_run_in_declared_order() {
  setup_tracing();
  let workflow = doubling_workflow();
  let (ctx, log) = context_with_log();

  let output = workflow.run(json!({ "value": 4 }), ctx).await.unwrap();

  assert_eq!(output, json!({ "value": 20 }));
  assert_eq!(log.entries(), vec!["add-one", "add-ten"]);
  assert_eq!(workflow.stage_ids(), vec!["add-one", "map-1", "add-ten"]);
}

#[tokio::test]
#[serial]
async fn test_repeated_invocations_are_independent() {
  setup_tracing();
  let workflow = doubling_workflow();

  let first = workflow.run(json!({ "value": 1 }), RuntimeContext::new()).await.unwrap();
  let second = workflow.run(json!({ "value": 1 }), RuntimeContext::new()).await.unwrap();
  assert_eq!(first, second);
}

#[tokio::test]
#[serial]
async fn test_concurrent_invocations_share_definition() {
  setup_tracing();
  let workflow = doubling_workflow();

  let (a, b, c) = tokio::join!(
    workflow.run(json!({ "value": 0 }), RuntimeContext::new()),
    workflow.run(json!({ "value": 5 }), RuntimeContext::new()),
    workflow.run(json!({ "value": 10 }), RuntimeContext::new()),
  );
  assert_eq!(a.unwrap(), json!({ "value": 12 }));
  assert_eq!(b.unwrap(), json!({ "value": 22 }));
  assert_eq!(c.unwrap(), json!({ "value": 32 }));
}

#[tokio::test]
#[serial]
async fn test_mapper_sees_initial_input_with_defaults() {
  setup_tracing();
  let input_schema = Schema::object()
    .field("owner", Schema::string())
    .with_default("branch", Schema::string(), "main")
    .build();
  let output_schema = Schema::object()
    .field("owner", Schema::string())
    .field("branch", Schema::string())
    .field("count", Schema::integer())
    .build();

  let workflow = WorkflowBuilder::new("init-data", input_schema, output_schema)
    .then(create_constant_step("count", counter_schema(), json!({ "value": 3 })))
    .map(|m| {
      json!({
        "owner": m.init_data()["owner"],
        "branch": m.init_data()["branch"],
        "count": m.input()["value"],
      })
    })
    .commit()
    .unwrap();

  let output = workflow
    .run(json!({ "owner": "acme", "ignored": true }), RuntimeContext::new())
    .await
    .unwrap();
  assert_eq!(output, json!({ "owner": "acme", "branch": "main", "count": 3 }));
}

#[tokio::test]
#[serial]
async fn test_mapper_is_deterministic_across_runs() {
  setup_tracing();
  let workflow = WorkflowBuilder::new("pure-map", counter_schema(), text_schema())
    .map(|m| json!({ "text": format!("value={}", m.input()["value"]) }))
    .commit()
    .unwrap();

  let mut outputs = Vec::new();
  for _ in 0..3 {
    outputs.push(workflow.run(json!({ "value": 7 }), RuntimeContext::new()).await.unwrap());
  }
  assert!(outputs.iter().all(|o| o == &json!({ "text": "value=7" })));
}

#[tokio::test]
#[serial]
async fn test_invoke_reports_every_transition() {
  setup_tracing();
  let workflow = doubling_workflow();
  let seen: Arc<Mutex<Vec<RunState>>> = Arc::new(Mutex::new(Vec::new()));
  let sink = Arc::clone(&seen);

  let state = workflow
    .invoke_observed(json!({ "value": 0 }), RuntimeContext::new(), move |s| sink.lock().push(s.clone()))
    .await;

  assert_eq!(state, RunState::Completed(json!({ "value": 12 })));
  let seen = seen.lock();
  assert_eq!(seen.len(), 5);
  assert_eq!(seen[0], RunState::NotStarted);
  assert_eq!(
    seen[2],
    RunState::Running {
      stage_index: 1,
      stage_id: "map-1".to_string()
    }
  );
  assert!(seen[4].is_terminal());
}

#[tokio::test]
#[serial]
async fn test_nested_workflow_runs_as_a_step() {
  setup_tracing();
  let inner = WorkflowBuilder::new("inner", counter_schema(), counter_schema())
    .then(create_increment_step("inner-add", 100))
    .commit()
    .unwrap();
  let outer = WorkflowBuilder::new("outer", counter_schema(), counter_schema())
    .then(create_increment_step("outer-add", 1))
    .then(inner.as_step())
    .commit()
    .unwrap();

  let (ctx, log) = context_with_log();
  let output = outer.run(json!({ "value": 0 }), ctx).await.unwrap();
  assert_eq!(output, json!({ "value": 101 }));
  assert_eq!(log.entries(), vec!["outer-add", "inner-add"]);
}

#[tokio::test]
#[serial]
async fn test_typed_step_round_trips_serde_types() {
  setup_tracing();

  #[derive(serde::Deserialize)]
  struct Greeting {
    name: String,
    punctuation: String,
  }

  #[derive(serde::Serialize)]
  struct Greeted {
    text: String,
  }

  let greet = StepDef::typed(
    "greet",
    "Greets someone",
    Schema::object()
      .field("name", Schema::string())
      .with_default("punctuation", Schema::string(), "!"),
    text_schema(),
    |input: Greeting, _ctx| async move {
      Ok::<_, anyhow::Error>(Greeted {
        text: format!("Hello, {}{}", input.name, input.punctuation),
      })
    },
  );
  let workflow = WorkflowBuilder::new("greeting", Schema::any(), text_schema())
    .then(greet)
    .commit()
    .unwrap();

  let output = workflow.run(json!({ "name": "Ada" }), RuntimeContext::new()).await.unwrap();
  assert_eq!(output, json!({ "text": "Hello, Ada!" }));
}

#[tokio::test]
#[serial]
async fn test_extra_output_fields_are_dropped_at_the_boundary() {
  setup_tracing();
  let workflow = WorkflowBuilder::new("trim", Schema::any(), text_schema())
    .then(create_constant_step(
      "noisy",
      text_schema(),
      json!({ "text": "kept", "debug": [1, 2, 3] }),
    ))
    .map(|m| m.input().clone())
    .commit()
    .unwrap();

  let output: Value = workflow.run(json!(null), RuntimeContext::new()).await.unwrap();
  assert_eq!(output, json!({ "text": "kept" }));
}
