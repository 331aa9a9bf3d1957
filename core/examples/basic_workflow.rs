// stepflow/examples/basic_workflow.rs

use serde_json::{json, Value};
use stepflow::{BranchArm, RunState, RuntimeContext, Schema, StepDef, StepflowResult, WorkflowBuilder};
use tracing::info;

fn greeting_schema() -> Schema {
  Schema::object().field("greeting", Schema::string()).build()
}

#[tokio::main]
async fn main() -> StepflowResult<()> {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Workflow Example ---");

  // 1. Describe the workflow boundaries
  let input = Schema::object()
    .field("name", Schema::string())
    .with_default("language", Schema::enumeration(["en", "fr"]), "en")
    .build();

  // 2. Define steps
  let english = StepDef::new("greet-en", "English greeting", input.clone(), greeting_schema(), |data: Value, _ctx| async move {
    Ok::<_, anyhow::Error>(json!({ "greeting": format!("Hello, {}", data["name"].as_str().unwrap_or("stranger")) }))
  });
  let french = StepDef::new("greet-fr", "French greeting", input.clone(), greeting_schema(), |data: Value, _ctx| async move {
    Ok::<_, anyhow::Error>(json!({ "greeting": format!("Bonjour, {}", data["name"].as_str().unwrap_or("inconnu")) }))
  });
  let shout = StepDef::new("shout", "Upper-cases the greeting", greeting_schema(), greeting_schema(), |data: Value, _ctx| async move {
    let loud = data["greeting"].as_str().unwrap_or_default().to_uppercase();
    Ok::<_, anyhow::Error>(json!({ "greeting": format!("{}!", loud) }))
  });

  // 3. Assemble and commit
  let workflow = WorkflowBuilder::new("greeter", input, greeting_schema())
    .description("Greets someone in their language, loudly")
    .branch_or_fail([
      BranchArm::when(|d: &Value| d["language"] == "fr", french),
      BranchArm::when(|_| true, english),
    ])
    .then(shout)
    .commit()?;

  // 4. Run it
  let output = workflow.run(json!({ "name": "Ada" }), RuntimeContext::new()).await?;
  info!("Completed: {}", output);

  let state = workflow
    .invoke_observed(json!({ "name": "Amélie", "language": "fr" }), RuntimeContext::new(), |s| {
      if let RunState::Running { stage_id, .. } = s {
        info!("Entering stage {}", stage_id);
      }
    })
    .await;
  info!("Final state: {:?}", state);

  // An invalid language is rejected before any stage runs.
  if let RunState::Failed(failure) = workflow.invoke(json!({ "name": "Bo", "language": "de" }), RuntimeContext::new()).await {
    info!("Rejected: {}", failure);
  }

  info!("--- Basic Workflow Example Finished ---");
  Ok(())
}
