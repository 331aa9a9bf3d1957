// review_agent/src/workflows/mod.rs

pub mod contribution;
pub mod create_issues;
pub mod gh_profile;

use stepflow::{StepflowResult, Workflow};

/// Every workflow the agent exposes.
pub fn all_workflows() -> StepflowResult<Vec<Workflow>> {
  Ok(vec![
    gh_profile::workflow()?,
    create_issues::workflow()?,
    contribution::workflow()?,
  ])
}
