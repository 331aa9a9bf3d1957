// review_agent/src/workflows/contribution.rs

use crate::tools::users::{contribution_input, contribution_schema, get_user_contribution_activity};
use stepflow::{StepflowResult, Workflow, WorkflowBuilder};

pub const WORKFLOW_ID: &str = "ContributionWorkflow";

/// A single-step workflow around the `getUserContributionActivity` tool.
pub fn workflow() -> StepflowResult<Workflow> {
  WorkflowBuilder::new(WORKFLOW_ID, contribution_input(), contribution_schema())
    .description(
      "Fetch GitHub user contribution activity summary (commits, PRs, issues, repos, forks) for a given time period (7d, 14d, 30d)",
    )
    .then(get_user_contribution_activity())
    .commit()
}
