// review_agent/src/main.rs

use clap::{Parser, Subcommand};
use review_agent::{build_agent, AppConfig, AppError};
use serde_json::Value;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "review-agent", version, about = "GitHub code review agent tools and workflows")]
struct Cli {
  /// Emit logs as JSON lines.
  #[arg(long, global = true)]
  json_logs: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the agent description and tool manifest.
  Catalog,
  /// Invoke a tool or workflow by id.
  Call {
    id: String,
    /// JSON input for the callable.
    #[arg(long, default_value = "{}")]
    input: String,
  },
}

fn init_tracing(json: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  // Logs go to stderr; stdout carries the JSON result.
  let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
  if json {
    builder.json().init();
  } else {
    builder.init();
  }
}

async fn run(cli: Cli) -> Result<String, AppError> {
  let config = AppConfig::from_env()?;
  let agent = build_agent(&config)?;

  match cli.command {
    Command::Catalog => Ok(serde_json::to_string_pretty(&agent.catalog_json())?),
    Command::Call { id, input } => {
      let input: Value = serde_json::from_str(&input)?;
      let output = agent.call(&id, input).await?;
      Ok(serde_json::to_string_pretty(&output)?)
    }
  }
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.json_logs);

  let id = match &cli.command {
    Command::Call { id, .. } => id.clone(),
    Command::Catalog => "catalog".to_string(),
  };
  match run(cli).await {
    Ok(output) => {
      println!("{}", output);
      ExitCode::SUCCESS
    }
    Err(AppError::Workflow { source }) => {
      // Already reported by the registry.
      eprintln!("{}", source.to_failure(&id));
      ExitCode::FAILURE
    }
    Err(e) => {
      tracing::error!(error = %e, "Invocation failed.");
      eprintln!("{}", e);
      ExitCode::FAILURE
    }
  }
}
