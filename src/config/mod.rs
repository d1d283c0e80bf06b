pub mod workflow_config;

pub use workflow_config::{ErrorHandlingConfig, FailurePolicy, WorkflowConfig, WorkflowFormat};

pub use crate::utils::logger::LogFormat;

#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "agents-hub")]
#[command(about = "Run an AI-Agents Hub workflow")]
pub struct CliConfig {
    /// Path to the workflow file (YAML, TOML or JSON)
    pub workflow: String,

    /// JSON object used as the initial payload
    #[arg(long, default_value = "{}")]
    pub input: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: LogFormat,

    /// Show the execution plan without running any agent
    #[arg(long)]
    pub dry_run: bool,

    /// Log resource usage at the start and end of the run
    #[arg(long)]
    pub monitor: bool,

    /// Execution ID for this run
    #[arg(long)]
    pub execution_id: Option<String>,

    /// Override the workflow's failure policy
    #[arg(long, value_parser = parse_failure_policy)]
    pub on_agent_failure: Option<FailurePolicy>,

    /// Write execution metrics as JSON to this path
    #[arg(long)]
    pub metrics_file: Option<String>,

    /// Write the final payload to this path instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

#[cfg(feature = "cli")]
fn parse_failure_policy(value: &str) -> Result<FailurePolicy, String> {
    match value.to_ascii_lowercase().as_str() {
        "stop" => Ok(FailurePolicy::Stop),
        "continue" => Ok(FailurePolicy::Continue),
        other => Err(format!("expected `stop` or `continue`, got `{}`", other)),
    }
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// `--on-agent-failure` 優先於工作流程檔案的設定
    pub fn effective_failure_policy(&self, workflow: &WorkflowConfig) -> FailurePolicy {
        self.on_agent_failure
            .unwrap_or_else(|| workflow.failure_policy())
    }
}
