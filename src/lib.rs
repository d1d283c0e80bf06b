pub mod agents;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{FailurePolicy, WorkflowConfig};
pub use core::{
    registry::AgentRegistry,
    runner::{run_workflow, StepResult, StepStatus, WorkflowOutcome, WorkflowRunner},
};
pub use domain::{
    model::{payload_from_json, AgentConfig, Payload, StepDefinition},
    ports::Agent,
};
pub use utils::error::{HubError, Result};
