use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("{message}")]
    InvalidWorkflow { message: String },

    #[error("Agent definition at position {position} is malformed: {reason}")]
    MalformedStep { position: usize, reason: String },

    #[error("Agent '{name}' is not registered.")]
    AgentNotFound { name: String },

    #[error("Invalid configuration for agent '{agent}': {message}")]
    AgentConfigError { agent: String, message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid payload: {message}")]
    PayloadError { message: String },

    #[error("Agent '{agent}' failed: {message}")]
    AgentError { agent: String, message: String },

    #[error("Step {position} ({agent}) failed: {source}")]
    StepFailed {
        position: usize,
        agent: String,
        #[source]
        source: Box<HubError>,
    },
}

pub type Result<T> = std::result::Result<T, HubError>;

/// 錯誤嚴重程度，CLI 依此決定退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl HubError {
    pub fn agent(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AgentError {
            agent: agent.into(),
            message: message.into(),
        }
    }

    pub fn agent_config(agent: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AgentConfigError {
            agent: agent.into(),
            message: message.into(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            HubError::HttpError(_) => ErrorSeverity::Medium,
            HubError::IoError(_) => ErrorSeverity::Critical,
            HubError::StepFailed { source, .. } => source.severity(),
            _ => ErrorSeverity::High,
        }
    }

    /// CLI 退出碼：可重試 2、處理錯誤 1、系統錯誤 3
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            HubError::IoError(_) => "Check that the file exists and is readable",
            HubError::JsonError(_) | HubError::PayloadError { .. } => {
                "Pass the initial payload as a JSON object, e.g. --input '{\"input\": \"hi\"}'"
            }
            HubError::YamlError(_) | HubError::TomlError(_) => {
                "Check the workflow file syntax"
            }
            HubError::InvalidWorkflow { .. } | HubError::MalformedStep { .. } => {
                "Every workflow needs a top-level `agents` list whose entries have a `name`"
            }
            HubError::AgentNotFound { .. } => {
                "Use one of the registered agent names (see --dry-run output)"
            }
            HubError::AgentConfigError { .. }
            | HubError::InvalidConfigValueError { .. }
            | HubError::MissingConfigError { .. } => "Fix the agent's `config` block",
            HubError::HttpError(_) => "Check network connectivity or raise retry_attempts",
            HubError::AgentError { .. } => "Inspect the agent's input payload",
            HubError::StepFailed { source, .. } => source.recovery_suggestion(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            HubError::StepFailed {
                position,
                agent,
                source,
            } => format!(
                "Step {} ({}) failed: {}",
                position,
                agent,
                source.user_friendly_message()
            ),
            HubError::IoError(e) => format!("File operation failed: {}", e),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_not_found_message() {
        let err = HubError::AgentNotFound {
            name: "NonExistentAgent".to_string(),
        };
        assert_eq!(err.to_string(), "Agent 'NonExistentAgent' is not registered.");
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_malformed_workflow_exits_with_one() {
        let err = HubError::MalformedStep {
            position: 1,
            reason: "missing `name`".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_step_failed_inherits_severity() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = HubError::StepFailed {
            position: 2,
            agent: "EchoAgent".to_string(),
            source: Box::new(HubError::IoError(io)),
        };
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.exit_code(), 3);
        assert!(err.user_friendly_message().starts_with("Step 2 (EchoAgent) failed"));
    }
}
