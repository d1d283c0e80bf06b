use super::config_str;
use crate::domain::model::{AgentConfig, Payload};
use crate::domain::ports::Agent;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;

pub const DEFAULT_PREFIX: &str = "Echo:";

/// 保留輸入的所有欄位，並加上 `message = "{prefix} {input}"`
///
/// 適合用於快速檢查工作流程，也可作為撰寫新 agent 的範本。
#[derive(Debug, Clone)]
pub struct EchoAgent {
    prefix: String,
}

impl EchoAgent {
    pub const NAME: &'static str = "EchoAgent";

    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let prefix = config_str(Self::NAME, config, "prefix")?.unwrap_or(DEFAULT_PREFIX);
        Ok(Self::new(prefix))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for EchoAgent {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

#[async_trait]
impl Agent for EchoAgent {
    async fn process(&self, mut payload: Payload) -> Result<Payload> {
        let input = match payload.get("input") {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        let message = format!("{} {}", self.prefix, input);
        tracing::debug!("EchoAgent message: {}", message);

        payload.insert("message".to_string(), Value::String(message));
        Ok(payload)
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}
