use crate::utils::error::{HubError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 在 agent 之間傳遞的資料，永遠是 JSON 物件
pub type Payload = serde_json::Map<String, Value>;

/// 傳給 agent 建構函式的設定
pub type AgentConfig = serde_json::Map<String, Value>;

/// 工作流程中的單一步驟
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub config: AgentConfig,
}

impl StepDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            enabled: None,
            config: AgentConfig::new(),
        }
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// 解析初始 payload；空字串視為空物件
pub fn payload_from_json(input: &str) -> Result<Payload> {
    if input.trim().is_empty() {
        return Ok(Payload::new());
    }

    match serde_json::from_str::<Value>(input)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Payload::new()),
        other => Err(HubError::PayloadError {
            message: format!("expected a JSON object, got {}", json_type_name(&other)),
        }),
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
