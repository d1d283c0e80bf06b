use crate::core::registry::AgentRegistry;
use crate::domain::model::{json_type_name, AgentConfig, StepDefinition};
use crate::utils::error::{HubError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;

/// 單一步驟失敗時的處理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    #[default]
    Stop,
    Continue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorHandlingConfig {
    #[serde(default)]
    pub on_agent_failure: FailurePolicy,
}

/// 工作流程檔案的格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowFormat {
    Yaml,
    Toml,
    Json,
}

impl WorkflowFormat {
    /// 依副檔名判斷，未知副檔名當作 YAML
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => WorkflowFormat::Toml,
            Some("json") => WorkflowFormat::Json,
            _ => WorkflowFormat::Yaml,
        }
    }
}

/// 工作流程定義：依序執行的 agent 清單
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkflowConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    pub agents: Vec<StepDefinition>,
    pub error_handling: Option<ErrorHandlingConfig>,
}

impl WorkflowConfig {
    pub fn new(agents: Vec<StepDefinition>) -> Self {
        Self {
            agents,
            ..Self::default()
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading workflow from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_str_with_format(&content, WorkflowFormat::from_path(path))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::from_str_with_format(content, WorkflowFormat::Yaml)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::from_str_with_format(content, WorkflowFormat::Toml)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::from_str_with_format(content, WorkflowFormat::Json)
    }

    pub fn from_str_with_format(content: &str, format: WorkflowFormat) -> Result<Self> {
        let mut document: Value = match format {
            WorkflowFormat::Yaml => serde_yaml::from_str(content)?,
            WorkflowFormat::Toml => toml::from_str(content)?,
            WorkflowFormat::Json => serde_json::from_str(content)?,
        };

        // 變數值只會成為字串內容，不會改變文件結構
        substitute_env_vars(&mut document);
        Self::from_document(document)
    }

    /// 從已解析的文件建立，並檢查結構
    pub fn from_document(document: Value) -> Result<Self> {
        let Value::Object(mut root) = document else {
            return Err(missing_agents());
        };

        let agents = match root.remove("agents") {
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(HubError::InvalidWorkflow {
                    message: format!(
                        "Workflow `agents` must be a list, got {}.",
                        json_type_name(&other)
                    ),
                })
            }
            None => return Err(missing_agents()),
        };

        let agents = agents
            .into_iter()
            .enumerate()
            .map(|(idx, entry)| parse_step(idx + 1, entry))
            .collect::<Result<Vec<_>>>()?;

        let error_handling = match root.remove("error_handling") {
            None | Some(Value::Null) => None,
            Some(value) => Some(serde_json::from_value(value).map_err(|e| {
                HubError::InvalidWorkflow {
                    message: format!("Invalid `error_handling` section: {}", e),
                }
            })?),
        };

        Ok(Self {
            name: optional_string(&mut root, "name")?,
            description: optional_string(&mut root, "description")?,
            agents,
            error_handling,
        })
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.error_handling
            .as_ref()
            .map(|e| e.on_agent_failure)
            .unwrap_or_default()
    }

    /// 依檔案順序列出啟用的步驟，附上 1 起算的位置
    pub fn enabled_steps(&self) -> Vec<(usize, &StepDefinition)> {
        self.agents
            .iter()
            .enumerate()
            .filter(|(_, step)| step.is_enabled())
            .map(|(idx, step)| (idx + 1, step))
            .collect()
    }

    /// 確認每個啟用的步驟都對應到已註冊的 agent
    pub fn validate_against(&self, registry: &AgentRegistry) -> Result<()> {
        self.validate()?;
        for (_, step) in self.enabled_steps() {
            if !registry.contains(&step.name) {
                return Err(HubError::AgentNotFound {
                    name: step.name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Validate for WorkflowConfig {
    fn validate(&self) -> Result<()> {
        for (idx, step) in self.agents.iter().enumerate() {
            validate_non_empty_string(&format!("agents[{}].name", idx + 1), &step.name)?;
        }
        Ok(())
    }
}

fn missing_agents() -> HubError {
    HubError::InvalidWorkflow {
        message: "Workflow must contain a top-level `agents` list.".to_string(),
    }
}

fn parse_step(position: usize, entry: Value) -> Result<StepDefinition> {
    let malformed = |reason: String| HubError::MalformedStep { position, reason };

    let mut fields = match entry {
        Value::Object(fields) => fields,
        other => {
            return Err(malformed(format!(
                "expected a mapping, got {}",
                json_type_name(&other)
            )))
        }
    };

    let name = match fields.remove("name") {
        Some(Value::String(name)) if !name.trim().is_empty() => name,
        Some(Value::String(_)) => return Err(malformed("`name` is empty".to_string())),
        Some(other) => {
            return Err(malformed(format!(
                "`name` must be a string, got {}",
                json_type_name(&other)
            )))
        }
        None => return Err(malformed("missing `name`".to_string())),
    };

    let config = match fields.remove("config") {
        None | Some(Value::Null) => AgentConfig::new(),
        Some(Value::Object(config)) => config,
        Some(other) => {
            return Err(malformed(format!(
                "`config` must be a mapping, got {}",
                json_type_name(&other)
            )))
        }
    };

    let enabled = match fields.remove("enabled") {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(b),
        Some(other) => {
            return Err(malformed(format!(
                "`enabled` must be a boolean, got {}",
                json_type_name(&other)
            )))
        }
    };

    let description = match fields.remove("description") {
        Some(Value::String(s)) => Some(s),
        _ => None,
    };

    Ok(StepDefinition {
        name,
        description,
        enabled,
        config,
    })
}

fn optional_string(root: &mut serde_json::Map<String, Value>, key: &str) -> Result<Option<String>> {
    match root.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(HubError::InvalidWorkflow {
            message: format!("Workflow `{}` must be a string, got {}.", key, json_type_name(&other)),
        }),
    }
}

/// 在所有字串值中替換 `${VAR}`；未設定的變數保持原樣
fn substitute_env_vars(value: &mut Value) {
    match value {
        Value::String(s) => {
            if let Some(replaced) = substitute_in_str(s) {
                *s = replaced;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(substitute_env_vars),
        Value::Object(map) => map.values_mut().for_each(substitute_env_vars),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn substitute_in_str(content: &str) -> Option<String> {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));

    if !re.is_match(content) {
        return None;
    }

    let replaced = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    });
    Some(replaced.into_owned())
}
