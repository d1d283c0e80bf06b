//! Built-in agents.
//!
//! Each agent is built from its `config` block by a factory registered in
//! [`AgentRegistry::with_builtins`](crate::core::registry::AgentRegistry::with_builtins).

pub mod echo;
pub mod field_map;
pub mod http;

pub use echo::EchoAgent;
pub use field_map::FieldMapAgent;
pub use http::HttpAgent;

use crate::domain::model::{json_type_name, AgentConfig};
use crate::utils::error::{HubError, Result};
use serde_json::Value;

/// 讀取可選的字串設定
pub(crate) fn config_str<'a>(
    agent: &str,
    config: &'a AgentConfig,
    key: &str,
) -> Result<Option<&'a str>> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(HubError::agent_config(
            agent,
            format!("`{}` must be a string, got {}", key, json_type_name(other)),
        )),
    }
}

/// 讀取可選的非負整數設定
pub(crate) fn config_u64(agent: &str, config: &AgentConfig, key: &str) -> Result<Option<u64>> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(|| {
            HubError::agent_config(agent, format!("`{}` must be a non-negative integer", key))
        }),
        Some(other) => Err(HubError::agent_config(
            agent,
            format!("`{}` must be an integer, got {}", key, json_type_name(other)),
        )),
    }
}

pub(crate) fn config_bool(agent: &str, config: &AgentConfig, key: &str) -> Result<Option<bool>> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(HubError::agent_config(
            agent,
            format!("`{}` must be a boolean, got {}", key, json_type_name(other)),
        )),
    }
}

/// 讀取 `{string: string}` 形式的設定
pub(crate) fn config_string_map(
    agent: &str,
    config: &AgentConfig,
    key: &str,
) -> Result<Option<Vec<(String, String)>>> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k.clone(), s.clone())),
                other => Err(HubError::agent_config(
                    agent,
                    format!("`{}.{}` must be a string, got {}", key, k, json_type_name(other)),
                )),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        Some(other) => Err(HubError::agent_config(
            agent,
            format!("`{}` must be a mapping, got {}", key, json_type_name(other)),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> AgentConfig {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_config_helpers() {
        let cfg = config(json!({
            "prefix": ">>",
            "retries": 3,
            "flag": true,
            "headers": {"X-Key": "abc"},
            "empty": null
        }));

        assert_eq!(config_str("A", &cfg, "prefix").unwrap(), Some(">>"));
        assert_eq!(config_str("A", &cfg, "empty").unwrap(), None);
        assert_eq!(config_u64("A", &cfg, "retries").unwrap(), Some(3));
        assert_eq!(config_bool("A", &cfg, "flag").unwrap(), Some(true));
        assert_eq!(
            config_string_map("A", &cfg, "headers").unwrap(),
            Some(vec![("X-Key".to_string(), "abc".to_string())])
        );
    }

    #[test]
    fn test_config_helpers_reject_wrong_types() {
        let cfg = config(json!({"prefix": 1, "retries": -1, "headers": {"a": 1}}));

        assert!(matches!(
            config_str("A", &cfg, "prefix"),
            Err(HubError::AgentConfigError { .. })
        ));
        assert!(config_u64("A", &cfg, "retries").is_err());
        assert!(config_bool("A", &cfg, "prefix").is_err());
        assert!(config_string_map("A", &cfg, "headers").is_err());
    }
}
