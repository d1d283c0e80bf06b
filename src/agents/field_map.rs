use super::{config_bool, config_string_map};
use crate::domain::model::{AgentConfig, Payload};
use crate::domain::ports::Agent;
use crate::utils::error::{HubError, Result};
use async_trait::async_trait;

/// 依 `mapping` 重新命名 payload 欄位
#[derive(Debug, Clone)]
pub struct FieldMapAgent {
    mapping: Vec<(String, String)>,
    drop_unmapped: bool,
}

impl FieldMapAgent {
    pub const NAME: &'static str = "FieldMapAgent";

    pub fn new(mapping: Vec<(String, String)>, drop_unmapped: bool) -> Self {
        Self {
            mapping,
            drop_unmapped,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let mapping = config_string_map(Self::NAME, config, "mapping")?
            .ok_or_else(|| HubError::agent_config(Self::NAME, "`mapping` is required"))?;
        let drop_unmapped = config_bool(Self::NAME, config, "drop_unmapped")?.unwrap_or(false);
        Ok(Self::new(mapping, drop_unmapped))
    }
}

#[async_trait]
impl Agent for FieldMapAgent {
    async fn process(&self, mut payload: Payload) -> Result<Payload> {
        // 先全部取出再寫回，避免 a->b、b->a 互相覆蓋
        let moved: Vec<(String, serde_json::Value)> = self
            .mapping
            .iter()
            .filter_map(|(from, to)| payload.remove(from).map(|v| (to.clone(), v)))
            .collect();

        if self.drop_unmapped {
            payload.clear();
        }

        for (to, value) in moved {
            payload.insert(to, value);
        }

        Ok(payload)
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}
