use crate::agents::{EchoAgent, FieldMapAgent, HttpAgent};
use crate::domain::model::AgentConfig;
use crate::domain::ports::Agent;
use crate::utils::error::{HubError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// 由設定建立 agent 的工廠函式
pub type AgentFactory = Arc<dyn Fn(&AgentConfig) -> Result<Box<dyn Agent>> + Send + Sync>;

/// 名稱 -> agent 工廠
#[derive(Clone, Default)]
pub struct AgentRegistry {
    factories: HashMap<String, AgentFactory>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 註冊所有內建 agent
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(EchoAgent::NAME, |config| {
            Ok(Box::new(EchoAgent::from_config(config)?) as Box<dyn Agent>)
        });
        registry.register(FieldMapAgent::NAME, |config| {
            Ok(Box::new(FieldMapAgent::from_config(config)?) as Box<dyn Agent>)
        });
        registry.register(HttpAgent::NAME, |config| {
            Ok(Box::new(HttpAgent::from_config(config)?) as Box<dyn Agent>)
        });
        registry
    }

    /// 註冊 agent；同名時取代舊的並回傳 `true`
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> bool
    where
        F: Fn(&AgentConfig) -> Result<Box<dyn Agent>> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!("Registering agent: {}", name);
        self.factories.insert(name, Arc::new(factory)).is_some()
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.factories.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&AgentFactory> {
        self.factories.get(name).ok_or_else(|| HubError::AgentNotFound {
            name: name.to_string(),
        })
    }

    pub fn create(&self, name: &str, config: &AgentConfig) -> Result<Box<dyn Agent>> {
        let factory = self.get(name)?;
        factory(config)
    }

    /// 已註冊的名稱（排序後）
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.names())
            .finish()
    }
}
