use crate::config::workflow_config::{FailurePolicy, WorkflowConfig};
use crate::core::registry::AgentRegistry;
use crate::domain::model::Payload;
use crate::domain::ports::Agent;
use crate::utils::error::{HubError, Result};
use crate::utils::monitor::RunMonitor;
use serde_json::Value;
use std::path::Path;
use std::time::{Duration, Instant};

/// 單一步驟的執行狀態
#[derive(Debug, Clone, PartialEq)]
pub enum StepStatus {
    Succeeded,
    Failed(String),
}

/// 單一步驟的執行結果
#[derive(Debug, Clone)]
pub struct StepResult {
    /// 在工作流程檔案中的位置（1 起算）
    pub position: usize,
    pub agent: String,
    pub duration: Duration,
    pub status: StepStatus,
}

impl StepResult {
    pub fn succeeded(&self) -> bool {
        self.status == StepStatus::Succeeded
    }
}

/// 整個工作流程的執行結果
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub execution_id: String,
    pub payload: Payload,
    pub steps: Vec<StepResult>,
}

/// 依序執行工作流程中的 agent
pub struct WorkflowRunner {
    registry: AgentRegistry,
    execution_id: String,
    failure_policy: Option<FailurePolicy>,
    monitor: Option<RunMonitor>,
}

impl WorkflowRunner {
    pub fn new(registry: AgentRegistry) -> Self {
        Self {
            registry,
            execution_id: default_execution_id(),
            failure_policy: None,
            monitor: None,
        }
    }

    pub fn with_execution_id(mut self, execution_id: impl Into<String>) -> Self {
        self.execution_id = execution_id.into();
        self
    }

    /// 啟用或停用資源監控
    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = enabled.then(RunMonitor::new);
        self
    }

    /// 覆寫工作流程檔案中的失敗處理設定
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// 先建立所有啟用的 agent，設定錯誤會在任何 agent 執行前出現
    pub fn instantiate(&self, workflow: &WorkflowConfig) -> Result<Vec<(usize, Box<dyn Agent>)>> {
        workflow
            .enabled_steps()
            .into_iter()
            .map(|(position, step)| {
                let agent = self
                    .registry
                    .create(&step.name, &step.config)
                    .map_err(|e| HubError::StepFailed {
                        position,
                        agent: step.name.clone(),
                        source: Box::new(e),
                    })?;
                Ok((position, agent))
            })
            .collect()
    }

    pub async fn run(&self, workflow: &WorkflowConfig, initial: Payload) -> Result<WorkflowOutcome> {
        let agents = self.instantiate(workflow)?;
        let policy = self.failure_policy.unwrap_or_else(|| workflow.failure_policy());

        tracing::info!(
            "🚀 Running workflow {} ({} agents, execution {})",
            workflow.name.as_deref().unwrap_or("<unnamed>"),
            agents.len(),
            self.execution_id
        );
        if let Some(monitor) = &self.monitor {
            monitor.log_snapshot("Workflow started");
        }

        let mut payload = initial;
        let mut steps = Vec::with_capacity(agents.len());

        for (position, agent) in &agents {
            let started = Instant::now();
            // agent 失敗時 continue 模式需要原本的 payload
            let input = match policy {
                FailurePolicy::Stop => std::mem::take(&mut payload),
                FailurePolicy::Continue => payload.clone(),
            };

            match agent.process(input).await {
                Ok(output) => {
                    let duration = started.elapsed();
                    tracing::info!(
                        "✅ Step {} ({}) completed in {:?}",
                        position,
                        agent.name(),
                        duration
                    );
                    payload = output;
                    steps.push(StepResult {
                        position: *position,
                        agent: agent.name().to_string(),
                        duration,
                        status: StepStatus::Succeeded,
                    });
                }
                Err(e) => {
                    tracing::error!("❌ Step {} ({}) failed: {}", position, agent.name(), e);
                    if policy == FailurePolicy::Stop {
                        return Err(HubError::StepFailed {
                            position: *position,
                            agent: agent.name().to_string(),
                            source: Box::new(e),
                        });
                    }
                    tracing::warn!("⚠️ Continuing with the payload from before step {}", position);
                    steps.push(StepResult {
                        position: *position,
                        agent: agent.name().to_string(),
                        duration: started.elapsed(),
                        status: StepStatus::Failed(e.to_string()),
                    });
                }
            }
        }

        if let Some(monitor) = &self.monitor {
            monitor.log_snapshot("Workflow completed");
        }

        Ok(WorkflowOutcome {
            execution_id: self.execution_id.clone(),
            payload,
            steps,
        })
    }

    /// 載入、驗證並執行工作流程檔案
    pub async fn run_file<P: AsRef<Path>>(&self, path: P, initial: Payload) -> Result<WorkflowOutcome> {
        let workflow = WorkflowConfig::from_file(path)?;
        workflow.validate_against(&self.registry)?;
        self.run(&workflow, initial).await
    }

    /// 執行摘要
    pub fn execution_summary(steps: &[StepResult]) -> serde_json::Map<String, Value> {
        let mut summary = serde_json::Map::new();

        let succeeded = steps.iter().filter(|s| s.succeeded()).count();
        let total_duration: Duration = steps.iter().map(|s| s.duration).sum();

        summary.insert("total_steps".to_string(), steps.len().into());
        summary.insert("succeeded_steps".to_string(), succeeded.into());
        summary.insert("failed_steps".to_string(), (steps.len() - succeeded).into());
        summary.insert(
            "total_duration_ms".to_string(),
            (total_duration.as_millis() as u64).into(),
        );
        summary.insert(
            "executed_agents".to_string(),
            Value::Array(steps.iter().map(|s| Value::String(s.agent.clone())).collect()),
        );

        summary
    }
}

/// 執行一個工作流程檔案，使用內建 agent
pub async fn run_workflow<P: AsRef<Path>>(path: P, initial: Payload) -> Result<Payload> {
    let runner = WorkflowRunner::new(AgentRegistry::with_builtins());
    Ok(runner.run_file(path, initial).await?.payload)
}

fn default_execution_id() -> String {
    format!("run_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
}
