use agents_hub::utils::logger;
use agents_hub::{
    payload_from_json, AgentRegistry, CliConfig, FailurePolicy, StepStatus, WorkflowConfig,
    WorkflowOutcome, WorkflowRunner,
};
use clap::Parser;
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliConfig::parse();

    logger::init_logger(args.verbose, args.log_format);

    tracing::info!("Starting agents-hub");
    tracing::debug!("CLI config: {:?}", args);

    let initial = match payload_from_json(&args.input) {
        Ok(payload) => payload,
        Err(e) => {
            eprintln!("Invalid JSON for --input: {}", e);
            std::process::exit(1);
        }
    };

    let registry = AgentRegistry::with_builtins();

    tracing::info!("📁 Loading workflow from: {}", args.workflow);
    let workflow = match WorkflowConfig::from_file(&args.workflow)
        .and_then(|w| w.validate_against(&registry).map(|_| w))
    {
        Ok(workflow) => workflow,
        Err(e) => {
            tracing::error!("❌ Workflow validation failed: {}", e);
            eprintln!("❌ Failed to load workflow '{}': {}", args.workflow, e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let policy = args.effective_failure_policy(&workflow);

    if args.dry_run {
        print_plan(&workflow, &registry, policy);
        return Ok(());
    }

    let mut runner = WorkflowRunner::new(registry)
        .with_monitoring(args.monitor)
        .with_failure_policy(policy);
    if let Some(id) = &args.execution_id {
        runner = runner.with_execution_id(id.clone());
    }

    match runner.run(&workflow, initial).await {
        Ok(outcome) => {
            tracing::info!(
                "✅ Workflow completed ({} steps, execution {})",
                outcome.steps.len(),
                outcome.execution_id
            );

            let rendered = serde_json::to_string_pretty(&outcome.payload)?;
            match &args.output {
                Some(path) => {
                    tokio::fs::write(path, format!("{}\n", rendered)).await?;
                    tracing::info!("📁 Output saved to: {}", path);
                }
                None => println!("{}", rendered),
            }

            // 指標只是附帶產物，寫入失敗不影響結果
            if let Some(path) = &args.metrics_file {
                if let Err(e) = export_metrics(&outcome, path).await {
                    tracing::warn!("⚠️ Failed to export metrics to {}: {}", path, e);
                    eprintln!("⚠️ Could not write metrics to '{}': {}", path, e);
                }
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Workflow execution failed: {} (Severity: {:?})",
                e,
                e.severity()
            );
            eprintln!("Workflow execution failed: {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn print_plan(workflow: &WorkflowConfig, registry: &AgentRegistry, policy: FailurePolicy) {
    println!("📋 Workflow: {}", workflow.name.as_deref().unwrap_or("<unnamed>"));
    if let Some(description) = &workflow.description {
        println!("  {}", description);
    }
    println!("  On agent failure: {:?}", policy);
    println!();

    println!("📝 Execution Order:");
    for (idx, step) in workflow.agents.iter().enumerate() {
        let status = if step.is_enabled() { "✅" } else { "⏸️" };
        let keys: Vec<&str> = step.config.keys().map(String::as_str).collect();
        println!(
            "  {}. {} {} - {}",
            idx + 1,
            status,
            step.name,
            step.description.as_deref().unwrap_or("No description")
        );
        if !keys.is_empty() {
            println!("     Config: {}", keys.join(", "));
        }
    }
    println!();
    println!("🧩 Registered agents: {}", registry.names().join(", "));
    println!("✅ Dry run complete, {} step(s) would run.", workflow.enabled_steps().len());
}

async fn export_metrics(outcome: &WorkflowOutcome, path: &str) -> anyhow::Result<()> {
    let steps: Vec<Value> = outcome
        .steps
        .iter()
        .map(|step| {
            let (status, error) = match &step.status {
                StepStatus::Succeeded => ("succeeded", None),
                StepStatus::Failed(message) => ("failed", Some(message.clone())),
            };
            json!({
                "position": step.position,
                "agent": step.agent,
                "duration_ms": step.duration.as_millis() as u64,
                "status": status,
                "error": error,
            })
        })
        .collect();

    let metrics = json!({
        "execution_id": outcome.execution_id,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "summary": WorkflowRunner::execution_summary(&outcome.steps),
        "steps": steps,
    });

    tokio::fs::write(path, serde_json::to_string_pretty(&metrics)?).await?;
    tracing::info!("📊 Execution metrics exported to: {}", path);
    Ok(())
}
