use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use crab::{
    agents::{ApprovalGate, FileMarkers, ShellExecutor},
    app::{load_config, load_config_file, Config},
    cli::{handle_command, Cli},
    context::{build_system_prompt, Workspace},
    models::ModelFactory,
    runtime::AgentLoop,
    session::{decode_history, initial_messages},
    utils::init_logger,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_logger(cli.verbose);

    let mut config = if let Some(config_path) = &cli.config {
        load_config_file(config_path)?
    } else {
        load_config()?
    };
    cli.apply_overrides(&mut config);

    if let Some(command) = &cli.command {
        return handle_command(command, &config, cli.config.clone());
    }

    run_agent(cli, config).await
}

/// Answer one user message and print the final reply
async fn run_agent(cli: Cli, config: Config) -> Result<()> {
    let workspace = Workspace::provision(&config.workspace.root)?;
    let system_prompt = build_system_prompt(&config.agent)?;

    let history = decode_history(&cli.history).unwrap_or_else(|e| {
        tracing::warn!("Ignoring unreadable history: {}", e);
        Vec::new()
    });
    let messages = initial_messages(&system_prompt, history, &cli.message);

    let model = ModelFactory::create(&config, &cli.agent_id)?;
    let runner = Arc::new(ShellExecutor::new(
        Some(workspace.work_dir()),
        config.executor.timeout(),
    ));

    let mut agent = AgentLoop::new(model, runner).with_max_iterations(config.agent.max_iterations);
    if cli.hitl {
        let markers = FileMarkers::new(
            &config.approval.approve_marker,
            &config.approval.deny_marker,
        );
        agent = agent.with_approval_gate(ApprovalGate::new(
            Box::new(markers),
            config.approval.poll_interval(),
            config.approval.ceiling(),
        ));
    }

    let report = agent.run(messages).await;
    tracing::info!(
        "Run finished after {} iteration(s), {} command(s), {}ms",
        report.iterations,
        report.commands.len(),
        report.duration_ms
    );

    match report.outcome.render() {
        Some(output) => println!("{}", output),
        None => tracing::warn!("No final reply after {} iterations", report.iterations),
    }

    Ok(())
}
