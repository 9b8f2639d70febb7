use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::app::Config;
use crate::constants::DEFAULT_AGENT_ID;

#[derive(Parser, Debug)]
#[command(name = "crab")]
#[command(version)]
#[command(about = "Single-turn autonomous agent with human-approved shell access", long_about = None)]
pub struct Cli {
    /// User message to answer
    #[arg(short, long, env = "USER_MSG", default_value = "")]
    pub message: String,

    /// Prior conversation as base64-encoded JSON
    #[arg(long, env = "HISTORY", default_value = "", hide_env_values = true)]
    pub history: String,

    /// Require human approval before dangerous commands run
    #[arg(
        long = "hitl",
        env = "HITL_ENABLED",
        value_parser = parse_enabled,
        default_value = "false",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub hitl: bool,

    /// Identifier sent to the orchestrator with every backend call
    #[arg(long, env = "AGENT_ID", default_value = DEFAULT_AGENT_ID)]
    pub agent_id: String,

    /// Orchestrator base URL (overrides config)
    #[arg(long, env = "ORCHESTRATOR_URL")]
    pub orchestrator_url: Option<String>,

    /// Agent name used in the system prompt (overrides config)
    #[arg(long, env = "AGENT_NAME")]
    pub name: Option<String>,

    /// Agent role used in the system prompt (overrides config)
    #[arg(long, env = "AGENT_ROLE")]
    pub role: Option<String>,

    /// Personality description for the system prompt (overrides config)
    #[arg(long, env = "PERSONALITY")]
    pub personality: Option<String>,

    /// Workspace root (overrides config)
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Layer command-line and environment values over the loaded config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.orchestrator_url {
            config.orchestrator.url = url.clone();
        }
        if let Some(name) = &self.name {
            config.agent.name = name.clone();
        }
        if let Some(role) = &self.role {
            config.agent.role = role.clone();
        }
        if let Some(personality) = &self.personality {
            config.agent.personality = personality.clone();
        }
        if let Some(workspace) = &self.workspace {
            config.workspace.root = workspace.clone();
        }
    }
}

/// Oversight is on only for the exact value `true`
fn parse_enabled(value: &str) -> Result<bool, String> {
    Ok(value == "true")
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init,
    /// Approve the pending dangerous command
    Approve,
    /// Deny the pending dangerous command
    Deny,
    /// Show version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hitl_flag_forms() {
        let cli = Cli::try_parse_from(["crab", "--hitl"]).unwrap();
        assert!(cli.hitl);

        let cli = Cli::try_parse_from(["crab", "--hitl", "true"]).unwrap();
        assert!(cli.hitl);

        let cli = Cli::try_parse_from(["crab", "--hitl", "yes"]).unwrap();
        assert!(!cli.hitl);
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::try_parse_from([
            "crab",
            "--message",
            "list files",
            "--orchestrator-url",
            "http://localhost:3000",
            "--name",
            "Hermit",
            "--workspace",
            "/tmp/ws",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(cli.message, "list files");
        assert_eq!(config.orchestrator.url, "http://localhost:3000");
        assert_eq!(config.agent.name, "Hermit");
        assert_eq!(config.agent.role, "Assistant");
        assert_eq!(config.workspace.root, PathBuf::from("/tmp/ws"));
    }

    #[test]
    fn test_subcommands() {
        let cli = Cli::try_parse_from(["crab", "approve"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Approve)));
    }
}
