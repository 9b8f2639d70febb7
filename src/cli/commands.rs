use anyhow::Result;
use std::path::PathBuf;

use crate::{
    agents::{ApprovalDecision, FileMarkers},
    app::{init_config, Config},
};

use super::Commands;

/// Handle CLI subcommands
pub fn handle_command(command: &Commands, config: &Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Init => {
            let (path, created) = init_config(config_path)?;
            if created {
                println!("Created default configuration at: {}", path.display());
            } else {
                println!("Configuration already exists at: {}", path.display());
            }
        }
        Commands::Approve => {
            let path = signal(config, ApprovalDecision::Approved)?;
            println!("Approval signalled: {}", path.display());
        }
        Commands::Deny => {
            let path = signal(config, ApprovalDecision::Denied)?;
            println!("Denial signalled: {}", path.display());
        }
        Commands::Version => show_version(),
    }
    Ok(())
}

fn signal(config: &Config, decision: ApprovalDecision) -> Result<PathBuf> {
    FileMarkers::new(&config.approval.approve_marker, &config.approval.deny_marker).signal(decision)
}

/// Show version information
pub fn show_version() {
    println!("crab v{}", env!("CARGO_PKG_VERSION"));
    println!("   Single-turn autonomous agent loop");
}
