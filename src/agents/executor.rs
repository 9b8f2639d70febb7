use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;

use super::types::ActionResult;
use crate::constants::{COMMAND_TIMEOUT_SECS, NO_OUTPUT_PLACEHOLDER};

/// Capability to run an arbitrary command string and capture its output.
///
/// Implementations report every failure inside [`ActionResult::Error`] so the
/// conversation always receives text.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str) -> ActionResult;
}

/// Runs commands through the host shell
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    working_dir: Option<PathBuf>,
    timeout: Duration,
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self {
            working_dir: None,
            timeout: Duration::from_secs(COMMAND_TIMEOUT_SECS),
        }
    }
}

impl ShellExecutor {
    pub fn new(working_dir: Option<PathBuf>, timeout: Duration) -> Self {
        Self {
            working_dir,
            timeout,
        }
    }

    fn build(&self, command: &str) -> Command {
        let (shell, shell_arg) = if cfg!(target_os = "windows") {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };

        let mut cmd = Command::new(shell);
        cmd.arg(shell_arg)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        cmd
    }
}

#[async_trait]
impl CommandRunner for ShellExecutor {
    async fn run(&self, command: &str) -> ActionResult {
        tracing::info!("Executing command: {}", command);

        match timeout(self.timeout, run_command(self.build(command))).await {
            Ok(Ok(output)) if output.is_empty() => ActionResult::Success {
                output: NO_OUTPUT_PLACEHOLDER.to_string(),
            },
            Ok(Ok(output)) => ActionResult::Success { output },
            Ok(Err(e)) => ActionResult::Error {
                error: format!("{:#}", e),
            },
            Err(_) => ActionResult::Error {
                error: format!("Command timed out after {}", describe_timeout(self.timeout)),
            },
        }
    }
}

fn describe_timeout(limit: Duration) -> String {
    if limit < Duration::from_secs(1) {
        format!("{}ms", limit.as_millis())
    } else if limit.subsec_millis() == 0 {
        format!("{} seconds", limit.as_secs())
    } else {
        format!("{:.1} seconds", limit.as_secs_f64())
    }
}

/// Run the command, merging raw stdout and stderr chunks in arrival order
async fn run_command(mut cmd: Command) -> Result<String> {
    let mut child = cmd.spawn()
        .context("Failed to execute command. Is the shell available?")?;

    let mut stdout = child.stdout.take()
        .context("Command process stdout stream not available")?;
    let mut stderr = child.stderr.take()
        .context("Command process stderr stream not available")?;

    let mut stdout_buf = [0u8; 4096];
    let mut stderr_buf = [0u8; 4096];
    let mut stdout_open = true;
    let mut stderr_open = true;

    let mut output = Vec::new();

    while stdout_open || stderr_open {
        tokio::select! {
            read = stdout.read(&mut stdout_buf), if stdout_open => {
                let n = read.context("Error reading command output")?;
                stdout_open = n > 0;
                output.extend_from_slice(&stdout_buf[..n]);
            }
            read = stderr.read(&mut stderr_buf), if stderr_open => {
                let n = read.context("Error reading command error output")?;
                stderr_open = n > 0;
                output.extend_from_slice(&stderr_buf[..n]);
            }
        }
    }

    let status = child.wait().await
        .context("Failed to wait for command to complete")?;
    tracing::debug!("Command exited with {}", status);

    Ok(String::from_utf8_lossy(&output).into_owned())
}
