use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, timeout};

use crate::utils::log_status;

/// Outcome of waiting on a human decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approved,
    Denied,
    /// No decision arrived before the ceiling. Treated as a denial.
    TimedOut,
}

impl ApprovalDecision {
    pub fn is_approved(self) -> bool {
        self == ApprovalDecision::Approved
    }
}

/// Source of approve/deny decisions
#[async_trait]
pub trait ApprovalSignal: Send + Sync {
    /// Take a pending decision if one is available. Taking consumes it.
    async fn try_take(&self) -> Result<Option<ApprovalDecision>>;
}

/// Approval signalled by the presence of marker files
#[derive(Debug, Clone)]
pub struct FileMarkers {
    approve: PathBuf,
    deny: PathBuf,
}

impl FileMarkers {
    pub fn new(approve: impl Into<PathBuf>, deny: impl Into<PathBuf>) -> Self {
        Self {
            approve: approve.into(),
            deny: deny.into(),
        }
    }

    pub fn approve_path(&self) -> &Path {
        &self.approve
    }

    pub fn deny_path(&self) -> &Path {
        &self.deny
    }

    /// Place a marker, acting as the human side of the gate
    pub fn signal(&self, decision: ApprovalDecision) -> Result<PathBuf> {
        let path = match decision {
            ApprovalDecision::Approved => &self.approve,
            ApprovalDecision::Denied | ApprovalDecision::TimedOut => &self.deny,
        };
        std::fs::write(path, b"")
            .with_context(|| format!("Failed to create marker {}", path.display()))?;
        Ok(path.clone())
    }
}

/// Remove a marker; a successful removal is the observation.
/// Two agents racing on one marker cannot both win the unlink.
fn consume_marker(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to consume marker {}", path.display())),
    }
}

#[async_trait]
impl ApprovalSignal for FileMarkers {
    async fn try_take(&self) -> Result<Option<ApprovalDecision>> {
        // Blocking unlinks on purpose: no await point between observe and consume
        if consume_marker(&self.approve)? {
            return Ok(Some(ApprovalDecision::Approved));
        }
        if consume_marker(&self.deny)? {
            return Ok(Some(ApprovalDecision::Denied));
        }
        Ok(None)
    }
}

/// In-process approval channel for embedding callers
pub struct ChannelSignal {
    rx: Mutex<mpsc::Receiver<ApprovalDecision>>,
}

impl ChannelSignal {
    pub fn pair() -> (mpsc::Sender<ApprovalDecision>, Self) {
        let (tx, rx) = mpsc::channel(1);
        (tx, Self { rx: Mutex::new(rx) })
    }
}

#[async_trait]
impl ApprovalSignal for ChannelSignal {
    async fn try_take(&self) -> Result<Option<ApprovalDecision>> {
        let mut rx = self.rx.lock().await;
        Ok(rx.try_recv().ok())
    }
}

/// Blocks the agent until a human approves or denies a dangerous command
pub struct ApprovalGate {
    signal: Box<dyn ApprovalSignal>,
    poll_interval: Duration,
    ceiling: Duration,
}

impl ApprovalGate {
    pub fn new(signal: Box<dyn ApprovalSignal>, poll_interval: Duration, ceiling: Duration) -> Self {
        Self {
            signal,
            poll_interval,
            ceiling,
        }
    }

    /// Wait for a decision. Fails closed: silence until the ceiling is a denial.
    pub async fn wait(&self) -> ApprovalDecision {
        log_status("[HITL] Waiting for approval...");

        let decision = match timeout(self.ceiling, self.poll_until_decided()).await {
            Ok(decision) => decision,
            Err(_) => ApprovalDecision::TimedOut,
        };

        match decision {
            ApprovalDecision::Approved => log_status("[HITL] Approved!"),
            ApprovalDecision::Denied => log_status("[HITL] Denied!"),
            ApprovalDecision::TimedOut => {
                tracing::warn!(
                    "No approval decision after {}s, denying",
                    self.ceiling.as_secs()
                );
                log_status("[HITL] Approval timed out");
            }
        }

        decision
    }

    async fn poll_until_decided(&self) -> ApprovalDecision {
        let mut ticker = interval(self.poll_interval);
        loop {
            ticker.tick().await;
            match self.signal.try_take().await {
                Ok(Some(decision)) => return decision,
                Ok(None) => {}
                Err(e) => tracing::warn!("Approval signal unreadable: {:#}", e),
            }
        }
    }
}
