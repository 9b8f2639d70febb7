use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::constants::{WORKSPACE_SUBDIRS, WORK_SUBDIR};

/// Directory tree the agent works in.
///
/// Commands run inside `work/` so that `out/` only receives files the agent
/// writes there on purpose.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create `out/`, `in/`, `work/` and `www/` under `root` if missing
    pub fn provision(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for sub in WORKSPACE_SUBDIRS {
            let dir = root.join(sub);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create workspace directory {}", dir.display()))?;
        }
        tracing::debug!("Workspace ready at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn work_dir(&self) -> PathBuf {
        self.root.join(WORK_SUBDIR)
    }
}
