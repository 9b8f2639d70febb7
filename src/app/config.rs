use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    APPROVAL_POLL_INTERVAL_MS, APPROVAL_TIMEOUT_SECS, COMMAND_TIMEOUT_SECS, DEFAULT_AGENT_NAME,
    DEFAULT_AGENT_ROLE, DEFAULT_APPROVE_MARKER, DEFAULT_DENY_MARKER, DEFAULT_MAX_ITERATIONS,
    DEFAULT_ORCHESTRATOR_URL, DEFAULT_WORKSPACE_ROOT, HTTP_REQUEST_TIMEOUT_SECS, LOCAL_CONFIG_PATH,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend proxy configuration
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Agent identity and loop limits
    #[serde(default)]
    pub agent: AgentSettings,

    /// Workspace layout
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Human approval gate
    #[serde(default)]
    pub approval: ApprovalConfig,

    /// Command execution
    #[serde(default)]
    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Base URL of the orchestrator; the LLM proxy lives under it
    pub url: String,
    pub request_timeout_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ORCHESTRATOR_URL.to_string(),
            request_timeout_secs: HTTP_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub name: String,
    pub role: String,
    pub personality: String,
    /// Backend calls allowed per invocation
    pub max_iterations: usize,
    /// System prompt template; defaults to system_prompt.txt next to the binary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_file: Option<PathBuf>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_AGENT_NAME.to_string(),
            role: DEFAULT_AGENT_ROLE.to_string(),
            personality: String::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            prompt_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub root: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_WORKSPACE_ROOT),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalConfig {
    pub approve_marker: PathBuf,
    pub deny_marker: PathBuf,
    pub poll_interval_ms: u64,
    pub timeout_secs: u64,
}

impl ApprovalConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn ceiling(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            approve_marker: PathBuf::from(DEFAULT_APPROVE_MARKER),
            deny_marker: PathBuf::from(DEFAULT_DENY_MARKER),
            poll_interval_ms: APPROVAL_POLL_INTERVAL_MS,
            timeout_secs: APPROVAL_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub timeout_secs: u64,
}

impl ExecutorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: COMMAND_TIMEOUT_SECS,
        }
    }
}

/// Load configuration from multiple sources
pub fn load_config() -> Result<Config> {
    let global_config = get_config_dir()?.join("config.toml");
    load_layered(&global_config, Path::new(LOCAL_CONFIG_PATH))
}

/// Defaults, then each config file that exists, then `CRAB_` env vars.
/// A file that exists but does not parse is an error.
fn load_layered(global_config: &Path, local_config: &Path) -> Result<Config> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));

    if global_config.exists() {
        figment = figment.merge(Toml::file(global_config));
    }

    if local_config.exists() {
        figment = figment.merge(Toml::file(local_config));
    }

    // CRAB_APPROVAL__TIMEOUT_SECS=30 sets approval.timeout_secs
    figment = figment.merge(Env::prefixed("CRAB_").split("__"));

    figment
        .extract()
        .context("Failed to load configuration")
}

/// Load configuration from a single TOML file on top of the defaults
pub fn load_config_file(path: &Path) -> Result<Config> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;

    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::string(&toml_str))
        .extract()
        .with_context(|| format!("Invalid config {}", path.display()))
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "crab") {
        Ok(proj_dirs.config_dir().to_path_buf())
    } else {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        Ok(PathBuf::from(home).join(".config").join("crab"))
    }
}

/// Save configuration to file
pub fn save_config(config: &Config, path: Option<PathBuf>) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()?.join("config.toml"),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(path)
}

/// Create a default configuration file if it doesn't exist.
/// Returns the path and whether a new file was written.
pub fn init_config(path: Option<PathBuf>) -> Result<(PathBuf, bool)> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()?.join("config.toml"),
    };

    if path.exists() {
        return Ok((path, false));
    }

    let path = save_config(&Config::default(), Some(path))?;
    Ok((path, true))
}
