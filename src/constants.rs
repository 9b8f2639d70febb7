/// Constants module to avoid magic numbers in the codebase

// Network Configuration
pub const DEFAULT_ORCHESTRATOR_URL: &str = "http://172.17.0.1:3000";
pub const ORCHESTRATOR_LLM_PATH: &str = "/api/internal/llm";
pub const DEFAULT_AGENT_ID: &str = "0";

// Timeouts
pub const COMMAND_TIMEOUT_SECS: u64 = 120;
pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 600; // 10 minutes for large model requests
pub const APPROVAL_POLL_INTERVAL_MS: u64 = 1000;
pub const APPROVAL_TIMEOUT_SECS: u64 = 600;

// Loop
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

// Workspace layout
pub const DEFAULT_WORKSPACE_ROOT: &str = "/app/workspace";
pub const WORKSPACE_SUBDIRS: &[&str] = &["out", "in", "work", "www"];
pub const WORK_SUBDIR: &str = "work";

// Config
pub const LOCAL_CONFIG_PATH: &str = ".crab/config.toml";

// Approval markers
pub const DEFAULT_APPROVE_MARKER: &str = "/tmp/hermit_approval.lock";
pub const DEFAULT_DENY_MARKER: &str = "/tmp/hermit_deny.lock";

// Agent identity
pub const DEFAULT_AGENT_NAME: &str = "Agent";
pub const DEFAULT_AGENT_ROLE: &str = "Assistant";
pub const SYSTEM_PROMPT_FILE: &str = "system_prompt.txt";
pub const FALLBACK_PROMPT_TEMPLATE: &str = "You are {name}, an autonomous AI agent.\nYour Role: {role}";

// Feedback text appended to the conversation
pub const NO_OUTPUT_PLACEHOLDER: &str = "Command executed successfully with no output.";
pub const INTERNAL_OUTPUT_PREFIX: &str = "[INTERNAL_COMMAND_OUTPUT]";
pub const COMMAND_DENIED_NOTICE: &str = "ERROR: Command denied by user";
pub const COMMAND_ERROR_PREFIX: &str = "ERROR executing command:";
pub const TRANSPORT_ERROR_PREFIX: &str = "Error communicating with Orchestrator Proxy:";

// Dangerous Commands (leading tokens that require approval)
pub const DANGEROUS_COMMANDS: &[&str] = &[
    "rm",
    "sudo",
    "su",
    "shutdown",
    "reboot",
    "nmap",
    "kill",
    "docker",
    "spawn_agent",
];
