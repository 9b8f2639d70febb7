use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{COMMAND_ERROR_PREFIX, INTERNAL_OUTPUT_PREFIX};

/// Structured view of a single model reply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedReply {
    /// Shell command requested through the `terminal` field
    pub command: Option<String>,
    /// User-facing message, or the fallback prose when no `message` field was given
    pub message: String,
    pub user_id: String,
    pub action: String,
    /// Opaque instructions for the UI side panel, passed through untouched
    pub panel_actions: Vec<Value>,
    /// Whether the reply carried a non-empty JSON object at all
    pub structured: bool,
}

impl ParsedReply {
    /// Reply with no usable JSON: only the raw text survives as the message
    pub fn unstructured(raw: &str) -> Self {
        Self {
            message: raw.trim().to_string(),
            ..Self::default()
        }
    }

    /// Build the externally visible record for a terminal reply
    pub fn to_final_output(&self) -> FinalOutput {
        FinalOutput {
            user_id: self.user_id.clone(),
            message: self.message.clone(),
            action: self.action.clone(),
            terminal: String::new(),
            panel_actions: self.panel_actions.clone(),
        }
    }
}

/// Final JSON artifact written to stdout. Field order is part of the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalOutput {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub message: String,
    pub action: String,
    pub terminal: String,
    #[serde(rename = "panelActions")]
    pub panel_actions: Vec<Value>,
}

/// Result of running a command on the model's behalf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionResult {
    Success {
        output: String,
    },
    Error {
        error: String,
    },
}

impl ActionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success { .. })
    }

    /// Text appended to the conversation as a user-role message
    pub fn feedback(&self) -> String {
        match self {
            ActionResult::Success { output } => format!("{}\n{}", INTERNAL_OUTPUT_PREFIX, output),
            ActionResult::Error { error } => format!("{} {}", COMMAND_ERROR_PREFIX, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_final_output_field_order() {
        let reply = ParsedReply {
            command: None,
            message: "Here are your files".to_string(),
            user_id: "u1".to_string(),
            action: String::new(),
            panel_actions: vec![],
            structured: true,
        };

        let json = serde_json::to_string(&reply.to_final_output()).unwrap();
        assert_eq!(
            json,
            r#"{"userId":"u1","message":"Here are your files","action":"","terminal":"","panelActions":[]}"#
        );
    }

    #[test]
    fn test_feedback_prefixes() {
        let ok = ActionResult::Success {
            output: "a.txt\n".to_string(),
        };
        assert_eq!(ok.feedback(), "[INTERNAL_COMMAND_OUTPUT]\na.txt\n");

        let failed = ActionResult::Error {
            error: "Command timed out after 120 seconds".to_string(),
        };
        assert_eq!(
            failed.feedback(),
            "ERROR executing command: Command timed out after 120 seconds"
        );
    }
}
