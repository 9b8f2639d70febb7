use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::models::ChatMessage;
use crate::utils::CrabError;

/// Decode prior conversation turns handed over by the caller.
///
/// The payload is base64 of a JSON array of `{role, content}` objects.
/// Blank input means no history.
pub fn decode_history(encoded: &str) -> Result<Vec<ChatMessage>, CrabError> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Ok(Vec::new());
    }

    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| CrabError::HistoryError(format!("invalid base64: {}", e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| CrabError::HistoryError(format!("invalid UTF-8: {}", e)))?;

    Ok(serde_json::from_str(&text)?)
}

/// Conversation that opens a run: system prompt, prior turns, new user message
pub fn initial_messages(
    system_prompt: &str,
    history: Vec<ChatMessage>,
    user_message: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend(history);
    messages.push(ChatMessage::user(user_message));
    messages
}
