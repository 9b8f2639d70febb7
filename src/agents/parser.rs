use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::types::ParsedReply;

/// Greedy span from the first `{` to the last `}`
static JSON_SPAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{[\s\S]*\}").expect("JSON span pattern is valid")
});

/// Locate the embedded JSON object in mixed text.
///
/// Nested or multiple objects collapse into one span on purpose: replies are
/// written against a prompt contract that expects exactly this behavior.
/// Returns the byte offset of the span and the span itself.
pub fn extract_json_span(text: &str) -> Option<(usize, &str)> {
    JSON_SPAN.find(text).map(|m| (m.start(), m.as_str()))
}

/// Parse a raw model reply into its structured fields. Never fails.
pub fn parse_reply(raw: &str) -> ParsedReply {
    let Some((start, span)) = extract_json_span(raw) else {
        return ParsedReply::unstructured(raw);
    };

    let fields = match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) | Err(_) => {
            tracing::debug!("Reply contained a brace span that is not a JSON object");
            return ParsedReply::unstructured(raw);
        }
    };

    let command = Some(text_field(&fields, "terminal")).filter(|cmd| !cmd.is_empty());

    let mut message = text_field(&fields, "message");
    if message.is_empty() {
        // Keep any prose the model wrote before its structured block
        message = raw[..start].trim().to_string();
    }

    let panel_actions = match fields.get("panelActions") {
        Some(Value::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    ParsedReply {
        command,
        message,
        user_id: text_field(&fields, "userId"),
        action: text_field(&fields, "action"),
        panel_actions,
        structured: !fields.is_empty(),
    }
}

/// Read a field as text; non-string scalars keep their JSON spelling
fn text_field(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
