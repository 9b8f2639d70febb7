use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::app::AgentSettings;
use crate::constants::{FALLBACK_PROMPT_TEMPLATE, SYSTEM_PROMPT_FILE};

/// Build the system prompt for this agent from its template
pub fn build_system_prompt(settings: &AgentSettings) -> Result<String> {
    let template = load_template(settings.prompt_file.as_deref())?;

    let personality_block = if settings.personality.is_empty() {
        String::new()
    } else {
        format!("\nYour Personality: {}\n", settings.personality)
    };
    let current_time = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    let values = HashMap::from([
        ("name", settings.name.as_str()),
        ("role", settings.role.as_str()),
        ("personality_block", personality_block.as_str()),
        ("current_time", current_time.as_str()),
    ]);

    Ok(render_template(&template, &values))
}

/// Read the template, falling back to the built-in one when no file exists.
/// An explicitly configured file that is unreadable is an error.
fn load_template(configured: Option<&Path>) -> Result<String> {
    if let Some(path) = configured {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt template {}", path.display()));
    }

    match default_template_path() {
        Some(path) if path.exists() => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read prompt template {}", path.display())),
        _ => {
            tracing::debug!("No prompt template found, using built-in template");
            Ok(FALLBACK_PROMPT_TEMPLATE.to_string())
        }
    }
}

fn default_template_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(SYSTEM_PROMPT_FILE))
}

/// Substitute `{key}` placeholders. `{{` and `}}` are literal braces and
/// unknown keys are left as written, so JSON examples in templates survive.
pub fn render_template(template: &str, values: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }

        if tail.starts_with('{') {
            if let Some(end) = tail.find('}') {
                let key = &tail[1..end];
                if let Some(value) = values.get(key) {
                    out.push_str(value);
                    rest = &tail[end + 1..];
                    continue;
                }
            }
        }

        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings() -> AgentSettings {
        AgentSettings {
            name: "Hermit".to_string(),
            role: "Researcher".to_string(),
            ..AgentSettings::default()
        }
    }

    #[test]
    fn test_placeholders_and_escapes() {
        let values = HashMap::from([("name", "Hermit")]);
        assert_eq!(
            render_template("Hi {name}! Reply as {{\"terminal\": \"\"}} {unknown}", &values),
            "Hi Hermit! Reply as {\"terminal\": \"\"} {unknown}"
        );
    }

    #[test]
    fn test_fallback_template() {
        let values = HashMap::from([("name", "Hermit"), ("role", "Researcher")]);
        assert_eq!(
            render_template(FALLBACK_PROMPT_TEMPLATE, &values),
            "You are Hermit, an autonomous AI agent.\nYour Role: Researcher"
        );
    }

    #[test]
    fn test_template_file_with_personality_and_time() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "{name}/{role}{personality_block}at {current_time}").unwrap();

        let mut settings = settings();
        settings.prompt_file = Some(path);
        settings.personality = "curious".to_string();

        let prompt = build_system_prompt(&settings).unwrap();
        assert!(prompt.starts_with("Hermit/Researcher\nYour Personality: curious\nat "));
        assert!(prompt.ends_with('Z'));
        assert!(!prompt.contains("{current_time}"));
    }

    #[test]
    fn test_empty_personality_block() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "[{personality_block}]").unwrap();

        let mut settings = settings();
        settings.prompt_file = Some(path);

        assert_eq!(build_system_prompt(&settings).unwrap(), "[]");
    }

    #[test]
    fn test_missing_configured_file_is_error() {
        let mut settings = settings();
        settings.prompt_file = Some(PathBuf::from("/no/such/prompt.txt"));
        assert!(build_system_prompt(&settings).is_err());
    }
}
