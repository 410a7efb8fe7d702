//! Parsing JSON out of model completions that may be wrapped in markdown

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::warn;

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^```(?:json)?\s*\n?(.*?)\n?```$").expect("fence regex is valid")
    })
}

/// Remove an enclosing markdown code fence, if any.
pub fn strip_code_fences(content: &str) -> String {
    let trimmed = content.trim();
    match fence_regex().captures(trimmed) {
        Some(capture) => capture[1].trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// Parse a model completion as JSON, tolerating code-fence wrapping.
/// Returns `None` (warn-logged) on any parse failure.
pub fn parse_model_json(content: &str) -> Option<Value> {
    if content.trim().is_empty() {
        return None;
    }

    let cleaned = strip_code_fences(content);
    match serde_json::from_str(&cleaned) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Failed to parse JSON from model output: {}", err);
            None
        }
    }
}
