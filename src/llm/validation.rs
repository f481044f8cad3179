/// Validation for judge output.
///
/// Even in JSON mode some models wrap the document in a Markdown code fence
/// or add a sentence before it. Before parsing we:
///
/// 1. **Reject empty output.**
/// 2. **Unwrap a fenced block** (```` ```json ... ``` ````) if present.
/// 3. **Slice from the first `{` to the last `}`** to drop surrounding prose.
use std::sync::LazyLock;

use anyhow::{Result, anyhow};
use regex::Regex;

/// Matches a fenced code block, optionally tagged `json`.
static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").expect("fence regex must compile")
});

/// Extract the JSON object text from raw judge output.
pub fn extract_json_object(raw: &str) -> Result<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("judge returned empty output"));
    }

    let body = FENCE_RE
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    let start = body
        .find('{')
        .ok_or_else(|| anyhow!("judge output contains no JSON object"))?;
    let end = body
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| anyhow!("judge output contains an unterminated JSON object"))?;

    Ok(&body[start..=end])
}

/// Shorten raw model output for error messages.
pub fn excerpt(raw: &str, max_chars: usize) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    format!("{cut}...")
}
