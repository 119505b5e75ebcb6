//! JSON helpers for LLM output.
//!
//! Models sometimes wrap JSON in markdown fences or prepend prose even in JSON mode.

use crate::domain::DomainError;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Strip markdown code fences and any text around the outermost JSON object.
pub fn sanitize_json(raw_text: &str) -> String {
    let trimmed = raw_text.trim();

    // Handle markdown code blocks: ```json ... ``` or ``` ... ```
    if trimmed.starts_with("```") {
        let without_prefix = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .unwrap_or(trimmed);

        if let Some(end_idx) = without_prefix.rfind("```") {
            return without_prefix[..end_idx].trim().to_string();
        }
        return without_prefix.trim().to_string();
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return trimmed[start..=end].to_string();
        }
    }

    trimmed.to_string()
}

/// Sanitize and deserialize an LLM reply into `T`.
pub fn parse_llm_json<T: DeserializeOwned>(raw_text: &str) -> Result<T, DomainError> {
    let clean = sanitize_json(raw_text);
    serde_json::from_str(&clean).map_err(|e| {
        warn!(
            error = %e,
            json = %clean.chars().take(200).collect::<String>(),
            "LLM JSON parse failed"
        );
        DomainError::Ai(format!("Failed to parse LLM JSON: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Verdict {
        flagged: bool,
    }

    #[test]
    fn test_sanitize_json_clean() {
        let input = r#"{"summary": "test"}"#;
        assert_eq!(sanitize_json(input), input);
    }

    #[test]
    fn test_sanitize_json_markdown() {
        let input = "```json\n{\"summary\": \"test\"}\n```";
        assert_eq!(sanitize_json(input), r#"{"summary": "test"}"#);
    }

    #[test]
    fn test_sanitize_json_markdown_no_lang() {
        let input = "```\n{\"summary\": \"test\"}\n```";
        assert_eq!(sanitize_json(input), r#"{"summary": "test"}"#);
    }

    #[test]
    fn test_sanitize_json_with_text() {
        let input = "Here is the verdict:\n{\"flagged\": true} hope this helps";
        assert_eq!(sanitize_json(input), r#"{"flagged": true}"#);
    }

    #[test]
    fn test_parse_llm_json() {
        let v: Verdict = parse_llm_json("```json\n{\"flagged\": false}\n```").unwrap();
        assert!(!v.flagged);

        let err = parse_llm_json::<Verdict>("not json at all").unwrap_err();
        assert_eq!(err.code(), "AI_ERROR");
    }
}
