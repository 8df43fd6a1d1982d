//! First validation phase: generator response text to loosely-typed JSON.
//!
//! The only tolerance applied is removal of a single Markdown code fence
//! around the payload. Anything that is still not JSON is rejected.

use std::sync::OnceLock;

use regex_lite::Regex;
use serde_json::Value;

/// Number of characters of the offending response kept for diagnostics.
const EXCERPT_CHARS: usize = 120;

/// The generator response is not structurally parseable.
#[derive(Debug, thiserror::Error)]
#[error("Proposal is not valid JSON ({source}); response starts with {excerpt:?}")]
pub struct ProposalParseError {
    /// Leading characters of the response.
    pub excerpt: String,
    /// Underlying JSON error.
    #[source]
    pub source: serde_json::Error,
}

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"^```[A-Za-z0-9_-]*[ \t]*\r?\n([\s\S]*?)\r?\n?```$")
            .unwrap_or_else(|e| unreachable!("fence pattern is a constant: {e}"))
    })
}

/// Remove one enclosing Markdown code fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    fence_pattern()
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or(trimmed)
}

/// Parse a generator response into a JSON value.
pub fn parse_proposal_text(text: &str) -> Result<Value, ProposalParseError> {
    let payload = strip_code_fence(text);
    serde_json::from_str(payload).map_err(|source| ProposalParseError {
        excerpt: payload.chars().take(EXCERPT_CHARS).collect(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let value = parse_proposal_text(r#"{"segments": []}"#).unwrap();
        assert!(value["segments"].is_array());
    }

    #[test]
    fn test_fenced_json() {
        let text = "```json\n{\"segments\": [1]}\n```";
        let value = parse_proposal_text(text).unwrap();
        assert_eq!(value["segments"][0], 1);
    }

    #[test]
    fn test_bare_fence_with_surrounding_whitespace() {
        let text = "\n  ```\n{\"a\": true}\n```  \n";
        assert_eq!(strip_code_fence(text), "{\"a\": true}");
    }

    #[test]
    fn test_prose_is_rejected() {
        let err = parse_proposal_text("Sure! Here is your segmentation:").unwrap_err();
        assert!(err.excerpt.starts_with("Sure!"));
    }

    #[test]
    fn test_truncated_json_is_rejected() {
        assert!(parse_proposal_text(r#"{"segments": [{"title": "A""#).is_err());
    }
}
