//! Completion parsing: strip an optional Markdown code fence and parse the
//! remainder as strict JSON.
//!
//! Models regularly wrap JSON answers in ```json fences even when told not
//! to. Only a fence that wraps the whole (trimmed) payload is stripped; a
//! fence in the middle of the text is part of the content and will fail the
//! JSON parse like any other garbage.

use crate::error::{ExtractError, ExtractResult};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_JSON_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```(?:json)?\s*\n?(.*?)\n?```\s*$").expect("fence regex is valid")
});

/// Parse a raw completion into a JSON value.
///
/// Empty or whitespace-only input is [`ExtractError::EmptyCompletion`]; input
/// that survives fence stripping but is not valid JSON is
/// [`ExtractError::Parse`] carrying the original raw text for the audit
/// trail.
pub fn parse_completion(raw: &str) -> ExtractResult<serde_json::Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::EmptyCompletion);
    }

    let payload = match RE_JSON_FENCE.captures(trimmed) {
        Some(captures) => captures.get(1).map_or("", |m| m.as_str()).trim(),
        None => trimmed,
    };
    if payload.is_empty() {
        return Err(ExtractError::EmptyCompletion);
    }

    serde_json::from_str(payload).map_err(|e| ExtractError::Parse {
        reason: e.to_string(),
        raw: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_json_parses() {
        assert_eq!(
            parse_completion(r#"{"data": []}"#).unwrap(),
            json!({"data": []})
        );
    }

    #[test]
    fn json_fence_is_stripped() {
        let raw = "```json\n{\"data\": [1, 2]}\n```";
        assert_eq!(parse_completion(raw).unwrap(), json!({"data": [1, 2]}));
    }

    #[test]
    fn anonymous_fence_is_stripped() {
        let raw = "```\n{\"ok\": true}\n```";
        assert_eq!(parse_completion(raw).unwrap(), json!({"ok": true}));
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let raw = "  \n```json\n{\"a\": 1}\n```  \n";
        assert_eq!(parse_completion(raw).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn non_json_text_is_a_parse_error_carrying_raw() {
        let err = parse_completion("I could not process this document.").unwrap_err();
        match err {
            ExtractError::Parse { raw, .. } => {
                assert_eq!(raw, "I could not process this document.")
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn fenced_non_json_is_a_parse_error() {
        assert!(matches!(
            parse_completion("```json\nnot json\n```"),
            Err(ExtractError::Parse { .. })
        ));
    }

    #[test]
    fn empty_and_blank_input_is_empty_completion() {
        assert!(matches!(
            parse_completion(""),
            Err(ExtractError::EmptyCompletion)
        ));
        assert!(matches!(
            parse_completion("   \n\t"),
            Err(ExtractError::EmptyCompletion)
        ));
        assert!(matches!(
            parse_completion("```json\n```"),
            Err(ExtractError::EmptyCompletion)
        ));
    }

    #[test]
    fn interior_fence_is_content_not_wrapper() {
        // The fence does not span the whole payload, so nothing is stripped
        // and the leading prose makes this invalid JSON.
        assert!(matches!(
            parse_completion("Here it is: ```json\n{}\n```"),
            Err(ExtractError::Parse { .. })
        ));
    }
}
