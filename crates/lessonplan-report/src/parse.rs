//! Parsing of raw backend text into lesson content shapes.
//!
//! Models frequently wrap the requested JSON in a Markdown code fence or
//! surround it with a sentence of prose. Parsing strips the fence first and
//! then falls back to the outermost `{ ... }` span before giving up.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{InClassContent, PostClassContent, PreClassContent, ReportError, Result};

/// Matches a whole document wrapped in a fenced code block, with an
/// optional info string such as `json`.
static CODE_FENCE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?[ \t]*```\s*$").ok()
});

/// Parses in-class content, failing if the text holds no JSON object.
pub fn parse_in_class_content(raw: &str) -> Result<InClassContent> {
    parse_content(raw)
}

/// Parses pre-class content, failing if the text holds no JSON object.
pub fn parse_pre_class_content(raw: &str) -> Result<PreClassContent> {
    parse_content(raw)
}

/// Parses post-class content, failing if the text holds no JSON object.
pub fn parse_post_class_content(raw: &str) -> Result<PostClassContent> {
    parse_content(raw)
}

/// Parses in-class content, returning empty content if the text is malformed.
pub fn parse_in_class_content_or_default(raw: &str) -> InClassContent {
    parse_content(raw).unwrap_or_default()
}

/// Parses pre-class content, returning empty content if the text is malformed.
pub fn parse_pre_class_content_or_default(raw: &str) -> PreClassContent {
    parse_content(raw).unwrap_or_default()
}

/// Parses post-class content, returning empty content if the text is malformed.
pub fn parse_post_class_content_or_default(raw: &str) -> PostClassContent {
    parse_content(raw).unwrap_or_default()
}

fn parse_content<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let value = extract_object(raw)?;
    serde_json::from_value(value).map_err(ReportError::from)
}

/// Finds the JSON object in `raw`.
fn extract_object(raw: &str) -> Result<Value> {
    let body = strip_code_fence(raw);

    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(err) => outermost_braces(body)
            .and_then(|span| serde_json::from_str::<Value>(span).ok())
            .ok_or_else(|| ReportError::MalformedContent(err.to_string()))?,
    };

    if value.is_object() {
        Ok(value)
    } else {
        Err(ReportError::MalformedContent(
            "expected a JSON object".to_string(),
        ))
    }
}

/// Returns the fenced body if the whole text is one code block.
fn strip_code_fence(raw: &str) -> &str {
    CODE_FENCE
        .as_ref()
        .and_then(|re| re.captures(raw))
        .and_then(|caps| caps.get(1))
        .map_or_else(|| raw.trim(), |body| body.as_str().trim())
}

fn outermost_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
