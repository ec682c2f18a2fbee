//! Chat message shapes shared by the style-description and lyrics prompts.
//!
//! The model call itself lives outside this crate: callers hand in any
//! [`TextGenerator`] (an HTTP client, a cached transcript, a test double).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

pub trait TextGenerator {
    /// Complete a conversation and return the raw response text.
    fn generate(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Pull the text out of a Responses-style JSON payload: `output_text` when
/// present, otherwise every `output[].content[].text` chunk joined by newlines.
pub fn extract_response_text(response: &Value) -> Result<String> {
    if let Some(text) = response.get("output_text").and_then(Value::as_str) {
        if !text.trim().is_empty() {
            return Ok(text.trim().to_string());
        }
    }

    let chunks: Vec<&str> = response
        .get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter_map(|content| content.get("text").and_then(Value::as_str))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();

    if chunks.is_empty() {
        return Err(Error::InvalidArgument(
            "response contains no output text".into(),
        ));
    }
    Ok(chunks.join("\n"))
}
