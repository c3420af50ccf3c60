//! Serde model of the assistant CLI event stream.
//!
//! Events arrive with a `type` discriminant (`system`, `user`, `assistant`,
//! `result`) and a sparse set of optional fields. Unknown fields are ignored
//! so newer CLI versions keep parsing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use transcriptor_core::{ModelUsage, TokenUsage};

/// A single event in the assistant CLI event stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Event discriminant: `system`, `user`, `assistant`, or `result`.
    #[serde(rename = "type", default)]
    pub event_type: String,
    /// Event sub-discriminant, e.g. `init` on the first system event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Message payload for `user` and `assistant` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<StreamMessage>,
    /// Session identifier, present on most events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Unique identifier of this event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Identifier of the enclosing tool call for nested agent events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_tool_use_id: Option<String>,
    /// Final result text, on `result` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// Wall-clock duration of the session in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    /// Number of conversation turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_turns: Option<u32>,
    /// Aggregate token usage, on `result` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    /// Per-model usage breakdown, on `result` events.
    #[serde(
        default,
        rename = "modelUsage",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub model_usage: HashMap<String, ModelUsage>,
    /// Total session cost in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost_usd: Option<f64>,
    /// Names of the tools available to the session.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
    /// Model identifier, on `system` init events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Permission mode the session ran under.
    #[serde(
        default,
        rename = "permissionMode",
        skip_serializing_if = "Option::is_none"
    )]
    pub permission_mode: Option<String>,
    /// Slash commands registered for the session.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slash_commands: Vec<String>,
    /// Version string of the CLI that produced the dump.
    #[serde(
        default,
        rename = "claude_code_version",
        skip_serializing_if = "Option::is_none"
    )]
    pub cli_version: Option<String>,
}

/// The message payload carried by `user` and `assistant` events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamMessage {
    /// Author role as reported by the CLI.
    #[serde(default)]
    pub role: String,
    /// Ordered content blocks of the message.
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    /// Why the model stopped generating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    /// Message identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Model that produced this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Token usage for this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// One content block within a [`StreamMessage`].
///
/// The `type` field selects which of the optional fields are populated:
/// `text` blocks carry `text`, `tool_use` blocks carry `id`/`name`/`input`,
/// and `tool_result` blocks carry `tool_use_id`/`content`/`is_error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Block discriminant: `text`, `tool_use`, or `tool_result`.
    #[serde(rename = "type", default)]
    pub block_type: String,
    /// Text payload of a `text` block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Tool call identifier of a `tool_use` block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Tool name of a `tool_use` block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tool parameters of a `tool_use` block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Identifier of the tool call a `tool_result` block answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use_id: Option<String>,
    /// Result payload of a `tool_result` block: a string, or a list of
    /// nested text blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    /// Whether the tool result reports an error.
    #[serde(default)]
    pub is_error: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn unknown_fields_are_ignored() {
        let event: StreamEvent = serde_json::from_str(
            r#"{"type": "system", "subtype": "init", "apiKeySource": "none", "model": "test-model"}"#,
        )
        .unwrap();
        assert_eq!(event.event_type, "system");
        assert_eq!(event.subtype.as_deref(), Some("init"));
        assert_eq!(event.model.as_deref(), Some("test-model"));
    }

    #[test]
    fn tool_use_block_fields() {
        let block: ContentBlock = serde_json::from_str(
            r#"{"type": "tool_use", "id": "toolu_1", "name": "Write", "input": {"file_path": "hello.sh"}}"#,
        )
        .unwrap();
        assert_eq!(block.block_type, "tool_use");
        assert_eq!(block.name.as_deref(), Some("Write"));
        assert_eq!(block.input.unwrap()["file_path"], "hello.sh");
    }

    #[test]
    fn tool_result_content_may_be_string_or_blocks() {
        let string_form: ContentBlock = serde_json::from_str(
            r#"{"type": "tool_result", "tool_use_id": "toolu_1", "content": "ok"}"#,
        )
        .unwrap();
        assert!(string_form.content.unwrap().is_string());

        let block_form: ContentBlock = serde_json::from_str(
            r#"{"type": "tool_result", "tool_use_id": "toolu_1",
                "content": [{"type": "text", "text": "ok"}]}"#,
        )
        .unwrap();
        assert!(block_form.content.unwrap().is_array());
    }

    #[test]
    fn model_usage_map_parses_from_result_event() {
        let event: StreamEvent = serde_json::from_str(
            r#"{"type": "result", "modelUsage": {"test-model": {"inputTokens": 3, "costUSD": 0.01}}}"#,
        )
        .unwrap();
        assert_eq!(event.model_usage["test-model"].input_tokens, 3);
    }
}
