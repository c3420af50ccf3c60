//! Extraction of ordered transcript entries from a parsed conversation.

use crate::conversation::{Conversation, LegacyMessage};
use crate::stream::StreamEvent;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use transcriptor_core::Role;

/// Characters kept of a tool result before the `... (truncated)` suffix.
pub const DEFAULT_TRUNCATE_LEN: usize = 500;

/// The kind of transcript event a [`LogEntry`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    /// Session initialization metadata.
    SystemInit,
    /// A message authored by the end-user.
    UserMessage,
    /// Text produced by the assistant.
    AssistantText,
    /// A tool invocation requested by the assistant.
    ToolCall,
    /// The output of a tool invocation.
    ToolResult,
    /// The final session result summary.
    SessionResult,
    /// An error surfaced by the session.
    Error,
}

impl LogKind {
    /// Returns the snake_case wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::SystemInit => "system_init",
            LogKind::UserMessage => "user_message",
            LogKind::AssistantText => "assistant_text",
            LogKind::ToolCall => "tool_call",
            LogKind::ToolResult => "tool_result",
            LogKind::SessionResult => "session_result",
            LogKind::Error => "error",
        }
    }
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timestamped, immutable transcript event extracted from a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the event happened. Synthesized from the entry index when the
    /// source format carries no timestamps.
    pub timestamp: DateTime<Utc>,
    /// What kind of event this is.
    pub kind: LogKind,
    /// Who authored the event.
    pub role: Role,
    /// Display text of the event. Tool results are truncated here; the full
    /// text lives in `tool_result`.
    pub content: String,
    /// Tool name, on `tool_call` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// Tool parameters, on `tool_call` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_params: Option<Value>,
    /// Full untruncated tool output, on `tool_result` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<String>,
    /// Additional key-value context for the entry.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

/// Walks a conversation in order and emits one [`LogEntry`] per transcript
/// event. Entry `i` gets `base_time + i` seconds when the source format has
/// no timestamps, so synthesized timestamps are strictly monotonic; legacy
/// messages that carry their own timestamp keep it.
pub fn extract_logs(conversation: &Conversation, base_time: DateTime<Utc>) -> Vec<LogEntry> {
    if !conversation.events.is_empty() {
        extract_from_events(&conversation.events, base_time)
    } else {
        extract_from_messages(&conversation.messages, base_time)
    }
}

fn synthesized(base_time: DateTime<Utc>, index: usize) -> DateTime<Utc> {
    base_time + Duration::seconds(index as i64)
}

fn extract_from_events(events: &[StreamEvent], base_time: DateTime<Utc>) -> Vec<LogEntry> {
    let mut entries: Vec<LogEntry> = Vec::new();

    for event in events {
        match event.event_type.as_str() {
            "system" => {
                if event.subtype.as_deref() != Some("init") {
                    continue;
                }
                let mut metadata = HashMap::new();
                if let Some(model) = &event.model {
                    metadata.insert("model".to_string(), Value::String(model.clone()));
                }
                if let Some(mode) = &event.permission_mode {
                    metadata.insert("permission_mode".to_string(), Value::String(mode.clone()));
                }
                if let Some(version) = &event.cli_version {
                    metadata.insert("cli_version".to_string(), Value::String(version.clone()));
                }
                if !event.tools.is_empty() {
                    metadata.insert(
                        "tools".to_string(),
                        Value::Array(
                            event
                                .tools
                                .iter()
                                .map(|t| Value::String(t.clone()))
                                .collect(),
                        ),
                    );
                }
                entries.push(LogEntry {
                    timestamp: synthesized(base_time, entries.len()),
                    kind: LogKind::SystemInit,
                    role: Role::System,
                    content: format!(
                        "Session initialized: {}",
                        event.session_id.as_deref().unwrap_or_default()
                    ),
                    tool_name: None,
                    tool_params: None,
                    tool_result: None,
                    metadata,
                });
            }

            "assistant" => {
                let Some(message) = &event.message else {
                    continue;
                };
                for block in &message.content {
                    match block.block_type.as_str() {
                        "text" => {
                            let Some(text) = block.text.as_deref().filter(|t| !t.is_empty())
                            else {
                                continue;
                            };
                            entries.push(LogEntry {
                                timestamp: synthesized(base_time, entries.len()),
                                kind: LogKind::AssistantText,
                                role: Role::Assistant,
                                content: text.to_string(),
                                tool_name: None,
                                tool_params: None,
                                tool_result: None,
                                metadata: HashMap::new(),
                            });
                        }
                        "tool_use" => {
                            let name = block.name.clone().unwrap_or_default();
                            let mut metadata = HashMap::new();
                            if let Some(id) = &block.id {
                                metadata.insert(
                                    "tool_use_id".to_string(),
                                    Value::String(id.clone()),
                                );
                            }
                            entries.push(LogEntry {
                                timestamp: synthesized(base_time, entries.len()),
                                kind: LogKind::ToolCall,
                                role: Role::Assistant,
                                content: format!("Tool call: {name}"),
                                tool_name: Some(name),
                                tool_params: block.input.clone(),
                                tool_result: None,
                                metadata,
                            });
                        }
                        _ => {}
                    }
                }
            }

            "user" => {
                let Some(message) = &event.message else {
                    continue;
                };
                for block in &message.content {
                    match block.block_type.as_str() {
                        "text" => {
                            let Some(text) = block.text.as_deref().filter(|t| !t.is_empty())
                            else {
                                continue;
                            };
                            entries.push(LogEntry {
                                timestamp: synthesized(base_time, entries.len()),
                                kind: LogKind::UserMessage,
                                role: Role::User,
                                content: text.to_string(),
                                tool_name: None,
                                tool_params: None,
                                tool_result: None,
                                metadata: HashMap::new(),
                            });
                        }
                        "tool_result" => {
                            let full = block
                                .content
                                .as_ref()
                                .map(flatten_content)
                                .unwrap_or_default();
                            let mut metadata = HashMap::new();
                            if let Some(id) = &block.tool_use_id {
                                metadata.insert(
                                    "tool_use_id".to_string(),
                                    Value::String(id.clone()),
                                );
                            }
                            metadata.insert("is_error".to_string(), Value::Bool(block.is_error));
                            entries.push(LogEntry {
                                timestamp: synthesized(base_time, entries.len()),
                                kind: LogKind::ToolResult,
                                role: Role::User,
                                content: truncate(&full, DEFAULT_TRUNCATE_LEN),
                                tool_name: None,
                                tool_params: None,
                                tool_result: Some(full),
                                metadata,
                            });
                        }
                        _ => {}
                    }
                }
            }

            "result" => {
                let mut metadata = HashMap::new();
                if let Some(duration) = event.duration_ms {
                    metadata.insert("duration_ms".to_string(), Value::from(duration));
                }
                if let Some(turns) = event.num_turns {
                    metadata.insert("num_turns".to_string(), Value::from(turns));
                }
                if let Some(cost) = event.total_cost_usd {
                    metadata.insert("total_cost_usd".to_string(), Value::from(cost));
                }
                if let Some(usage) = &event.usage {
                    if let Ok(value) = serde_json::to_value(usage) {
                        metadata.insert("usage".to_string(), value);
                    }
                }
                if let Some(subtype) = &event.subtype {
                    metadata.insert("subtype".to_string(), Value::String(subtype.clone()));
                }
                entries.push(LogEntry {
                    timestamp: synthesized(base_time, entries.len()),
                    kind: LogKind::SessionResult,
                    role: Role::System,
                    content: event.result.clone().unwrap_or_default(),
                    tool_name: None,
                    tool_params: None,
                    tool_result: None,
                    metadata,
                });
            }

            _ => {}
        }
    }

    entries
}

fn extract_from_messages(messages: &[LegacyMessage], base_time: DateTime<Utc>) -> Vec<LogEntry> {
    let mut entries: Vec<LogEntry> = Vec::new();

    for message in messages {
        let timestamp = message
            .timestamp
            .unwrap_or_else(|| synthesized(base_time, entries.len()));

        match message.role.as_str() {
            "user" => {
                let content = flatten_content(&message.content);
                if content.is_empty() {
                    continue;
                }
                entries.push(LogEntry {
                    timestamp,
                    kind: LogKind::UserMessage,
                    role: Role::User,
                    content,
                    tool_name: None,
                    tool_params: None,
                    tool_result: None,
                    metadata: HashMap::new(),
                });
            }
            "assistant" => {
                let content = flatten_content(&message.content);
                if !content.is_empty() {
                    entries.push(LogEntry {
                        timestamp,
                        kind: LogKind::AssistantText,
                        role: Role::Assistant,
                        content,
                        tool_name: None,
                        tool_params: None,
                        tool_result: None,
                        metadata: HashMap::new(),
                    });
                }
                if let Some(tool_use) = &message.tool_use {
                    let mut metadata = HashMap::new();
                    if !tool_use.id.is_empty() {
                        metadata.insert(
                            "tool_use_id".to_string(),
                            Value::String(tool_use.id.clone()),
                        );
                    }
                    entries.push(LogEntry {
                        timestamp: message
                            .timestamp
                            .unwrap_or_else(|| synthesized(base_time, entries.len())),
                        kind: LogKind::ToolCall,
                        role: Role::Assistant,
                        content: format!("Tool call: {}", tool_use.name),
                        tool_name: Some(tool_use.name.clone()),
                        tool_params: Some(tool_use.input.clone()),
                        tool_result: None,
                        metadata,
                    });
                }
            }
            _ => {}
        }
    }

    entries
}

/// Flattens a content value into plain text: strings pass through, arrays of
/// text blocks join with newlines, anything else falls back to its JSON form.
pub(crate) fn flatten_content(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let mut parts: Vec<&str> = Vec::new();
            for item in items {
                let Some(object) = item.as_object() else {
                    continue;
                };
                if let Some(text) = object.get("text").and_then(Value::as_str) {
                    parts.push(text);
                } else if object.get("type").and_then(Value::as_str) == Some("text") {
                    if let Some(text) = object.get("content").and_then(Value::as_str) {
                        parts.push(text);
                    }
                }
            }
            parts.join("\n")
        }
        other => other.to_string(),
    }
}

/// Truncates to `max_chars` characters, appending a marker when anything was
/// cut. Counts characters, not bytes, so multi-byte text never splits.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}... (truncated)", &s[..index]),
        None => s.to_string(),
    }
}
