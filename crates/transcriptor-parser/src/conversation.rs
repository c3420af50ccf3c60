//! Conversation assembly and input format detection.

use crate::stream::StreamEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use transcriptor_core::{ModelUsage, TokenUsage, TranscriptorError, TranscriptorResult};

/// A parsed conversation dump plus the session-level metadata pulled out of
/// its events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    /// The raw event stream, in input order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<StreamEvent>,
    /// Session identifier from the first event that carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Model identifier from the first event that carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Total session cost in USD, from the `result` event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost_usd: Option<f64>,
    /// Wall-clock session duration in milliseconds, from the `result` event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration_ms: Option<i64>,
    /// Number of conversation turns, from the `result` event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_turns: Option<u32>,
    /// Aggregate token usage, from the `result` event.
    #[serde(default)]
    pub usage: TokenUsage,
    /// Per-model usage breakdown, from the `result` event.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub model_usage: HashMap<String, ModelUsage>,
    /// Messages of the legacy object format, empty for event streams.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<LegacyMessage>,
}

/// A message in the legacy object format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyMessage {
    /// Author role: `user` or `assistant`.
    #[serde(default)]
    pub role: String,
    /// Message content: a string, or a list of text blocks.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub content: Value,
    /// Timestamp, when the producer recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    /// Tool invocation attached to an assistant message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use: Option<LegacyToolUse>,
}

/// A tool invocation block in the legacy object format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegacyToolUse {
    /// Tool call identifier.
    #[serde(default)]
    pub id: String,
    /// Name of the invoked tool.
    #[serde(default)]
    pub name: String,
    /// JSON parameters passed to the tool.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub input: Value,
}

/// Parses raw conversation dumps into [`Conversation`] values.
///
/// Three input shapes are accepted:
/// - a JSON array of stream events,
/// - one stream event object per line (JSONL),
/// - the legacy single object with a `messages` list.
///
/// A single JSON object on one line is ambiguous between a one-event stream
/// and the legacy format; it parses as legacy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversationParser;

impl ConversationParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parses a raw dump, detecting its format.
    pub fn parse(&self, input: &str) -> TranscriptorResult<Conversation> {
        let input = input.trim();
        if input.is_empty() {
            return Err(TranscriptorError::Parse(
                "empty conversation input".to_string(),
            ));
        }

        if input.starts_with('[') {
            self.parse_event_array(input)
        } else if looks_like_event_lines(input) {
            self.parse_event_lines(input)
        } else {
            self.parse_legacy(input)
        }
    }

    /// Reads and parses a dump from a file.
    pub async fn parse_file(&self, path: impl AsRef<Path>) -> TranscriptorResult<Conversation> {
        let data = tokio::fs::read_to_string(path.as_ref()).await?;
        self.parse(&data)
    }

    fn parse_event_array(&self, input: &str) -> TranscriptorResult<Conversation> {
        let events: Vec<StreamEvent> = serde_json::from_str(input)
            .map_err(|e| TranscriptorError::Parse(format!("invalid event stream: {e}")))?;
        debug!(events = events.len(), "Parsed event array");
        Ok(Self::from_events(events))
    }

    fn parse_event_lines(&self, input: &str) -> TranscriptorResult<Conversation> {
        let mut events = Vec::new();
        for (lineno, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let event: StreamEvent = serde_json::from_str(line).map_err(|e| {
                TranscriptorError::Parse(format!("invalid event on line {}: {e}", lineno + 1))
            })?;
            events.push(event);
        }
        debug!(events = events.len(), "Parsed event lines");
        Ok(Self::from_events(events))
    }

    fn parse_legacy(&self, input: &str) -> TranscriptorResult<Conversation> {
        let conversation: Conversation = serde_json::from_str(input)
            .map_err(|e| TranscriptorError::Parse(format!("invalid legacy conversation: {e}")))?;
        debug!(messages = conversation.messages.len(), "Parsed legacy conversation");
        Ok(conversation)
    }

    /// Builds a [`Conversation`] from an already-decoded event stream,
    /// extracting session-level metadata: the first `session_id` and `model`
    /// seen win, and a `result` event supplies totals.
    pub fn from_events(events: Vec<StreamEvent>) -> Conversation {
        let mut conversation = Conversation::default();

        for event in &events {
            if conversation.session_id.is_none() {
                conversation.session_id = event.session_id.clone();
            }
            if conversation.model.is_none() {
                conversation.model = event.model.clone();
            }
            if event.event_type == "result" {
                conversation.total_cost_usd = event.total_cost_usd;
                conversation.total_duration_ms = event.duration_ms;
                conversation.num_turns = event.num_turns;
                if let Some(usage) = event.usage {
                    conversation.usage = usage;
                }
                if !event.model_usage.is_empty() {
                    conversation.model_usage = event.model_usage.clone();
                }
            }
        }

        conversation.events = events;
        conversation
    }
}

/// A multi-line input whose first non-empty line is a complete JSON object is
/// treated as one event per line. Pretty-printed legacy objects start with a
/// bare `{` line, which is not a complete object, so they fall through.
fn looks_like_event_lines(input: &str) -> bool {
    let mut lines = input.lines().map(str::trim).filter(|l| !l.is_empty());
    match (lines.next(), lines.next()) {
        (Some(first), Some(_)) => matches!(
            serde_json::from_str::<Value>(first),
            Ok(Value::Object(_))
        ),
        _ => false,
    }
}
