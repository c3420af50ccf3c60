//! Core types and error definitions for the Transcriptor toolkit.
//!
//! This crate provides the foundational types shared across all Transcriptor
//! crates, including error handling, participant roles, and tool call
//! abstractions.
//!
//! # Main types
//!
//! - [`TranscriptorError`] - Unified error enum for all Transcriptor subsystems.
//! - [`TranscriptorResult`] - Convenience alias for `Result<T, TranscriptorError>`.
//! - [`Role`] - Transcript participant role (user, assistant, system, tool).
//! - [`ToolCall`] - A tool invocation requested by the assistant.
//! - [`ToolResult`] - The result returned after executing a tool call.
//! - [`TokenUsage`] / [`ModelUsage`] - Token and cost accounting.

/// Token and per-model usage accounting.
pub mod usage;

pub use usage::{ModelUsage, TokenUsage};

use serde::{Deserialize, Serialize};

// --- Error types ---

/// Top-level error type for the Transcriptor toolkit.
///
/// Each variant corresponds to a subsystem that can produce errors.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptorError {
    /// An error while parsing a conversation dump.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An error related to session persistence or lookup.
    #[error("Session error: {0}")]
    Session(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// An error while rendering or writing a report.
    #[error("Report error: {0}")]
    Report(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`TranscriptorError`].
pub type TranscriptorResult<T> = Result<T, TranscriptorError>;

// --- Role ---

/// The role of the participant that authored a transcript event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human end-user.
    User,
    /// The AI assistant.
    Assistant,
    /// A system-level event or instruction.
    System,
    /// Output produced by a tool invocation.
    Tool,
}

impl Role {
    /// Returns the lowercase wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Tool types ---

/// A request from the assistant to invoke a specific tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier assigned by the assistant for this tool call.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON arguments to pass to the tool.
    pub arguments: serde_json::Value,
}

impl ToolCall {
    /// Creates a new tool call.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// The result returned after executing a [`ToolCall`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The ID of the [`ToolCall`] this result corresponds to.
    pub call_id: String,
    /// The textual output produced by the tool.
    pub content: String,
    /// Whether the tool execution ended in an error.
    pub is_error: bool,
}

impl ToolResult {
    /// Creates a successful tool result.
    pub fn success(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Creates an error tool result.
    pub fn error(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Tool).unwrap(), "\"tool\"");
        let role: Role = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, Role::Assistant);
    }

    #[test]
    fn role_display_matches_wire_name() {
        assert_eq!(Role::System.to_string(), "system");
    }

    #[test]
    fn tool_result_constructors() {
        let ok = ToolResult::success("tc-1", "done");
        assert_eq!(ok.call_id, "tc-1");
        assert!(!ok.is_error);

        let err = ToolResult::error("tc-2", "boom");
        assert!(err.is_error);
        assert_eq!(err.content, "boom");
    }

    #[test]
    fn tool_call_round_trip() {
        let call = ToolCall::new("toolu_123", "Read", serde_json::json!({"file_path": "test.txt"}));
        let json = serde_json::to_string(&call).unwrap();
        let back: ToolCall = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "Read");
        assert_eq!(back.arguments["file_path"], "test.txt");
    }
}
