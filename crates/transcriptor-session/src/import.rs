use crate::session::Session;
use crate::store::SessionStore;
use crate::transcript::{TranscriptEvent, TranscriptRecorder, TranscriptStore};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use transcriptor_core::TranscriptorResult;
use transcriptor_parser::{Conversation, LogEntry, LogKind};

/// Stores a parsed conversation as a session plus an append-only transcript.
///
/// Session metadata comes from the conversation (source session id, model,
/// cost, turns, token totals); the extracted log entries become transcript
/// events, keeping their timestamps.
pub async fn import_conversation(
    sessions: &dyn SessionStore,
    transcripts: Arc<dyn TranscriptStore>,
    conversation: &Conversation,
    entries: &[LogEntry],
) -> TranscriptorResult<Session> {
    let mut session = Session::new();
    session.source_session_id = conversation.session_id.clone();
    session.model = conversation.model.clone();
    if let Some(cost) = conversation.total_cost_usd {
        session
            .metadata
            .insert("total_cost_usd".to_string(), Value::from(cost));
    }
    if let Some(turns) = conversation.num_turns {
        session
            .metadata
            .insert("num_turns".to_string(), Value::from(turns));
    }
    if conversation.usage.total() > 0 {
        session.metadata.insert(
            "usage".to_string(),
            serde_json::to_value(conversation.usage)?,
        );
    }
    sessions.create(&session).await?;

    let mut recorder = TranscriptRecorder::new(transcripts, session.id);
    for entry in entries {
        recorder
            .record_at(entry.timestamp, event_from_entry(entry))
            .await?;
    }

    info!(
        session = %session.id,
        entries = entries.len(),
        "Imported conversation"
    );
    Ok(session)
}

fn event_from_entry(entry: &LogEntry) -> TranscriptEvent {
    match entry.kind {
        LogKind::UserMessage => TranscriptEvent::UserMessage {
            content: entry.content.clone(),
        },
        LogKind::AssistantText => TranscriptEvent::AssistantMessage {
            content: entry.content.clone(),
        },
        LogKind::ToolCall => TranscriptEvent::ToolCallRequest {
            call_id: metadata_str(entry, "tool_use_id"),
            tool_name: entry.tool_name.clone().unwrap_or_default(),
            arguments: entry.tool_params.clone().unwrap_or(Value::Null),
        },
        LogKind::ToolResult => TranscriptEvent::ToolCallResult {
            call_id: metadata_str(entry, "tool_use_id"),
            tool_name: entry.tool_name.clone().unwrap_or_default(),
            content: entry
                .tool_result
                .clone()
                .unwrap_or_else(|| entry.content.clone()),
            is_error: entry
                .metadata
                .get("is_error")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        },
        LogKind::SystemInit => system_event("init", entry),
        LogKind::SessionResult => system_event("result", entry),
        LogKind::Error => system_event("error", entry),
    }
}

fn metadata_str(entry: &LogEntry, key: &str) -> String {
    entry
        .metadata
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

fn system_event(event_type: &str, entry: &LogEntry) -> TranscriptEvent {
    let mut details = serde_json::Map::new();
    if !entry.content.is_empty() {
        details.insert("content".to_string(), Value::String(entry.content.clone()));
    }
    for (key, value) in &entry.metadata {
        details.insert(key.clone(), value.clone());
    }
    TranscriptEvent::SystemEvent {
        event_type: event_type.to_string(),
        details: Value::Object(details),
    }
}
