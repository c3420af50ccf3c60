use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use transcriptor_core::{ToolCall, ToolResult, TranscriptorResult};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// TranscriptEvent
// ---------------------------------------------------------------------------

/// One transcript event, tagged by `type` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptEvent {
    /// A message authored by the end-user.
    UserMessage {
        /// Message text.
        content: String,
    },
    /// A message authored by the assistant.
    AssistantMessage {
        /// Message text.
        content: String,
    },
    /// A tool invocation requested by the assistant.
    ToolCallRequest {
        /// Identifier pairing the request with its result.
        call_id: String,
        /// Name of the invoked tool.
        tool_name: String,
        /// JSON parameters passed to the tool.
        arguments: serde_json::Value,
    },
    /// The output of a tool invocation.
    ToolCallResult {
        /// Identifier pairing the result with its request.
        call_id: String,
        /// Name of the invoked tool, when known.
        tool_name: String,
        /// Textual tool output.
        content: String,
        /// Whether the tool reported an error.
        is_error: bool,
    },
    /// A system-level event (session init, final result, errors).
    SystemEvent {
        /// Event discriminant, e.g. `init` or `result`.
        event_type: String,
        /// Structured event payload.
        details: serde_json::Value,
    },
}

// ---------------------------------------------------------------------------
// TranscriptEntry
// ---------------------------------------------------------------------------

/// An immutable, sequenced record of a [`TranscriptEvent`] within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Unique identifier of this entry.
    pub id: Uuid,
    /// The session the entry belongs to.
    pub session_id: Uuid,
    /// When the event happened. Never decreases within a session.
    pub timestamp: DateTime<Utc>,
    /// Position in the session's append order, starting at 0.
    pub seq: u64,
    /// The recorded event.
    pub event: TranscriptEvent,
}

// ---------------------------------------------------------------------------
// TranscriptStore
// ---------------------------------------------------------------------------

/// Append-only storage for transcript entries. There is no update or delete.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Appends one entry to its session's transcript.
    async fn append(&self, entry: TranscriptEntry) -> TranscriptorResult<()>;
    /// Reads a session's entries, ordered by `seq` then timestamp.
    async fn read(&self, session_id: Uuid) -> TranscriptorResult<Vec<TranscriptEntry>>;
}

/// File-based transcript store, one JSON line per entry in
/// `<dir>/<session>.transcript.jsonl`.
pub struct FileTranscriptStore {
    dir: PathBuf,
}

impl FileTranscriptStore {
    /// Creates the store, ensuring its directory exists.
    pub async fn new(dir: PathBuf) -> TranscriptorResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn transcript_path(&self, session_id: Uuid) -> PathBuf {
        self.dir.join(format!("{session_id}.transcript.jsonl"))
    }
}

#[async_trait]
impl TranscriptStore for FileTranscriptStore {
    async fn append(&self, entry: TranscriptEntry) -> TranscriptorResult<()> {
        let path = self.transcript_path(entry.session_id);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        debug!(session = %entry.session_id, seq = entry.seq, "Appended transcript entry");
        Ok(())
    }

    async fn read(&self, session_id: Uuid) -> TranscriptorResult<Vec<TranscriptEntry>> {
        let path = self.transcript_path(session_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = tokio::fs::read_to_string(&path).await?;
        let mut entries: Vec<TranscriptEntry> = data
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(serde_json::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort_by(|a, b| a.seq.cmp(&b.seq).then_with(|| a.timestamp.cmp(&b.timestamp)));
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// TranscriptRecorder
// ---------------------------------------------------------------------------

/// Appends events to one session's transcript, assigning sequence numbers
/// and keeping timestamps monotonic: a clock step backwards is clamped to
/// the previous entry's timestamp.
pub struct TranscriptRecorder {
    store: Arc<dyn TranscriptStore>,
    session_id: Uuid,
    next_seq: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl TranscriptRecorder {
    /// Creates a recorder for a fresh session transcript, starting at seq 0.
    pub fn new(store: Arc<dyn TranscriptStore>, session_id: Uuid) -> Self {
        Self {
            store,
            session_id,
            next_seq: 0,
            last_timestamp: None,
        }
    }

    /// The session this recorder appends to.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Records an event at the current time.
    pub async fn record(&mut self, event: TranscriptEvent) -> TranscriptorResult<TranscriptEntry> {
        self.record_at(Utc::now(), event).await
    }

    /// Records an event at an explicit timestamp. Timestamps earlier than
    /// the previous entry's are clamped to it.
    pub async fn record_at(
        &mut self,
        timestamp: DateTime<Utc>,
        event: TranscriptEvent,
    ) -> TranscriptorResult<TranscriptEntry> {
        let timestamp = match self.last_timestamp {
            Some(last) if timestamp < last => last,
            _ => timestamp,
        };
        let entry = TranscriptEntry {
            id: Uuid::new_v4(),
            session_id: self.session_id,
            timestamp,
            seq: self.next_seq,
            event,
        };
        self.store.append(entry.clone()).await?;
        self.next_seq += 1;
        self.last_timestamp = Some(timestamp);
        Ok(entry)
    }

    /// Records a user message.
    pub async fn record_user(
        &mut self,
        content: impl Into<String>,
    ) -> TranscriptorResult<TranscriptEntry> {
        self.record(TranscriptEvent::UserMessage {
            content: content.into(),
        })
        .await
    }

    /// Records an assistant message.
    pub async fn record_assistant(
        &mut self,
        content: impl Into<String>,
    ) -> TranscriptorResult<TranscriptEntry> {
        self.record(TranscriptEvent::AssistantMessage {
            content: content.into(),
        })
        .await
    }

    /// Records a tool invocation request.
    pub async fn record_tool_call(
        &mut self,
        call: &ToolCall,
    ) -> TranscriptorResult<TranscriptEntry> {
        self.record(TranscriptEvent::ToolCallRequest {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            arguments: call.arguments.clone(),
        })
        .await
    }

    /// Records a tool invocation result.
    pub async fn record_tool_result(
        &mut self,
        tool_name: impl Into<String>,
        result: &ToolResult,
    ) -> TranscriptorResult<TranscriptEntry> {
        self.record(TranscriptEvent::ToolCallResult {
            call_id: result.call_id.clone(),
            tool_name: tool_name.into(),
            content: result.content.clone(),
            is_error: result.is_error,
        })
        .await
    }

    /// Records a system event.
    pub async fn record_system(
        &mut self,
        event_type: impl Into<String>,
        details: serde_json::Value,
    ) -> TranscriptorResult<TranscriptEntry> {
        self.record(TranscriptEvent::SystemEvent {
            event_type: event_type.into(),
            details,
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn temp_store() -> (Arc<FileTranscriptStore>, TempDir) {
        let tmp = TempDir::new().unwrap();
        let store = FileTranscriptStore::new(tmp.path().to_path_buf())
            .await
            .unwrap();
        (Arc::new(store), tmp)
    }

    #[tokio::test]
    async fn empty_transcript_reads_as_empty_vec() {
        let (store, _tmp) = temp_store().await;
        let entries = store.read(Uuid::new_v4()).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn entries_appended_out_of_seq_order_read_back_sorted() {
        let (store, _tmp) = temp_store().await;
        let sid = Uuid::new_v4();

        for seq in [3u64, 1, 2] {
            store
                .append(TranscriptEntry {
                    id: Uuid::new_v4(),
                    session_id: sid,
                    timestamp: Utc::now(),
                    seq,
                    event: TranscriptEvent::AssistantMessage {
                        content: format!("entry {seq}"),
                    },
                })
                .await
                .unwrap();
        }

        let entries = store.read(sid).await.unwrap();
        let seqs: Vec<u64> = entries.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn recorder_assigns_increasing_seq() {
        let (store, _tmp) = temp_store().await;
        let sid = Uuid::new_v4();
        let mut recorder = TranscriptRecorder::new(store.clone(), sid);

        let first = recorder.record_user("hi").await.unwrap();
        let second = recorder.record_assistant("hello").await.unwrap();
        assert_eq!(first.seq, 0);
        assert_eq!(second.seq, 1);

        let entries = store.read(sid).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(matches!(
            entries[0].event,
            TranscriptEvent::UserMessage { .. }
        ));
    }

    #[tokio::test]
    async fn recorder_clamps_backwards_timestamps() {
        let (store, _tmp) = temp_store().await;
        let mut recorder = TranscriptRecorder::new(store, Uuid::new_v4());

        let later = Utc::now() + chrono::Duration::seconds(60);
        let first = recorder
            .record_at(
                later,
                TranscriptEvent::UserMessage {
                    content: "first".to_string(),
                },
            )
            .await
            .unwrap();

        // The clock "went backwards": the next entry keeps the previous
        // timestamp instead of regressing.
        let second = recorder.record_assistant("second").await.unwrap();
        assert_eq!(second.timestamp, first.timestamp);
        assert!(second.seq > first.seq);
    }

    #[tokio::test]
    async fn recorder_tool_helpers_round_trip() {
        let (store, _tmp) = temp_store().await;
        let sid = Uuid::new_v4();
        let mut recorder = TranscriptRecorder::new(store.clone(), sid);

        let call = ToolCall::new("tc-1", "echo", serde_json::json!({"text": "ping"}));
        recorder.record_tool_call(&call).await.unwrap();
        recorder
            .record_tool_result("echo", &ToolResult::success("tc-1", "ping"))
            .await
            .unwrap();

        let entries = store.read(sid).await.unwrap();
        assert_eq!(entries.len(), 2);
        match &entries[0].event {
            TranscriptEvent::ToolCallRequest {
                call_id,
                tool_name,
                arguments,
            } => {
                assert_eq!(call_id, "tc-1");
                assert_eq!(tool_name, "echo");
                assert_eq!(arguments["text"], "ping");
            }
            other => panic!("expected ToolCallRequest, got {other:?}"),
        }
        match &entries[1].event {
            TranscriptEvent::ToolCallResult {
                content, is_error, ..
            } => {
                assert_eq!(content, "ping");
                assert!(!is_error);
            }
            other => panic!("expected ToolCallResult, got {other:?}"),
        }
    }

    #[test]
    fn event_wire_tags_are_snake_case() {
        let event = TranscriptEvent::ToolCallRequest {
            call_id: "tc-1".to_string(),
            tool_name: "Bash".to_string(),
            arguments: serde_json::json!({}),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "tool_call_request");

        let user = TranscriptEvent::UserMessage {
            content: "hi".to_string(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["type"], "user_message");
    }
}
