use crate::session::Session;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;
use transcriptor_core::{TranscriptorError, TranscriptorResult};
use uuid::Uuid;

/// Storage for [`Session`] records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a new session record.
    async fn create(&self, session: &Session) -> TranscriptorResult<()>;
    /// Loads a session by id, `None` when absent.
    async fn get(&self, id: Uuid) -> TranscriptorResult<Option<Session>>;
    /// Replaces a stored session record.
    async fn update(&self, session: &Session) -> TranscriptorResult<()>;
    /// Removes a session record. Deleting an absent session is not an error.
    async fn delete(&self, id: Uuid) -> TranscriptorResult<()>;
    /// Lists the ids of all stored sessions.
    async fn list(&self) -> TranscriptorResult<Vec<Uuid>>;
}

/// File-based session store, one pretty JSON file per session.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Creates the store, ensuring its directory exists.
    pub async fn new(dir: PathBuf) -> TranscriptorResult<Self> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn session_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn create(&self, session: &Session) -> TranscriptorResult<()> {
        let path = self.session_path(session.id);
        let json = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&path, json).await?;
        debug!(session = %session.id, "Stored session record");
        Ok(())
    }

    async fn get(&self, id: Uuid) -> TranscriptorResult<Option<Session>> {
        let path = self.session_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let data = tokio::fs::read_to_string(path).await?;
        let session: Session = serde_json::from_str(&data)
            .map_err(|e| TranscriptorError::Session(format!("Failed to parse session: {e}")))?;
        Ok(Some(session))
    }

    async fn update(&self, session: &Session) -> TranscriptorResult<()> {
        self.create(session).await
    }

    async fn delete(&self, id: Uuid) -> TranscriptorResult<()> {
        let path = self.session_path(id);
        if path.exists() {
            tokio::fs::remove_file(path).await?;
            debug!(session = %id, "Deleted session record");
        }
        Ok(())
    }

    async fn list(&self) -> TranscriptorResult<Vec<Uuid>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str() {
                if let Some(stem) = name.strip_suffix(".json") {
                    if let Ok(id) = Uuid::parse_str(stem) {
                        ids.push(id);
                    }
                }
            }
        }
        Ok(ids)
    }
}
