//! File outputs: formatted logs and pretty JSON dumps.

use crate::conversation::Conversation;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;
use transcriptor_core::TranscriptorResult;

/// Writes conversation reports into an output directory.
///
/// Output names follow `<module>_<job>_<YYYYmmdd_HHMMSS>.<ext>`, with module
/// and job sanitized for the filesystem. The directory is created on demand.
#[derive(Debug, Clone)]
pub struct Reporter {
    out_dir: PathBuf,
}

impl Reporter {
    /// Creates a reporter writing into `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// The directory reports are written into.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Writes an already-rendered formatted log, returning its path.
    pub async fn save_log(
        &self,
        module: &str,
        job: &str,
        rendered: &str,
    ) -> TranscriptorResult<PathBuf> {
        let path = self.output_path(module, job, "log");
        tokio::fs::create_dir_all(&self.out_dir).await?;
        tokio::fs::write(&path, rendered).await?;
        info!(path = %path.display(), "Saved formatted log");
        Ok(path)
    }

    /// Writes the conversation as pretty-printed JSON, returning its path.
    pub async fn save_json(
        &self,
        module: &str,
        job: &str,
        conversation: &Conversation,
    ) -> TranscriptorResult<PathBuf> {
        let path = self.output_path(module, job, "json");
        let data = serde_json::to_string_pretty(conversation)?;
        tokio::fs::create_dir_all(&self.out_dir).await?;
        tokio::fs::write(&path, data).await?;
        info!(path = %path.display(), "Saved conversation JSON");
        Ok(path)
    }

    fn output_path(&self, module: &str, job: &str, extension: &str) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        self.out_dir.join(format!(
            "{}_{}_{stamp}.{extension}",
            sanitize_filename(module),
            sanitize_filename(job)
        ))
    }
}

/// Replaces path separators, reserved characters, and spaces with `_`.
/// Non-ASCII text passes through untouched.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | ' ' => '_',
            other => other,
        })
        .collect()
}
