//! Session and transcript persistence for the Transcriptor toolkit.
//!
//! A [`Session`] is the stored record of one assistant conversation; its
//! events live in an append-only JSONL transcript next to it. The
//! [`TranscriptRecorder`] assigns sequence numbers and keeps timestamps
//! monotonic, and [`import_conversation`] turns a parsed dump into a stored
//! session in one call.

/// Conversion of parsed conversations into stored sessions.
pub mod import;
/// The session record.
pub mod session;
/// JSON-file session storage.
pub mod store;
/// Transcript events, the JSONL store, and the recorder.
pub mod transcript;

pub use import::import_conversation;
pub use session::Session;
pub use store::{FileSessionStore, SessionStore};
pub use transcript::{
    FileTranscriptStore, TranscriptEntry, TranscriptEvent, TranscriptRecorder, TranscriptStore,
};
