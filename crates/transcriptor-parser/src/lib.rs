//! Conversation dump parsing and reporting for the Transcriptor toolkit.
//!
//! Assistant CLIs dump a session as a stream of JSON events (an array, or one
//! event per line); older tooling produced a single object with a `messages`
//! list. This crate turns any of those into a [`Conversation`], extracts an
//! ordered sequence of [`LogEntry`] records from it, and renders the result
//! as a human-readable log with summary statistics.
//!
//! # Main types
//!
//! - [`ConversationParser`] - Format detection and parsing entry point.
//! - [`Conversation`] - A parsed dump plus session-level metadata.
//! - [`LogEntry`] / [`LogKind`] - One timestamped transcript event.
//! - [`Statistics`] - Entry and tool-call counts over a transcript.
//! - [`Reporter`] - Writes formatted logs and pretty JSON to disk.

pub mod conversation;
pub mod extract;
pub mod render;
pub mod report;
pub mod stream;

pub use conversation::{Conversation, ConversationParser, LegacyMessage, LegacyToolUse};
pub use extract::{extract_logs, LogEntry, LogKind, DEFAULT_TRUNCATE_LEN};
pub use render::{render_log, RenderOptions, Statistics};
pub use report::Reporter;
pub use stream::{ContentBlock, StreamEvent, StreamMessage};
