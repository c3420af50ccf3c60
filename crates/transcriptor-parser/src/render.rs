//! Human-readable rendering of extracted transcripts.

use crate::conversation::Conversation;
use crate::extract::{LogEntry, LogKind, DEFAULT_TRUNCATE_LEN};
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;

const RULE: &str = "=====================================";

/// Options controlling formatted log output.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Characters of tool output shown before truncation.
    pub truncate_len: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            truncate_len: DEFAULT_TRUNCATE_LEN,
        }
    }
}

/// Entry and tool-call counts over an extracted transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Number of entries per [`LogKind`] wire name.
    pub kind_counts: BTreeMap<String, usize>,
    /// Number of tool calls per tool name.
    pub tool_counts: BTreeMap<String, usize>,
}

impl Statistics {
    /// Counts entries by kind and tool calls by tool name.
    pub fn from_entries(entries: &[LogEntry]) -> Self {
        let mut stats = Self::default();
        for entry in entries {
            *stats.kind_counts.entry(entry.kind.as_str().to_string()).or_default() += 1;
            if entry.kind == LogKind::ToolCall {
                if let Some(name) = &entry.tool_name {
                    *stats.tool_counts.entry(name.clone()).or_default() += 1;
                }
            }
        }
        stats
    }
}

/// Renders the formatted log: a header with session metadata, one block per
/// entry, a statistics section, and a per-model usage breakdown when the
/// conversation carries one.
pub fn render_log(
    conversation: &Conversation,
    entries: &[LogEntry],
    options: &RenderOptions,
) -> String {
    let mut out = String::new();

    render_header(&mut out, conversation, entries.len());
    for entry in entries {
        render_entry(&mut out, entry, options);
    }
    render_statistics(&mut out, &Statistics::from_entries(entries));
    if !conversation.model_usage.is_empty() {
        render_model_usage(&mut out, conversation);
    }

    out
}

fn render_header(out: &mut String, conversation: &Conversation, entry_count: usize) {
    out.push_str("=== Conversation Log ===\n");
    out.push_str(&format!(
        "Generated: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    ));
    if let Some(session_id) = &conversation.session_id {
        out.push_str(&format!("Session ID: {session_id}\n"));
    }
    if let Some(model) = &conversation.model {
        out.push_str(&format!("Model: {model}\n"));
    }
    if conversation.usage.total() > 0 {
        out.push_str(&format!(
            "Tokens: {} input + {} output = {} total\n",
            conversation.usage.input_tokens,
            conversation.usage.output_tokens,
            conversation.usage.total()
        ));
    }
    if let Some(cost) = conversation.total_cost_usd {
        out.push_str(&format!("Total Cost: ${cost:.4} USD\n"));
    }
    if let Some(duration) = conversation.total_duration_ms {
        out.push_str(&format!("Duration: {:.2} seconds\n", duration as f64 / 1000.0));
    }
    if let Some(turns) = conversation.num_turns {
        out.push_str(&format!("Turns: {turns}\n"));
    }
    out.push_str(&format!("Total Events: {entry_count}\n"));
    out.push_str(RULE);
    out.push_str("\n\n");
}

fn render_entry(out: &mut String, entry: &LogEntry, options: &RenderOptions) {
    let timestamp = entry.timestamp.format("%H:%M:%S");

    match entry.kind {
        LogKind::SystemInit => {
            out.push_str(&format!("[{timestamp}] SYSTEM INIT:\n{}\n", entry.content));
            if let Some(model) = entry.metadata.get("model").and_then(Value::as_str) {
                out.push_str(&format!("  Model: {model}\n"));
            }
            if let Some(version) = entry.metadata.get("cli_version").and_then(Value::as_str) {
                out.push_str(&format!("  CLI Version: {version}\n"));
            }
            if let Some(tools) = entry.metadata.get("tools").and_then(Value::as_array) {
                if !tools.is_empty() {
                    out.push_str(&format!("  Available Tools: {}\n", tools.len()));
                }
            }
            out.push('\n');
        }

        LogKind::UserMessage => {
            out.push_str(&format!("[{timestamp}] USER:\n{}\n\n", entry.content));
        }

        LogKind::AssistantText => {
            out.push_str(&format!("[{timestamp}] ASSISTANT:\n{}\n\n", entry.content));
        }

        LogKind::ToolCall => {
            out.push_str(&format!(
                "[{timestamp}] TOOL CALL: {}\n",
                entry.tool_name.as_deref().unwrap_or_default()
            ));
            if let Some(params) = &entry.tool_params {
                if let Ok(pretty) = serde_json::to_string_pretty(params) {
                    out.push_str(&format!(
                        "  Parameters:\n  {}\n",
                        pretty.replace('\n', "\n  ")
                    ));
                }
            }
            out.push('\n');
        }

        LogKind::ToolResult => {
            out.push_str(&format!("[{timestamp}] TOOL RESULT\n"));
            if let Some(result) = entry.tool_result.as_deref().filter(|r| !r.is_empty()) {
                out.push_str(&format!(
                    "  {}\n",
                    crate::extract::truncate(result, options.truncate_len)
                ));
            }
            if entry
                .metadata
                .get("is_error")
                .and_then(Value::as_bool)
                .unwrap_or(false)
            {
                out.push_str("  [ERROR]\n");
            }
            out.push('\n');
        }

        LogKind::SessionResult => {
            out.push_str(&format!("[{timestamp}] SESSION COMPLETED\n"));
            if !entry.content.is_empty() {
                out.push_str(&format!("{}\n", entry.content));
            }
            if let Some(duration) = entry.metadata.get("duration_ms").and_then(Value::as_i64) {
                out.push_str(&format!("  Duration: {:.2} seconds\n", duration as f64 / 1000.0));
            }
            if let Some(turns) = entry.metadata.get("num_turns").and_then(Value::as_u64) {
                out.push_str(&format!("  Turns: {turns}\n"));
            }
            if let Some(cost) = entry.metadata.get("total_cost_usd").and_then(Value::as_f64) {
                out.push_str(&format!("  Cost: ${cost:.4} USD\n"));
            }
            out.push('\n');
        }

        LogKind::Error => {
            out.push_str(&format!("[{timestamp}] ERROR:\n{}\n\n", entry.content));
        }
    }
}

fn render_statistics(out: &mut String, stats: &Statistics) {
    out.push_str(&format!("\n{RULE}\n=== Statistics ===\n{RULE}\n"));

    out.push_str("Message Types:\n");
    for (kind, count) in &stats.kind_counts {
        out.push_str(&format!("  - {kind}: {count}\n"));
    }

    if !stats.tool_counts.is_empty() {
        out.push_str("\nTool Usage:\n");
        for (tool, count) in &stats.tool_counts {
            out.push_str(&format!("  - {tool}: {count}\n"));
        }
    }
}

fn render_model_usage(out: &mut String, conversation: &Conversation) {
    out.push_str(&format!("\n{RULE}\n=== Model Usage Breakdown ===\n{RULE}\n"));

    let ordered: BTreeMap<_, _> = conversation.model_usage.iter().collect();
    for (model, usage) in ordered {
        out.push_str(&format!("\n{model}:\n"));
        out.push_str(&format!("  Input Tokens: {}\n", usage.input_tokens));
        out.push_str(&format!("  Output Tokens: {}\n", usage.output_tokens));
        if usage.cache_read_input_tokens > 0 {
            out.push_str(&format!(
                "  Cache Read Tokens: {}\n",
                usage.cache_read_input_tokens
            ));
        }
        if usage.cache_creation_input_tokens > 0 {
            out.push_str(&format!(
                "  Cache Creation Tokens: {}\n",
                usage.cache_creation_input_tokens
            ));
        }
        out.push_str(&format!("  Cost: ${:.4} USD\n", usage.cost_usd));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::conversation::ConversationParser;
    use crate::extract::extract_logs;
    use chrono::TimeZone;

    fn sample_conversation() -> Conversation {
        ConversationParser::new()
            .parse(
                r#"[
                    {"type": "system", "subtype": "init", "session_id": "sess-1",
                     "model": "model-a", "tools": ["Bash", "Write"]},
                    {"type": "user", "message": {"role": "user", "content": [
                        {"type": "text", "text": "Run the script"}]}},
                    {"type": "assistant", "message": {"role": "assistant", "content": [
                        {"type": "text", "text": "Running it now."},
                        {"type": "tool_use", "id": "t1", "name": "Bash",
                         "input": {"command": "sh hello.sh"}}]}},
                    {"type": "user", "message": {"role": "user", "content": [
                        {"type": "tool_result", "tool_use_id": "t1",
                         "content": "Hello World!\n"}]}},
                    {"type": "result", "subtype": "success", "result": "Ran the script.",
                     "duration_ms": 2100, "num_turns": 2, "total_cost_usd": 0.0031,
                     "usage": {"input_tokens": 20, "output_tokens": 10},
                     "modelUsage": {"model-a": {"inputTokens": 20, "outputTokens": 10,
                                    "costUSD": 0.0031}}}
                ]"#,
            )
            .unwrap()
    }

    fn sample_entries(conversation: &Conversation) -> Vec<LogEntry> {
        let base = Utc.with_ymd_and_hms(2025, 11, 5, 9, 30, 0).unwrap();
        extract_logs(conversation, base)
    }

    #[test]
    fn statistics_count_kinds_and_tools() {
        let conversation = sample_conversation();
        let stats = Statistics::from_entries(&sample_entries(&conversation));
        assert_eq!(stats.kind_counts["user_message"], 1);
        assert_eq!(stats.kind_counts["assistant_text"], 1);
        assert_eq!(stats.kind_counts["tool_call"], 1);
        assert_eq!(stats.kind_counts["tool_result"], 1);
        assert_eq!(stats.tool_counts["Bash"], 1);
    }

    #[test]
    fn rendered_log_contains_header_and_markers() {
        let conversation = sample_conversation();
        let entries = sample_entries(&conversation);
        let rendered = render_log(&conversation, &entries, &RenderOptions::default());

        assert!(rendered.starts_with("=== Conversation Log ===\n"));
        assert!(rendered.contains("Generated: "));
        assert!(rendered.contains("Session ID: sess-1"));
        assert!(rendered.contains("Model: model-a"));
        assert!(rendered.contains("Tokens: 20 input + 10 output = 30 total"));
        assert!(rendered.contains("Total Cost: $0.0031 USD"));
        assert!(rendered.contains("USER:\nRun the script"));
        assert!(rendered.contains("ASSISTANT:\nRunning it now."));
        assert!(rendered.contains("TOOL CALL: Bash"));
        assert!(rendered.contains("\"command\": \"sh hello.sh\""));
        assert!(rendered.contains("Hello World!"));
        assert!(rendered.contains("SESSION COMPLETED"));
        assert!(rendered.contains("=== Statistics ==="));
        assert!(rendered.contains("  - tool_call: 1"));
        assert!(rendered.contains("=== Model Usage Breakdown ==="));
        assert!(rendered.contains("  Cost: $0.0031 USD"));
    }

    #[test]
    fn tool_results_truncate_at_the_configured_length() {
        let long_output = "z".repeat(300);
        let conversation = ConversationParser::new()
            .parse(&format!(
                r#"[{{"type": "user", "message": {{"role": "user", "content": [
                    {{"type": "tool_result", "tool_use_id": "t1", "content": "{long_output}"}}
                ]}}}}]"#,
            ))
            .unwrap();
        let entries = sample_entries(&conversation);
        let rendered = render_log(
            &conversation,
            &entries,
            &RenderOptions { truncate_len: 100 },
        );
        assert!(rendered.contains(&format!("{}... (truncated)", "z".repeat(100))));
    }

    #[test]
    fn error_tool_results_carry_a_marker() {
        let conversation = ConversationParser::new()
            .parse(
                r#"[{"type": "user", "message": {"role": "user", "content": [
                    {"type": "tool_result", "tool_use_id": "t1",
                     "content": "command not found", "is_error": true}
                ]}}]"#,
            )
            .unwrap();
        let entries = sample_entries(&conversation);
        let rendered = render_log(&conversation, &entries, &RenderOptions::default());
        assert!(rendered.contains("  [ERROR]\n"));
    }
}
