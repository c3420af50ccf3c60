//! The `transcriptor` command line interface.

use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use transcriptor_parser::{
    extract_logs, render_log, Conversation, ConversationParser, RenderOptions, Reporter,
    Statistics,
};
use transcriptor_session::{
    import_conversation, FileSessionStore, FileTranscriptStore, SessionStore, TranscriptEntry,
    TranscriptEvent, TranscriptStore,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "transcriptor", about = "Transcriptor - session transcript toolkit")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "transcriptor.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a conversation dump and save a formatted log plus pretty JSON
    Parse {
        /// Input dump: JSON event array, JSONL, or legacy object
        #[arg(short, long)]
        input: PathBuf,
        /// Output directory for reports (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Module name used in report filenames
        #[arg(long, default_value = "default_module")]
        module: String,
        /// Job name used in report filenames
        #[arg(long, default_value = "default_job")]
        job: String,
    },
    /// Parse a dump and print its summary, writing nothing
    Summary {
        /// Input dump: JSON event array, JSONL, or legacy object
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Store a dump as a session with an append-only transcript
    Import {
        /// Input dump: JSON event array, JSONL, or legacy object
        #[arg(short, long)]
        input: PathBuf,
        /// Data directory (overrides config)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// List stored sessions
    Sessions {
        /// Data directory (overrides config)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Render a stored transcript to stdout
    Show {
        /// Session id as printed by `import` and `sessions`
        session_id: Uuid,
        /// Data directory (overrides config)
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[derive(Deserialize)]
struct TranscriptorConfig {
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    #[serde(default = "default_log_dir")]
    log_dir: PathBuf,
    #[serde(default)]
    report: ReportConfig,
}

impl Default for TranscriptorConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_dir: default_log_dir(),
            report: ReportConfig::default(),
        }
    }
}

#[derive(Deserialize)]
struct ReportConfig {
    #[serde(default = "default_truncate_len")]
    truncate_len: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            truncate_len: default_truncate_len(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}
fn default_truncate_len() -> usize {
    transcriptor_parser::DEFAULT_TRUNCATE_LEN
}

async fn load_config(path: &PathBuf) -> anyhow::Result<TranscriptorConfig> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display())),
        // A missing config file falls back to defaults.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Ok(TranscriptorConfig::default())
        }
        Err(e) => Err(anyhow::anyhow!("cannot read config {}: {e}", path.display())),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config).await?;
    let parser = ConversationParser::new();

    match cli.command {
        Commands::Parse {
            input,
            output,
            module,
            job,
        } => {
            let conversation = parser.parse_file(&input).await?;
            let entries = extract_logs(&conversation, Utc::now());
            print_summary(&conversation, entries.len(), &Statistics::from_entries(&entries));

            let options = RenderOptions {
                truncate_len: config.report.truncate_len,
            };
            let rendered = render_log(&conversation, &entries, &options);

            let reporter = Reporter::new(output.unwrap_or(config.log_dir));
            let log_path = reporter.save_log(&module, &job, &rendered).await?;
            let json_path = reporter.save_json(&module, &job, &conversation).await?;

            println!("\n=== Success ===");
            println!("Formatted log saved to: {}", log_path.display());
            println!("Formatted JSON saved to: {}", json_path.display());
        }

        Commands::Summary { input } => {
            let conversation = parser.parse_file(&input).await?;
            let entries = extract_logs(&conversation, Utc::now());
            print_summary(&conversation, entries.len(), &Statistics::from_entries(&entries));
        }

        Commands::Import { input, data_dir } => {
            let conversation = parser.parse_file(&input).await?;
            let entries = extract_logs(&conversation, Utc::now());

            let data_dir = data_dir.unwrap_or(config.data_dir);
            let sessions = FileSessionStore::new(data_dir.join("sessions")).await?;
            let transcripts: Arc<dyn TranscriptStore> =
                Arc::new(FileTranscriptStore::new(data_dir.join("transcripts")).await?);

            let session =
                import_conversation(&sessions, transcripts, &conversation, &entries).await?;
            info!(session = %session.id, "Import complete");
            println!("Imported session: {}", session.id);
        }

        Commands::Sessions { data_dir } => {
            let data_dir = data_dir.unwrap_or(config.data_dir);
            let sessions = FileSessionStore::new(data_dir.join("sessions")).await?;
            let mut ids = sessions.list().await?;
            ids.sort();
            for id in &ids {
                println!("{id}");
            }
            println!("{} session(s)", ids.len());
        }

        Commands::Show {
            session_id,
            data_dir,
        } => {
            let data_dir = data_dir.unwrap_or(config.data_dir);
            let sessions = FileSessionStore::new(data_dir.join("sessions")).await?;
            let transcripts = FileTranscriptStore::new(data_dir.join("transcripts")).await?;

            if let Some(session) = sessions.get(session_id).await? {
                println!(
                    "Session {} (source: {}, model: {})",
                    session.id,
                    session.source_session_id.as_deref().unwrap_or("-"),
                    session.model.as_deref().unwrap_or("-")
                );
            }
            let entries = transcripts.read(session_id).await?;
            if entries.is_empty() {
                println!("No transcript entries for {session_id}");
                return Ok(());
            }
            for entry in &entries {
                print!("{}", format_stored_entry(entry));
            }
        }
    }

    Ok(())
}

fn print_summary(conversation: &Conversation, entry_count: usize, stats: &Statistics) {
    println!("\n=== Parsing Summary ===");
    if let Some(session_id) = &conversation.session_id {
        println!("Session ID: {session_id}");
    }
    if let Some(model) = &conversation.model {
        println!("Model: {model}");
    }
    println!("Events: {}", conversation.events.len());
    if let Some(cost) = conversation.total_cost_usd {
        println!("Cost: ${cost:.4} USD");
    }
    if let Some(duration) = conversation.total_duration_ms {
        println!("Duration: {:.2} seconds", duration as f64 / 1000.0);
    }
    if let Some(turns) = conversation.num_turns {
        println!("Turns: {turns}");
    }
    if conversation.usage.total() > 0 {
        println!(
            "Tokens: {} input + {} output = {} total",
            conversation.usage.input_tokens,
            conversation.usage.output_tokens,
            conversation.usage.total()
        );
    }
    println!("Extracted Logs: {entry_count}");

    println!("\nLog Types:");
    for (kind, count) in &stats.kind_counts {
        println!("  - {kind}: {count}");
    }
}

fn format_stored_entry(entry: &TranscriptEntry) -> String {
    let timestamp = entry.timestamp.format("%H:%M:%S");
    match &entry.event {
        TranscriptEvent::UserMessage { content } => {
            format!("[{timestamp}] USER:\n{content}\n\n")
        }
        TranscriptEvent::AssistantMessage { content } => {
            format!("[{timestamp}] ASSISTANT:\n{content}\n\n")
        }
        TranscriptEvent::ToolCallRequest {
            tool_name,
            arguments,
            ..
        } => {
            if arguments.is_null() {
                format!("[{timestamp}] TOOL CALL: {tool_name}\n\n")
            } else {
                format!("[{timestamp}] TOOL CALL: {tool_name}\n  {arguments}\n\n")
            }
        }
        TranscriptEvent::ToolCallResult {
            tool_name,
            content,
            is_error,
            ..
        } => {
            let marker = if *is_error { "\n  [ERROR]" } else { "" };
            if tool_name.is_empty() {
                format!("[{timestamp}] TOOL RESULT\n  {content}{marker}\n\n")
            } else {
                format!("[{timestamp}] TOOL RESULT ({tool_name})\n  {content}{marker}\n\n")
            }
        }
        TranscriptEvent::SystemEvent {
            event_type,
            details,
        } => {
            format!("[{timestamp}] SYSTEM {event_type}: {details}\n\n")
        }
    }
}
