#![allow(clippy::unwrap_used)]

use criterion::{criterion_group, criterion_main, Criterion};
use transcriptor_parser::{extract_logs, ConversationParser};

fn synthetic_dump(turns: usize) -> String {
    let mut events = vec![
        r#"{"type": "system", "subtype": "init", "session_id": "bench", "model": "bench-model", "tools": ["Bash", "Write"]}"#.to_string(),
    ];
    for i in 0..turns {
        events.push(format!(
            r#"{{"type": "assistant", "message": {{"role": "assistant", "content": [
                {{"type": "text", "text": "step {i}"}},
                {{"type": "tool_use", "id": "toolu_{i}", "name": "Bash", "input": {{"command": "true"}}}}
            ]}}}}"#
        ));
        events.push(format!(
            r#"{{"type": "user", "message": {{"role": "user", "content": [
                {{"type": "tool_result", "tool_use_id": "toolu_{i}", "content": "ok"}}
            ]}}}}"#
        ));
    }
    events.push(r#"{"type": "result", "result": "done", "num_turns": 1}"#.to_string());
    format!("[{}]", events.join(","))
}

fn bench_parse_event_stream(c: &mut Criterion) {
    let parser = ConversationParser::new();
    let dump = synthetic_dump(100);

    c.bench_function("parse_event_stream_100_turns", |b| {
        b.iter(|| parser.parse(std::hint::black_box(&dump)).unwrap());
    });
}

fn bench_extract_logs(c: &mut Criterion) {
    let parser = ConversationParser::new();
    let conversation = parser.parse(&synthetic_dump(100)).unwrap();
    let base = chrono::DateTime::<chrono::Utc>::UNIX_EPOCH;

    c.bench_function("extract_logs_100_turns", |b| {
        b.iter(|| extract_logs(std::hint::black_box(&conversation), base));
    });
}

criterion_group!(benches, bench_parse_event_stream, bench_extract_logs);
criterion_main!(benches);
