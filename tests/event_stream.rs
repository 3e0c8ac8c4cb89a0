//! Integration tests for the session event stream.
//!
//! The runner is exercised end-to-end against a fake agent runtime: a shell
//! script that prints canned stream-json lines. No real model or browser is
//! involved.

#![cfg(unix)]

use futures_util::StreamExt;
use souschef::config::AgentConfig;
use souschef::session::{map_line, AgentEvent, ClaudeCodeRunner, Runner};
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use tempfile::TempDir;

/// Write an executable shell script acting as the agent runtime binary.
fn fake_runtime(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("fake-claude");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "#!/bin/sh").unwrap();
    f.write_all(body.as_bytes()).unwrap();
    drop(f);
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn runner_for(script: &std::path::Path, timeout_secs: u64) -> std::sync::Arc<ClaudeCodeRunner> {
    let config = AgentConfig {
        claude_bin: script.to_string_lossy().into_owned(),
        turn_timeout_secs: timeout_secs,
        ..AgentConfig::default()
    };
    ClaudeCodeRunner::new(config)
}

const TURN_SCRIPT: &str = r##"
# Ignore all arguments; emit one canned turn.
echo 'starting up' >&2
cat <<'EOF'
{"type":"system","subtype":"init","session_id":"s_123"}
{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"Searching allrecipes."}]}}
{"type":"assistant","message":{"role":"assistant","content":[{"type":"tool_use","id":"tu_1","name":"mcp__playwright__browser_navigate","input":{"url":"https://www.allrecipes.com"}}]}}
{"type":"user","message":{"content":[{"type":"tool_result","tool_use_id":"tu_1"}]}}
{"type":"assistant","message":{"role":"assistant","content":[{"type":"tool_use","id":"tu_2","name":"mcp__playwright__browser_snapshot","input":{}},{"type":"text","text":"Found it."}]}}
not even json
{"type":"result","subtype":"success","is_error":false,"result":"# Chicken Pad Thai","usage":{"input_tokens":900,"output_tokens":120}}
EOF
"##;

#[tokio::test]
async fn full_turn_maps_in_order_and_terminates_with_done() {
    let dir = TempDir::new().unwrap();
    let script = fake_runtime(&dir, TURN_SCRIPT);
    let runner = runner_for(&script, 30);

    let stream = runner.query("find me a pad thai recipe").await.unwrap();
    let events: Vec<AgentEvent> = stream.collect().await;

    assert_eq!(
        events,
        vec![
            AgentEvent::Text {
                text: "Searching allrecipes.".into()
            },
            AgentEvent::Tool {
                name: "mcp__playwright__browser_navigate".into()
            },
            AgentEvent::Tool {
                name: "mcp__playwright__browser_snapshot".into()
            },
            AgentEvent::Text {
                text: "Found it.".into()
            },
            AgentEvent::Usage {
                input_tokens: 900,
                output_tokens: 120
            },
            AgentEvent::Result {
                result: "# Chicken Pad Thai".into()
            },
            AgentEvent::Done,
        ]
    );
}

#[tokio::test]
async fn stream_ends_with_done_even_without_a_result_event() {
    let dir = TempDir::new().unwrap();
    let script = fake_runtime(
        &dir,
        r#"
echo '{"type":"assistant","message":{"content":[{"type":"text","text":"partial"}]}}'
# Exit without a result event (crash simulation).
exit 1
"#,
    );
    let runner = runner_for(&script, 30);

    let events: Vec<AgentEvent> = runner.query("task").await.unwrap().collect().await;
    assert_eq!(
        events,
        vec![
            AgentEvent::Text {
                text: "partial".into()
            },
            AgentEvent::Done,
        ]
    );
}

#[tokio::test]
async fn hung_runtime_is_killed_at_the_turn_timeout() {
    let dir = TempDir::new().unwrap();
    let script = fake_runtime(&dir, "exec sleep 30\n");
    let runner = runner_for(&script, 1);

    let start = std::time::Instant::now();
    let events: Vec<AgentEvent> = runner.query("task").await.unwrap().collect().await;
    assert_eq!(events, vec![AgentEvent::Done]);
    assert!(start.elapsed() < std::time::Duration::from_secs(10));
}

#[tokio::test]
async fn stop_kills_the_subprocess_and_drains_to_done() {
    let dir = TempDir::new().unwrap();
    let script = fake_runtime(
        &dir,
        r#"
echo '{"type":"assistant","message":{"content":[{"type":"text","text":"first"}]}}'
exec sleep 30
"#,
    );
    let runner = runner_for(&script, 60);

    let mut stream = runner.query("task").await.unwrap();
    assert_eq!(
        stream.next().await,
        Some(AgentEvent::Text {
            text: "first".into()
        })
    );

    runner.stop().await.unwrap();

    let rest: Vec<AgentEvent> = stream.collect().await;
    assert_eq!(rest, vec![AgentEvent::Done]);
}

#[tokio::test]
async fn spawn_failure_surfaces_as_an_error() {
    let config = AgentConfig {
        claude_bin: "/nonexistent/claude-binary".into(),
        ..AgentConfig::default()
    };
    let runner = ClaudeCodeRunner::new(config);
    let err = runner.query("task").await.unwrap_err();
    assert!(err.to_string().contains("failed to spawn agent runtime"));
}

#[test]
fn map_line_is_order_preserving_over_a_whole_transcript() {
    let transcript = [
        r#"{"type":"system","subtype":"init"}"#,
        r#"{"type":"assistant","message":{"content":[{"type":"text","text":"a"}]}}"#,
        r#"{"type":"assistant","message":{"content":[{"type":"tool_use","name":"mcp__playwright__browser_click","id":"t","input":{}}]}}"#,
        r#"{"type":"result","result":"done","usage":{"input_tokens":1,"output_tokens":2}}"#,
    ];
    let events: Vec<AgentEvent> = transcript.iter().flat_map(|l| map_line(l)).collect();
    assert_eq!(
        events,
        vec![
            AgentEvent::Text { text: "a".into() },
            AgentEvent::Tool {
                name: "mcp__playwright__browser_click".into()
            },
            AgentEvent::Usage {
                input_tokens: 1,
                output_tokens: 2
            },
            AgentEvent::Result {
                result: "done".into()
            },
        ]
    );
}
