use super::events::AgentEvent;
use super::runner::Runner;
use super::system_prompt::{allowed_tools_arg, RECIPE_SEARCH_PROMPT};
use crate::config::AgentConfig;
use crate::mcp::{mcp_config_json, playwright_server};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::{Child, ChildStdout, Command},
    sync::{mpsc, Mutex},
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, trace, warn};

/// Capacity of the event channel between the driver task and the caller.
const EVENT_CHANNEL_CAPACITY: usize = 64;

// ─── Errors ───────────────────────────────────────────────────────────────────

/// Failures the session layer reports itself. Everything inside the runtime
/// subprocess (tool errors, model errors) arrives through the event stream
/// instead.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to spawn agent runtime '{bin}' — is it installed and on PATH?")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },
    #[error("agent runtime produced no stdout pipe")]
    NoStdout,
}

// ─── Runtime stream-json output types ────────────────────────────────────────

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClaudeEvent {
    /// An assistant message: text and tool_use content blocks.
    Assistant { message: AssistantMessage },
    /// Final event of the turn, carrying the result string and usage counters.
    Result {
        result: Option<String>,
        usage: Option<UsageCounters>,
    },
    /// Startup/housekeeping events. Not surfaced to callers.
    System {
        #[allow(dead_code)]
        subtype: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize, Debug)]
struct AssistantMessage {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    ToolUse { name: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug)]
struct UsageCounters {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

// ─── Event mapping ────────────────────────────────────────────────────────────

/// Map one line of runtime output to zero or more caller-facing events.
///
/// Assistant messages flatten into one `Text` per text block and one `Tool`
/// per tool_use block, in block order. The terminal `result` event maps to
/// `Usage` (when counters are present) followed by `Result`. System events,
/// unknown tags, and unparseable lines map to nothing.
pub fn map_line(line: &str) -> Vec<AgentEvent> {
    let event: ClaudeEvent = match serde_json::from_str(line) {
        Ok(e) => e,
        Err(_) => {
            warn!(line = %line, "unparseable runtime event");
            return Vec::new();
        }
    };
    map_event(event)
}

fn map_event(event: ClaudeEvent) -> Vec<AgentEvent> {
    match event {
        ClaudeEvent::Assistant { message } => message
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(AgentEvent::Text { text }),
                ContentBlock::ToolUse { name } => Some(AgentEvent::Tool { name }),
                ContentBlock::Other => None,
            })
            .collect(),
        ClaudeEvent::Result { result, usage } => {
            let mut out = Vec::with_capacity(2);
            if let Some(u) = usage {
                out.push(AgentEvent::Usage {
                    input_tokens: u.input_tokens,
                    output_tokens: u.output_tokens,
                });
            }
            out.push(AgentEvent::Result {
                result: result.unwrap_or_default(),
            });
            out
        }
        ClaudeEvent::System { .. } | ClaudeEvent::Unknown => Vec::new(),
    }
}

// ─── Runner ───────────────────────────────────────────────────────────────────

/// Drives one `claude` subprocess per turn and adapts its stream-json output
/// into an [`AgentEvent`] stream.
pub struct ClaudeCodeRunner {
    config: AgentConfig,
    /// The currently running subprocess, if any. Shared between the driver
    /// task (which reaps it) and stop() (which kills it).
    current_child: Arc<Mutex<Option<Child>>>,
}

impl ClaudeCodeRunner {
    pub fn new(config: AgentConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            current_child: Arc::new(Mutex::new(None)),
        })
    }

    /// Assemble the runtime invocation: stream-json output, the Playwright
    /// MCP server as the only server, the browser-tool allow-list, the
    /// recipe-search system prompt, and the caller's extra environment merged
    /// on top of the inherited one.
    fn build_command(&self, task: &str) -> Command {
        let server = playwright_server(self.config.runtime);
        let mcp_config = mcp_config_json(&server);
        let allowed_tools = allowed_tools_arg();

        let mut cmd = Command::new(&self.config.claude_bin);
        cmd.args([
            "--output-format",
            "stream-json",
            "--verbose",
            "--dangerously-skip-permissions",
            // Only the server we configure — ignore any user-level MCP config.
            "--strict-mcp-config",
            "--mcp-config",
            mcp_config.as_str(),
            "--allowedTools",
            allowed_tools.as_str(),
            "--append-system-prompt",
            RECIPE_SEARCH_PROMPT,
        ]);
        if let Some(ref model) = self.config.model {
            cmd.args(["--model", model.as_str()]);
        }
        cmd.args(["-p", task]);

        for (k, v) in &self.config.env {
            cmd.env(k, v);
        }

        cmd.stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());
        cmd
    }
}

#[async_trait]
impl Runner for ClaudeCodeRunner {
    async fn query(&self, task: &str) -> Result<ReceiverStream<AgentEvent>> {
        let mut child = self.build_command(task).spawn().map_err(|e| SessionError::Spawn {
            bin: self.config.claude_bin.clone(),
            source: e,
        })?;

        let stdout = child.stdout.take().ok_or(SessionError::NoStdout)?;
        let stderr = child.stderr.take().context("no stderr")?;

        // Drain stderr so the subprocess cannot block on a full pipe; surface
        // it at debug for diagnosis.
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(target: "claude_stderr", "{}", line);
            }
        });

        *self.current_child.lock().await = Some(child);

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let current_child = Arc::clone(&self.current_child);
        let timeout_secs = self.config.turn_timeout_secs;

        // Driver task: pump mapped events until stdout closes or the timeout
        // fires, then reap the child and emit the terminal Done.
        tokio::spawn(async move {
            let timed_out =
                tokio::time::timeout(Duration::from_secs(timeout_secs), drive(stdout, tx.clone()))
                    .await
                    .is_err();

            if let Some(mut child) = current_child.lock().await.take() {
                if timed_out {
                    warn!(secs = timeout_secs, "turn timed out — killing runtime subprocess");
                    let _ = child.kill().await;
                }
                let _ = child.wait().await;
            }

            let _ = tx.send(AgentEvent::Done).await;
        });

        Ok(ReceiverStream::new(rx))
    }

    async fn stop(&self) -> Result<()> {
        if let Some(mut child) = self.current_child.lock().await.take() {
            // Ignore errors — the process may have already exited.
            let _ = child.kill().await;
            let _ = child.wait().await;
        }
        Ok(())
    }
}

/// Read runtime output line by line and forward mapped events. Returns when
/// stdout closes or the receiver is dropped.
async fn drive(stdout: ChildStdout, tx: mpsc::Sender<AgentEvent>) {
    let mut lines = BufReader::new(stdout).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        trace!(event = %line, "runtime event");
        for event in map_line(&line) {
            if tx.send(event).await.is_err() {
                return;
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
