use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Environment variable that selects the execution context for the
/// browser-control process.
pub const RUNTIME_ENV_VAR: &str = "SOUSCHEF_RUNTIME";

/// Sentinel value of [`RUNTIME_ENV_VAR`] that selects the container variant.
const CONTAINER_SENTINEL: &str = "container";

/// Per-turn timeout override, in seconds.
pub const TURN_TIMEOUT_ENV_VAR: &str = "SOUSCHEF_TURN_TIMEOUT_SECS";

const DEFAULT_TURN_TIMEOUT_SECS: u64 = 600;
const DEFAULT_CLAUDE_BIN: &str = "claude";

// ─── RuntimeKind ─────────────────────────────────────────────────────────────

/// Where the Playwright browser-control process runs.
///
/// `Container` means a sandboxed container without a display server or user
/// namespaces, so the browser needs headless/no-sandbox flags. `Local` is a
/// normal developer machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeKind {
    Container,
    #[default]
    Local,
}

impl RuntimeKind {
    /// Detect the runtime kind from the process environment.
    pub fn detect() -> Self {
        Self::from_env_value(std::env::var(RUNTIME_ENV_VAR).ok().as_deref())
    }

    /// Classify an environment value. `Container` if and only if the value
    /// equals the `container` sentinel; unset or anything else is `Local`.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v == CONTAINER_SENTINEL => Self::Container,
            _ => Self::Local,
        }
    }
}

// ─── AgentConfig ─────────────────────────────────────────────────────────────

/// Configuration for one agent session (`config.toml` or CLI flags).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model passed to the agent runtime. None = runtime default.
    pub model: Option<String>,

    /// Maximum wall-clock seconds for one turn before the runtime subprocess
    /// is killed. Defaults to 600.
    pub turn_timeout_secs: u64,

    /// Agent runtime binary to spawn. Defaults to `claude` on PATH.
    pub claude_bin: String,

    /// Extra environment variables merged into the runtime subprocess
    /// environment on top of the inherited one.
    pub env: HashMap<String, String>,

    /// Execution context for the browser-control process. Detected from
    /// [`RUNTIME_ENV_VAR`], never read from the config file.
    #[serde(skip)]
    pub runtime: RuntimeKind,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: None,
            turn_timeout_secs: DEFAULT_TURN_TIMEOUT_SECS,
            claude_bin: DEFAULT_CLAUDE_BIN.to_string(),
            env: HashMap::new(),
            runtime: RuntimeKind::Local,
        }
    }
}

impl AgentConfig {
    /// Load configuration: defaults, then the optional TOML file, then
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read config file '{}'", p.display()))?;
                let parsed: AgentConfig = toml::from_str(&raw)
                    .with_context(|| format!("failed to parse config file '{}'", p.display()))?;
                info!(path = %p.display(), "loaded config file");
                parsed
            }
            None => AgentConfig::default(),
        };

        if let Some(secs) = env_timeout_override() {
            config.turn_timeout_secs = secs;
        }
        config.runtime = RuntimeKind::detect();

        Ok(config)
    }
}

fn env_timeout_override() -> Option<u64> {
    std::env::var(TURN_TIMEOUT_ENV_VAR)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
