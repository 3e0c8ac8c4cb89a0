/// MCP server launch configuration.
///
/// The agent runtime spawns its MCP servers itself — this module only builds
/// the launch configuration handed to it: which command to run, with which
/// arguments and environment. The only server souschef configures is the
/// Playwright browser-control server (see [`playwright`]).
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod playwright;

pub use playwright::{mcp_config_json, playwright_args, playwright_server};

/// Configuration for one stdio MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerConfig {
    /// Key the server is registered under (e.g. `"playwright"`).
    /// Tool names are namespaced as `mcp__<name>__<tool>`.
    #[serde(skip)]
    pub name: String,

    /// Executable to run (e.g. `"npx"`).
    pub command: String,

    /// Arguments passed to the command.
    pub args: Vec<String>,

    /// Environment variables to inject into the server process.
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub env: HashMap<String, String>,
}
