// Playwright MCP server launch configuration.
//
// The browser-control process is `@playwright/mcp` run through npx. Two fixed
// argument-list variants exist:
//
//   local     — the base invocation; Playwright picks its default browser and
//               runs it however the desktop environment allows.
//   container — adds headless Chromium flags for sandboxed containers with no
//               display server and no user namespaces, plus `--isolated` so
//               no profile state leaks between sessions.
//
// Which variant is used is decided solely by the runtime kind detected from
// the environment (see `config::RuntimeKind`).

use super::McpServerConfig;
use crate::config::RuntimeKind;
use serde_json::json;
use std::collections::HashMap;

/// Registered server name. Tools surface as `mcp__playwright__browser_*`.
pub const PLAYWRIGHT_SERVER_NAME: &str = "playwright";

const PLAYWRIGHT_COMMAND: &str = "npx";
const PLAYWRIGHT_PACKAGE: &str = "@playwright/mcp@latest";

/// Build the argument list for the Playwright MCP server process.
///
/// Returns the container variant if and only if `kind` is
/// [`RuntimeKind::Container`]; otherwise the base (local) variant.
pub fn playwright_args(kind: RuntimeKind) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into(), PLAYWRIGHT_PACKAGE.into()];
    if kind == RuntimeKind::Container {
        args.extend(
            [
                "--browser",
                "chromium",
                "--headless",
                "--no-sandbox",
                "--isolated",
            ]
            .map(String::from),
        );
    }
    args
}

/// Launch configuration for the Playwright MCP server.
pub fn playwright_server(kind: RuntimeKind) -> McpServerConfig {
    McpServerConfig {
        name: PLAYWRIGHT_SERVER_NAME.to_string(),
        command: PLAYWRIGHT_COMMAND.to_string(),
        args: playwright_args(kind),
        env: HashMap::new(),
    }
}

/// Serialize a server config into the inline `--mcp-config` document the
/// agent runtime accepts: `{"mcpServers":{"<name>":{"command":...,"args":...}}}`.
pub fn mcp_config_json(server: &McpServerConfig) -> String {
    let mut entry = json!({
        "command": server.command,
        "args": server.args,
    });
    if !server.env.is_empty() {
        entry["env"] = json!(server.env);
    }

    let mut servers = serde_json::Map::new();
    servers.insert(server.name.clone(), entry);
    json!({ "mcpServers": servers }).to_string()
}

// ─── Tests ────────────────────────────────────────────────────────────────────
