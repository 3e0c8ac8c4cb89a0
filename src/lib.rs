pub mod config;
pub mod mcp;
pub mod session;

pub use config::{AgentConfig, RuntimeKind};
pub use session::{AgentEvent, ClaudeCodeRunner, Runner};
