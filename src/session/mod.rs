pub mod claude;
pub mod events;
pub mod runner;
pub mod system_prompt;

pub use claude::{map_line, ClaudeCodeRunner, SessionError};
pub use events::AgentEvent;
pub use runner::Runner;
pub use system_prompt::{allowed_tools_arg, ALLOWED_TOOLS, RECIPE_SEARCH_PROMPT};
