use serde::{Deserialize, Serialize};

/// One event emitted to the caller during a session turn.
///
/// Events are produced in strict pass-through order from the agent runtime's
/// output stream. Every stream ends with exactly one `Done`, whether or not a
/// `Result` was seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// A fragment of assistant text.
    Text { text: String },
    /// The runtime invoked a tool. Name only — inputs stay with the runtime.
    Tool { name: String },
    /// Token usage counters for the turn.
    Usage {
        input_tokens: u64,
        output_tokens: u64,
    },
    /// The final result string of the turn.
    Result { result: String },
    /// Terminal marker: the runtime's stream has ended.
    Done,
}
