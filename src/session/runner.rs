use super::events::AgentEvent;
use anyhow::Result;
use async_trait::async_trait;
use tokio_stream::wrappers::ReceiverStream;

/// Common interface for agent-runtime runners.
///
/// A runner owns one runtime subprocess at a time. `query` starts a turn and
/// returns the event stream; the turn runs until the stream yields
/// [`AgentEvent::Done`] or `stop` is called.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Start one turn with the given task and return the event stream.
    async fn query(&self, task: &str) -> Result<ReceiverStream<AgentEvent>>;

    /// Kill and reap the running subprocess, if any. The in-flight stream
    /// ends with `Done` shortly after.
    async fn stop(&self) -> Result<()>;
}
