mod builder;
#[cfg(test)]
mod tests;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::time::Duration;

use concierge_model::{
    AssistantTurn, ModelMessage, ModelProviderError, ModelRequest,
    ToolCallRequest, ToolCallResult,
};
use futures::future;
use tokio::time::timeout;

use crate::model_client::ModelClient;
use crate::state::AgentState;
use crate::tool::Registry;
pub use builder::AgentBuilder;

const DEFAULT_MAX_ITERATIONS: usize = 8;
const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// An incremental event emitted while a run progresses.
///
/// Callers consuming a run incrementally should surface only the content
/// of the final assistant turn as the user-visible answer; assistant
/// turns that lead into tool calls carry no user-meant content.
#[derive(Clone, Debug)]
pub enum AgentEvent {
    /// A reasoning phase completed with the given turn.
    Assistant(AssistantTurn),
    /// A tool call of the current acting phase was resolved.
    ToolResult(ToolCallResult),
}

/// The error type for a failed run.
///
/// Tool-level failures never show up here; they are fed back to the model
/// as ordinary tool results. Only reasoning-level failures terminate the
/// run.
#[derive(Debug)]
pub enum RunError {
    /// The reasoning step failed.
    Model(Box<dyn ModelProviderError>),
    /// The model kept requesting tools past the configured cap.
    MaxIterationsExceeded {
        /// The configured cap on reasoning phases.
        limit: usize,
    },
}

impl Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Model(err) => write!(f, "model invocation failed: {err}"),
            RunError::MaxIterationsExceeded { limit } => {
                write!(f, "run did not complete within {limit} reasoning phases")
            }
        }
    }
}

impl StdError for RunError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            RunError::Model(err) => Some(err.as_ref()),
            RunError::MaxIterationsExceeded { .. } => None,
        }
    }
}

enum Phase {
    Reason,
    Act(Vec<ToolCallRequest>),
    Done(String),
}

/// An agent that alternates between reasoning and tool execution until
/// the model produces a final answer.
///
/// The agent itself is read-only after construction and safe to share
/// across concurrent conversations; all per-run mutable state lives in
/// the [`AgentState`] passed to [`run_turn`](Self::run_turn).
pub struct Agent {
    model_client: ModelClient,
    registry: Registry,
    system_prompt: Option<String>,
    max_iterations: usize,
    tool_timeout: Duration,
}

impl Agent {
    /// Runs one user turn to completion and returns the final answer.
    ///
    /// The state must already contain the new user message (and any prior
    /// history). Each reasoning phase appends one assistant turn; each
    /// acting phase appends exactly one tool result per call the model
    /// issued, in the order it issued them, before the model is consulted
    /// again. `on_event` observes every appended message as it happens.
    pub async fn run_turn(
        &self,
        state: &mut AgentState,
        mut on_event: impl FnMut(AgentEvent),
    ) -> Result<String, RunError> {
        let mut phase = Phase::Reason;
        let mut reason_phases = 0usize;

        loop {
            phase = match phase {
                Phase::Reason => {
                    if reason_phases == self.max_iterations {
                        warn!(
                            "giving up after {} reasoning phases",
                            self.max_iterations
                        );
                        return Err(RunError::MaxIterationsExceeded {
                            limit: self.max_iterations,
                        });
                    }
                    reason_phases += 1;

                    let turn = self
                        .model_client
                        .complete_turn(self.build_request(state))
                        .await
                        .map_err(RunError::Model)?;
                    state.push(ModelMessage::Assistant(turn.clone()));
                    on_event(AgentEvent::Assistant(turn.clone()));

                    if turn.is_final() {
                        Phase::Done(turn.content)
                    } else {
                        Phase::Act(turn.tool_calls)
                    }
                }
                Phase::Act(calls) => {
                    for result in self.resolve_tool_calls(calls).await {
                        state.push(ModelMessage::ToolResult(result.clone()));
                        on_event(AgentEvent::ToolResult(result));
                    }
                    Phase::Reason
                }
                Phase::Done(answer) => return Ok(answer),
            };
        }
    }

    fn build_request(&self, state: &AgentState) -> ModelRequest {
        let mut messages = Vec::with_capacity(state.messages().len() + 1);
        if let Some(prompt) = &self.system_prompt {
            messages.push(ModelMessage::System(prompt.clone()));
        }
        messages.extend_from_slice(state.messages());
        ModelRequest {
            messages,
            tools: self.registry.definitions(),
        }
    }

    /// Resolves the calls of one acting phase.
    ///
    /// Dispatches run concurrently, but the results come back ordered by
    /// the call order, not by completion order. A call that misses its
    /// deadline yields a timeout error text instead of blocking the run.
    async fn resolve_tool_calls(
        &self,
        calls: Vec<ToolCallRequest>,
    ) -> Vec<ToolCallResult> {
        let tool_timeout = self.tool_timeout;
        let dispatches = calls.into_iter().map(|call| {
            let id = call.id.clone();
            let name = call.name.clone();
            let fut = self.registry.dispatch(call);
            async move {
                match timeout(tool_timeout, fut).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!("tool call ({id}) to `{name}` timed out");
                        ToolCallResult {
                            id,
                            content: format!("Error: tool `{name}` timed out"),
                        }
                    }
                }
            }
        });
        future::join_all(dispatches).await
    }
}
