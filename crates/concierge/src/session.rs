use std::time::Duration;

use concierge_core::state::AgentState;
use concierge_core::tool::{RegistryError, Tool};
use concierge_core::{Agent, AgentBuilder, RunError};
use concierge_model::{AssistantTurn, ModelMessage, ModelProvider};

const MODEL_FAILURE_FALLBACK: &str =
    "Sorry, an error occurred. Please check the server logs or try again.";
const GAVE_UP_FALLBACK: &str =
    "Sorry, I could not complete that request. Please try asking in a different way.";

/// One prior exchange in the chat history kept by the front end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatTurn {
    /// What the user said.
    pub user: String,
    /// The recorded reply, or `None` if the turn has no reply yet.
    pub assistant: Option<String>,
}

/// Builds the agent state for a new turn from the persisted history.
///
/// Turns are replayed in order as user and assistant messages, then the
/// new user message is appended last. Tool traffic from earlier turns is
/// not part of the history and never reaches the model again.
pub fn state_from_history(history: &[ChatTurn], message: &str) -> AgentState {
    let mut messages = Vec::with_capacity(history.len() * 2 + 1);
    for turn in history {
        messages.push(ModelMessage::User(turn.user.clone()));
        if let Some(assistant) = &turn.assistant {
            messages.push(ModelMessage::Assistant(AssistantTurn::text(assistant.clone())));
        }
    }
    messages.push(ModelMessage::User(message.to_owned()));
    AgentState::from_messages(messages)
}

/// Maps a completed run to the text shown to the user.
///
/// An answer passes through unchanged. Loop-level failures are logged and
/// collapsed to a graceful fallback message, so the front end never has
/// to surface a raw error.
pub fn extract_answer(run: Result<String, RunError>) -> String {
    match run {
        Ok(answer) => answer,
        Err(err @ RunError::Model(_)) => {
            error!("turn failed: {err}");
            MODEL_FAILURE_FALLBACK.to_owned()
        }
        Err(err @ RunError::MaxIterationsExceeded { .. }) => {
            error!("turn failed: {err}");
            GAVE_UP_FALLBACK.to_owned()
        }
    }
}

/// A builder for configuring and creating [`Session`] objects.
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
}

impl SessionBuilder {
    /// Creates a new builder with the given model provider.
    pub fn with_model_provider<P: ModelProvider + 'static>(provider: P) -> Self {
        Self {
            agent_builder: AgentBuilder::with_model_provider(provider),
        }
    }

    /// Sets the system prompt for the session.
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.agent_builder = self.agent_builder.with_system_prompt(prompt);
        self
    }

    /// Adds a tool the model can use.
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.agent_builder = self.agent_builder.with_tool(tool);
        self
    }

    /// Overrides the cap on reasoning phases per turn.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.agent_builder = self.agent_builder.with_max_iterations(max_iterations);
        self
    }

    /// Overrides the per-call tool timeout.
    pub fn with_tool_timeout(mut self, tool_timeout: Duration) -> Self {
        self.agent_builder = self.agent_builder.with_tool_timeout(tool_timeout);
        self
    }

    /// Builds the session.
    pub fn build(self) -> Result<Session, RegistryError> {
        Ok(Session {
            agent: self.agent_builder.build()?,
        })
    }
}

/// A chat session, the front end's entry into the agent.
///
/// The session holds a fully configured agent and derives a fresh state
/// from the provided history on every call, so one session can serve any
/// number of independent conversations.
pub struct Session {
    agent: Agent,
}

impl Session {
    /// Runs one user turn and returns the text to display.
    pub async fn respond(&self, history: &[ChatTurn], message: &str) -> String {
        let mut state = state_from_history(history, message);
        let run = self.agent.run_turn(&mut state, |_| {}).await;
        extract_answer(run)
    }
}
