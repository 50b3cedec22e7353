//! Per-turn agent state.

use concierge_model::ModelMessage;

/// The ordered message history threaded through one agent run.
///
/// A state is created per conversation turn, rehydrated from whatever the
/// caller persisted, and grows append-only while the loop runs. It is
/// owned by exactly one run and never shared across conversations.
#[derive(Clone, Default, Debug)]
pub struct AgentState {
    messages: Vec<ModelMessage>,
}

impl AgentState {
    /// Creates an empty state.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state from existing history messages.
    #[inline]
    pub fn from_messages(messages: Vec<ModelMessage>) -> Self {
        Self { messages }
    }

    /// Appends a message to the state.
    #[inline]
    pub fn push(&mut self, msg: ModelMessage) {
        self.messages.push(msg);
    }

    /// Returns the messages in order.
    #[inline]
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }
}
