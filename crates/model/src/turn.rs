use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One complete assistant turn produced by a model provider.
///
/// The turn is final when `tool_calls` is empty, in which case `content`
/// carries the user-facing answer. A non-empty `tool_calls` means the
/// model wants the listed tools resolved before it continues, and
/// `content` (if any) is interim text that is not meant for the user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssistantTurn {
    /// The text content of the turn.
    pub content: String,
    /// Tool calls requested by the model, in the order it issued them.
    pub tool_calls: Vec<ToolCallRequest>,
}

impl AssistantTurn {
    /// Creates a text-only turn.
    #[inline]
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Returns `true` if this turn is a final answer.
    #[inline]
    pub fn is_final(&self) -> bool {
        self.tool_calls.is_empty()
    }
}

/// Describes a tool call request from the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// The unique identifier for the tool call request.
    pub id: String,
    /// The name of the tool to call.
    pub name: String,
    /// The arguments to pass to the tool.
    pub arguments: Value,
}
