use concierge_model::{AssistantTurn, ErrorKind, ToolCallRequest};
use serde_json::Value;

/// One scripted step of the conversation script.
#[derive(Clone, Debug, PartialEq)]
pub enum PresetTurn {
    /// The model responds with the given turn.
    Respond(AssistantTurn),
    /// The request fails with the given error kind.
    Fail(ErrorKind),
}

impl PresetTurn {
    /// Creates a step that answers with plain text.
    #[inline]
    pub fn says<S: Into<String>>(text: S) -> Self {
        Self::Respond(AssistantTurn::text(text))
    }

    /// Creates a step that requests a single tool call with no interim
    /// text, which is how most models behave on tool-calling turns.
    #[inline]
    pub fn calls_tool<S1, S2>(id: S1, name: S2, arguments: Value) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self::Respond(AssistantTurn {
            content: String::new(),
            tool_calls: vec![ToolCallRequest {
                id: id.into(),
                name: name.into(),
                arguments,
            }],
        })
    }

    /// Creates a failing step.
    #[inline]
    pub fn fails(kind: ErrorKind) -> Self {
        Self::Fail(kind)
    }
}
