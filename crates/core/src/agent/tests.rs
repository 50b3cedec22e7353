use std::future::ready;
use std::time::Duration;

use concierge_model::{
    AssistantTurn, ErrorKind, ModelMessage, ToolCallRequest,
};
use concierge_test_model::{PresetTurn, ScriptedModelProvider};
use serde_json::{Value, json};
use tokio::time::sleep;

use crate::state::AgentState;
use crate::tool::{Error as ToolError, Tool, ToolResult};
use crate::{AgentBuilder, AgentEvent, RunError};

static EMPTY_SCHEMA: &Value = &Value::Null;

#[derive(serde::Deserialize)]
struct EchoInput {
    text: String,
}

struct EchoTool;

impl Tool for EchoTool {
    type Input = EchoInput;

    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes the given text"
    }

    fn parameter_schema(&self) -> &Value {
        EMPTY_SCHEMA
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Ok(format!("echo: {}", input.text)))
    }
}

struct FailingTool;

impl Tool for FailingTool {
    type Input = serde_json::Value;

    fn name(&self) -> &str {
        "failing"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameter_schema(&self) -> &Value {
        EMPTY_SCHEMA
    }

    fn execute(
        &self,
        _input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        ready(Err(ToolError::execution_error().with_reason("boom")))
    }
}

struct SlowTool;

impl Tool for SlowTool {
    type Input = serde_json::Value;

    fn name(&self) -> &str {
        "slow"
    }

    fn description(&self) -> &str {
        "Never finishes in time"
    }

    fn parameter_schema(&self) -> &Value {
        EMPTY_SCHEMA
    }

    fn execute(
        &self,
        _input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        async {
            sleep(Duration::from_secs(3600)).await;
            Ok("too late".to_owned())
        }
    }
}

fn user_state(text: &str) -> AgentState {
    AgentState::from_messages(vec![ModelMessage::User(text.to_owned())])
}

fn tool_call(id: &str, name: &str, arguments: Value) -> ToolCallRequest {
    ToolCallRequest {
        id: id.to_owned(),
        name: name.to_owned(),
        arguments,
    }
}

#[tokio::test]
async fn test_direct_answer() {
    let mut provider = ScriptedModelProvider::default();
    provider.add_turn(PresetTurn::says("Hi there!"));

    let agent = AgentBuilder::with_model_provider(provider)
        .with_tool(EchoTool)
        .build()
        .unwrap();

    let mut state = user_state("Hello");
    let answer = agent.run_turn(&mut state, |_| {}).await.unwrap();
    assert_eq!(answer, "Hi there!");

    // A turn with no tool calls terminates immediately: one user message,
    // one assistant message, never a tool result.
    assert_eq!(state.messages().len(), 2);
    assert!(matches!(state.messages()[0], ModelMessage::User(_)));
    assert!(matches!(state.messages()[1], ModelMessage::Assistant(_)));
}

#[tokio::test]
async fn test_tool_round_trip() {
    let mut provider = ScriptedModelProvider::default();
    provider.add_turn(PresetTurn::Respond(AssistantTurn {
        content: String::new(),
        tool_calls: vec![
            tool_call("tool:1", "echo", json!({ "text": "first" })),
            tool_call("tool:2", "echo", json!({ "text": "second" })),
        ],
    }));
    provider.add_turn(PresetTurn::says("Both done."));

    let agent = AgentBuilder::with_model_provider(provider)
        .with_tool(EchoTool)
        .build()
        .unwrap();

    let mut state = user_state("Echo twice");
    let mut events = Vec::new();
    let answer = agent
        .run_turn(&mut state, |event| events.push(event))
        .await
        .unwrap();
    assert_eq!(answer, "Both done.");

    // Exactly one result per call, ordered by the call order.
    let results: Vec<_> = state
        .messages()
        .iter()
        .filter_map(|msg| match msg {
            ModelMessage::ToolResult(result) => Some(result),
            _ => None,
        })
        .collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "tool:1");
    assert_eq!(results[0].content, "echo: first");
    assert_eq!(results[1].id, "tool:2");
    assert_eq!(results[1].content, "echo: second");

    // Events mirror the appended messages.
    assert!(matches!(events[0], AgentEvent::Assistant(_)));
    assert!(matches!(events[1], AgentEvent::ToolResult(_)));
    assert!(matches!(events[2], AgentEvent::ToolResult(_)));
    assert!(matches!(events[3], AgentEvent::Assistant(_)));
    assert_eq!(events.len(), 4);
}

#[tokio::test]
async fn test_unknown_tool_reported_to_model() {
    let mut provider = ScriptedModelProvider::default();
    provider.add_turn(PresetTurn::calls_tool("tool:1", "nope", json!({})));
    provider.add_turn(PresetTurn::says("I see, that tool is unavailable."));

    let agent = AgentBuilder::with_model_provider(provider)
        .with_tool(EchoTool)
        .build()
        .unwrap();

    let mut state = user_state("Use a tool");
    let answer = agent.run_turn(&mut state, |_| {}).await.unwrap();
    assert_eq!(answer, "I see, that tool is unavailable.");

    let ModelMessage::ToolResult(result) = &state.messages()[2] else {
        panic!("expected a tool result message");
    };
    assert_eq!(result.id, "tool:1");
    assert_eq!(result.content, "Error: unknown tool `nope`");
}

#[tokio::test]
async fn test_invalid_input_reported_to_model() {
    let mut provider = ScriptedModelProvider::default();
    provider.add_turn(PresetTurn::calls_tool(
        "tool:1",
        "echo",
        json!({ "text": 42 }),
    ));
    provider.add_turn(PresetTurn::says("Let me try something else."));

    let agent = AgentBuilder::with_model_provider(provider)
        .with_tool(EchoTool)
        .build()
        .unwrap();

    let mut state = user_state("Echo a number");
    agent.run_turn(&mut state, |_| {}).await.unwrap();

    let ModelMessage::ToolResult(result) = &state.messages()[2] else {
        panic!("expected a tool result message");
    };
    assert!(result.content.starts_with("Error: "));
}

#[tokio::test]
async fn test_tool_failure_becomes_result() {
    let mut provider = ScriptedModelProvider::default();
    provider.add_turn(PresetTurn::calls_tool("tool:1", "failing", json!({})));
    provider.add_turn(PresetTurn::says("The tool failed."));

    let agent = AgentBuilder::with_model_provider(provider)
        .with_tool(FailingTool)
        .build()
        .unwrap();

    let mut state = user_state("Try the failing tool");
    let answer = agent.run_turn(&mut state, |_| {}).await.unwrap();
    assert_eq!(answer, "The tool failed.");

    let ModelMessage::ToolResult(result) = &state.messages()[2] else {
        panic!("expected a tool result message");
    };
    assert_eq!(result.content, "Error: boom");
}

#[tokio::test(start_paused = true)]
async fn test_tool_timeout_becomes_result() {
    let mut provider = ScriptedModelProvider::default();
    provider.add_turn(PresetTurn::calls_tool("tool:1", "slow", json!({})));
    provider.add_turn(PresetTurn::says("That took too long."));

    let agent = AgentBuilder::with_model_provider(provider)
        .with_tool(SlowTool)
        .with_tool_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let mut state = user_state("Run the slow tool");
    let answer = agent.run_turn(&mut state, |_| {}).await.unwrap();
    assert_eq!(answer, "That took too long.");

    let ModelMessage::ToolResult(result) = &state.messages()[2] else {
        panic!("expected a tool result message");
    };
    assert_eq!(result.content, "Error: tool `slow` timed out");
}

#[tokio::test]
async fn test_max_iterations() {
    let mut provider = ScriptedModelProvider::default();
    provider.add_turn(PresetTurn::calls_tool(
        "tool:1",
        "echo",
        json!({ "text": "again" }),
    ));
    provider.repeat_last();
    let call_counter = provider.clone();

    let agent = AgentBuilder::with_model_provider(provider)
        .with_tool(EchoTool)
        .with_max_iterations(3)
        .build()
        .unwrap();

    let mut state = user_state("Loop forever");
    let err = agent.run_turn(&mut state, |_| {}).await.unwrap_err();
    assert!(matches!(err, RunError::MaxIterationsExceeded { limit: 3 }));

    // Exactly the capped number of reasoning phases ran, no more.
    assert_eq!(call_counter.requests_served(), 3);
}

#[tokio::test]
async fn test_model_error_terminates_run() {
    let mut provider = ScriptedModelProvider::default();
    provider.add_turn(PresetTurn::fails(ErrorKind::RateLimitExceeded));

    let agent = AgentBuilder::with_model_provider(provider)
        .build()
        .unwrap();

    let mut state = user_state("Hello");
    let err = agent.run_turn(&mut state, |_| {}).await.unwrap_err();
    let RunError::Model(err) = err else {
        panic!("expected a model error");
    };
    assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);

    // The failing reasoning phase appended nothing.
    assert_eq!(state.messages().len(), 1);
}

#[tokio::test]
async fn test_system_prompt_not_persisted() {
    let mut provider = ScriptedModelProvider::default();
    provider.add_turn(PresetTurn::says("Welcome to the estate."));

    let agent = AgentBuilder::with_model_provider(provider)
        .with_system_prompt("You are a friendly concierge.")
        .build()
        .unwrap();

    let mut state = user_state("Hi");
    agent.run_turn(&mut state, |_| {}).await.unwrap();

    // The prompt goes into every request, not into the run's state.
    assert!(
        !state
            .messages()
            .iter()
            .any(|msg| matches!(msg, ModelMessage::System(_)))
    );
}

#[test]
fn test_duplicate_tool_is_fatal() {
    let provider = ScriptedModelProvider::default();
    let result = AgentBuilder::with_model_provider(provider)
        .with_tool(EchoTool)
        .with_tool(EchoTool)
        .build();
    let Err(err) = result else {
        panic!("expected a duplicate tool error");
    };
    assert_eq!(
        err,
        crate::tool::RegistryError::DuplicateTool("echo".to_owned())
    );
}
