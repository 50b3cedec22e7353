use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::future::ready;
use std::pin::Pin;

use concierge_model::{ModelTool, ToolCallRequest, ToolCallResult};
use tracing::Instrument;

use crate::tool::ToolObject;

/// The error type for an invalid registry setup.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RegistryError {
    /// A tool with the same name has already been registered.
    DuplicateTool(String),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateTool(name) => {
                write!(f, "a tool named `{name}` is already registered")
            }
        }
    }
}

impl StdError for RegistryError {}

/// A mapping from tool name to callable tool.
///
/// The registry is populated once at startup and read-only afterwards,
/// so it is safe to share across concurrent runs.
#[derive(Default)]
pub struct Registry {
    tools: HashMap<String, Box<dyn ToolObject>>,
}

impl Registry {
    pub(crate) fn register(
        &mut self,
        tool: Box<dyn ToolObject>,
    ) -> Result<(), RegistryError> {
        let name = tool.name().to_owned();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Returns the descriptors of every registered tool, for presenting
    /// to the model alongside the messages.
    pub fn definitions(&self) -> Vec<ModelTool> {
        self.tools
            .values()
            .map(|tool| ModelTool {
                name: tool.name().to_owned(),
                description: tool.description().to_owned(),
                parameters: tool.parameter_schema().clone(),
            })
            .collect()
    }

    /// Resolves one tool call request into a result message.
    ///
    /// This never fails past the registry: an unknown tool name, invalid
    /// input, and the tool's own failures all come back as a descriptive
    /// error text tagged with the originating call id.
    pub fn dispatch(
        &self,
        req: ToolCallRequest,
    ) -> Pin<Box<dyn Future<Output = ToolCallResult> + Send>> {
        let ToolCallRequest {
            id,
            name,
            arguments,
        } = req;

        let Some(tool) = self.tools.get(&name) else {
            warn!("tool not found: {name}");
            return Box::pin(ready(ToolCallResult {
                id,
                content: format!("Error: unknown tool `{name}`"),
            }));
        };

        trace!("dispatching tool call ({id}) to `{name}` with args: {arguments:?}");
        let fut = tool.execute(arguments);
        Box::pin(
            async move {
                let content = match fut.await {
                    Ok(output) => output,
                    Err(err) => format!("Error: {}", err.reason()),
                };
                ToolCallResult { id, content }
            }
            .instrument(debug_span!("tool execute", tool = %name)),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use serde_json::{Value, json};

    use super::*;
    use crate::tool::{AnyTool, Error, Tool, ToolResult};

    static EMPTY_SCHEMA: &Value = &Value::Null;

    struct TestTool;

    impl Tool for TestTool {
        type Input = serde_json::Value;

        fn name(&self) -> &str {
            "test_tool"
        }

        fn description(&self) -> &str {
            "A test tool"
        }

        fn parameter_schema(&self) -> &Value {
            EMPTY_SCHEMA
        }

        fn execute(
            &self,
            _input: Self::Input,
        ) -> impl Future<Output = ToolResult> + Send + 'static {
            ready(Ok("success".to_owned()))
        }
    }

    struct FailingTool;

    impl Tool for FailingTool {
        type Input = serde_json::Value;

        fn name(&self) -> &str {
            "failing_tool"
        }

        fn description(&self) -> &str {
            "A tool that always fails"
        }

        fn parameter_schema(&self) -> &Value {
            EMPTY_SCHEMA
        }

        fn execute(
            &self,
            _input: Self::Input,
        ) -> impl Future<Output = ToolResult> + Send + 'static {
            ready(Err(Error::execution_error().with_reason("boom")))
        }
    }

    fn registry_with_test_tools() -> Registry {
        let mut registry = Registry::default();
        registry.register(Box::new(AnyTool(TestTool))).unwrap();
        registry.register(Box::new(AnyTool(FailingTool))).unwrap();
        registry
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = registry_with_test_tools();
        let err = registry.register(Box::new(AnyTool(TestTool))).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTool("test_tool".to_owned()));
    }

    #[test]
    fn test_definitions() {
        let registry = registry_with_test_tools();
        let mut names: Vec<_> = registry
            .definitions()
            .into_iter()
            .map(|tool| tool.name)
            .collect();
        names.sort();
        assert_eq!(names, ["failing_tool", "test_tool"]);
    }

    #[tokio::test]
    async fn test_dispatch() {
        let registry = registry_with_test_tools();
        let result = registry
            .dispatch(ToolCallRequest {
                id: "tool:1".to_owned(),
                name: "test_tool".to_owned(),
                arguments: json!({}),
            })
            .await;
        assert_eq!(result.id, "tool:1");
        assert_eq!(result.content, "success");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let registry = registry_with_test_tools();
        let result = registry
            .dispatch(ToolCallRequest {
                id: "tool:1".to_owned(),
                name: "read_tool".to_owned(),
                arguments: json!({}),
            })
            .await;
        assert_eq!(result.id, "tool:1");
        assert_eq!(result.content, "Error: unknown tool `read_tool`");
    }

    #[tokio::test]
    async fn test_dispatch_tool_failure() {
        let registry = registry_with_test_tools();
        let result = registry
            .dispatch(ToolCallRequest {
                id: "tool:2".to_owned(),
                name: "failing_tool".to_owned(),
                arguments: json!({}),
            })
            .await;
        assert_eq!(result.content, "Error: boom");
    }
}
