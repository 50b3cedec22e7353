use std::time::Duration;

use concierge_model::ModelProvider;

use super::{Agent, DEFAULT_MAX_ITERATIONS, DEFAULT_TOOL_TIMEOUT};
use crate::model_client::ModelClient;
use crate::tool::{AnyTool, Registry, RegistryError, Tool, ToolObject};

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    tools: Vec<Box<dyn ToolObject>>,
    system_prompt: Option<String>,
    max_iterations: usize,
    tool_timeout: Duration,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            tools: vec![],
            system_prompt: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Sets the system prompt prepended to every model request.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.tools.push(Box::new(AnyTool(tool)));
        self
    }

    /// Caps how many reasoning phases one run may take.
    #[inline]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the per-call deadline for tool execution.
    #[inline]
    pub fn with_tool_timeout(mut self, tool_timeout: Duration) -> Self {
        self.tool_timeout = tool_timeout;
        self
    }

    /// Builds the agent.
    ///
    /// Fails if two registered tools share a name; that is a setup error
    /// the process should not start with.
    pub fn build(self) -> Result<Agent, RegistryError> {
        let mut registry = Registry::default();
        for tool in self.tools {
            registry.register(tool)?;
        }
        Ok(Agent {
            model_client: self.model_client,
            registry,
            system_prompt: self.system_prompt,
            max_iterations: self.max_iterations,
            tool_timeout: self.tool_timeout,
        })
    }
}
