use std::fmt::Write as _;

use concierge_core::tool::{Error as ToolError, Tool, ToolResult};
use reqwest::Client;
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::{Value, json};

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";
const MAX_RESULTS: usize = 3;

#[derive(Deserialize, JsonSchema)]
pub struct WebSearchParameters {
    #[schemars(description = "The search query.")]
    query: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    url: String,
}

/// A tool for searching the web via the Tavily search API.
pub struct WebSearchTool {
    client: Client,
    api_key: String,
    parameter_schema: Value,
}

impl WebSearchTool {
    /// Creates a new web search tool.
    #[inline]
    pub fn new(client: Client, api_key: String) -> Self {
        WebSearchTool {
            client,
            api_key,
            parameter_schema: schema_for!(WebSearchParameters).to_value(),
        }
    }
}

impl Tool for WebSearchTool {
    type Input = WebSearchParameters;

    fn name(&self) -> &str {
        "tavily_search"
    }

    fn description(&self) -> &str {
        "Searches the web for current information. Use this for news, \
         facts, and anything not covered by the winery knowledge base."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: WebSearchParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        let api_key = self.api_key.clone();
        async move {
            debug!("searching the web for: {}", input.query);
            let resp = client
                .post(TAVILY_SEARCH_URL)
                .json(&json!({
                    "api_key": api_key,
                    "query": input.query,
                    "max_results": MAX_RESULTS,
                }))
                .send()
                .await
                .map_err(|err| {
                    ToolError::execution_error()
                        .with_reason(format!("search request failed: {err}"))
                })?;
            let status = resp.status();
            if !status.is_success() {
                return Err(ToolError::execution_error()
                    .with_reason(format!("search service returned HTTP {status}")));
            }
            let payload: SearchResponse = resp.json().await.map_err(|err| {
                ToolError::execution_error()
                    .with_reason(format!("malformed search response: {err}"))
            })?;
            Ok(format_results(&payload.results))
        }
    }
}

fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results found.".to_owned();
    }

    let mut rendered = String::new();
    for (n, result) in results.iter().enumerate() {
        if n > 0 {
            rendered.push_str("\n\n");
        }
        _ = write!(
            rendered,
            "[{}] {}\n{}\nSource: {}",
            n + 1,
            result.title,
            result.content,
            result.url
        );
    }
    rendered
}
