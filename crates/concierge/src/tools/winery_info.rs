use std::sync::Arc;

use concierge_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

const RETRIEVAL_K: usize = 3;

/// A retrieved passage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Passage {
    /// The passage text.
    pub text: String,
}

/// A document retrieval backend.
///
/// The tool doesn't care how passages are indexed or scored, so any
/// backend (a vector store, a search service) can sit behind this
/// interface.
pub trait Retriever: Send + Sync + 'static {
    /// Returns up to `k` passages relevant to the query, best first.
    fn search(&self, query: &str, k: usize) -> Vec<Passage>;
}

/// A keyword-overlap retriever over paragraph chunks of one document.
///
/// It splits the document into paragraphs and ranks them by how many
/// distinct query terms each one contains. Crude compared to an
/// embedding index, but it needs no external service and works well for
/// a single knowledge-base document.
pub struct KeywordRetriever {
    chunks: Vec<String>,
}

impl KeywordRetriever {
    /// Builds a retriever over the given document.
    pub fn from_document(document: &str) -> Self {
        let chunks = document
            .split("\n\n")
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        KeywordRetriever { chunks }
    }
}

impl Retriever for KeywordRetriever {
    fn search(&self, query: &str, k: usize) -> Vec<Passage> {
        let query_terms = terms(query);
        let mut scored: Vec<(usize, &String)> = self
            .chunks
            .iter()
            .filter_map(|chunk| {
                let lowered = chunk.to_lowercase();
                let score = query_terms
                    .iter()
                    .filter(|term| lowered.contains(term.as_str()))
                    .count();
                (score > 0).then_some((score, chunk))
            })
            .collect();
        // Stable sort keeps document order among equally scored chunks.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(k)
            .map(|(_, chunk)| Passage {
                text: chunk.clone(),
            })
            .collect()
    }
}

fn terms(text: &str) -> Vec<String> {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|term| term.len() > 2)
        .map(str::to_lowercase)
        .collect()
}

#[derive(Deserialize, JsonSchema)]
pub struct WineryInfoParameters {
    #[schemars(description = "What to look up about the winery.")]
    query: String,
}

/// A tool that searches the winery knowledge base.
pub struct WineryInfoTool {
    retriever: Arc<dyn Retriever>,
    parameter_schema: Value,
}

impl WineryInfoTool {
    /// Creates the tool over the given retrieval backend.
    #[inline]
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        WineryInfoTool {
            retriever,
            parameter_schema: schema_for!(WineryInfoParameters).to_value(),
        }
    }
}

impl Tool for WineryInfoTool {
    type Input = WineryInfoParameters;

    fn name(&self) -> &str {
        "search_wine_business_info"
    }

    fn description(&self) -> &str {
        "Searches and returns information about the Celestial Vines Estate \
         winery. Use for questions about their history, wines, tours, \
         hours, or location."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: WineryInfoParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let retriever = Arc::clone(&self.retriever);
        async move {
            let passages = retriever.search(&input.query, RETRIEVAL_K);
            if passages.is_empty() {
                return Ok("No relevant information found.".to_owned());
            }
            let joined = passages
                .iter()
                .map(|passage| passage.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            Ok(joined)
        }
    }
}
