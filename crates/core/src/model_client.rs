use std::pin::Pin;
use std::sync::Arc;

use concierge_model::{
    AssistantTurn, ModelProvider, ModelProviderError, ModelRequest,
};
use tracing::Instrument;

type CompleteTurnResult = Result<AssistantTurn, Box<dyn ModelProviderError>>;
type BoxedCompleteTurnFuture =
    Pin<Box<dyn Future<Output = CompleteTurnResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(ModelRequest) -> BoxedCompleteTurnFuture + Send + Sync>;

/// A wrapper around a model provider that provides a type-erased
/// interface for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    /// Creates a client that forwards requests to the given provider.
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let handler_fn: HandlerFn = Arc::new(move |req| {
            let fut = provider.complete_turn(&req);
            Box::pin(
                async move {
                    trace!("got a request: {req:?}");
                    match fut.await {
                        Ok(turn) => {
                            trace!("got a turn: {turn:?}");
                            Ok(turn)
                        }
                        Err(err) => {
                            error!("got an error: {err:?}");
                            Err(Box::new(err) as Box<dyn ModelProviderError>)
                        }
                    }
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends the conversation to the model and returns the turn it
    /// produced.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. The underlying request is dropped when
    /// this operation is cancelled.
    #[inline]
    pub async fn complete_turn(
        &self,
        req: ModelRequest,
    ) -> Result<AssistantTurn, Box<dyn ModelProviderError>> {
        (self.handler_fn)(req).await
    }
}

#[cfg(test)]
mod tests {
    use concierge_model::{ErrorKind, ModelMessage};
    use concierge_test_model::{PresetTurn, ScriptedModelProvider};

    use super::*;

    #[tokio::test]
    async fn test_complete_turn() {
        let mut model_provider = ScriptedModelProvider::default();
        model_provider.add_turn(PresetTurn::says("How are you?"));

        let model_client = ModelClient::new(model_provider);
        let turn = model_client
            .complete_turn(ModelRequest {
                messages: vec![ModelMessage::User("Hi".to_owned())],
                tools: vec![],
            })
            .await
            .unwrap();
        assert_eq!(turn.content, "How are you?");
        assert!(turn.is_final());
    }

    #[tokio::test]
    async fn test_error_handling() {
        let model_provider = ScriptedModelProvider::default();
        let model_client = ModelClient::new(model_provider);
        let turn_or_err = model_client
            .complete_turn(ModelRequest {
                messages: vec![ModelMessage::User("Hi".to_owned())],
                tools: vec![],
            })
            .await;
        let err = turn_or_err.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
