use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;

use concierge_model::{
    AssistantTurn, ErrorKind, ModelMessage, ModelProvider, ModelProviderError,
    ModelRequest,
};

#[derive(Debug)]
struct FakeModelProviderError(ErrorKind);

impl Display for FakeModelProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeModelProviderError {}

impl ModelProviderError for FakeModelProviderError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

struct FakeModelProvider;

impl ModelProvider for FakeModelProvider {
    type Error = FakeModelProviderError;

    fn complete_turn(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<AssistantTurn, Self::Error>> + Send + 'static
    {
        let result = 'blk: {
            let Some(msg) = req.messages.last() else {
                break 'blk Err(FakeModelProviderError(ErrorKind::Other));
            };

            let ModelMessage::User(text) = msg else {
                break 'blk Err(FakeModelProviderError(
                    ErrorKind::MalformedResponse,
                ));
            };

            Ok(AssistantTurn::text(format!("You said {text}")))
        };
        ready(result)
    }
}

mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completion() {
        let provider = FakeModelProvider;
        let req = ModelRequest {
            messages: vec![ModelMessage::User("Good morning".to_string())],
            tools: vec![],
        };
        let turn = provider.complete_turn(&req).await.unwrap();
        assert_eq!(turn.content, "You said Good morning");
        assert!(turn.is_final());
    }

    #[tokio::test]
    async fn test_error() {
        let provider = FakeModelProvider;
        let req = ModelRequest {
            messages: vec![],
            tools: vec![],
        };
        let result = provider.complete_turn(&req).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
