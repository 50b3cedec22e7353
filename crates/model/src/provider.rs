use std::error::Error;

use crate::error::ErrorKind;
use crate::request::ModelRequest;
use crate::turn::AssistantTurn;

/// The error type for a model provider.
pub trait ModelProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a model provider, which is an entry for getting
/// one complete assistant turn out of a reasoning model.
///
/// Once the provider is created, it should behave like a stateless object.
/// It can still have internal state, but callers should not rely on it,
/// and the provider should be prepared for being dropped anytime.
///
/// Providers are inherently nondeterministic and may be slow or fallible;
/// implementations must bound every network call with a deadline and
/// report failures through [`Self::Error`] instead of panicking.
pub trait ModelProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ModelProviderError;

    /// Sends the conversation to the model and resolves to the turn it
    /// produced.
    ///
    /// The returned future must be independent of `self` so the caller
    /// can run it without holding the provider borrowed.
    fn complete_turn(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<AssistantTurn, Self::Error>> + Send + 'static;
}
