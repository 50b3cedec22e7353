/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request did not complete within the deadline.
    Timeout,
    /// The provider rejected the configured credential.
    InvalidCredential,
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// The provider returned a payload the client could not interpret.
    MalformedResponse,
    /// Any other errors.
    Other,
}
