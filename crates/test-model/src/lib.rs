//! A local fake model for testing purpose.

mod preset;

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use concierge_model::{
    AssistantTurn, ErrorKind, ModelMessage, ModelProvider, ModelProviderError,
    ModelRequest,
};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the conversation script,
/// which is how the model should respond to each request. The step is
/// selected by counting the assistant turns already present in the
/// request, so appended tool results don't shift the script. If there
/// are no enough steps in the script, an error will be returned, unless
/// [`repeat_last`](Self::repeat_last) is set.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct ScriptedModelProvider {
    script: Vec<PresetTurn>,
    repeat_last: bool,
    requests_served: Arc<AtomicUsize>,
}

impl ScriptedModelProvider {
    /// Appends a step to the conversation script.
    #[inline]
    pub fn add_turn(&mut self, preset: PresetTurn) {
        self.script.push(preset);
    }

    /// Keeps replaying the last scripted step once the script runs out.
    ///
    /// Useful for simulating a model that never stops requesting tools.
    #[inline]
    pub fn repeat_last(&mut self) {
        self.repeat_last = true;
    }

    /// Returns how many requests this provider has served so far.
    ///
    /// The counter is shared across clones of the provider.
    #[inline]
    pub fn requests_served(&self) -> usize {
        self.requests_served.load(Ordering::Relaxed)
    }
}

impl ModelProvider for ScriptedModelProvider {
    type Error = Error;

    fn complete_turn(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<AssistantTurn, Self::Error>> + Send + 'static
    {
        self.requests_served.fetch_add(1, Ordering::Relaxed);

        let step_idx = req
            .messages
            .iter()
            .filter(|msg| matches!(msg, ModelMessage::Assistant(_)))
            .count();
        let step = if step_idx < self.script.len() {
            Some(&self.script[step_idx])
        } else if self.repeat_last {
            self.script.last()
        } else {
            None
        };

        let result = match step {
            None => Err(Error {
                message: "no enough steps",
                kind: ErrorKind::Other,
            }),
            Some(PresetTurn::Fail(kind)) => Err(Error {
                message: "scripted failure",
                kind: *kind,
            }),
            Some(PresetTurn::Respond(turn)) => Ok(turn.clone()),
        };
        ready(result)
    }
}
