//! An out-of-the-box conversational concierge for Celestial Vines Estate.
//!
//! The crate wires the agent core to a Gemini reasoning model and three
//! tools: winery knowledge retrieval, web search and weather lookup. A
//! terminal chat front end ships as the `concierge` binary, and the
//! [`Session`] type lets host apps embed the same concierge behind their
//! own user interface.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod config;
mod session;
pub mod tools;

pub use config::{Config, ConfigError};
pub use session::{ChatTurn, Session, SessionBuilder, extract_answer, state_from_history};

/// Re-exports of [`concierge_core`] crate.
pub mod core {
    pub use concierge_core::*;
}
