//! Core logic including the agent loop, tool dispatch, and the model
//! client.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
mod model_client;
pub mod state;
pub mod tool;

pub use agent::{Agent, AgentBuilder, AgentEvent, RunError};
pub use model_client::ModelClient;
