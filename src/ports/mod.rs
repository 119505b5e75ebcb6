//! Port traits. API boundaries for the hexagon.
//!
//! Outbound only: the application calls into the LLM and the post store.
//! The inbound side is the HTTP adapter, which calls use cases directly.

pub mod outbound;

pub use outbound::{CompletionOptions, LlmMessage, LlmPort, PostRepoPort};
