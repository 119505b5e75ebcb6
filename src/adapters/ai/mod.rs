//! AI adapter module. Implements LlmPort for LLM integration.
//!
//! Provides an OpenAI-compatible adapter and mock adapters for offline use and tests.

pub mod json_utils;
pub mod mock_adapter;
pub mod openai_adapter;

pub use json_utils::{parse_llm_json, sanitize_json};
pub use mock_adapter::{MockAiAdapter, ScriptedAiAdapter};
pub use openai_adapter::OpenAiAdapter;
