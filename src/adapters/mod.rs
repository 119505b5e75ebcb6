//! Infrastructure adapters. Implement outbound ports and serve the HTTP API.
//!
//! LLM clients, post stores, markdown import, axum. Map errors to DomainError.

pub mod ai;
pub mod http;
pub mod persistence;
