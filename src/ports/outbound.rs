//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{BlogPost, ChatRole, DomainError};

/// One message of an LLM prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmMessage {
    pub role: ChatRole,
    pub content: String,
}

impl LlmMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Sampling options for a single completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Ask the provider for a JSON object response.
    pub json: bool,
}

impl CompletionOptions {
    pub fn text(temperature: f32) -> Self {
        Self {
            temperature,
            max_tokens: None,
            json: false,
        }
    }

    pub fn json(temperature: f32) -> Self {
        Self {
            temperature,
            max_tokens: None,
            json: true,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// LLM gateway. One call per skill invocation; no retries at this layer.
#[async_trait::async_trait]
pub trait LlmPort: Send + Sync {
    /// Send the prompt and return the raw text of the first choice.
    async fn complete(
        &self,
        messages: &[LlmMessage],
        options: &CompletionOptions,
    ) -> Result<String, DomainError>;

    /// Model identifier, reported by the health endpoint.
    fn model(&self) -> &str;
}

/// Post store. Slug is the key; saving an existing slug replaces it.
#[async_trait::async_trait]
pub trait PostRepoPort: Send + Sync {
    async fn save_post(&self, post: &BlogPost) -> Result<(), DomainError>;

    /// Insert only if the slug is free. Returns false when it is taken.
    async fn insert_post(&self, post: &BlogPost) -> Result<bool, DomainError>;

    async fn get_post(&self, slug: &str) -> Result<Option<BlogPost>, DomainError>;

    /// Newest first (by `created_at`, then slug).
    async fn list_posts(&self, limit: u32, offset: u32) -> Result<Vec<BlogPost>, DomainError>;

    /// Returns false when no post had this slug.
    async fn delete_post(&self, slug: &str) -> Result<bool, DomainError>;

    async fn count_posts(&self) -> Result<u64, DomainError>;
}
