//! Mock AI adapters for running without API calls.
//!
//! `MockAiAdapter` returns canned but well-formed replies so every skill works
//! offline. `ScriptedAiAdapter` replays queued replies and records prompts (tests).

use crate::domain::{text, ChatRole, DomainError};
use crate::ports::{CompletionOptions, LlmMessage, LlmPort};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

/// Offline LLM stand-in.
///
/// Picks the reply shape from the prompt: JSON mode with a moderation schema gets a
/// clean verdict, other JSON requests get a generated post, and text requests get
/// either a summary or a chat reply. Simulates network latency with a configurable delay.
pub struct MockAiAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockAiAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self { delay_ms: 100 }
    }

    /// Create a mock adapter with custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    fn system_prompt(messages: &[LlmMessage]) -> &str {
        messages
            .iter()
            .find(|m| m.role == ChatRole::System)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    fn last_user(messages: &[LlmMessage]) -> &str {
        messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    fn mock_post(prompt: &str) -> String {
        let topic = prompt
            .lines()
            .find_map(|l| l.strip_prefix("Topic:"))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("Something Worth Writing About");

        let paragraph = format!(
            "This mock paragraph talks about {topic} in plain words. It explains why \
             {topic} matters to readers, how to get started, and which small habits make \
             the biggest difference over time. Each sentence stays short so the text reads \
             easily, and the examples stay concrete."
        );
        let body = format!(
            "## Why {topic}\n\n{p}\n\n## Getting started\n\n{p}\n\n## Going further\n\n{p}\n\n\
             ## Wrapping up\n\n{p}",
            p = paragraph
        );
        serde_json::json!({
            "title": format!("[MOCK] A Practical Guide to {}", topic),
            "excerpt": format!("A short, practical look at {}.", topic),
            "body": body,
            "tags": ["mock", topic],
            "category": "general",
        })
        .to_string()
    }
}

impl Default for MockAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmPort for MockAiAdapter {
    async fn complete(
        &self,
        messages: &[LlmMessage],
        options: &CompletionOptions,
    ) -> Result<String, DomainError> {
        info!(
            messages = messages.len(),
            json = options.json,
            "[MOCK] Simulating completion"
        );

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        let system = Self::system_prompt(messages);
        let user = Self::last_user(messages);

        if options.json {
            if system.contains("\"flagged\"") {
                return Ok(r#"{"flagged": false, "categories": [], "reason": "[MOCK] no issues found"}"#
                    .to_string());
            }
            return Ok(Self::mock_post(user));
        }

        if system.to_lowercase().contains("summar") {
            let body = user.split_once("\n\n").map(|(_, b)| b).unwrap_or(user);
            return Ok(format!("[MOCK] {}", text::truncate_words(body, 20)));
        }

        Ok(format!(
            "[MOCK] Thanks for asking about \"{}\". Configure BLOG_AI_API_KEY for real answers.",
            text::truncate_words(user, 12)
        ))
    }

    fn model(&self) -> &str {
        "mock"
    }
}

/// Replays queued replies in order and records every prompt it receives.
#[derive(Default)]
pub struct ScriptedAiAdapter {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<Vec<LlmMessage>>>,
}

impl ScriptedAiAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push_reply(reply);
        self
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut q) = self.replies.lock() {
            q.push_back(Ok(reply.into()));
        }
    }

    /// Queue a failure surfaced as `DomainError::Ai`.
    pub fn push_error(&self, message: impl Into<String>) {
        if let Ok(mut q) = self.replies.lock() {
            q.push_back(Err(message.into()));
        }
    }

    pub fn calls(&self) -> Vec<Vec<LlmMessage>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl LlmPort for ScriptedAiAdapter {
    async fn complete(
        &self,
        messages: &[LlmMessage],
        _options: &CompletionOptions,
    ) -> Result<String, DomainError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        let next = self
            .replies
            .lock()
            .map_err(|_| DomainError::Ai("scripted adapter poisoned".to_string()))?
            .pop_front();
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(DomainError::Ai(message)),
            None => Err(DomainError::Ai("no scripted reply left".to_string())),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
