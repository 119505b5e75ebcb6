//! Chat skill. Blog assistant replies, optionally grounded in one stored post.

use crate::domain::{text, ChatMessage, ChatReply, ChatRequest, ChatRole, DomainError};
use crate::ports::{CompletionOptions, LlmMessage, LlmPort, PostRepoPort};
use crate::usecases::contract::{Skill, SkillKind};
use std::sync::Arc;
use tracing::{debug, warn};

pub const MAX_MESSAGES: usize = 50;
pub const MAX_MESSAGE_CHARS: usize = 4000;
/// History turns forwarded to the model.
const HISTORY_WINDOW: usize = 20;
const CONTEXT_CHARS: usize = 6000;

const SYSTEM_PROMPT: &str = "You are the assistant of a personal technical blog. \
Answer readers' questions clearly and briefly, in a friendly tone. When a post is \
provided as context, base your answer on it and say so when the post does not cover \
the question. Never invent links or quotes.";

pub struct ChatSkill {
    llm: Arc<dyn LlmPort>,
    repo: Arc<dyn PostRepoPort>,
}

impl ChatSkill {
    pub fn new(llm: Arc<dyn LlmPort>, repo: Arc<dyn PostRepoPort>) -> Self {
        Self { llm, repo }
    }

    /// Post context block, or None when no slug was given or it is unknown.
    async fn post_context(&self, slug: Option<&str>) -> Result<Option<String>, DomainError> {
        let Some(slug) = slug.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        match self.repo.get_post(slug).await? {
            Some(post) => {
                let body: String = text::strip_markdown(&post.body)
                    .chars()
                    .take(CONTEXT_CHARS)
                    .collect();
                Ok(Some(format!(
                    "The reader is looking at this post.\n\nTitle: {}\n\n{}",
                    post.title,
                    body.trim()
                )))
            }
            None => {
                warn!(slug, "chat context post not found, answering without it");
                Ok(None)
            }
        }
    }
}

#[async_trait::async_trait]
impl Skill for ChatSkill {
    type Input = ChatRequest;
    type Output = ChatReply;

    fn kind(&self) -> SkillKind {
        SkillKind::Chat
    }

    fn check_pre(&self, input: &ChatRequest) -> Result<(), DomainError> {
        let Some(last) = input.messages.last() else {
            return Err(DomainError::validation(
                "EMPTY_CONVERSATION",
                "at least one message is required",
            ));
        };
        if input.messages.len() > MAX_MESSAGES {
            return Err(DomainError::validation(
                "CONVERSATION_TOO_LONG",
                format!("at most {} messages are allowed", MAX_MESSAGES),
            ));
        }
        if let Some(i) = input.messages.iter().position(|m| m.role == ChatRole::System) {
            return Err(DomainError::validation(
                "INVALID_ROLE",
                format!("message {} has role system, which clients may not send", i),
            ));
        }
        if let Some(i) = input.messages.iter().position(|m| {
            m.content.trim().is_empty() || m.content.chars().count() > MAX_MESSAGE_CHARS
        }) {
            return Err(DomainError::validation(
                "INVALID_MESSAGE",
                format!(
                    "message {} must be non-empty and at most {} characters",
                    i, MAX_MESSAGE_CHARS
                ),
            ));
        }
        if last.role != ChatRole::User {
            return Err(DomainError::validation(
                "INVALID_TURN",
                "the last message must come from the user",
            ));
        }
        Ok(())
    }

    async fn execute(&self, input: ChatRequest) -> Result<ChatReply, DomainError> {
        let mut prompt = vec![LlmMessage::system(SYSTEM_PROMPT)];
        if let Some(context) = self.post_context(input.post_slug.as_deref()).await? {
            prompt.push(LlmMessage::system(context));
        }
        let skip = input.messages.len().saturating_sub(HISTORY_WINDOW);
        prompt.extend(input.messages.iter().skip(skip).map(|m| LlmMessage {
            role: m.role,
            content: m.content.clone(),
        }));
        debug!(turns = prompt.len(), "sending chat turn");

        let raw = self
            .llm
            .complete(&prompt, &CompletionOptions::text(0.7).with_max_tokens(800))
            .await?;

        let reply = ChatMessage::assistant(raw.trim());
        let mut messages = input.messages;
        messages.push(reply.clone());
        Ok(ChatReply { reply, messages })
    }

    fn check_post(&self, _input: &ChatRequest, output: &ChatReply) -> Result<(), DomainError> {
        if output.reply.content.is_empty() {
            return Err(DomainError::postcondition("chat", "reply is empty"));
        }
        Ok(())
    }
}
