//! Summarize skill. Condenses an article into a short plain-text summary.

use crate::domain::{text, DomainError, SummarizeRequest, Summary};
use crate::ports::{CompletionOptions, LlmMessage, LlmPort};
use crate::usecases::contract::{Skill, SkillKind};
use std::sync::Arc;
use tracing::{debug, info};

pub const MIN_CONTENT_WORDS: usize = 100;
pub const DEFAULT_MAX_WORDS: usize = 60;
pub const MIN_MAX_WORDS: usize = 10;
pub const MAX_MAX_WORDS: usize = 300;

const SYSTEM_PROMPT: &str = "You summarize blog articles for a post listing. \
Write plain prose with no markdown, no bullet points and no preamble such as \
\"This article\". Keep the author's key claims and stay within the word limit.";

pub struct SummarizeSkill {
    llm: Arc<dyn LlmPort>,
}

impl SummarizeSkill {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }
}

#[async_trait::async_trait]
impl Skill for SummarizeSkill {
    type Input = SummarizeRequest;
    type Output = Summary;

    fn kind(&self) -> SkillKind {
        SkillKind::Summarize
    }

    fn check_pre(&self, input: &SummarizeRequest) -> Result<(), DomainError> {
        let words = text::word_count(&input.content);
        if words < MIN_CONTENT_WORDS {
            return Err(DomainError::validation(
                "CONTENT_TOO_SHORT",
                format!(
                    "content has {} words, at least {} are required",
                    words, MIN_CONTENT_WORDS
                ),
            ));
        }
        let max = input.max_words.unwrap_or(DEFAULT_MAX_WORDS);
        if !(MIN_MAX_WORDS..=MAX_MAX_WORDS).contains(&max) {
            return Err(DomainError::validation(
                "INVALID_LENGTH",
                format!(
                    "max_words must be between {} and {}",
                    MIN_MAX_WORDS, MAX_MAX_WORDS
                ),
            ));
        }
        Ok(())
    }

    async fn execute(&self, input: SummarizeRequest) -> Result<Summary, DomainError> {
        let max_words = input.max_words.unwrap_or(DEFAULT_MAX_WORDS);
        let original_words = text::word_count(&input.content);
        info!(original_words, max_words, "summarizing content");

        let plain = text::strip_markdown(&input.content);
        let messages = [
            LlmMessage::system(SYSTEM_PROMPT),
            LlmMessage::user(format!(
                "Summarize the following article in at most {} words.\n\n{}",
                max_words,
                plain.trim()
            )),
        ];
        let raw = self
            .llm
            .complete(
                &messages,
                &CompletionOptions::text(0.3).with_max_tokens((max_words as u32) * 3),
            )
            .await?;

        let mut summary = raw.trim().to_string();
        if text::word_count(&summary) > max_words {
            debug!(max_words, "truncating over-long summary");
            summary = text::truncate_words(&summary, max_words);
        }
        let summary_words = text::word_count(&summary);

        Ok(Summary {
            summary,
            original_words,
            summary_words,
            compression_ratio: summary_words as f64 / original_words.max(1) as f64,
        })
    }

    fn check_post(&self, input: &SummarizeRequest, output: &Summary) -> Result<(), DomainError> {
        if output.summary.is_empty() || output.summary_words == 0 {
            return Err(DomainError::postcondition("summarize", "summary is empty"));
        }
        let max_words = input.max_words.unwrap_or(DEFAULT_MAX_WORDS);
        if output.summary_words > max_words {
            return Err(DomainError::postcondition(
                "summarize",
                format!("summary has {} words, limit is {}", output.summary_words, max_words),
            ));
        }
        if output.summary_words >= output.original_words {
            return Err(DomainError::postcondition(
                "summarize",
                "summary is not shorter than the input",
            ));
        }
        Ok(())
    }
}
