//! Generate skill. Drafts a full blog post from a topic with one JSON-mode LLM call.

use crate::adapters::ai::parse_llm_json;
use crate::domain::{normalize_tags, text, BlogPost, DomainError, GenerateRequest, GeneratedPost};
use crate::ports::{CompletionOptions, LlmMessage, LlmPort};
use crate::usecases::contract::{Skill, SkillKind};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_TARGET_WORDS: usize = 800;
pub const MIN_TARGET_WORDS: usize = 200;
pub const MAX_TARGET_WORDS: usize = 3000;
pub const MAX_KEYWORDS: usize = 10;
/// Shortest body accepted from the model.
pub const MIN_BODY_WORDS: usize = 100;

const EXCERPT_CHARS: usize = 200;

const SYSTEM_PROMPT: &str = r#"You are an experienced blog writer for a personal technical blog.

## Your Task
Write one complete blog post about the topic you are given.

## Rules
- Use markdown in the body, with `##` section headings.
- Weave the requested keywords in naturally; never stuff them.
- Keep paragraphs short and concrete.
- The excerpt is one or two sentences that make a reader want to click.
- Give 3-6 short lowercase tags and one broad category.

## Output Format
You MUST respond with valid JSON only. No markdown fences, no explanations outside JSON.

{
  "title": "Post title",
  "excerpt": "One or two sentence teaser",
  "body": "Full markdown body",
  "tags": ["tag1", "tag2"],
  "category": "category"
}"#;

/// Parsed LLM response (matches the JSON schema above).
#[derive(Deserialize)]
struct LlmPost {
    title: String,
    #[serde(default)]
    excerpt: String,
    body: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    category: String,
}

pub struct GenerateSkill {
    llm: Arc<dyn LlmPort>,
}

impl GenerateSkill {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }

    fn user_prompt(input: &GenerateRequest, target_words: usize) -> String {
        let mut prompt = format!("Topic: {}\n", input.topic.trim());
        if !input.keywords.is_empty() {
            prompt.push_str(&format!("Keywords: {}\n", input.keywords.join(", ")));
        }
        prompt.push_str(&format!(
            "Tone: {}\n",
            input.tone.as_deref().unwrap_or("friendly and practical")
        ));
        prompt.push_str(&format!("Length: about {} words\n", target_words));
        prompt
    }

    fn into_post(raw: LlmPost) -> BlogPost {
        let now = Utc::now();
        let title = raw.title.trim().to_string();
        let body = raw.body.trim().to_string();
        let excerpt = if raw.excerpt.trim().is_empty() {
            text::excerpt(&body, EXCERPT_CHARS)
        } else {
            raw.excerpt.trim().to_string()
        };
        let category = match raw.category.trim() {
            "" => "general".to_string(),
            c => c.to_lowercase(),
        };
        BlogPost {
            slug: text::slugify(&title),
            excerpt,
            tags: normalize_tags(&raw.tags),
            category,
            reading_time_minutes: text::reading_time_minutes(&body),
            title,
            body,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait::async_trait]
impl Skill for GenerateSkill {
    type Input = GenerateRequest;
    type Output = GeneratedPost;

    fn kind(&self) -> SkillKind {
        SkillKind::Generate
    }

    fn check_pre(&self, input: &GenerateRequest) -> Result<(), DomainError> {
        let topic_len = input.topic.trim().chars().count();
        if !(3..=200).contains(&topic_len) {
            return Err(DomainError::validation(
                "INVALID_TOPIC",
                "topic must be between 3 and 200 characters",
            ));
        }
        if input.keywords.len() > MAX_KEYWORDS {
            return Err(DomainError::validation(
                "TOO_MANY_KEYWORDS",
                format!("at most {} keywords are allowed", MAX_KEYWORDS),
            ));
        }
        let target = input.target_words.unwrap_or(DEFAULT_TARGET_WORDS);
        if !(MIN_TARGET_WORDS..=MAX_TARGET_WORDS).contains(&target) {
            return Err(DomainError::validation(
                "INVALID_LENGTH",
                format!(
                    "target_words must be between {} and {}",
                    MIN_TARGET_WORDS, MAX_TARGET_WORDS
                ),
            ));
        }
        Ok(())
    }

    async fn execute(&self, input: GenerateRequest) -> Result<GeneratedPost, DomainError> {
        let target = input.target_words.unwrap_or(DEFAULT_TARGET_WORDS);
        info!(topic = %input.topic.trim(), target_words = target, "generating post");

        let messages = [
            LlmMessage::system(SYSTEM_PROMPT),
            LlmMessage::user(Self::user_prompt(&input, target)),
        ];
        // ~1.5 tokens per word plus JSON overhead.
        let max_tokens = (target as u32) * 2 + 300;
        let raw = self
            .llm
            .complete(&messages, &CompletionOptions::json(0.7).with_max_tokens(max_tokens))
            .await?;
        debug!(raw_len = raw.len(), "received generated post");

        let post = Self::into_post(parse_llm_json(&raw)?);
        let word_count = text::word_count(&post.body);
        Ok(GeneratedPost {
            post,
            word_count,
            saved: false,
        })
    }

    fn check_post(&self, _input: &GenerateRequest, output: &GeneratedPost) -> Result<(), DomainError> {
        if output.post.title.is_empty() {
            return Err(DomainError::postcondition("generate", "title is empty"));
        }
        if output.word_count < MIN_BODY_WORDS {
            return Err(DomainError::postcondition(
                "generate",
                format!(
                    "body has {} words, expected at least {}",
                    output.word_count, MIN_BODY_WORDS
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::ScriptedAiAdapter;
    use crate::usecases::contract::run;
    use crate::usecases::metrics::SkillMetrics;

    fn request(topic: &str) -> GenerateRequest {
        GenerateRequest {
            topic: topic.to_string(),
            keywords: vec!["axum".into()],
            tone: None,
            target_words: None,
            save: false,
        }
    }

    fn llm_reply(body_words: usize) -> String {
        serde_json::json!({
            "title": "Building Web Services in Rust!",
            "excerpt": "",
            "body": format!("## Start\n\n{}", "word ".repeat(body_words)),
            "tags": ["Rust", "Web Dev", "rust"],
            "category": ""
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_generate_builds_post() {
        let llm = Arc::new(ScriptedAiAdapter::new().with_reply(format!(
            "```json\n{}\n```",
            llm_reply(150)
        )));
        let skill = GenerateSkill::new(llm.clone());
        let out = run(&skill, request("Rust web services"), &SkillMetrics::new())
            .await
            .unwrap();

        assert_eq!(out.post.slug, "building-web-services-in-rust");
        assert_eq!(out.post.tags, vec!["rust", "web-dev"]);
        assert_eq!(out.post.category, "general");
        assert!(out.post.excerpt.starts_with("Start word word"));
        assert_eq!(out.word_count, 151);
        assert!(!out.saved);

        let calls = llm.calls();
        assert!(calls[0][1].content.contains("Topic: Rust web services"));
        assert!(calls[0][1].content.contains("Keywords: axum"));
    }

    #[tokio::test]
    async fn test_generate_rejects_short_body() {
        let llm = Arc::new(ScriptedAiAdapter::new().with_reply(llm_reply(20)));
        let skill = GenerateSkill::new(llm);
        let err = run(&skill, request("Rust web services"), &SkillMetrics::new())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "POSTCONDITION_FAILED");
    }

    #[tokio::test]
    async fn test_generate_preconditions() {
        let llm = Arc::new(ScriptedAiAdapter::new());
        let skill = GenerateSkill::new(llm.clone());
        let metrics = SkillMetrics::new();

        let err = run(&skill, request("  a "), &metrics).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_TOPIC");

        let mut req = request("valid topic");
        req.keywords = (0..11).map(|i| i.to_string()).collect();
        assert_eq!(
            run(&skill, req, &metrics).await.unwrap_err().code(),
            "TOO_MANY_KEYWORDS"
        );

        let mut req = request("valid topic");
        req.target_words = Some(50);
        assert_eq!(
            run(&skill, req, &metrics).await.unwrap_err().code(),
            "INVALID_LENGTH"
        );
        assert!(llm.calls().is_empty());
    }
}
