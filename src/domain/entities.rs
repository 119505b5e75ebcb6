//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP, LLM or storage types here; adapters map into these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of tags kept on a post after normalization.
pub const MAX_TAGS: usize = 8;

/// A published (or generated) blog post. The slug is its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    /// Markdown body.
    pub body: String,
    pub tags: Vec<String>,
    pub category: String,
    pub reading_time_minutes: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalize a tag list: trim, lowercase, inner whitespace to `-`, drop empties,
/// dedupe keeping first occurrence, cap at [`MAX_TAGS`].
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag
            .as_ref()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();
        if tag.is_empty() || out.contains(&tag) {
            continue;
        }
        out.push(tag);
        if out.len() == MAX_TAGS {
            break;
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// A single chat turn. Conversations are passed by value in each request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Skill inputs / outputs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub topic: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub target_words: Option<usize>,
    /// Persist the generated post through the post store.
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub post: BlogPost,
    pub word_count: usize,
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub content: String,
    #[serde(default)]
    pub max_words: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub summary: String,
    pub original_words: usize,
    pub summary_words: usize,
    pub compression_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerateRequest {
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagCategory {
    PersonalInfo,
    Profanity,
    Repetition,
    Shouting,
    Spam,
    /// Raised by the LLM verdict rather than a local pattern.
    Model,
}

impl FlagCategory {
    /// Risk points contributed by a heuristic flag of this category.
    pub fn weight(self) -> u32 {
        match self {
            FlagCategory::Profanity => 40,
            FlagCategory::Spam => 35,
            FlagCategory::PersonalInfo => 25,
            FlagCategory::Shouting => 15,
            FlagCategory::Repetition => 10,
            FlagCategory::Model => 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationFlag {
    pub category: FlagCategory,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationReport {
    pub approved: bool,
    pub risk_score: u32,
    pub flags: Vec<ModerationFlag>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub focus_keyword: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Readability {
    pub flesch: f64,
    pub label: String,
    pub avg_sentence_length: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoReport {
    pub score: u32,
    pub grade: char,
    pub word_count: usize,
    pub readability: Readability,
    pub keyword_density: Option<f64>,
    pub top_keywords: Vec<KeywordCount>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub score: u32,
    pub shared_tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub post_slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: ChatMessage,
    pub messages: Vec<ChatMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(["  Rust ", "rust", "Web Dev", "", "AI"]);
        assert_eq!(tags, vec!["rust", "web-dev", "ai"]);
    }

    #[test]
    fn test_normalize_tags_caps_at_max() {
        let raw: Vec<String> = (0..20).map(|i| format!("tag{}", i)).collect();
        assert_eq!(normalize_tags(&raw).len(), MAX_TAGS);
    }

    #[test]
    fn test_chat_role_wire_format() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"role": "assistant", "content": "hi"}"#).unwrap();
        assert_eq!(msg.role, ChatRole::Assistant);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
    }
}
