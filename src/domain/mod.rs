//! Core domain layer. No external I/O dependencies.
//!
//! Entities, errors and text heuristics live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod text;

pub use entities::{
    normalize_tags, BlogPost, ChatMessage, ChatReply, ChatRequest, ChatRole, FlagCategory,
    GenerateRequest, GeneratedPost, KeywordCount, ModerateRequest, ModerationFlag,
    ModerationReport, Readability, RecommendRequest, Recommendation, SeoReport, SeoRequest,
    SummarizeRequest, Summary,
};
pub use errors::DomainError;
