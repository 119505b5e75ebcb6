//! Recommend skill. Ranks stored posts by similarity to a source post, no LLM call.
//!
//! score = round(100 * (0.5 * tag jaccard + 0.3 * title dice + 0.2 * keyword jaccard))

use crate::domain::{normalize_tags, text, BlogPost, DomainError, RecommendRequest, Recommendation};
use crate::ports::PostRepoPort;
use crate::usecases::contract::{Skill, SkillKind};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_LIMIT: usize = 3;
pub const MAX_LIMIT: usize = 10;
/// Upper bound on posts considered per request.
const MAX_CANDIDATES: u32 = 500;
const KEYWORDS_PER_POST: usize = 10;

const TAG_WEIGHT: f64 = 0.5;
const TITLE_WEIGHT: f64 = 0.3;
const KEYWORD_WEIGHT: f64 = 0.2;

/// What a candidate is compared against.
struct Source {
    slug: Option<String>,
    title: String,
    tags: Vec<String>,
    keywords: Vec<String>,
}

fn keywords(body: &str) -> Vec<String> {
    text::top_keywords(&text::strip_markdown(body), KEYWORDS_PER_POST)
        .into_iter()
        .map(|(k, _)| k)
        .collect()
}

fn score(source: &Source, candidate: &BlogPost) -> u32 {
    let tags = text::jaccard(&source.tags, &candidate.tags);
    let title = text::dice_similarity(&source.title, &candidate.title);
    let body = text::jaccard(&source.keywords, &keywords(&candidate.body));
    let raw = TAG_WEIGHT * tags + TITLE_WEIGHT * title + KEYWORD_WEIGHT * body;
    (raw * 100.0).round().clamp(0.0, 100.0) as u32
}

pub struct RecommendSkill {
    repo: Arc<dyn PostRepoPort>,
}

impl RecommendSkill {
    pub fn new(repo: Arc<dyn PostRepoPort>) -> Self {
        Self { repo }
    }

    async fn source(&self, input: &RecommendRequest) -> Result<Source, DomainError> {
        if let Some(slug) = input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let post = self
                .repo
                .get_post(slug)
                .await?
                .ok_or_else(|| DomainError::NotFound(format!("post '{}'", slug)))?;
            return Ok(Source {
                slug: Some(post.slug),
                keywords: keywords(&post.body),
                title: post.title,
                tags: post.tags,
            });
        }
        Ok(Source {
            slug: None,
            title: input.title.clone().unwrap_or_default(),
            tags: normalize_tags(&input.tags),
            keywords: input.content.as_deref().map(keywords).unwrap_or_default(),
        })
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

#[async_trait::async_trait]
impl Skill for RecommendSkill {
    type Input = RecommendRequest;
    type Output = Vec<Recommendation>;

    fn kind(&self) -> SkillKind {
        SkillKind::Recommend
    }

    fn check_pre(&self, input: &RecommendRequest) -> Result<(), DomainError> {
        if !has_text(&input.slug) && !has_text(&input.title) {
            return Err(DomainError::validation(
                "MISSING_SOURCE",
                "either slug or title is required",
            ));
        }
        let limit = input.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(DomainError::validation(
                "INVALID_LIMIT",
                format!("limit must be between 1 and {}", MAX_LIMIT),
            ));
        }
        Ok(())
    }

    async fn execute(&self, input: RecommendRequest) -> Result<Vec<Recommendation>, DomainError> {
        let limit = input.limit.unwrap_or(DEFAULT_LIMIT);
        let source = self.source(&input).await?;
        let candidates = self.repo.list_posts(MAX_CANDIDATES, 0).await?;
        debug!(candidates = candidates.len(), "scoring recommendation candidates");

        let mut scored: Vec<(u32, BlogPost)> = candidates
            .into_iter()
            .filter(|p| source.slug.as_deref() != Some(p.slug.as_str()))
            .map(|p| (score(&source, &p), p))
            .filter(|(s, _)| *s > 0)
            .collect();
        scored.sort_by(|(sa, a), (sb, b)| {
            sb.cmp(sa)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.slug.cmp(&b.slug))
        });
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(score, post)| Recommendation {
                shared_tags: post
                    .tags
                    .iter()
                    .filter(|t| source.tags.contains(t))
                    .cloned()
                    .collect(),
                slug: post.slug,
                title: post.title,
                excerpt: post.excerpt,
                score,
            })
            .collect())
    }

    fn check_post(
        &self,
        input: &RecommendRequest,
        output: &Vec<Recommendation>,
    ) -> Result<(), DomainError> {
        if output.len() > input.limit.unwrap_or(DEFAULT_LIMIT) {
            return Err(DomainError::postcondition("recommend", "more results than limit"));
        }
        if output.iter().any(|r| r.score > 100) {
            return Err(DomainError::postcondition("recommend", "score out of range"));
        }
        if output
            .windows(2)
            .any(|w| w[0].score.cmp(&w[1].score) == Ordering::Less)
        {
            return Err(DomainError::postcondition("recommend", "results not sorted by score"));
        }
        if let Some(slug) = input.slug.as_deref().map(str::trim) {
            if output.iter().any(|r| r.slug == slug) {
                return Err(DomainError::postcondition("recommend", "source post recommended"));
            }
        }
        Ok(())
    }
}
