//! SEO skill. Pure on-page analysis, no LLM call.
//!
//! Seven weighted checks add up to 100 points. Each shortfall adds a suggestion.

use crate::domain::{text, DomainError, KeywordCount, Readability, SeoReport, SeoRequest};
use crate::usecases::contract::{Skill, SkillKind};
use regex::Regex;
use std::sync::LazyLock;

pub const MIN_CONTENT_WORDS: usize = 50;
const TOP_KEYWORDS: usize = 5;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s{0,3}#{1,6}\s+\S").expect("heading regex"));

/// Letter grade for a 0..=100 score.
pub fn grade(score: u32) -> char {
    match score {
        90.. => 'A',
        75..=89 => 'B',
        60..=74 => 'C',
        40..=59 => 'D',
        _ => 'F',
    }
}

/// Score a post. Callers are expected to have validated the request.
pub fn analyze(input: &SeoRequest) -> SeoReport {
    let mut score = 0u32;
    let mut suggestions = Vec::new();

    let title = input.title.trim();
    let title_len = title.chars().count();
    match title_len {
        30..=60 => score += 15,
        20..=70 => {
            score += 8;
            suggestions.push(format!(
                "Title is {} characters; aim for 30-60.",
                title_len
            ));
        }
        _ => suggestions.push(format!(
            "Title is {} characters; aim for 30-60 so it is not cut off in search results.",
            title_len
        )),
    }

    let meta = input
        .meta_description
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());
    match meta.map(|m| m.chars().count()) {
        Some(120..=160) => score += 15,
        Some(len @ 50..=200) => {
            score += 8;
            suggestions.push(format!(
                "Meta description is {} characters; aim for 120-160.",
                len
            ));
        }
        Some(len) => suggestions.push(format!(
            "Meta description is {} characters; rewrite it to 120-160.",
            len
        )),
        None => suggestions.push("Add a meta description of 120-160 characters.".to_string()),
    }

    let plain = text::strip_markdown(&input.content);
    let word_count = text::word_count(&plain);
    if word_count >= 300 {
        score += 15;
    } else if word_count >= 150 {
        score += 8;
        suggestions.push(format!(
            "Content has {} words; 300+ words tend to rank better.",
            word_count
        ));
    } else {
        suggestions.push(format!(
            "Content has only {} words; expand it to at least 300.",
            word_count
        ));
    }

    if HEADING.is_match(&input.content) {
        score += 10;
    } else {
        suggestions.push("Break the content up with markdown headings (##).".to_string());
    }

    let flesch = text::flesch_reading_ease(&plain);
    if flesch >= 60.0 {
        score += 15;
    } else if flesch >= 30.0 {
        score += 8;
        suggestions.push("Shorten sentences and prefer simpler words to improve readability.".to_string());
    } else {
        suggestions.push("Text is very hard to read; split long sentences and cut jargon.".to_string());
    }

    let keyword = input
        .focus_keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());
    let keyword_density = keyword.map(|k| text::keyword_density(&plain, k));
    match (keyword, keyword_density) {
        (Some(k), Some(density)) => {
            if (0.5..=2.5).contains(&density) {
                score += 15;
            } else if density > 2.5 {
                score += 5;
                suggestions.push(format!(
                    "Focus keyword \"{}\" density is {:.1}%; reduce it below 2.5%.",
                    k, density
                ));
            } else if density > 0.0 {
                score += 5;
                suggestions.push(format!(
                    "Focus keyword \"{}\" density is {:.1}%; use it a little more.",
                    k, density
                ));
            } else {
                suggestions.push(format!("Focus keyword \"{}\" does not appear in the content.", k));
            }

            if text::contains_phrase(title, k) {
                score += 15;
            } else {
                suggestions.push(format!("Include the focus keyword \"{}\" in the title.", k));
            }
        }
        _ => {
            score += 7 + 7;
            suggestions.push("Set a focus keyword to get keyword checks.".to_string());
        }
    }

    let top_keywords = text::top_keywords(&plain, TOP_KEYWORDS)
        .into_iter()
        .map(|(keyword, count)| KeywordCount { keyword, count })
        .collect();

    let score = score.min(100);
    SeoReport {
        score,
        grade: grade(score),
        word_count,
        readability: Readability {
            flesch: round1(flesch),
            label: text::readability_label(flesch).to_string(),
            avg_sentence_length: round1(text::avg_sentence_length(&plain)),
        },
        keyword_density: keyword_density.map(|d| (d * 100.0).round() / 100.0),
        top_keywords,
        suggestions,
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub struct SeoSkill;

#[async_trait::async_trait]
impl Skill for SeoSkill {
    type Input = SeoRequest;
    type Output = SeoReport;

    fn kind(&self) -> SkillKind {
        SkillKind::Seo
    }

    fn check_pre(&self, input: &SeoRequest) -> Result<(), DomainError> {
        if input.title.trim().is_empty() {
            return Err(DomainError::validation("EMPTY_TITLE", "title is empty"));
        }
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
        Ok(())
    }

    async fn execute(&self, input: SeoRequest) -> Result<SeoReport, DomainError> {
        Ok(analyze(&input))
    }

    fn check_post(&self, _input: &SeoRequest, output: &SeoReport) -> Result<(), DomainError> {
        if output.score > 100 {
            return Err(DomainError::postcondition(
                "seo",
                format!("score {} out of range", output.score),
            ));
        }
        Ok(())
    }
}
