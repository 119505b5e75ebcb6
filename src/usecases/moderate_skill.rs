//! Moderate skill. Local pattern heuristics plus one LLM verdict, combined into
//! a 0..=100 risk score.

use crate::adapters::ai::parse_llm_json;
use crate::domain::{DomainError, FlagCategory, ModerateRequest, ModerationFlag, ModerationReport};
use crate::ports::{CompletionOptions, LlmMessage, LlmPort};
use crate::usecases::contract::{Skill, SkillKind};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

pub const MAX_CONTENT_CHARS: usize = 10_000;
/// Reports at or above this risk are not approved.
pub const APPROVAL_THRESHOLD: u32 = 50;

const MIN_LINKS_FOR_SPAM: usize = 3;
const SHOUTING_MIN_LETTERS: usize = 20;
const SHOUTING_RATIO: f64 = 0.7;
const REPEAT_RUN: usize = 6;

static PROFANITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:fuck\w*|shit\w*|bitch\w*|bastard|asshole|dickhead|crap|damn)\b")
        .expect("profanity regex")
});
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("link regex"));
static SPAM_PHRASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:buy now|click here|free money|act now|limited time offer|work from home|earn \$?\d+ (?:a|per) day|100% free)",
    )
    .expect("spam regex")
});
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email regex")
});
/// Grouped digits only, so bare runs like unix timestamps do not match.
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+\d{1,3}[\s.-]?)?(?:\(\d{3}\)\s?|\b\d{3}[\s.-])\d{3}[\s.-]\d{4}\b")
        .expect("phone regex")
});

const SYSTEM_PROMPT: &str = r#"You are a content moderator for a personal blog's comments and posts.

Decide whether the text should be held for review. Flag harassment, hate speech,
threats, sexual content, scams or spam, and personal data about other people.
Strong opinions, criticism and technical jargon are fine.

You MUST respond with valid JSON only:
{"flagged": true|false, "categories": ["harassment", ...], "reason": "one short sentence"}"#;

#[derive(Debug, Deserialize)]
struct LlmVerdict {
    #[serde(default)]
    flagged: bool,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    reason: String,
}

/// Run the local heuristics. At most one flag per category, sorted by category.
pub fn scan(content: &str) -> Vec<ModerationFlag> {
    let mut flags: BTreeMap<FlagCategory, String> = BTreeMap::new();

    let profane = PROFANITY.find_iter(content).count();
    if profane > 0 {
        flags.insert(
            FlagCategory::Profanity,
            format!("{} profane word(s)", profane),
        );
    }

    let links = LINK.find_iter(content).count();
    if links >= MIN_LINKS_FOR_SPAM {
        flags.insert(FlagCategory::Spam, format!("{} links", links));
    } else if let Some(m) = SPAM_PHRASE.find(content) {
        flags.insert(
            FlagCategory::Spam,
            format!("spam phrase \"{}\"", m.as_str().to_lowercase()),
        );
    }

    let prose = prose_lines(content);

    if EMAIL.is_match(content) {
        flags.insert(FlagCategory::PersonalInfo, "email address".to_string());
    } else if PHONE.is_match(&prose) {
        flags.insert(FlagCategory::PersonalInfo, "phone number".to_string());
    }

    let letters = content.chars().filter(|c| c.is_alphabetic()).count();
    if letters >= SHOUTING_MIN_LETTERS {
        let upper = content.chars().filter(|c| c.is_uppercase()).count();
        let ratio = upper as f64 / letters as f64;
        if ratio >= SHOUTING_RATIO {
            flags.insert(
                FlagCategory::Shouting,
                format!("{:.0}% uppercase", ratio * 100.0),
            );
        }
    }

    if let Some(c) = repeated_char(&prose, REPEAT_RUN) {
        flags.insert(
            FlagCategory::Repetition,
            format!("'{}' repeated {}+ times", c, REPEAT_RUN),
        );
    }

    flags
        .into_iter()
        .map(|(category, detail)| ModerationFlag { category, detail })
        .collect()
}

/// Lines outside fenced code blocks, minus markdown rules and setext underlines.
fn prose_lines(content: &str) -> String {
    let mut in_fence = false;
    let mut kept = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence || is_rule(trimmed) {
            continue;
        }
        kept.push(line);
    }
    kept.join("\n")
}

/// `---`, `***`, `___`, `===` and spaced variants.
fn is_rule(line: &str) -> bool {
    let mut marks = line.chars().filter(|c| !c.is_whitespace());
    let Some(first) = marks.next() else {
        return false;
    };
    matches!(first, '-' | '*' | '_' | '=')
        && line.chars().filter(|c| *c == first).count() >= 3
        && marks.all(|c| c == first)
}

/// First non-whitespace character that appears `run` or more times in a row.
fn repeated_char(content: &str, run: usize) -> Option<char> {
    let mut prev: Option<char> = None;
    let mut len = 0usize;
    for c in content.chars() {
        if Some(c) == prev {
            len += 1;
        } else {
            prev = Some(c);
            len = 1;
        }
        if len >= run && !c.is_whitespace() {
            return Some(c);
        }
    }
    None
}

/// Sum of flag weights, capped at 100.
pub fn risk_score(flags: &[ModerationFlag]) -> u32 {
    flags
        .iter()
        .map(|f| f.category.weight())
        .sum::<u32>()
        .min(100)
}

pub struct ModerateSkill {
    llm: Arc<dyn LlmPort>,
}

impl ModerateSkill {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }
}

#[async_trait::async_trait]
impl Skill for ModerateSkill {
    type Input = ModerateRequest;
    type Output = ModerationReport;

    fn kind(&self) -> SkillKind {
        SkillKind::Moderate
    }

    fn check_pre(&self, input: &ModerateRequest) -> Result<(), DomainError> {
        if input.content.trim().is_empty() {
            return Err(DomainError::validation("EMPTY_CONTENT", "content is empty"));
        }
        if input.content.chars().count() > MAX_CONTENT_CHARS {
            return Err(DomainError::validation(
                "CONTENT_TOO_LONG",
                format!("content exceeds {} characters", MAX_CONTENT_CHARS),
            ));
        }
        Ok(())
    }

    async fn execute(&self, input: ModerateRequest) -> Result<ModerationReport, DomainError> {
        let mut flags = scan(&input.content);
        debug!(heuristic_flags = flags.len(), "heuristic scan done");

        let messages = [
            LlmMessage::system(SYSTEM_PROMPT),
            LlmMessage::user(input.content.clone()),
        ];
        let raw = self
            .llm
            .complete(&messages, &CompletionOptions::json(0.0).with_max_tokens(200))
            .await?;
        let verdict: LlmVerdict = parse_llm_json(&raw)?;

        if verdict.flagged {
            let detail = if verdict.categories.is_empty() {
                "flagged by model".to_string()
            } else {
                verdict.categories.join(", ")
            };
            flags.push(ModerationFlag {
                category: FlagCategory::Model,
                detail,
            });
            flags.sort_by_key(|f| f.category);
        }

        let risk_score = risk_score(&flags);
        let approved = risk_score < APPROVAL_THRESHOLD;
        let reason = Some(verdict.reason.trim().to_string()).filter(|r| !r.is_empty());

        info!(
            risk_score,
            approved,
            flags = flags.len(),
            model_flagged = verdict.flagged,
            "moderation done"
        );

        Ok(ModerationReport {
            approved,
            risk_score,
            flags,
            reason,
        })
    }

    fn check_post(&self, _input: &ModerateRequest, output: &ModerationReport) -> Result<(), DomainError> {
        if output.risk_score > 100 {
            return Err(DomainError::postcondition(
                "moderate",
                format!("risk score {} out of range", output.risk_score),
            ));
        }
        if output.approved != (output.risk_score < APPROVAL_THRESHOLD) {
            return Err(DomainError::postcondition(
                "moderate",
                "approval does not match risk score",
            ));
        }
        Ok(())
    }
}
