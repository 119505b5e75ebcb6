//! Application use cases. Orchestrate domain logic via ports.
//!
//! One module per skill, plus the skill contract, metrics and the post catalogue.

pub mod chat_skill;
pub mod contract;
pub mod generate_skill;
pub mod metrics;
pub mod moderate_skill;
pub mod post_service;
pub mod recommend_skill;
pub mod seo_skill;
pub mod summarize_skill;

pub use chat_skill::ChatSkill;
pub use contract::{run, Skill, SkillKind};
pub use generate_skill::GenerateSkill;
pub use metrics::{MetricsSnapshot, SkillMetrics, SkillStats};
pub use moderate_skill::ModerateSkill;
pub use post_service::PostService;
pub use recommend_skill::RecommendSkill;
pub use seo_skill::SeoSkill;
pub use summarize_skill::SummarizeSkill;
