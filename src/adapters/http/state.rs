//! Shared handler state: one instance of every skill plus the post catalogue.

use crate::ports::{LlmPort, PostRepoPort};
use crate::usecases::{
    ChatSkill, GenerateSkill, ModerateSkill, PostService, RecommendSkill, SeoSkill, SkillMetrics,
    SummarizeSkill,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub generate: Arc<GenerateSkill>,
    pub summarize: Arc<SummarizeSkill>,
    pub moderate: Arc<ModerateSkill>,
    pub seo: Arc<SeoSkill>,
    pub recommend: Arc<RecommendSkill>,
    pub chat: Arc<ChatSkill>,
    pub posts: Arc<PostService>,
    pub metrics: Arc<SkillMetrics>,
    /// Model name reported by the health endpoint.
    pub model: String,
}

impl AppState {
    pub fn new(llm: Arc<dyn LlmPort>, repo: Arc<dyn PostRepoPort>) -> Self {
        Self {
            generate: Arc::new(GenerateSkill::new(Arc::clone(&llm))),
            summarize: Arc::new(SummarizeSkill::new(Arc::clone(&llm))),
            moderate: Arc::new(ModerateSkill::new(Arc::clone(&llm))),
            seo: Arc::new(SeoSkill),
            recommend: Arc::new(RecommendSkill::new(Arc::clone(&repo))),
            chat: Arc::new(ChatSkill::new(Arc::clone(&llm), Arc::clone(&repo))),
            posts: Arc::new(PostService::new(repo)),
            metrics: Arc::new(SkillMetrics::new()),
            model: llm.model().to_string(),
        }
    }
}
