//! Endpoint handlers. Each AI endpoint runs exactly one skill through the contract.

use super::error::ApiError;
use super::response::ApiResponse;
use super::state::AppState;
use crate::domain::{
    BlogPost, ChatReply, ChatRequest, GenerateRequest, GeneratedPost, ModerateRequest,
    ModerationReport, RecommendRequest, Recommendation, SeoReport, SeoRequest, SummarizeRequest,
    Summary,
};
use crate::usecases::{run, MetricsSnapshot};
use axum::{
    extract::{FromRequest, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

/// `Json` extractor whose rejection is an `ApiError` (400 `INVALID_BODY`).
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
    pub posts: u64,
}

pub async fn health(State(state): State<AppState>) -> ApiResult<Health> {
    ok(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        model: state.model.clone(),
        posts: state.posts.count().await?,
    })
}

pub async fn metrics(State(state): State<AppState>) -> ApiResult<MetricsSnapshot> {
    ok(state.metrics.snapshot())
}

pub async fn generate(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GenerateRequest>,
) -> ApiResult<GeneratedPost> {
    let save = req.save;
    let mut out = run(state.generate.as_ref(), req, &state.metrics).await?;
    if save {
        out.post = state.posts.save_unique(out.post).await?;
        out.saved = true;
    }
    ok(out)
}

pub async fn summarize(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SummarizeRequest>,
) -> ApiResult<Summary> {
    ok(run(state.summarize.as_ref(), req, &state.metrics).await?)
}

pub async fn moderate(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ModerateRequest>,
) -> ApiResult<ModerationReport> {
    ok(run(state.moderate.as_ref(), req, &state.metrics).await?)
}

pub async fn seo(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SeoRequest>,
) -> ApiResult<SeoReport> {
    ok(run(state.seo.as_ref(), req, &state.metrics).await?)
}

pub async fn recommend(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RecommendRequest>,
) -> ApiResult<Vec<Recommendation>> {
    ok(run(state.recommend.as_ref(), req, &state.metrics).await?)
}

pub async fn chat(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> ApiResult<ChatReply> {
    ok(run(state.chat.as_ref(), req, &state.metrics).await?)
}

#[derive(Deserialize, Debug, Default)]
pub struct ListQuery {
    pub tag: Option<String>,
    pub limit: Option<usize>,
}

pub async fn list_posts(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, axum::extract::rejection::QueryRejection>,
) -> ApiResult<Vec<BlogPost>> {
    let Query(query) = query?;
    ok(state.posts.list(query.tag.as_deref(), query.limit).await?)
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<BlogPost> {
    ok(state.posts.get(&slug).await?)
}

#[derive(Serialize, Debug)]
pub struct Deleted {
    pub slug: String,
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Deleted> {
    state.posts.delete(&slug).await?;
    ok(Deleted { slug })
}
