//! HTTP routes. `/api/ai/*` runs the skills, `/api/posts` serves the catalogue.

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    let ai = Router::new()
        .route("/generate", post(handlers::generate))
        .route("/summarize", post(handlers::summarize))
        .route("/moderate", post(handlers::moderate))
        .route("/seo", post(handlers::seo))
        .route("/recommend", post(handlers::recommend))
        .route("/chat", post(handlers::chat));

    let posts = Router::new()
        .route("/", get(handlers::list_posts))
        .route(
            "/{slug}",
            get(handlers::get_post).delete(handlers::delete_post),
        );

    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .nest("/ai", ai)
        .nest("/posts", posts);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
