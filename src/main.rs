//! Wiring & DI. Entry point: bootstrap adapters, import content, serve the HTTP API.
//! No business logic here.

use dotenv::dotenv;
use inkwell::adapters::ai::{MockAiAdapter, OpenAiAdapter};
use inkwell::adapters::http::{build_router, AppState};
use inkwell::adapters::persistence::{MemoryRepo, SqliteRepo};
use inkwell::ports::{LlmPort, PostRepoPort};
use inkwell::shared::config::{AppConfig, StorageKind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "invalid configuration, using defaults");
        AppConfig::default()
    });

    // --- Post store ---
    let repo: Arc<dyn PostRepoPort> = match cfg.storage_kind() {
        StorageKind::Sqlite => {
            let data_dir = PathBuf::from(cfg.data_dir_or_default());
            let sqlite = SqliteRepo::connect(&data_dir)
                .await
                .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?;
            Arc::new(sqlite)
        }
        StorageKind::Memory => {
            info!("using in-memory post store; posts are lost on exit");
            Arc::new(MemoryRepo::new())
        }
    };

    // --- LLM ---
    let llm: Arc<dyn LlmPort> = if cfg.is_ai_configured() {
        info!(
            model = %cfg.ai_model_or_default(),
            url = %cfg.ai_api_url_or_default(),
            "AI skills enabled with OpenAI adapter"
        );
        Arc::new(OpenAiAdapter::new(
            cfg.ai_api_url_or_default(),
            cfg.ai_api_key().unwrap_or_default(),
            cfg.ai_model_or_default(),
            Duration::from_secs(cfg.ai_timeout_secs_or_default()),
        ))
    } else {
        warn!("BLOG_AI_API_KEY not set, using mock AI adapter");
        Arc::new(MockAiAdapter::new())
    };

    let state = AppState::new(llm, repo);

    // --- Content import ---
    let content_dir = cfg.content_dir_or_default();
    match state.posts.import_dir(&content_dir).await {
        Ok(count) => info!(path = %content_dir, count, "imported markdown posts"),
        Err(e) => warn!(path = %content_dir, error = %e, "content import failed"),
    }

    // --- Serve ---
    let addr = cfg.bind_addr_or_default();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("bind {} failed: {}", addr, e))?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}
