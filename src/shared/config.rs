//! Application configuration. Server address, storage paths, LLM credentials.

use crate::domain::DomainError;
use serde::Deserialize;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_AI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";

/// Post store backend selected by `BLOG_STORAGE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Listen address. Read from BLOG_BIND_ADDR.
    #[serde(default)]
    pub bind_addr: Option<String>,

    /// Directory holding posts.db. Read from BLOG_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Markdown posts imported at startup. Read from BLOG_CONTENT_DIR.
    #[serde(default)]
    pub content_dir: Option<String>,

    /// "sqlite" (default) or "memory". Read from BLOG_STORAGE.
    #[serde(default)]
    pub storage: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // LLM Configuration
    // ─────────────────────────────────────────────────────────────────────────
    /// API key (e.g., OpenAI). Read from BLOG_AI_API_KEY.
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// Chat completions URL. Defaults to OpenAI. Read from BLOG_AI_API_URL.
    #[serde(default)]
    pub ai_api_url: Option<String>,

    /// Model name. Defaults to "gpt-4o-mini". Read from BLOG_AI_MODEL.
    #[serde(default)]
    pub ai_model: Option<String>,

    /// Per-request timeout in seconds (default 60). Read from BLOG_AI_TIMEOUT_SECS.
    #[serde(default)]
    pub ai_timeout_secs: Option<u64>,
}

impl AppConfig {
    pub fn load() -> Result<Self, DomainError> {
        dotenv::dotenv().ok();
        Self::load_from(std::env::var("BLOG_CONFIG").ok().as_deref())
    }

    /// Optional config file, then `BLOG_*` environment variables.
    fn load_from(file: Option<&str>) -> Result<Self, DomainError> {
        let config_err = |e: config::ConfigError| DomainError::Config(e.to_string());
        let mut c = config::Config::builder();
        if let Some(path) = file {
            c = c.add_source(config::File::with_name(path));
        }
        // Environment wins over the file.
        c = c.add_source(config::Environment::with_prefix("BLOG"));
        let mut cfg: Self = c
            .build()
            .map_err(config_err)?
            .try_deserialize()
            .map_err(config_err)?;
        // Numeric env values arrive as strings; parse them explicitly.
        if let Ok(s) = std::env::var("BLOG_AI_TIMEOUT_SECS") {
            if let Ok(n) = s.parse::<u64>() {
                cfg.ai_timeout_secs = Some(n);
            }
        }
        Ok(cfg)
    }

    pub fn bind_addr_or_default(&self) -> String {
        self.bind_addr
            .clone()
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
    }

    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    pub fn content_dir_or_default(&self) -> String {
        self.content_dir
            .clone()
            .unwrap_or_else(|| "./content/posts".to_string())
    }

    /// Unknown values fall back to SQLite.
    pub fn storage_kind(&self) -> StorageKind {
        match self.storage.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("memory") => StorageKind::Memory,
            _ => StorageKind::Sqlite,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // LLM Configuration Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the API key if configured. Reads from config or BLOG_AI_API_KEY env.
    pub fn ai_api_key(&self) -> Option<String> {
        self.ai_api_key
            .clone()
            .or_else(|| std::env::var("BLOG_AI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn ai_api_url_or_default(&self) -> String {
        self.ai_api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_AI_API_URL.to_string())
    }

    pub fn ai_model_or_default(&self) -> String {
        self.ai_model
            .clone()
            .unwrap_or_else(|| DEFAULT_AI_MODEL.to_string())
    }

    pub fn ai_timeout_secs_or_default(&self) -> u64 {
        self.ai_timeout_secs.unwrap_or(60)
    }

    /// Returns true if the LLM is configured (API key present).
    pub fn is_ai_configured(&self) -> bool {
        self.ai_api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.bind_addr_or_default(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.ai_model_or_default(), DEFAULT_AI_MODEL);
        assert_eq!(cfg.ai_timeout_secs_or_default(), 60);
        assert_eq!(cfg.storage_kind(), StorageKind::Sqlite);
    }

    #[test]
    fn test_storage_kind() {
        let cfg = AppConfig {
            storage: Some("Memory".into()),
            ..Default::default()
        };
        assert_eq!(cfg.storage_kind(), StorageKind::Memory);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inkwell.toml");
        std::fs::write(&path, "content_dir = \"/srv/posts\"\nai_model = \"local-llm\"\n").unwrap();
        let cfg = AppConfig::load_from(path.to_str()).unwrap();
        assert_eq!(cfg.content_dir_or_default(), "/srv/posts");
        assert_eq!(cfg.ai_model_or_default(), "local-llm");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = AppConfig::load_from(Some("/nonexistent/inkwell.toml")).unwrap_err();
        assert!(matches!(err, DomainError::Config(_)));
        assert_eq!(err.code(), "CONFIG_ERROR");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_blank_api_key_is_unconfigured() {
        let cfg = AppConfig {
            ai_api_key: Some("  ".into()),
            ..Default::default()
        };
        assert!(cfg.ai_api_key().is_none());
        assert!(!cfg.is_ai_configured());
    }
}
