//! Markdown content directory. Reads `*.md` posts with a `+++` TOML front matter block.
//!
//! ```text
//! +++
//! title = "Hello"
//! tags = ["rust", "web"]
//! category = "tech"
//! date = 2024-01-01
//! +++
//! Body in markdown...
//! ```
//!
//! Slug comes from front matter or the file stem. Files that fail to parse are skipped.

use crate::domain::{normalize_tags, text, BlogPost, DomainError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

const DELIMITER: &str = "+++";
const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct FrontMatter {
    title: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    excerpt: Option<String>,
    /// Quoted string or bare TOML date/datetime.
    #[serde(default)]
    date: Option<toml::Value>,
}

fn parse_date(value: &toml::Value) -> Option<DateTime<Utc>> {
    let raw = match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Datetime(dt) => dt.to_string(),
        _ => return None,
    };
    if let Ok(t) = DateTime::parse_from_rfc3339(&raw) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Split `+++ front matter +++ body`. Returns None when there is no front matter.
fn split_front_matter(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.trim_start_matches('\u{feff}').trim_start();
    let rest = rest.strip_prefix(DELIMITER)?;
    let end = rest.find(&format!("\n{}", DELIMITER))?;
    let front = &rest[..end];
    let body = &rest[end + 1 + DELIMITER.len()..];
    Some((front, body.trim_start_matches(['\r', '\n'])))
}

/// Parse one markdown file into a post. `stem` is the fallback slug source.
pub fn parse_post(stem: &str, raw: &str) -> Result<BlogPost, DomainError> {
    let (front, body) = split_front_matter(raw).ok_or_else(|| {
        DomainError::validation("MISSING_FRONT_MATTER", "expected a +++ front matter block")
    })?;
    let meta: FrontMatter = toml::from_str(front)
        .map_err(|e| DomainError::validation("INVALID_FRONT_MATTER", e.to_string()))?;

    let title = meta.title.trim().to_string();
    if title.is_empty() {
        return Err(DomainError::validation("INVALID_FRONT_MATTER", "title is empty"));
    }
    let body = body.trim_end().to_string();
    let created_at = meta.date.as_ref().and_then(parse_date).unwrap_or_else(Utc::now);
    let slug = text::slugify(meta.slug.as_deref().unwrap_or(stem));

    Ok(BlogPost {
        slug,
        excerpt: meta
            .excerpt
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| text::excerpt(&body, EXCERPT_CHARS)),
        tags: normalize_tags(&meta.tags),
        category: meta
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "general".to_string()),
        reading_time_minutes: text::reading_time_minutes(&body),
        title,
        body,
        created_at,
        updated_at: created_at,
    })
}

/// Load every `*.md` post under `dir` (non-recursive), sorted by file name.
/// A missing directory yields no posts.
pub async fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<BlogPost>, DomainError> {
    let dir = dir.as_ref();
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %dir.display(), "content directory not found, nothing to import");
            return Ok(Vec::new());
        }
        Err(e) => return Err(DomainError::Repo(e.to_string())),
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DomainError::Repo(e.to_string()))?
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("md") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut posts = Vec::with_capacity(paths.len());
    for path in paths {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable post");
                continue;
            }
        };
        match parse_post(&stem, &raw) {
            Ok(post) => posts.push(post),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping invalid post"),
        }
    }

    info!(path = %dir.display(), count = posts.len(), "loaded markdown posts");
    Ok(posts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "+++\ntitle = \"Hello, Rust\"\ntags = [\"Rust\", \"Web Dev\"]\ndate = 2024-01-15\n+++\n\n## Intro\n\nRust is **fast** and safe.\n";

    #[test]
    fn test_parse_post() {
        let post = parse_post("2024-01-hello", SAMPLE).unwrap();
        assert_eq!(post.title, "Hello, Rust");
        assert_eq!(post.slug, "2024-01-hello");
        assert_eq!(post.tags, vec!["rust", "web-dev"]);
        assert_eq!(post.category, "general");
        assert_eq!(post.created_at.format("%Y-%m-%d").to_string(), "2024-01-15");
        assert!(post.body.starts_with("## Intro"));
        assert_eq!(post.excerpt, "Intro Rust is fast and safe.");
    }

    #[test]
    fn test_parse_post_slug_override_and_string_date() {
        let raw = "+++\ntitle = \"X\"\nslug = \"My Custom Slug\"\ndate = \"2023-05-01T10:00:00Z\"\n+++\nbody";
        let post = parse_post("ignored", raw).unwrap();
        assert_eq!(post.slug, "my-custom-slug");
        assert_eq!(post.created_at.format("%H").to_string(), "10");
    }

    #[test]
    fn test_parse_post_rejects_missing_front_matter() {
        let err = parse_post("x", "# Just markdown").unwrap_err();
        assert_eq!(err.code(), "MISSING_FRONT_MATTER");
        let err = parse_post("x", "+++\ntitle = 5\n+++\nbody").unwrap_err();
        assert_eq!(err.code(), "INVALID_FRONT_MATTER");
    }

    #[tokio::test]
    async fn test_load_dir_skips_invalid() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b-good.md"), SAMPLE).unwrap();
        std::fs::write(dir.path().join("a-bad.md"), "no front matter").unwrap();
        std::fs::write(dir.path().join("notes.txt"), SAMPLE).unwrap();

        let posts = load_dir(dir.path()).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "b-good");

        let missing = load_dir(dir.path().join("nope")).await.unwrap();
        assert!(missing.is_empty());
    }
}
