//! Post catalogue use case: list, read, save, delete and import posts.
//!
//! Thin layer over PostRepoPort that turns missing slugs into NotFound and
//! validates listing parameters.

use crate::adapters::persistence::content_dir;
use crate::domain::{normalize_tags, BlogPost, DomainError};
use crate::ports::PostRepoPort;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_LIST_LIMIT: usize = 20;
pub const MAX_LIST_LIMIT: usize = 100;
/// Posts scanned when filtering by tag.
const TAG_SCAN_LIMIT: u32 = 1000;
/// Highest numeric suffix tried by `save_unique` before giving up.
const MAX_SLUG_SUFFIX: usize = 100;

/// Post catalogue service. Shared by the HTTP handlers and startup import.
pub struct PostService {
    repo: Arc<dyn PostRepoPort>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepoPort>) -> Self {
        Self { repo }
    }

    /// Newest posts first, optionally only those carrying `tag`.
    pub async fn list(
        &self,
        tag: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<BlogPost>, DomainError> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        if !(1..=MAX_LIST_LIMIT).contains(&limit) {
            return Err(DomainError::validation(
                "INVALID_LIMIT",
                format!("limit must be between 1 and {}", MAX_LIST_LIMIT),
            ));
        }

        let tag = tag.and_then(|t| normalize_tags([t]).into_iter().next());
        match tag {
            Some(tag) => {
                let mut posts = self.repo.list_posts(TAG_SCAN_LIMIT, 0).await?;
                posts.retain(|p| p.tags.contains(&tag));
                posts.truncate(limit);
                Ok(posts)
            }
            None => self.repo.list_posts(limit as u32, 0).await,
        }
    }

    pub async fn get(&self, slug: &str) -> Result<BlogPost, DomainError> {
        self.repo
            .get_post(slug)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post '{}'", slug)))
    }

    /// Insert or replace by slug.
    pub async fn save(&self, post: &BlogPost) -> Result<(), DomainError> {
        self.repo.save_post(post).await?;
        info!(slug = %post.slug, "post saved");
        Ok(())
    }

    /// Save without replacing an existing post: on a slug collision the slug gets
    /// a `-2`, `-3`, ... suffix. Returns the post as stored.
    pub async fn save_unique(&self, mut post: BlogPost) -> Result<BlogPost, DomainError> {
        let base = post.slug.clone();
        let mut n = 1;
        while !self.repo.insert_post(&post).await? {
            n += 1;
            if n > MAX_SLUG_SUFFIX {
                return Err(DomainError::validation(
                    "SLUG_TAKEN",
                    format!("no free slug for '{}'", base),
                ));
            }
            post.slug = format!("{}-{}", base, n);
        }
        info!(slug = %post.slug, "post saved");
        Ok(post)
    }

    pub async fn delete(&self, slug: &str) -> Result<(), DomainError> {
        if !self.repo.delete_post(slug).await? {
            return Err(DomainError::NotFound(format!("post '{}'", slug)));
        }
        info!(slug, "post deleted");
        Ok(())
    }

    pub async fn count(&self) -> Result<u64, DomainError> {
        self.repo.count_posts().await
    }

    /// Upsert every post; returns how many were stored. A failing post is logged and skipped.
    pub async fn import(&self, posts: Vec<BlogPost>) -> usize {
        let mut stored = 0;
        for post in posts {
            match self.repo.save_post(&post).await {
                Ok(()) => stored += 1,
                Err(e) => warn!(slug = %post.slug, error = %e, "failed to import post"),
            }
        }
        stored
    }

    /// Import the markdown posts of a content directory.
    pub async fn import_dir(&self, dir: impl AsRef<Path>) -> Result<usize, DomainError> {
        let dir = dir.as_ref();
        let posts = content_dir::load_dir(dir).await?;
        let found = posts.len();
        let stored = self.import(posts).await;
        info!(path = %dir.display(), found, stored, "content directory imported");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::MemoryRepo;
    use chrono::{Duration, Utc};

    fn post(slug: &str, tags: &[&str], age_days: i64) -> BlogPost {
        let at = Utc::now() - Duration::days(age_days);
        BlogPost {
            slug: slug.into(),
            title: slug.into(),
            excerpt: String::new(),
            body: "body".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            category: "general".into(),
            reading_time_minutes: 1,
            created_at: at,
            updated_at: at,
        }
    }

    async fn service() -> PostService {
        let svc = PostService::new(Arc::new(MemoryRepo::new()));
        svc.import(vec![
            post("a", &["rust"], 3),
            post("b", &["cooking"], 2),
            post("c", &["rust", "web"], 1),
        ])
        .await;
        svc
    }

    #[tokio::test]
    async fn test_list_filters_by_tag() {
        let svc = service().await;
        let all: Vec<String> = svc.list(None, None).await.unwrap().into_iter().map(|p| p.slug).collect();
        assert_eq!(all, vec!["c", "b", "a"]);

        let rust: Vec<String> = svc
            .list(Some(" Rust "), Some(10))
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(rust, vec!["c", "a"]);

        let err = svc.list(None, Some(0)).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_LIMIT");
    }

    #[tokio::test]
    async fn test_get_and_delete_not_found() {
        let svc = service().await;
        assert_eq!(svc.get("a").await.unwrap().slug, "a");
        svc.delete("a").await.unwrap();
        assert!(matches!(svc.get("a").await, Err(DomainError::NotFound(_))));
        assert!(matches!(svc.delete("a").await, Err(DomainError::NotFound(_))));
        assert_eq!(svc.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_save_unique_suffixes_slug() {
        let svc = service().await;
        let saved = svc.save_unique(post("a", &[], 0)).await.unwrap();
        assert_eq!(saved.slug, "a-2");
        let saved = svc.save_unique(post("a", &[], 0)).await.unwrap();
        assert_eq!(saved.slug, "a-3");
        let saved = svc.save_unique(post("fresh", &[], 0)).await.unwrap();
        assert_eq!(saved.slug, "fresh");
        assert_eq!(svc.count().await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_concurrent_save_unique_never_overwrites() {
        let svc = Arc::new(PostService::new(Arc::new(MemoryRepo::new())));
        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let svc = svc.clone();
                tokio::spawn(async move {
                    let mut p = post("same-title", &[], 0);
                    p.body = format!("draft {}", i);
                    svc.save_unique(p).await
                })
            })
            .collect();

        let mut slugs = Vec::new();
        for task in tasks {
            slugs.push(task.await.unwrap().unwrap().slug);
        }
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), 8);
        assert_eq!(svc.count().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_import_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("hello.md"),
            "+++\ntitle = \"Hello\"\ntags = [\"intro\"]\n+++\nFirst post.",
        )
        .unwrap();
        let svc = PostService::new(Arc::new(MemoryRepo::new()));
        assert_eq!(svc.import_dir(dir.path()).await.unwrap(), 1);
        assert_eq!(svc.get("hello").await.unwrap().tags, vec!["intro"]);
    }
}
