//! In-memory post store. Implements PostRepoPort for tests and `BLOG_STORAGE=memory`.

use crate::domain::{BlogPost, DomainError};
use crate::ports::PostRepoPort;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Posts keyed by slug. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryRepo {
    posts: RwLock<HashMap<String, BlogPost>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PostRepoPort for MemoryRepo {
    async fn save_post(&self, post: &BlogPost) -> Result<(), DomainError> {
        let mut posts = self.posts.write().await;
        let mut post = post.clone();
        if let Some(existing) = posts.get(&post.slug) {
            post.created_at = existing.created_at;
        }
        posts.insert(post.slug.clone(), post);
        Ok(())
    }

    async fn insert_post(&self, post: &BlogPost) -> Result<bool, DomainError> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.slug) {
            return Ok(false);
        }
        posts.insert(post.slug.clone(), post.clone());
        Ok(true)
    }

    async fn get_post(&self, slug: &str) -> Result<Option<BlogPost>, DomainError> {
        Ok(self.posts.read().await.get(slug).cloned())
    }

    async fn list_posts(&self, limit: u32, offset: u32) -> Result<Vec<BlogPost>, DomainError> {
        let posts = self.posts.read().await;
        let mut all: Vec<BlogPost> = posts.values().cloned().collect();
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.slug.cmp(&b.slug))
        });
        Ok(all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn delete_post(&self, slug: &str) -> Result<bool, DomainError> {
        Ok(self.posts.write().await.remove(slug).is_some())
    }

    async fn count_posts(&self) -> Result<u64, DomainError> {
        Ok(self.posts.read().await.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn post(slug: &str, age_days: i64) -> BlogPost {
        let at = Utc::now() - Duration::days(age_days);
        BlogPost {
            slug: slug.into(),
            title: slug.into(),
            excerpt: String::new(),
            body: String::new(),
            tags: vec![],
            category: "general".into(),
            reading_time_minutes: 1,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_memory_repo_ordering_and_upsert() {
        let repo = MemoryRepo::new();
        repo.save_post(&post("a", 3)).await.unwrap();
        repo.save_post(&post("b", 1)).await.unwrap();

        let first_created = repo.get_post("a").await.unwrap().unwrap().created_at;
        repo.save_post(&post("a", 0)).await.unwrap();
        assert_eq!(
            repo.get_post("a").await.unwrap().unwrap().created_at,
            first_created
        );

        let slugs: Vec<_> = repo
            .list_posts(10, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["b", "a"]);
        assert_eq!(repo.count_posts().await.unwrap(), 2);
        assert!(repo.delete_post("a").await.unwrap());
        assert_eq!(repo.count_posts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_post_keeps_existing() {
        let repo = MemoryRepo::new();
        assert!(repo.insert_post(&post("a", 1)).await.unwrap());
        let mut other = post("a", 0);
        other.title = "other".into();
        assert!(!repo.insert_post(&other).await.unwrap());
        assert_eq!(repo.get_post("a").await.unwrap().unwrap().title, "a");
    }
}
