//! SQLite-backed post store via libsql. Implements PostRepoPort.
//!
//! Single `posts` table keyed by slug; tags are stored as a JSON array and
//! timestamps as RFC 3339 text. Saving an existing slug replaces the row but
//! keeps its original `created_at`.

use crate::domain::{BlogPost, DomainError};
use crate::ports::PostRepoPort;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{params, Connection, Database};
use std::path::Path;
use tracing::{debug, info};

const POSTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    slug TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    excerpt TEXT NOT NULL DEFAULT '',
    body TEXT NOT NULL,
    tags_json TEXT NOT NULL DEFAULT '[]',
    category TEXT NOT NULL DEFAULT 'general',
    reading_time INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)"#;
const POSTS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_posts_created ON posts (created_at DESC, slug)";

const SELECT_COLUMNS: &str =
    "slug, title, excerpt, body, tags_json, category, reading_time, created_at, updated_at";

fn repo_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Repo(e.to_string())
}

/// SQLite repository. One database file (posts.db) in the given base directory.
pub struct SqliteRepo {
    db: Database,
}

impl SqliteRepo {
    /// Connect to (or create) the SQLite database and ensure the schema exists.
    /// Call this once at startup; the returned repo is safe to share via Arc.
    ///
    /// Sets WAL mode and synchronous=NORMAL so reads don't block the writer.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(repo_err)?;
        let db_path = base.join("posts.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(repo_err)?;
        let conn = db.connect().map_err(repo_err)?;

        // PRAGMA returns a row (new value); use query and consume rows (execute fails when rows are returned).
        for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
            let mut rows = conn
                .query(pragma, ())
                .await
                .map_err(|e| DomainError::Repo(format!("{} failed: {}", pragma, e)))?;
            while rows.next().await.map_err(repo_err)?.is_some() {}
        }

        conn.execute(POSTS_TABLE, ()).await.map_err(repo_err)?;
        conn.execute(POSTS_INDEX, ()).await.map_err(repo_err)?;

        info!(path = %db_path.display(), "SQLite post store connected with WAL mode");

        Ok(Self { db })
    }

    fn conn(&self) -> Result<Connection, DomainError> {
        self.db.connect().map_err(repo_err)
    }

    /// Fixed-width UTC form so text ordering matches time ordering.
    fn format_time(t: &DateTime<Utc>) -> String {
        t.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_time(raw: &str) -> Result<DateTime<Utc>, DomainError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| DomainError::Repo(format!("bad timestamp {:?}: {}", raw, e)))
    }

    fn row_to_post(row: &libsql::Row) -> Result<BlogPost, DomainError> {
        let tags_json: String = row.get(4).map_err(repo_err)?;
        let created_at: String = row.get(7).map_err(repo_err)?;
        let updated_at: String = row.get(8).map_err(repo_err)?;
        let reading_time: i64 = row.get(6).map_err(repo_err)?;
        Ok(BlogPost {
            slug: row.get(0).map_err(repo_err)?,
            title: row.get(1).map_err(repo_err)?,
            excerpt: row.get::<String>(2).unwrap_or_default(),
            body: row.get(3).map_err(repo_err)?,
            tags: serde_json::from_str(&tags_json).unwrap_or_default(),
            category: row.get(5).map_err(repo_err)?,
            reading_time_minutes: reading_time.max(0) as u32,
            created_at: Self::parse_time(&created_at)?,
            updated_at: Self::parse_time(&updated_at)?,
        })
    }
}

#[async_trait::async_trait]
impl PostRepoPort for SqliteRepo {
    async fn save_post(&self, post: &BlogPost) -> Result<(), DomainError> {
        let tags_json = serde_json::to_string(&post.tags).map_err(repo_err)?;
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO posts (slug, title, excerpt, body, tags_json, category, reading_time, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (slug) DO UPDATE SET
                title = excluded.title,
                excerpt = excluded.excerpt,
                body = excluded.body,
                tags_json = excluded.tags_json,
                category = excluded.category,
                reading_time = excluded.reading_time,
                updated_at = excluded.updated_at
            "#,
            params![
                post.slug.as_str(),
                post.title.as_str(),
                post.excerpt.as_str(),
                post.body.as_str(),
                tags_json,
                post.category.as_str(),
                post.reading_time_minutes as i64,
                Self::format_time(&post.created_at),
                Self::format_time(&post.updated_at)
            ],
        )
        .await
        .map_err(repo_err)?;
        debug!(slug = %post.slug, "post saved");
        Ok(())
    }

    async fn insert_post(&self, post: &BlogPost) -> Result<bool, DomainError> {
        let tags_json = serde_json::to_string(&post.tags).map_err(repo_err)?;
        let conn = self.conn()?;
        let affected = conn
            .execute(
                r#"
                INSERT INTO posts (slug, title, excerpt, body, tags_json, category, reading_time, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT (slug) DO NOTHING
                "#,
                params![
                    post.slug.as_str(),
                    post.title.as_str(),
                    post.excerpt.as_str(),
                    post.body.as_str(),
                    tags_json,
                    post.category.as_str(),
                    post.reading_time_minutes as i64,
                    Self::format_time(&post.created_at),
                    Self::format_time(&post.updated_at)
                ],
            )
            .await
            .map_err(repo_err)?;
        Ok(affected > 0)
    }

    async fn get_post(&self, slug: &str) -> Result<Option<BlogPost>, DomainError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM posts WHERE slug = ?1", SELECT_COLUMNS);
        let mut rows = conn.query(&sql, params![slug]).await.map_err(repo_err)?;
        match rows.next().await.map_err(repo_err)? {
            Some(row) => Ok(Some(Self::row_to_post(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_posts(&self, limit: u32, offset: u32) -> Result<Vec<BlogPost>, DomainError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM posts ORDER BY created_at DESC, slug ASC LIMIT ?1 OFFSET ?2",
            SELECT_COLUMNS
        );
        let mut rows = conn
            .query(&sql, params![limit as i64, offset as i64])
            .await
            .map_err(repo_err)?;
        let mut posts = Vec::new();
        while let Some(row) = rows.next().await.map_err(repo_err)? {
            posts.push(Self::row_to_post(&row)?);
        }
        Ok(posts)
    }

    async fn delete_post(&self, slug: &str) -> Result<bool, DomainError> {
        let conn = self.conn()?;
        let affected = conn
            .execute("DELETE FROM posts WHERE slug = ?1", params![slug])
            .await
            .map_err(repo_err)?;
        Ok(affected > 0)
    }

    async fn count_posts(&self) -> Result<u64, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query("SELECT COUNT(*) FROM posts", ())
            .await
            .map_err(repo_err)?;
        let count: i64 = match rows.next().await.map_err(repo_err)? {
            Some(row) => row.get(0).map_err(repo_err)?,
            None => 0,
        };
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(slug: &str, age_days: i64) -> BlogPost {
        let at = Utc::now() - Duration::days(age_days);
        BlogPost {
            slug: slug.to_string(),
            title: format!("Title {}", slug),
            excerpt: "excerpt".into(),
            body: "body text".into(),
            tags: vec!["rust".into(), "web".into()],
            category: "tech".into(),
            reading_time_minutes: 2,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn test_save_get_roundtrip_and_upsert() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();

        let original = post("hello", 3);
        repo.save_post(&original).await.unwrap();

        let loaded = repo.get_post("hello").await.unwrap().unwrap();
        assert_eq!(loaded.tags, original.tags);
        assert_eq!(loaded.created_at.timestamp(), original.created_at.timestamp());

        let mut edited = original.clone();
        edited.title = "Edited".into();
        edited.created_at = Utc::now();
        repo.save_post(&edited).await.unwrap();

        let loaded = repo.get_post("hello").await.unwrap().unwrap();
        assert_eq!(loaded.title, "Edited");
        // created_at is kept from the first insert
        assert_eq!(loaded.created_at.timestamp(), original.created_at.timestamp());
        assert_eq!(repo.count_posts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_newest_first_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();
        for (slug, age) in [("old", 10), ("new", 1), ("mid", 5)] {
            repo.save_post(&post(slug, age)).await.unwrap();
        }

        let slugs: Vec<String> = repo
            .list_posts(10, 0)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["new", "mid", "old"]);

        let page = repo.list_posts(1, 1).await.unwrap();
        assert_eq!(page[0].slug, "mid");

        assert!(repo.delete_post("mid").await.unwrap());
        assert!(!repo.delete_post("mid").await.unwrap());
        assert!(repo.get_post("mid").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_post_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SqliteRepo::connect(dir.path()).await.unwrap();
        assert!(repo.insert_post(&post("hello", 1)).await.unwrap());

        let mut other = post("hello", 0);
        other.title = "Other".into();
        assert!(!repo.insert_post(&other).await.unwrap());
        assert_eq!(repo.get_post("hello").await.unwrap().unwrap().title, "Title hello");
        assert_eq!(repo.count_posts().await.unwrap(), 1);
    }
}
