//! Post repository for database operations

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::{NewPost, Post, PostChanges, PostQuery};

/// Post repository
#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    /// Create a new post repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new post
    pub async fn create(&self, new_post: &NewPost) -> Result<Post> {
        info!("Creating post for author: {}", new_post.author_id);

        let (cover_url, cover_key) = match &new_post.cover {
            Some(stored) => (stored.url.as_str(), stored.key.as_str()),
            None => ("", ""),
        };

        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (author_id, title, content, cover_url, cover_key)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, author_id, title, content, cover_url, cover_key,
                      created_at, updated_at
            "#,
        )
        .bind(new_post.author_id)
        .bind(&new_post.title)
        .bind(&new_post.content)
        .bind(cover_url)
        .bind(cover_key)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    /// Find a post by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, content, cover_url, cover_key,
                   created_at, updated_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// List posts with pagination and optional author/title filters,
    /// newest first
    pub async fn list(&self, query: &PostQuery) -> Result<(Vec<Post>, i64)> {
        let page = query.page();
        let limit = query.limit();
        let offset = (page - 1) as i64 * limit as i64;

        let posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, title, content, cover_url, cover_key,
                   created_at, updated_at
            FROM posts
            WHERE ($1::uuid IS NULL OR author_id = $1)
              AND ($2::text IS NULL OR title ILIKE '%' || $2 || '%')
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(query.author)
        .bind(&query.search)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM posts
            WHERE ($1::uuid IS NULL OR author_id = $1)
              AND ($2::text IS NULL OR title ILIKE '%' || $2 || '%')
            "#,
        )
        .bind(query.author)
        .bind(&query.search)
        .fetch_one(&self.pool)
        .await?;

        Ok((posts, total))
    }

    /// Persist resolved post changes in one save
    ///
    /// Absent fields keep their stored value. Returns `None` when the post
    /// no longer exists.
    pub async fn update(&self, id: Uuid, changes: &PostChanges) -> Result<Option<Post>> {
        info!("Updating post: {}", id);

        let (cover_url, cover_key) = match &changes.cover {
            Some(stored) => (Some(stored.url.as_str()), Some(stored.key.as_str())),
            None => (None, None),
        };

        let post = sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = COALESCE($2, title),
                content = COALESCE($3, content),
                cover_url = COALESCE($4, cover_url),
                cover_key = COALESCE($5, cover_key),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, author_id, title, content, cover_url, cover_key,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(cover_url)
        .bind(cover_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Delete a post by ID
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        info!("Deleting post: {}", id);

        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
