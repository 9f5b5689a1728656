//! Post model and related views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::storage::StoredObject;

/// Post entity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub cover_url: String,
    /// Provider key of a self-hosted cover image; empty when absent
    #[serde(skip_serializing)]
    pub cover_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New post creation payload
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub cover: Option<StoredObject>,
}

/// Resolved post changes, persisted in a single save
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub cover: Option<StoredObject>,
}

/// Raw post patch as supplied by the client
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl PostPatch {
    /// Title and content are replaced only when supplied non-empty.
    pub fn into_changes(self) -> PostChanges {
        PostChanges {
            title: self.title.filter(|t| !t.is_empty()),
            content: self.content.filter(|c| !c.is_empty()),
            cover: None,
        }
    }
}

/// Query parameters for post listing
#[derive(Debug, Clone, Deserialize)]
pub struct PostQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
    /// Filter by author
    pub author: Option<Uuid>,
    /// Search term matched against titles
    pub search: Option<String>,
}

impl PostQuery {
    /// Effective page, clamped to 1 or more
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to 1..=100
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }
}

/// View returned for a single post
#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub cover: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            author_id: post.author_id,
            title: post.title.clone(),
            content: post.content.clone(),
            cover: post.cover_url.clone(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Response for post listing with pagination
#[derive(Debug, Serialize)]
pub struct PostListResponse {
    pub items: Vec<PostView>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_clamps_page_and_limit() {
        let query = PostQuery {
            page: Some(0),
            limit: Some(1000),
            author: None,
            search: None,
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 100);

        let query = PostQuery {
            page: None,
            limit: Some(0),
            author: None,
            search: None,
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 1);
    }

    #[test]
    fn test_query_defaults() {
        let query = PostQuery {
            page: None,
            limit: None,
            author: None,
            search: None,
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 10);
    }

    #[test]
    fn test_patch_policy_ignores_empty_fields() {
        let changes = PostPatch {
            title: Some("".to_string()),
            content: Some("".to_string()),
        }
        .into_changes();
        assert!(changes.title.is_none());
        assert!(changes.content.is_none());

        let changes = PostPatch {
            title: Some("New title".to_string()),
            content: None,
        }
        .into_changes();
        assert_eq!(changes.title.as_deref(), Some("New title"));
        assert!(changes.content.is_none());
    }
}
