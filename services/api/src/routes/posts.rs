//! Blog post routes
//!
//! Reads are public; writes require authentication and post ownership.
//! Cover images follow the same replacement policy as avatars: stored
//! objects are deleted best-effort on replacement, uploads happen before
//! the single save.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::AuthUser,
    models::{ApiResponse, NewPost, Post, PostListResponse, PostPatch, PostQuery, PostView},
    state::AppState,
    storage,
};

use super::auth::FilePart;

/// Post creation form fields
#[derive(Default)]
struct PostForm {
    title: String,
    content: String,
    file: Option<FilePart>,
}

async fn read_post_form(multipart: &mut Multipart) -> Result<PostForm, ApiError> {
    let mut form = PostForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("Invalid multipart payload".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" => {
                form.title = field
                    .text()
                    .await
                    .map_err(|_| ApiError::Validation("Invalid title field".to_string()))?;
            }
            "content" => {
                form.content = field
                    .text()
                    .await
                    .map_err(|_| ApiError::Validation("Invalid content field".to_string()))?;
            }
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::Validation("Invalid file field".to_string()))?
                    .to_vec();
                form.file = Some(FilePart { filename, data });
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Load a post and check that the caller owns it
async fn load_owned_post(state: &AppState, id: Uuid, author: &AuthUser) -> Result<Post, ApiError> {
    let post = state
        .post_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to load post: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    if post.author_id != author.id {
        return Err(ApiError::Forbidden);
    }

    Ok(post)
}

/// Create a new post
pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_post_form(&mut multipart).await?;

    if form.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    if form.content.trim().is_empty() {
        return Err(ApiError::Validation("Content is required".to_string()));
    }

    // Upload first: a failed upload must not create a post.
    let cover = match form.file {
        Some(file) => Some(
            state
                .media_store
                .upload(file.data, storage::COVERS, &file.filename)
                .await
                .map_err(|e| {
                    error!("Cover upload failed: {}", e);
                    ApiError::Upload(e.to_string())
                })?,
        ),
        None => None,
    };

    let new_post = NewPost {
        author_id: auth.id,
        title: form.title,
        content: form.content,
        cover,
    };

    let post = state.post_repository.create(&new_post).await.map_err(|e| {
        error!("Failed to create post: {}", e);
        ApiError::Internal
    })?;

    info!("Created post: {}", post.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("Post created", PostView::from(&post))),
    ))
}

/// List posts with pagination and optional filters
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (posts, total) = state.post_repository.list(&query).await.map_err(|e| {
        error!("Failed to list posts: {}", e);
        ApiError::Internal
    })?;

    let response = PostListResponse {
        items: posts.iter().map(PostView::from).collect(),
        page: query.page(),
        limit: query.limit(),
        total,
    };

    Ok(Json(ApiResponse::new("Posts", response)))
}

/// Get a post by ID
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .post_repository
        .find_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to load post: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    Ok(Json(ApiResponse::new("Post", PostView::from(&post))))
}

/// Update a post owned by the caller
pub async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_post_form(&mut multipart).await?;
    let post = load_owned_post(&state, id, &auth).await?;

    let mut changes = PostPatch {
        title: Some(form.title),
        content: Some(form.content),
    }
    .into_changes();

    if let Some(file) = form.file {
        // Same policy as avatars: stored covers are deleted best-effort,
        // external URLs are left alone.
        if let Some(old_key) = storage::stored_key(&post.cover_key) {
            if let Err(e) = state.media_store.delete(old_key).await {
                warn!("Failed to delete old cover {}: {}", old_key, e);
            }
        }

        changes.cover = Some(
            state
                .media_store
                .upload(file.data, storage::COVERS, &file.filename)
                .await
                .map_err(|e| {
                    error!("Cover upload failed: {}", e);
                    ApiError::Upload(e.to_string())
                })?,
        );
    }

    let post = state
        .post_repository
        .update(id, &changes)
        .await
        .map_err(|e| {
            error!("Failed to update post: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    info!("Updated post: {}", post.id);

    Ok(Json(ApiResponse::new("Post updated", PostView::from(&post))))
}

/// Delete a post owned by the caller
pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = load_owned_post(&state, id, &auth).await?;

    // The row delete is the outcome; orphaned covers are tolerated.
    if let Some(key) = storage::stored_key(&post.cover_key) {
        if let Err(e) = state.media_store.delete(key).await {
            warn!("Failed to delete cover {}: {}", key, e);
        }
    }

    let deleted = state.post_repository.delete(id).await.map_err(|e| {
        error!("Failed to delete post: {}", e);
        ApiError::Internal
    })?;
    if !deleted {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    info!("Deleted post: {}", id);

    Ok(Json(ApiResponse::message("Post deleted")))
}
