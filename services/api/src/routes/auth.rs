//! Authentication and profile routes
//!
//! Registration, login, profile retrieval, and profile update. Register
//! and update accept multipart forms so an avatar file can ride along with
//! the text fields; uploads happen before anything is persisted, so a
//! failed upload never leaves a partial record behind.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info, warn};

use crate::{
    error::ApiError,
    middleware::AuthUser,
    models::{
        ApiResponse, AuthResponse, LoginRequest, NewUser, ProfilePatch, ProfileResponse, UserView,
    },
    state::AppState,
    storage,
    validation,
};

/// An uploaded file part: original filename and raw bytes
pub(crate) struct FilePart {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Registration form fields
#[derive(Default)]
struct RegisterForm {
    name: String,
    email: String,
    password: String,
    bio: Option<String>,
    file: Option<FilePart>,
}

async fn read_register_form(multipart: &mut Multipart) -> Result<RegisterForm, ApiError> {
    let mut form = RegisterForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("Invalid multipart payload".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "name" => {
                form.name = field
                    .text()
                    .await
                    .map_err(|_| ApiError::Validation("Invalid name field".to_string()))?;
            }
            "email" => {
                form.email = field
                    .text()
                    .await
                    .map_err(|_| ApiError::Validation("Invalid email field".to_string()))?;
            }
            "password" => {
                form.password = field
                    .text()
                    .await
                    .map_err(|_| ApiError::Validation("Invalid password field".to_string()))?;
            }
            "bio" => {
                form.bio = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::Validation("Invalid bio field".to_string()))?,
                );
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

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = read_register_form(&mut multipart).await?;

    validation::validate_name(&form.name).map_err(ApiError::Validation)?;
    validation::validate_email(&form.email).map_err(ApiError::Validation)?;
    validation::validate_password(&form.password).map_err(ApiError::Validation)?;

    let existing = state
        .user_repository
        .find_by_email(&form.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user by email: {}", e);
            ApiError::Internal
        })?;
    if existing.is_some() {
        return Err(ApiError::Conflict(
            "A user with this email already exists".to_string(),
        ));
    }

    // Upload first: a failed upload must not create an account.
    let avatar = match form.file {
        Some(file) => Some(
            state
                .media_store
                .upload(file.data, storage::AVATARS, &file.filename)
                .await
                .map_err(|e| {
                    error!("Avatar upload failed: {}", e);
                    ApiError::Upload(e.to_string())
                })?,
        ),
        None => None,
    };

    let new_user = NewUser {
        name: form.name,
        email: form.email,
        password: form.password,
        bio: form.bio.unwrap_or_default(),
        avatar,
    };

    let user = state.user_repository.create(&new_user).await.map_err(|e| {
        error!("Failed to create user: {}", e);
        ApiError::Internal
    })?;

    let token = state.jwt_service.issue_token(user.id).map_err(|e| {
        error!("Failed to issue token: {}", e);
        ApiError::Internal
    })?;

    info!("Registered user: {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            "User registered",
            AuthResponse::new(&user, token),
        )),
    ))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    // Unknown email and wrong password produce the same response.
    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user by email: {}", e);
            ApiError::Internal
        })?
        .ok_or(ApiError::InvalidCredentials)?;

    let verified = state
        .user_repository
        .verify_password(&user, &payload.password)
        .await
        .map_err(|e| {
            error!("Failed to verify password: {}", e);
            ApiError::Internal
        })?;
    if !verified {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.jwt_service.issue_token(user.id).map_err(|e| {
        error!("Failed to issue token: {}", e);
        ApiError::Internal
    })?;

    info!("User logged in: {}", user.id);

    Ok(Json(ApiResponse::new(
        "Login successful",
        AuthResponse::new(&user, token),
    )))
}

/// Current user's profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_repository
        .find_by_id(auth.id)
        .await
        .map_err(|e| {
            error!("Failed to load user: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ApiResponse::new(
        "Profile",
        ProfileResponse::from(&user),
    )))
}

async fn read_profile_form(
    multipart: &mut Multipart,
) -> Result<(ProfilePatch, Option<FilePart>), ApiError> {
    let mut patch = ProfilePatch::default();
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("Invalid multipart payload".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "name" => {
                patch.name = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::Validation("Invalid name field".to_string()))?,
                );
            }
            "bio" => {
                patch.bio = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::Validation("Invalid bio field".to_string()))?,
                );
            }
            "password" => {
                patch.password = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::Validation("Invalid password field".to_string()))?,
                );
            }
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::Validation("Invalid file field".to_string()))?
                    .to_vec();
                file = Some(FilePart { filename, data });
            }
            _ => {}
        }
    }

    Ok((patch, file))
}

/// Profile update endpoint
///
/// All field assignments are resolved in memory and persisted by a single
/// save, so an upload failure aborts the whole update.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (patch, file) = read_profile_form(&mut multipart).await?;

    // Defensive: the account could have been deleted under an
    // already-issued token.
    let user = state
        .user_repository
        .find_by_id(auth.id)
        .await
        .map_err(|e| {
            error!("Failed to load user: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let mut changes = patch.into_changes();

    if let Some(file) = file {
        // A stored key marks a self-hosted avatar. Deletion is
        // best-effort: replacement must not fail because cleanup of the
        // old object failed.
        if let Some(old_key) = storage::stored_key(&user.avatar_key) {
            if let Err(e) = state.media_store.delete(old_key).await {
                warn!("Failed to delete old avatar {}: {}", old_key, e);
            }
        }

        changes.avatar = Some(
            state
                .media_store
                .upload(file.data, storage::AVATARS, &file.filename)
                .await
                .map_err(|e| {
                    error!("Avatar upload failed: {}", e);
                    ApiError::Upload(e.to_string())
                })?,
        );
    }

    let user = state
        .user_repository
        .update(auth.id, &changes)
        .await
        .map_err(|e| {
            error!("Failed to update user: {}", e);
            ApiError::Internal
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!("Updated profile: {}", user.id);

    Ok(Json(ApiResponse::new(
        "Profile updated",
        UserView::from(&user),
    )))
}
