//! Application state shared across handlers

use crate::{
    jwt::JwtService,
    repositories::{PostRepository, UserRepository},
    storage::MediaStore,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: JwtService,
    pub media_store: MediaStore,
    pub user_repository: UserRepository,
    pub post_repository: PostRepository,
}
