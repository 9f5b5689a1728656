//! API models for request and response payloads

use serde::Serialize;

pub mod post;
pub mod user;

// Re-export for convenience
pub use post::{NewPost, Post, PostChanges, PostListResponse, PostPatch, PostQuery, PostView};
pub use user::{
    AuthResponse, LoginRequest, NewUser, ProfilePatch, ProfileResponse, User, UserChanges,
    UserView,
};

/// Response envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful envelope carrying a payload
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<serde_json::Value> {
    /// Successful envelope with no payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_absent_data() {
        let value = serde_json::to_value(ApiResponse::message("done")).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "done");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_envelope_carries_data() {
        let value = serde_json::to_value(ApiResponse::new("ok", 42)).unwrap();
        assert_eq!(value["data"], 42);
    }
}
