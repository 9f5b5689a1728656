//! User model and related views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::storage::StoredObject;

/// User entity
///
/// The password hash never leaves the process: it is skipped on
/// serialization, and none of the response views carry it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: String,
    pub avatar_url: String,
    /// Provider key of a self-hosted avatar; empty when the avatar is an
    /// externally supplied URL or absent
    #[serde(skip_serializing)]
    pub avatar_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user creation payload; the password is hashed by the repository
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub bio: String,
    pub avatar: Option<StoredObject>,
}

/// Resolved profile changes, persisted in a single save
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<StoredObject>,
}

/// Raw profile patch as supplied by the client
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub password: Option<String>,
}

impl ProfilePatch {
    /// Apply the field update policy: name and password are replaced only
    /// when supplied non-empty, bio is replaced whenever the field was
    /// present at all (an explicit empty string clears it).
    pub fn into_changes(self) -> UserChanges {
        UserChanges {
            name: self.name.filter(|n| !n.is_empty()),
            bio: self.bio,
            password: self.password.filter(|p| !p.is_empty()),
            avatar: None,
        }
    }
}

/// Request for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// View returned by registration and login, with a fresh session token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub avatar: String,
    pub token: String,
}

impl AuthResponse {
    pub fn new(user: &User, token: String) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
            avatar: user.avatar_url.clone(),
            token,
        }
    }
}

/// View returned by profile retrieval
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
            avatar: user.avatar_url.clone(),
            created_at: user.created_at,
        }
    }
}

/// View returned by profile update
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub bio: String,
    pub avatar: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            bio: user.bio.clone(),
            avatar: user.avatar_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            bio: "Writes about engines".to_string(),
            avatar_url: "https://cdn.example.com/avatars/x.png".to_string(),
            avatar_key: "avatars/x.png".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_serialization_never_exposes_password() {
        let value = serde_json::to_value(sample_user()).unwrap();
        assert!(value.get("password_hash").is_none());
        assert!(value.get("password").is_none());
    }

    #[test]
    fn test_profile_views_never_expose_password() {
        let user = sample_user();
        for value in [
            serde_json::to_value(ProfileResponse::from(&user)).unwrap(),
            serde_json::to_value(UserView::from(&user)).unwrap(),
            serde_json::to_value(AuthResponse::new(&user, "tok".into())).unwrap(),
        ] {
            assert!(value.get("password_hash").is_none());
            assert!(value.get("password").is_none());
        }
    }

    #[test]
    fn test_patch_policy_ignores_empty_name_and_password() {
        let changes = ProfilePatch {
            name: Some("".to_string()),
            bio: None,
            password: Some("".to_string()),
        }
        .into_changes();

        assert!(changes.name.is_none());
        assert!(changes.password.is_none());
        assert!(changes.bio.is_none());
    }

    #[test]
    fn test_patch_policy_explicit_empty_bio_clears_it() {
        // bio supplied as "" is distinct from bio absent
        let changes = ProfilePatch {
            name: None,
            bio: Some("".to_string()),
            password: None,
        }
        .into_changes();

        assert_eq!(changes.bio.as_deref(), Some(""));
    }

    #[test]
    fn test_patch_policy_keeps_supplied_values() {
        let changes = ProfilePatch {
            name: Some("Grace".to_string()),
            bio: Some("New bio".to_string()),
            password: Some("hunter2hunter2".to_string()),
        }
        .into_changes();

        assert_eq!(changes.name.as_deref(), Some("Grace"));
        assert_eq!(changes.bio.as_deref(), Some("New bio"));
        assert_eq!(changes.password.as_deref(), Some("hunter2hunter2"));
    }
}
