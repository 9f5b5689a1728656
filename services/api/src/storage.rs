//! Media store adapter backed by S3-compatible object storage
//!
//! Uploaded files land under a namespace prefix ("avatars", "covers") with
//! a generated object key, and are exposed through a public base URL. The
//! provider key of every object this service stores is kept on the owning
//! record, so replacement can delete the old object without parsing URLs.

use anyhow::Result;
use aws_sdk_s3::{Client, primitives::ByteStream};
use tracing::info;
use uuid::Uuid;

/// Namespace for user avatars
pub const AVATARS: &str = "avatars";
/// Namespace for post cover images
pub const COVERS: &str = "covers";

/// Object storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket holding all uploaded media
    pub bucket: String,
    /// Public base URL under which bucket objects are reachable
    pub public_base_url: String,
}

impl StorageConfig {
    /// Create a new StorageConfig from environment variables
    ///
    /// # Environment Variables
    /// - `MEDIA_BUCKET_NAME`: Bucket name (default: "quill-media")
    /// - `MEDIA_PUBLIC_URL`: Public base URL (default: "https://<bucket>.s3.amazonaws.com")
    pub fn from_env() -> Result<Self> {
        let bucket =
            std::env::var("MEDIA_BUCKET_NAME").unwrap_or_else(|_| "quill-media".to_string());

        let public_base_url = std::env::var("MEDIA_PUBLIC_URL")
            .unwrap_or_else(|_| format!("https://{}.s3.amazonaws.com", bucket));

        Ok(StorageConfig {
            bucket,
            public_base_url,
        })
    }
}

/// A stored media object: its provider key and its public URL
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

/// Media store adapter
#[derive(Clone)]
pub struct MediaStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl MediaStore {
    /// Create a new media store over an S3 client
    pub fn new(client: Client, config: StorageConfig) -> Self {
        Self {
            client,
            bucket: config.bucket,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Upload a file into the given namespace and return its key and URL
    pub async fn upload(&self, data: Vec<u8>, folder: &str, filename: &str) -> Result<StoredObject> {
        let key = object_key(folder, filename);
        info!("Uploading media object: {}", key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .content_type(content_type_for(filename))
            .send()
            .await?;

        let url = self.public_url(&key);
        Ok(StoredObject { key, url })
    }

    /// Delete a previously stored object by its key
    pub async fn delete(&self, key: &str) -> Result<()> {
        info!("Deleting media object: {}", key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;

        Ok(())
    }

    /// Public URL for a stored object key
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

/// The stored provider key of a record, if it references a self-hosted
/// object
///
/// Keys are only recorded for objects this service uploaded; an empty key
/// marks an externally supplied URL (or no media at all), which must never
/// be deleted from the store.
pub fn stored_key(key: &str) -> Option<&str> {
    if key.is_empty() { None } else { Some(key) }
}

/// Build an object key under a namespace, keeping the original extension
fn object_key(folder: &str, filename: &str) -> String {
    format!("{}/{}.{}", folder, Uuid::new_v4(), extension_of(filename))
}

/// File extension of an uploaded filename, lowercased ("bin" when missing)
fn extension_of(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string())
}

/// Content type for an uploaded filename
fn content_type_for(filename: &str) -> &'static str {
    match extension_of(filename).as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_key_distinguishes_external_urls() {
        assert_eq!(stored_key("avatars/x.png"), Some("avatars/x.png"));
        assert_eq!(stored_key(""), None);
    }

    #[test]
    fn test_object_key_shape() {
        let key = object_key("avatars", "me.PNG");
        assert!(key.starts_with("avatars/"));
        assert!(key.ends_with(".png"));

        let key = object_key("covers", "noextension");
        assert!(key.starts_with("covers/"));
        assert!(key.ends_with(".bin"));
    }

    #[test]
    fn test_object_keys_are_unique() {
        assert_ne!(object_key("avatars", "a.jpg"), object_key("avatars", "a.jpg"));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.jpg"), "image/jpeg");
        assert_eq!(content_type_for("a.JPEG"), "image/jpeg");
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.webp"), "image/webp");
        assert_eq!(content_type_for("a"), "application/octet-stream");
    }

    #[test]
    fn test_public_url_joins_cleanly() {
        let config = StorageConfig {
            bucket: "quill-media".to_string(),
            public_base_url: "https://cdn.example.com/".to_string(),
        };
        let store = MediaStore::new(
            Client::from_conf(
                aws_sdk_s3::Config::builder()
                    .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
                    .build(),
            ),
            config,
        );
        assert_eq!(
            store.public_url("avatars/x.png"),
            "https://cdn.example.com/avatars/x.png"
        );
    }
}
