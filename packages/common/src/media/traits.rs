use async_trait::async_trait;

use super::error::MediaError;

/// Key-addressed storage for uploaded media (demo audio, competitor photos).
///
/// Objects are write-once: uploads always use a fresh randomized key, so
/// overwrite semantics are never needed.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store bytes under `key` and return the public URL for the object.
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<String, MediaError>;

    /// Public URL for an object key.
    fn public_url(&self, key: &str) -> String;
}
