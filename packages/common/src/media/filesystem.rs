use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::error::MediaError;
use super::traits::MediaStore;
use super::validate_key;

/// Filesystem-backed media store.
///
/// Objects live at `{root}/{key}`; the serving layer maps `{public_base_url}/{key}`
/// back onto the same tree. Writes go through a temp file and an atomic rename so
/// a crashed upload never leaves a half-written object at its final path.
pub struct FilesystemMediaStore {
    root: PathBuf,
    public_base_url: String,
}

impl FilesystemMediaStore {
    /// Create a new filesystem media store rooted at `root`.
    pub async fn new(root: PathBuf, public_base_url: String) -> Result<Self, MediaError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a validated key to its on-disk path.
    pub fn object_path(&self, key: &str) -> Result<PathBuf, MediaError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.root.join(".tmp").join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn put(&self, key: &str, data: &[u8], _content_type: &str) -> Result<String, MediaError> {
        let object_path = self.object_path(key)?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &object_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}
