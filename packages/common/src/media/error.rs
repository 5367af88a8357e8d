use thiserror::Error;

/// Errors that can occur while storing or addressing media objects.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The object key is empty, absolute, or contains traversal segments.
    #[error("invalid media key: {0:?}")]
    InvalidKey(String),
    /// An I/O error from the filesystem backend.
    #[error("media IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The remote storage backend rejected the operation.
    #[error("media backend error: {0}")]
    Backend(String),
}
