mod error;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::MediaError;
pub use traits::MediaStore;

/// Reject keys that could escape the storage root or address hidden files.
///
/// Keys are forward-slash separated relative paths like `demos/171-...-track.mp3`.
pub fn validate_key(key: &str) -> Result<(), MediaError> {
    if key.is_empty() || key.len() > 512 {
        return Err(MediaError::InvalidKey(key.to_string()));
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(MediaError::InvalidKey(key.to_string()));
    }
    for segment in key.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.starts_with('.') {
            return Err(MediaError::InvalidKey(key.to_string()));
        }
    }
    if key.contains('\\') || key.chars().any(|c| c.is_control()) {
        return Err(MediaError::InvalidKey(key.to_string()));
    }
    Ok(())
}
