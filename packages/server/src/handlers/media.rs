use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use common::media::validate_key;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// Serve an object written by the filesystem storage backend.
///
/// Only mounted when that backend is configured; the S3 backend hands out
/// bucket URLs instead.
#[instrument(skip(state))]
pub async fn serve_media(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // The same key rules as writes; anything else cannot name a stored object.
    validate_key(&path).map_err(|_| AppError::NotFound("Media object not found".into()))?;

    let file_path = std::path::Path::new(&state.config.storage.root).join(&path);
    let file = match tokio::fs::File::open(&file_path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("Media object not found".into()));
        }
        Err(e) => return Err(AppError::Internal(format!("IO error: {e}"))),
    };

    let mime = mime_guess::from_path(&file_path).first_or_octet_stream();
    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}
