use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;

/// Admin guard extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require the configured admin
/// token. When no token is configured, every admin request is rejected.
pub struct AdminToken;

impl FromRequestParts<AppState> for AdminToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let expected = state
            .config
            .admin
            .token
            .as_deref()
            .ok_or(AppError::TokenInvalid)?;

        if constant_time_eq(token.as_bytes(), expected.as_bytes()) {
            Ok(AdminToken)
        } else {
            Err(AppError::TokenInvalid)
        }
    }
}

/// Constant-time byte comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
