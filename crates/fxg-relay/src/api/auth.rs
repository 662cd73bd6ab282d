//! Shared-secret check for the webhook endpoints.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use fxg_types::SecretString;

use crate::error::RelayError;

/// The token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Accept the request only if its bearer token equals `secret`.
///
/// An unset secret rejects every request.
pub fn authorize(headers: &HeaderMap, secret: &SecretString) -> Result<(), RelayError> {
    match bearer_token(headers) {
        Some(token) if !secret.is_empty() && token == secret.expose() => Ok(()),
        _ => Err(RelayError::Unauthorized),
    }
}
