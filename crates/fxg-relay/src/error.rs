//! Request-level errors and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::warn;

use fxg_types::PlatformError;

/// Why a webhook request failed.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Missing or wrong shared secret.
    #[error("Unauthorized")]
    Unauthorized,

    /// The gateway session is not established yet.
    #[error("Bot not ready")]
    NotReady,

    /// Required body fields are absent.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A platform call failed, including the user-resolution timeout.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl RelayError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            RelayError::MissingFields(_) => StatusCode::BAD_REQUEST,
            RelayError::Platform(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            RelayError::Unauthorized | RelayError::MissingFields(_) => {
                serde_json::json!({ "error": self.to_string() })
            }
            RelayError::NotReady => {
                serde_json::json!({ "error": self.to_string(), "status": "connecting" })
            }
            RelayError::Platform(e) => {
                warn!(error = %e, "platform call failed");
                serde_json::json!({ "success": false, "error": e.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}
