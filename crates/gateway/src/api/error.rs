//! Mapping from domain errors to `{ "error": "<message>" }` responses.
//!
//! Messages for server-side failures are fixed strings; the underlying
//! engine error is logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use cc_domain::error::Error;

/// Build a standardized JSON error response: `{ "error": "<message>" }`.
pub fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Handler error wrapping the shared [`Error`].
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            Error::BadRequest(msg) => api_error(StatusCode::BAD_REQUEST, msg.clone()),
            Error::MalformedClaims(detail) => {
                tracing::info!(detail = %detail, "rejected identity token");
                api_error(StatusCode::BAD_REQUEST, "identity token claims are malformed")
            }
            Error::CredentialNotFound(_) => api_error(StatusCode::NOT_FOUND, "credential not found"),
            Error::StoreWrite(_) => {
                tracing::error!(error = %self.0, "credential store write failed");
                api_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to persist credential")
            }
            _ => {
                tracing::error!(error = %self.0, "request failed");
                api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}
