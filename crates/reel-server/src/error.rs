//! API error type and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use reel_auth::AuthError;
use reel_core::access::DenyReason;
use serde_json::json;
use thiserror::Error;

/// An error returned by a handler or extractor.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("authentication failed: {0}")]
  Auth(#[from] AuthError),

  /// Authenticated, but not as anyone who owns records.
  #[error("unauthorized")]
  Unauthorized,

  #[error("premium access denied: {0:?}")]
  Denied(DenyReason),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::Auth(AuthError::MissingCredential) => {
        (StatusCode::UNAUTHORIZED, json!({ "error": "missing token" }))
      }
      ApiError::Auth(AuthError::InvalidCredential(_) | AuthError::AnonymousSubject) => {
        (StatusCode::UNAUTHORIZED, json!({ "error": "invalid token" }))
      }
      ApiError::Auth(e @ (AuthError::Misconfigured | AuthError::Signing(_))) => {
        tracing::error!(error = %e, "token verification is misconfigured");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          json!({ "error": "jwt secret not configured" }),
        )
      }
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "unauthorized" })),
      ApiError::Denied(reason) => (
        StatusCode::FORBIDDEN,
        json!({ "error": reason.code(), "message": reason.message() }),
      ),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, json!({ "error": m })),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, json!({ "error": m })),
      ApiError::Internal(m) => {
        tracing::error!(error = %m, "internal error");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": m }))
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": e.to_string() }))
      }
    };
    (status, Json(body)).into_response()
  }
}
