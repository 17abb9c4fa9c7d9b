//! Bearer-token extractors.
//!
//! [`Authenticated`] rejects the request unless a valid token is present.
//! [`MaybeAuthenticated`] never rejects; it reports what it found so the
//! access engine can decide. Both attach the verified [`Subject`] to the
//! request extensions.

use std::sync::Arc;

use axum::{
  extract::{FromRef, FromRequestParts},
  http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use reel_auth::TokenVerifier;
use reel_core::subject::Subject;

use crate::error::ApiError;

/// The raw `Authorization` header value, if it is valid UTF-8.
pub fn authorization(headers: &HeaderMap) -> Option<&str> {
  headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

/// A caller whose token verified.
#[derive(Debug, Clone)]
pub struct Authenticated {
  pub subject:    Subject,
  /// The header exactly as received, for forwarding.
  pub credential: String,
}

impl<S> FromRequestParts<S> for Authenticated
where
  Arc<TokenVerifier>: FromRef<S>,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    let verifier = Arc::<TokenVerifier>::from_ref(state);
    let header = authorization(&parts.headers);
    let subject = verifier.verify_header(header)?;
    let credential = header.unwrap_or_default().to_owned();

    parts.extensions.insert(subject);
    Ok(Self { subject, credential })
  }
}

/// Whatever the caller presented, verified where possible.
///
/// `subject` is `None` when there was no token or it failed verification;
/// `credential` is the raw header regardless.
#[derive(Debug, Clone, Default)]
pub struct MaybeAuthenticated {
  pub subject:    Option<Subject>,
  pub credential: Option<String>,
}

impl<S> FromRequestParts<S> for MaybeAuthenticated
where
  Arc<TokenVerifier>: FromRef<S>,
  S: Send + Sync,
{
  type Rejection = std::convert::Infallible;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    let verifier = Arc::<TokenVerifier>::from_ref(state);
    let header = authorization(&parts.headers);

    let subject = match verifier.verify_header(header) {
      Ok(subject) => Some(subject),
      Err(e) => {
        tracing::debug!(reason = e.code(), "request carries no verified subject");
        None
      }
    };
    let credential = header.map(str::to_owned);

    if let Some(subject) = subject {
      parts.extensions.insert(subject);
    }
    Ok(Self { subject, credential })
  }
}
