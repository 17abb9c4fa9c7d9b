//! Error taxonomy for token handling.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
  /// No `Authorization` header, wrong scheme, or an empty token.
  #[error("missing credential")]
  MissingCredential,

  /// Bad signature, undecodable, or past its embedded expiry.
  #[error("invalid credential: {0}")]
  InvalidCredential(#[source] jsonwebtoken::errors::Error),

  /// Valid signature but no positive integer subject, and anonymous tokens
  /// are refused.
  #[error("credential carries no usable subject")]
  AnonymousSubject,

  /// No signing secret is configured. Never treated as "valid".
  #[error("signing secret is not configured")]
  Misconfigured,

  #[error("failed to sign token: {0}")]
  Signing(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
  /// Stable machine-readable code, distinct per failure class.
  pub fn code(&self) -> &'static str {
    match self {
      Self::MissingCredential => "missing_credential",
      Self::InvalidCredential(_) | Self::AnonymousSubject => "invalid_credential",
      Self::Misconfigured | Self::Signing(_) => "server_misconfigured",
    }
  }
}
