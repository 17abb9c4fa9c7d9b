//! Failures talking to the subscription authority.
//!
//! Every variant means "the authority could not give a usable answer". None
//! of them means "the subject has no subscription"; that is a successful
//! answer carrying [`reel_core::entitlement::Entitlement::none`].

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
  #[error("invalid authority URL {0:?}: {1}")]
  InvalidUrl(String, String),

  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("credential is not a valid header value")]
  InvalidCredential,

  #[error("no response within {0:?}")]
  Timeout(Duration),

  #[error("transport error: {0}")]
  Transport(#[source] reqwest::Error),

  #[error("authority answered {0}")]
  Status(StatusCode),

  #[error("authority answered with an undecodable body: {0}")]
  MalformedBody(String),
}

impl OracleError {
  /// Classify a `reqwest` failure, folding its own timeout into ours.
  pub(crate) fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
    if error.is_timeout() {
      Self::Timeout(timeout)
    } else {
      Self::Transport(error)
    }
  }
}
