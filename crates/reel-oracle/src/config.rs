//! Connection settings for the subscription authority.

use std::time::Duration;

use reqwest::Url;

use crate::OracleError;

/// Applied when no timeout is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the authority lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct AuthorityConfig {
  base_url: String,
  pub timeout: Duration,
}

impl AuthorityConfig {
  /// Validate `base_url` and pair it with `timeout`.
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self, OracleError> {
    let trimmed = base_url.trim_end_matches('/');
    Url::parse(trimmed)
      .map_err(|e| OracleError::InvalidUrl(base_url.to_owned(), e.to_string()))?;
    Ok(Self { base_url: trimmed.to_owned(), timeout })
  }

  pub fn base_url(&self) -> &str { &self.base_url }

  pub(crate) fn endpoint(&self, path: &str) -> Result<Url, OracleError> {
    let raw = format!("{}{path}", self.base_url);
    Url::parse(&raw).map_err(|e| OracleError::InvalidUrl(raw, e.to_string()))
  }

  /// A pooled client whose connect phase is bounded by the call timeout.
  pub(crate) fn http_client(&self) -> Result<reqwest::Client, OracleError> {
    reqwest::Client::builder()
      .connect_timeout(self.timeout)
      .timeout(self.timeout)
      .build()
      .map_err(OracleError::Client)
  }
}
