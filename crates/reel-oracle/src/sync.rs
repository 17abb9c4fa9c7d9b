//! Pushes a purchased plan to the subscription authority.

use chrono::{DateTime, Utc};
use reel_core::plan::{self, Plan};
use reqwest::{
  Url,
  header::{AUTHORIZATION, HeaderValue},
};
use serde::Serialize;

use crate::{AuthorityConfig, OracleError};

/// Body of `PATCH /subscribe`.
#[derive(Debug, Serialize)]
struct SubscriptionUpdate<'a> {
  subscription_type: &'a str,
  expires_at:        Option<DateTime<Utc>>,
}

/// Client for the authority's `PATCH /subscribe` endpoint.
#[derive(Debug, Clone)]
pub struct ProfileSync {
  http:          reqwest::Client,
  subscribe_url: Url,
  config:        AuthorityConfig,
}

impl ProfileSync {
  pub fn new(config: AuthorityConfig) -> Result<Self, OracleError> {
    Ok(Self {
      http:          config.http_client()?,
      subscribe_url: config.endpoint("/subscribe")?,
      config,
    })
  }

  /// Record `plan` (or no plan) on the caller's profile.
  ///
  /// `credential` is forwarded verbatim; the authority decides whose
  /// profile it is. Any status of 400 or above is an error.
  pub async fn push(
    &self,
    credential: &str,
    plan: Option<Plan>,
    expires_at: Option<DateTime<Utc>>,
  ) -> Result<(), OracleError> {
    let header = HeaderValue::from_str(credential).map_err(|_| OracleError::InvalidCredential)?;
    let timeout = self.config.timeout;
    let body = SubscriptionUpdate { subscription_type: plan::label(plan), expires_at };

    let call = async {
      let resp = self
        .http
        .patch(self.subscribe_url.clone())
        .header(AUTHORIZATION, header)
        .json(&body)
        .send()
        .await
        .map_err(|e| OracleError::from_reqwest(e, timeout))?;

      let status = resp.status();
      if status.is_client_error() || status.is_server_error() {
        return Err(OracleError::Status(status));
      }
      Ok(())
    };

    tokio::time::timeout(timeout, call)
      .await
      .map_err(|_| OracleError::Timeout(timeout))?
  }
}
