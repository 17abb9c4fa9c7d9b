//! The remote subscription oracle.

use reel_core::{
  entitlement::{Entitlement, Expiry},
  plan::Plan,
  source::EntitlementSource,
};
use reqwest::{
  Url,
  header::{AUTHORIZATION, HeaderValue},
};
use serde_json::Value;

use crate::{AuthorityConfig, OracleError};

/// Asks the authority's `/profile` endpoint for the caller's entitlement.
///
/// Cheap to clone; the inner [`reqwest::Client`] pools connections and is
/// shared by every concurrent request. Dropping an in-flight
/// [`check`](Self::check) future aborts the outbound call and releases its
/// connection.
#[derive(Debug, Clone)]
pub struct SubscriptionOracle {
  http:        reqwest::Client,
  profile_url: Url,
  config:      AuthorityConfig,
}

impl SubscriptionOracle {
  pub fn new(config: AuthorityConfig) -> Result<Self, OracleError> {
    Ok(Self {
      http:        config.http_client()?,
      profile_url: config.endpoint("/profile")?,
      config,
    })
  }

  pub fn config(&self) -> &AuthorityConfig { &self.config }

  /// `GET /profile`, forwarding `credential` as the `Authorization` header.
  ///
  /// Resolves within the configured timeout. A non-2xx status, a transport
  /// failure or a body that is not a JSON object is an error; anything a
  /// JSON object can say about the subscription is an [`Entitlement`].
  pub async fn check(&self, credential: &str) -> Result<Entitlement, OracleError> {
    let header = HeaderValue::from_str(credential).map_err(|_| OracleError::InvalidCredential)?;
    let timeout = self.config.timeout;

    let call = async {
      let resp = self
        .http
        .get(self.profile_url.clone())
        .header(AUTHORIZATION, header)
        .send()
        .await
        .map_err(|e| OracleError::from_reqwest(e, timeout))?;

      let status = resp.status();
      if !status.is_success() {
        return Err(OracleError::Status(status));
      }

      let bytes = resp
        .bytes()
        .await
        .map_err(|e| OracleError::from_reqwest(e, timeout))?;
      serde_json::from_slice::<Value>(&bytes)
        .map_err(|e| OracleError::MalformedBody(e.to_string()))
    };

    let body = tokio::time::timeout(timeout, call)
      .await
      .map_err(|_| OracleError::Timeout(timeout))??;

    parse_profile(&body)
  }
}

impl EntitlementSource for SubscriptionOracle {
  type Error = OracleError;

  async fn check_entitlement(&self, credential: &str) -> Result<Entitlement, OracleError> {
    self.check(credential).await
  }
}

/// Read an entitlement out of a profile document.
///
/// Fails closed: a missing, non-string or unrecognised `subscription_type`
/// is no plan; a missing or non-string `subscription_expired_at` is a
/// missing expiry.
pub fn parse_profile(body: &Value) -> Result<Entitlement, OracleError> {
  let Value::Object(fields) = body else {
    return Err(OracleError::MalformedBody("expected a JSON object".into()));
  };

  let plan = match fields.get("subscription_type") {
    Some(Value::String(raw)) => Plan::parse_optional(raw).unwrap_or_else(|e| {
      tracing::debug!(error = %e, "unrecognised subscription_type, treating as none");
      None
    }),
    _ => None,
  };

  let expiry = match fields.get("subscription_expired_at") {
    Some(Value::String(raw)) => Expiry::parse(Some(raw.as_str())),
    _ => Expiry::Missing,
  };

  Ok(Entitlement { plan, expiry })
}
