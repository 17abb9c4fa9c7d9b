//! Token issuance. Login itself lives elsewhere; this is what it calls.

use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use reel_core::subject::SubjectId;
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Lifetime of tokens issued at login, in hours.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub user_id: u64,
  pub email:   String,
  pub iat:     i64,
  pub exp:     i64,
}

/// Signs HS256 tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
  key: EncodingKey,
}

impl TokenIssuer {
  pub fn new(secret: &str) -> Result<Self, AuthError> {
    if secret.is_empty() {
      return Err(AuthError::Misconfigured);
    }
    Ok(Self { key: EncodingKey::from_secret(secret.as_bytes()) })
  }

  /// Issue a token for `user_id` valid for `ttl` from now.
  pub fn issue(&self, user_id: SubjectId, email: &str, ttl: Duration) -> Result<String, AuthError> {
    let now = Utc::now();
    self.sign(&Claims {
      user_id: user_id.get(),
      email:   email.to_owned(),
      iat:     now.timestamp(),
      exp:     (now + ttl).timestamp(),
    })
  }

  /// Sign an arbitrary claim set.
  pub fn sign<C: Serialize>(&self, claims: &C) -> Result<String, AuthError> {
    encode(&Header::default(), claims, &self.key).map_err(AuthError::Signing)
  }
}
