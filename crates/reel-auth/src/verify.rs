//! The token verifier.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use reel_core::subject::{Subject, SubjectId};
use serde::Deserialize;
use serde_json::Value;

use crate::{AuthError, BEARER_PREFIX};

/// Claims as they arrive; only the subject is inspected beyond what
/// `jsonwebtoken` validates itself.
#[derive(Deserialize)]
struct RawClaims {
  #[serde(default)]
  user_id: Option<Value>,
}

/// Verifies HMAC-signed tokens against a shared secret.
///
/// Immutable once built; cheap to share behind an `Arc`.
#[derive(Clone)]
pub struct TokenVerifier {
  key:              DecodingKey,
  validation:       Validation,
  reject_anonymous: bool,
}

impl std::fmt::Debug for TokenVerifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TokenVerifier")
      .field("key", &"[REDACTED]")
      .field("algorithms", &self.validation.algorithms)
      .field("reject_anonymous", &self.reject_anonymous)
      .finish()
  }
}

impl TokenVerifier {
  /// Build a verifier for `secret`. An empty secret is a configuration error.
  pub fn new(secret: &str) -> Result<Self, AuthError> {
    if secret.is_empty() {
      return Err(AuthError::Misconfigured);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    // Expiry is the token's own; no grace period.
    validation.leeway = 0;
    // Audience is not part of the contract. A present `nbf` is honoured.
    validation.validate_aud = false;
    validation.validate_nbf = true;

    Ok(Self {
      key: DecodingKey::from_secret(secret.as_bytes()),
      validation,
      reject_anonymous: false,
    })
  }

  /// Refuse validly-signed tokens that carry no usable subject instead of
  /// yielding [`Subject::Anonymous`].
  pub fn reject_anonymous(mut self, reject: bool) -> Self {
    self.reject_anonymous = reject;
    self
  }

  /// Verify a bare token (no scheme marker) and extract its subject.
  pub fn verify(&self, token: &str) -> Result<Subject, AuthError> {
    if token.is_empty() {
      return Err(AuthError::MissingCredential);
    }

    let data = decode::<RawClaims>(token, &self.key, &self.validation)
      .map_err(AuthError::InvalidCredential)?;

    match subject_from_claim(data.claims.user_id.as_ref()) {
      Subject::Anonymous if self.reject_anonymous => Err(AuthError::AnonymousSubject),
      Subject::Anonymous => {
        tracing::warn!("accepted a validly-signed token without a usable user_id claim");
        Ok(Subject::Anonymous)
      }
      known => Ok(known),
    }
  }

  /// Verify the value of an `Authorization` header.
  pub fn verify_header(&self, header: Option<&str>) -> Result<Subject, AuthError> {
    self.verify(bearer_token(header)?)
  }
}

/// Extract the token from an `Authorization` header value.
///
/// A missing header, a different scheme, or an empty token are all
/// [`AuthError::MissingCredential`]; nothing is decoded.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
  header
    .and_then(|h| h.strip_prefix(BEARER_PREFIX))
    .filter(|t| !t.is_empty())
    .ok_or(AuthError::MissingCredential)
}

/// Decode the subject claim. JSON numbers are accepted when they denote a
/// positive integer (`7` or `7.0`); anything else is anonymous.
fn subject_from_claim(claim: Option<&Value>) -> Subject {
  let Some(Value::Number(n)) = claim else {
    return Subject::Anonymous;
  };

  let id = match (n.as_u64(), n.as_f64()) {
    (Some(id), _) => Some(id),
    (None, Some(f)) if f.fract() == 0.0 && f >= 1.0 && f < u64::MAX as f64 => Some(f as u64),
    _ => None,
  };

  id.and_then(SubjectId::new)
    .map_or(Subject::Anonymous, Subject::Known)
}
