//! Handlers for the user service, the authority the movie service consults.
//!
//! | Method  | Path         | Notes |
//! |---------|--------------|-------|
//! | `GET`   | `/profile`   | The caller's profile and entitlement |
//! | `PATCH` | `/subscribe` | Body: `{"subscription_type":"yearly","expires_at":"…"}` |

use axum::{
  Json,
  extract::State,
};
use chrono::{DateTime, Utc};
use reel_core::{plan::Plan, subject::SubjectId};
use serde::{Deserialize, Serialize};

use crate::{
  ProfileState,
  auth::Authenticated,
  error::ApiError,
  store::Profile,
};

fn owner(caller: &Authenticated) -> Result<SubjectId, ApiError> {
  caller.subject.known().ok_or_else(|| {
    tracing::warn!("anonymous token refused on a profile endpoint");
    ApiError::Unauthorized
  })
}

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /profile`
pub async fn get_profile(
  State(state): State<ProfileState>,
  caller: Authenticated,
) -> Result<Json<Profile>, ApiError> {
  let id = owner(&caller)?;
  let profile = state
    .profiles
    .get(id)
    .await
    .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
  Ok(Json(profile))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubscriptionBody {
  pub subscription_type: String,
  #[serde(default)]
  pub expires_at:        Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionUpdated {
  pub message:           &'static str,
  pub subscription_type: &'static str,
  pub expires_at:        Option<DateTime<Utc>>,
}

/// `PATCH /subscribe`
pub async fn set_subscription(
  State(state): State<ProfileState>,
  caller: Authenticated,
  Json(body): Json<SubscriptionBody>,
) -> Result<Json<SubscriptionUpdated>, ApiError> {
  let id = owner(&caller)?;
  let plan = Plan::parse_optional(&body.subscription_type)
    .map_err(|_| ApiError::BadRequest("unknown plan".into()))?;

  let profile = state
    .profiles
    .set_subscription(id, plan, body.expires_at)
    .await
    .ok_or_else(|| ApiError::NotFound("user not found".into()))?;

  tracing::info!(
    user_id = %id,
    plan = reel_core::plan::label(profile.subscription_type),
    expires_at = ?profile.subscription_expired_at,
    "subscription updated"
  );
  Ok(Json(SubscriptionUpdated {
    message:           "subscription updated",
    subscription_type: reel_core::plan::label(profile.subscription_type),
    expires_at:        profile.subscription_expired_at,
  }))
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::Duration;
  use reel_auth::{TokenIssuer, TokenVerifier};
  use serde_json::{Value, json};
  use tower::ServiceExt;

  use super::*;
  use crate::{profiles_router, store::ProfileStore};

  const SECRET: &str = "profiles-secret";

  fn router() -> Router {
    let ana = Profile {
      id:                      SubjectId::new(7).unwrap(),
      name:                    "Ana".into(),
      email:                   "ana@example.com".into(),
      subscription_type:       None,
      subscription_expired_at: None,
    };
    profiles_router(ProfileState {
      profiles: Arc::new(ProfileStore::new([ana])),
      verifier: Arc::new(TokenVerifier::new(SECRET).unwrap()),
    })
  }

  fn bearer(user_id: u64) -> String {
    let token = TokenIssuer::new(SECRET)
      .unwrap()
      .issue(SubjectId::new(user_id).unwrap(), "ana@example.com", Duration::hours(1))
      .unwrap();
    format!("Bearer {token}")
  }

  fn anonymous_bearer() -> String {
    let exp = (Utc::now() + Duration::hours(1)).timestamp();
    let token = TokenIssuer::new(SECRET)
      .unwrap()
      .sign(&json!({ "email": "ghost@example.com", "exp": exp }))
      .unwrap();
    format!("Bearer {token}")
  }

  async fn send(
    router: Router,
    method: &str,
    uri: &str,
    authorization: Option<&str>,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
      builder = builder.header(header::AUTHORIZATION, value);
    }
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let resp = router.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
  }

  // ── Authentication ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn credential_failures() {
    let (status, body) = send(router(), "GET", "/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing token");

    let (status, body) = send(router(), "GET", "/profile", Some("Bearer x.y.z"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid token");

    let anonymous = anonymous_bearer();
    let (status, body) = send(router(), "GET", "/profile", Some(&anonymous), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
  }

  // ── Profile ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn profile_of_caller() {
    let (status, body) = send(router(), "GET", "/profile", Some(&bearer(7)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 7);
    assert_eq!(body["name"], "Ana");
    assert_eq!(body["subscription_type"], "none");
    assert_eq!(body["subscription_expired_at"], Value::Null);

    let (status, body) = send(router(), "GET", "/profile", Some(&bearer(8)), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "user not found");
  }

  // ── Subscribe ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn subscribe_then_read_back() {
    let app = router();
    let auth = bearer(7);

    let (status, body) = send(
      app.clone(),
      "PATCH",
      "/subscribe",
      Some(&auth),
      Some(json!({ "subscription_type": "3months", "expires_at": "2030-04-01T00:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "subscription updated");
    assert_eq!(body["subscription_type"], "3months");

    let (_, profile) = send(app.clone(), "GET", "/profile", Some(&auth), None).await;
    assert_eq!(profile["subscription_type"], "3months");
    assert_eq!(profile["subscription_expired_at"], "2030-04-01T00:00:00Z");

    let (status, body) = send(
      app.clone(),
      "PATCH",
      "/subscribe",
      Some(&auth),
      Some(json!({ "subscription_type": "none" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expires_at"], Value::Null);

    let (_, profile) = send(app, "GET", "/profile", Some(&auth), None).await;
    assert_eq!(profile["subscription_type"], "none");
    assert_eq!(profile["subscription_expired_at"], Value::Null);
  }

  #[tokio::test]
  async fn subscribe_rejects_unknown_plan() {
    let (status, body) = send(
      router(),
      "PATCH",
      "/subscribe",
      Some(&bearer(7)),
      Some(json!({ "subscription_type": "lifetime" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown plan");
  }
}
