//! The premium gate against a live user service.
//!
//! The user service router is served on a loopback socket and the movie
//! service consults it over real HTTP, exactly as in production.

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::Utc;
use reel_auth::{TokenIssuer, TokenVerifier};
use reel_core::{access::AccessEngine, movie::Movie, plan::Plan, subject::SubjectId};
use reel_oracle::{AuthorityConfig, ProfileSync, SubscriptionOracle};
use reel_server::{
  MovieState,
  ProfileState,
  movies_router,
  profiles_router,
  store::{InMemoryCatalog, Profile, ProfileStore},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

const SECRET: &str = "shared-secret";

fn premium_movie() -> Movie {
  serde_json::from_value(json!({ "id": 42, "title": "Solaris", "is_premium": true })).unwrap()
}

fn bearer(user_id: u64) -> String {
  let token = TokenIssuer::new(SECRET)
    .unwrap()
    .issue(SubjectId::new(user_id).unwrap(), "viewer@example.com", chrono::Duration::hours(1))
    .unwrap();
  format!("Bearer {token}")
}

fn profile(plan: Option<Plan>, expires: Option<chrono::DateTime<Utc>>) -> Profile {
  Profile {
    id:                      SubjectId::new(7).unwrap(),
    name:                    "Ana".into(),
    email:                   "viewer@example.com".into(),
    subscription_type:       plan,
    subscription_expired_at: expires,
  }
}

/// Serve a user service holding `profiles` and return its base URL.
async fn spawn_user_service(profiles: Vec<Profile>) -> String {
  let router = profiles_router(ProfileState {
    profiles: Arc::new(ProfileStore::new(profiles)),
    verifier: Arc::new(TokenVerifier::new(SECRET).unwrap()),
  });
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let address = listener.local_addr().unwrap();
  tokio::spawn(async move { axum::serve(listener, router).await });
  format!("http://{address}")
}

fn movie_service(authority: &str, timeout: Duration) -> Router {
  let oracle = SubscriptionOracle::new(AuthorityConfig::new(authority, timeout).unwrap()).unwrap();
  movies_router(MovieState {
    catalog:  Arc::new(InMemoryCatalog::new([premium_movie()])),
    access:   Arc::new(AccessEngine::new(oracle)),
    verifier: Arc::new(TokenVerifier::new(SECRET).unwrap()),
  })
}

async fn fetch(router: Router, authorization: Option<&str>) -> (StatusCode, Value) {
  let mut builder = Request::builder().uri("/movies/42");
  if let Some(value) = authorization {
    builder = builder.header(header::AUTHORIZATION, value);
  }
  let resp = router.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn absent_token_never_reaches_the_authority() {
  let authority = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(200))
    .expect(0)
    .mount(&authority)
    .await;

  let (status, body) = fetch(movie_service(&authority.uri(), Duration::from_secs(5)), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["error"], "subscription_required");
}

#[tokio::test]
async fn active_yearly_plan_is_served() {
  let expires = Utc::now() + chrono::Duration::days(365);
  let authority = spawn_user_service(vec![profile(Some(Plan::Yearly), Some(expires))]).await;

  let (status, body) =
    fetch(movie_service(&authority, Duration::from_secs(5)), Some(&bearer(7))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["title"], "Solaris");
}

#[tokio::test]
async fn plan_that_ended_yesterday_is_expired() {
  let expires = Utc::now() - chrono::Duration::days(1);
  let authority = spawn_user_service(vec![profile(Some(Plan::Yearly), Some(expires))]).await;

  let (status, body) =
    fetch(movie_service(&authority, Duration::from_secs(5)), Some(&bearer(7))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["error"], "subscription_expired");
}

#[tokio::test]
async fn no_plan_and_unknown_user_are_refused() {
  let authority = spawn_user_service(vec![profile(None, None)]).await;
  let movies = movie_service(&authority, Duration::from_secs(5));

  let (status, body) = fetch(movies.clone(), Some(&bearer(7))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["error"], "subscription_required");

  // The authority answers 404 for a user it does not know.
  let (status, body) = fetch(movies, Some(&bearer(8))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["error"], "subscription_required");
}

#[tokio::test]
async fn purchase_on_the_authority_unlocks_premium() {
  let authority = spawn_user_service(vec![profile(None, None)]).await;
  let movies = movie_service(&authority, Duration::from_secs(5));
  let auth = bearer(7);

  let (status, _) = fetch(movies.clone(), Some(&auth)).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let sync = ProfileSync::new(AuthorityConfig::new(&authority, Duration::from_secs(5)).unwrap())
    .unwrap();
  let expires = Utc::now() + chrono::Duration::days(30);
  sync.push(&auth, Some(Plan::Monthly), Some(expires)).await.unwrap();

  let (status, _) = fetch(movies, Some(&auth)).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn slow_authority_is_unreachable_within_the_timeout() {
  let authority = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(
      ResponseTemplate::new(200)
        .set_body_json(json!({
          "subscription_type": "yearly",
          "subscription_expired_at": "2099-01-01T00:00:00Z",
        }))
        .set_delay(Duration::from_secs(5)),
    )
    .mount(&authority)
    .await;

  let timeout = Duration::from_millis(400);
  let started = Instant::now();
  let (status, body) = fetch(movie_service(&authority.uri(), timeout), Some(&bearer(7))).await;
  let elapsed = started.elapsed();

  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["error"], "subscription_required");
  assert!(elapsed >= timeout, "answered before the timeout: {elapsed:?}");
  assert!(elapsed < Duration::from_secs(2), "timeout not enforced: {elapsed:?}");
}
