//! HTTP boundary for the Reel services.
//!
//! Each process runs one [`Service`]: the movie catalog with its premium
//! gate, the user service that is the subscription authority, or the
//! purchase service that feeds it. Every router verifies bearer tokens with
//! the same [`TokenVerifier`].

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod store;

pub use config::{ConfigError, ServerConfig, Service};
pub use error::ApiError;

use std::sync::Arc;

use axum::{
  Router,
  extract::FromRef,
  routing::{get, patch, post},
};
use reel_auth::TokenVerifier;
use reel_core::{access::AccessEngine, movie::MovieCatalog, source::EntitlementSource};
use reel_oracle::{ProfileSync, SubscriptionOracle};
use tower_http::trace::TraceLayer;

use store::{InMemoryCatalog, ProfileStore, Seed, SubscriptionLedger};

// ─── Application state ────────────────────────────────────────────────────────

/// State for the movie service.
pub struct MovieState<C, O> {
  pub catalog:  Arc<C>,
  pub access:   Arc<AccessEngine<O>>,
  pub verifier: Arc<TokenVerifier>,
}

impl<C, O> Clone for MovieState<C, O> {
  fn clone(&self) -> Self {
    Self {
      catalog:  self.catalog.clone(),
      access:   self.access.clone(),
      verifier: self.verifier.clone(),
    }
  }
}

impl<C, O> FromRef<MovieState<C, O>> for Arc<TokenVerifier> {
  fn from_ref(state: &MovieState<C, O>) -> Self { state.verifier.clone() }
}

/// State for the user service.
#[derive(Clone, FromRef)]
pub struct ProfileState {
  pub profiles: Arc<ProfileStore>,
  pub verifier: Arc<TokenVerifier>,
}

/// State for the purchase service.
#[derive(Clone, FromRef)]
pub struct SubscriptionState {
  pub ledger:   Arc<SubscriptionLedger>,
  pub sync:     ProfileSync,
  pub verifier: Arc<TokenVerifier>,
}

// ─── Routers ──────────────────────────────────────────────────────────────────

/// `GET /movies/{id}`, gated for premium titles.
pub fn movies_router<C, O>(state: MovieState<C, O>) -> Router
where
  C: MovieCatalog + 'static,
  C::Error: std::error::Error + Send + Sync + 'static,
  O: EntitlementSource + 'static,
{
  Router::new()
    .route("/movies/{id}", get(handlers::movies::get_one::<C, O>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// `GET /profile` and `PATCH /subscribe`.
pub fn profiles_router(state: ProfileState) -> Router {
  Router::new()
    .route("/profile", get(handlers::profiles::get_profile))
    .route("/subscribe", patch(handlers::profiles::set_subscription))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// `POST /subscribe` and `GET /subscriptions/me`.
pub fn subscriptions_router(state: SubscriptionState) -> Router {
  Router::new()
    .route("/subscribe", post(handlers::subscriptions::purchase))
    .route("/subscriptions/me", get(handlers::subscriptions::mine))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Assemble the router for `service` from validated configuration.
///
/// Fails if the signing secret is absent, or if the service talks to the
/// user service and its URL is absent or invalid.
pub fn app(service: Service, config: &ServerConfig, seed: Seed) -> Result<Router, ConfigError> {
  let verifier = Arc::new(config.verifier()?);

  let router = match service {
    Service::Movies => {
      let oracle = SubscriptionOracle::new(config.oracle.resolve("oracle")?)?;
      tracing::info!(
        authority = oracle.config().base_url(),
        timeout = ?oracle.config().timeout,
        movies = seed.movies.len(),
        "movie service configured"
      );
      movies_router(MovieState {
        catalog: Arc::new(InMemoryCatalog::new(seed.movies)),
        access: Arc::new(AccessEngine::new(oracle)),
        verifier,
      })
    }
    Service::Users => {
      tracing::info!(profiles = seed.profiles.len(), "user service configured");
      profiles_router(ProfileState {
        profiles: Arc::new(ProfileStore::new(seed.profiles)),
        verifier,
      })
    }
    Service::Subscriptions => {
      let sync = ProfileSync::new(config.user_service.resolve("user_service")?)?;
      subscriptions_router(SubscriptionState {
        ledger: Arc::new(SubscriptionLedger::default()),
        sync,
        verifier,
      })
    }
  };
  Ok(router)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
