//! Handlers for plan purchases.
//!
//! | Method | Path                | Notes |
//! |--------|---------------------|-------|
//! | `POST` | `/subscribe`        | Body: `{"plan":"monthly"}` |
//! | `GET`  | `/subscriptions/me` | The caller's purchases, newest first |
//!
//! A purchase is recorded first and then pushed to the user service. A
//! failed push does not undo the purchase; the record is marked
//! [`SyncStatus::Failed`] instead.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use reel_core::{plan::Plan, subject::SubjectId};
use serde::{Deserialize, Serialize};

use crate::{
  SubscriptionState,
  auth::Authenticated,
  error::ApiError,
  store::{Subscription, SyncStatus},
};

fn buyer(caller: &Authenticated) -> Result<SubjectId, ApiError> {
  caller.subject.known().ok_or_else(|| {
    tracing::warn!("anonymous token refused on a purchase endpoint");
    ApiError::Unauthorized
  })
}

// ─── Purchase ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PurchaseBody {
  pub plan: String,
}

#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
  pub message:      &'static str,
  pub subscription: Subscription,
}

/// `POST /subscribe`
pub async fn purchase(
  State(state): State<SubscriptionState>,
  caller: Authenticated,
  Json(body): Json<PurchaseBody>,
) -> Result<impl IntoResponse, ApiError> {
  let user_id = buyer(&caller)?;
  let plan: Plan = body
    .plan
    .parse()
    .map_err(|_| ApiError::BadRequest("unknown plan".into()))?;

  let start_at = Utc::now();
  let end_at = plan
    .ends_at(start_at)
    .map_err(|e| ApiError::Internal(e.to_string()))?;
  let recorded = state.ledger.record(user_id, plan, start_at, end_at).await;

  let (status, message, sync) =
    match state.sync.push(&caller.credential, Some(plan), Some(end_at)).await {
      Ok(()) => (StatusCode::CREATED, "subscription successful", SyncStatus::Synced),
      Err(error) => {
        tracing::warn!(
          user_id = %user_id,
          subscription = recorded.id,
          error = %error,
          "purchase recorded but the user service was not updated"
        );
        (
          StatusCode::OK,
          "subscription created but failed to update user-service",
          SyncStatus::Failed,
        )
      }
    };

  let subscription = match state.ledger.mark(recorded.id, sync).await {
    Some(updated) => updated,
    None => Subscription { sync, ..recorded },
  };
  Ok((status, Json(PurchaseResponse { message, subscription })))
}

// ─── History ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct History {
  pub user_id:       SubjectId,
  pub subscriptions: Vec<Subscription>,
}

/// `GET /subscriptions/me`
pub async fn mine(
  State(state): State<SubscriptionState>,
  caller: Authenticated,
) -> Result<Json<History>, ApiError> {
  let user_id = buyer(&caller)?;
  let subscriptions = state.ledger.for_user(user_id).await;
  Ok(Json(History { user_id, subscriptions }))
}
