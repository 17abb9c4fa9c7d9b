//! Handlers for `/movies` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/movies/{id}` | Public; premium titles need an active plan |

use axum::{
  Json,
  extract::{Path, State},
};
use reel_core::{
  access::{AccessRequest, Verdict},
  movie::{Movie, MovieCatalog},
  source::EntitlementSource,
};

use crate::{MovieState, auth::MaybeAuthenticated, error::ApiError};

/// `GET /movies/{id}`
pub async fn get_one<C, O>(
  State(state): State<MovieState<C, O>>,
  caller: MaybeAuthenticated,
  Path(raw_id): Path<String>,
) -> Result<Json<Movie>, ApiError>
where
  C: MovieCatalog,
  C::Error: std::error::Error + Send + Sync + 'static,
  O: EntitlementSource,
{
  let id: u64 = raw_id
    .parse()
    .map_err(|_| ApiError::BadRequest("invalid id".into()))?;

  let movie = state
    .catalog
    .get_movie(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound("movie not found".into()))?;

  let request = AccessRequest {
    premium:    movie.is_premium,
    subject:    caller.subject,
    credential: caller.credential.as_deref(),
  };
  match state.access.decide(request).await {
    Verdict::Allow => Ok(Json(movie)),
    Verdict::Deny(reason) => Err(ApiError::Denied(reason)),
  }
}
