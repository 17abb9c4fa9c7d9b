//! Movies: the content items the premium gate protects.
//!
//! The gate only ever reads [`Movie::is_premium`]; everything else is payload.

use std::future::Future;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
  pub id:               u64,
  pub title:            String,
  #[serde(default)]
  pub poster_base64:    String,
  #[serde(default)]
  pub duration_minutes: i32,
  #[serde(default)]
  pub synopsis:         String,
  #[serde(default)]
  pub release_year:     i32,
  #[serde(default)]
  pub rating:           f32,
  #[serde(default)]
  pub views:            i64,
  /// Movies are premium unless stated otherwise.
  #[serde(default = "premium_by_default")]
  pub is_premium:       bool,
  /// Genre ids.
  #[serde(default)]
  pub genres:           Vec<u64>,
  /// Actor ids.
  #[serde(default)]
  pub actors:           Vec<u64>,
}

fn premium_by_default() -> bool { true }

/// Read access to the content records owned by the content service.
pub trait MovieCatalog: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a movie by id. Returns `None` if not found.
  fn get_movie(
    &self,
    id: u64,
  ) -> impl Future<Output = Result<Option<Movie>, Self::Error>> + Send + '_;
}
