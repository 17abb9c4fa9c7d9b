//! In-memory stores backing the three services.
//!
//! Content and profiles are seeded from a JSON file at startup; purchases
//! are appended to a process-local ledger. None of this survives a restart.

use std::{
  collections::HashMap,
  convert::Infallible,
  path::Path,
  sync::atomic::{AtomicU64, Ordering},
};

use chrono::{DateTime, Utc};
use reel_core::{
  movie::{Movie, MovieCatalog},
  plan::{self, Plan},
  subject::SubjectId,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::ConfigError;

// ─── Seed ────────────────────────────────────────────────────────────────────

/// Shape of the seed file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Seed {
  #[serde(default)]
  pub movies:   Vec<Movie>,
  #[serde(default)]
  pub profiles: Vec<Profile>,
}

impl Seed {
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::SeedIo {
      path: path.to_path_buf(),
      source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::SeedJson {
      path: path.to_path_buf(),
      source,
    })
  }
}

// ─── Movies ──────────────────────────────────────────────────────────────────

/// A read-only movie catalog.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
  movies: HashMap<u64, Movie>,
}

impl InMemoryCatalog {
  pub fn new(movies: impl IntoIterator<Item = Movie>) -> Self {
    Self { movies: movies.into_iter().map(|m| (m.id, m)).collect() }
  }

  pub fn len(&self) -> usize { self.movies.len() }

  pub fn is_empty(&self) -> bool { self.movies.is_empty() }
}

impl MovieCatalog for InMemoryCatalog {
  type Error = Infallible;

  async fn get_movie(&self, id: u64) -> Result<Option<Movie>, Infallible> {
    Ok(self.movies.get(&id).cloned())
  }
}

// ─── Profiles ────────────────────────────────────────────────────────────────

/// A user as the subscription authority sees them. Serialises to the
/// `GET /profile` document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
  pub id:                      SubjectId,
  #[serde(default)]
  pub name:                    String,
  #[serde(default)]
  pub email:                   String,
  #[serde(default, with = "plan::wire")]
  pub subscription_type:       Option<Plan>,
  #[serde(default)]
  pub subscription_expired_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct ProfileStore {
  profiles: RwLock<HashMap<SubjectId, Profile>>,
}

impl ProfileStore {
  pub fn new(profiles: impl IntoIterator<Item = Profile>) -> Self {
    Self {
      profiles: RwLock::new(profiles.into_iter().map(|p| (p.id, p)).collect()),
    }
  }

  pub async fn get(&self, id: SubjectId) -> Option<Profile> {
    self.profiles.read().await.get(&id).cloned()
  }

  /// Set the subscription on `id`'s profile.
  ///
  /// A provided `expires_at` replaces the stored expiry; an absent one keeps
  /// it. Setting no plan always clears the expiry. Returns `None` if the
  /// profile does not exist.
  pub async fn set_subscription(
    &self,
    id: SubjectId,
    plan: Option<Plan>,
    expires_at: Option<DateTime<Utc>>,
  ) -> Option<Profile> {
    let mut profiles = self.profiles.write().await;
    let profile = profiles.get_mut(&id)?;

    profile.subscription_type = plan;
    if expires_at.is_some() {
      profile.subscription_expired_at = expires_at;
    }
    if plan.is_none() {
      profile.subscription_expired_at = None;
    }
    Some(profile.clone())
  }
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

/// Whether a purchase reached the subscription authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
  Pending,
  Synced,
  /// The authority was not updated; the purchase stands regardless.
  Failed,
}

/// One purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
  pub id:       u64,
  pub user_id:  SubjectId,
  pub plan:     Plan,
  pub amount:   i64,
  /// Payment status; purchases are recorded only once paid.
  pub status:   String,
  pub start_at: DateTime<Utc>,
  pub end_at:   DateTime<Utc>,
  pub sync:     SyncStatus,
}

/// Append-only record of purchases.
#[derive(Debug)]
pub struct SubscriptionLedger {
  next_id: AtomicU64,
  records: RwLock<Vec<Subscription>>,
}

impl Default for SubscriptionLedger {
  fn default() -> Self {
    Self { next_id: AtomicU64::new(1), records: RwLock::default() }
  }
}

impl SubscriptionLedger {
  /// Record a paid purchase of `plan` running from `start_at` to `end_at`.
  pub async fn record(
    &self,
    user_id: SubjectId,
    plan: Plan,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
  ) -> Subscription {
    let subscription = Subscription {
      id: self.next_id.fetch_add(1, Ordering::Relaxed),
      user_id,
      plan,
      amount: plan.price(),
      status: "success".to_owned(),
      start_at,
      end_at,
      sync: SyncStatus::Pending,
    };
    self.records.write().await.push(subscription.clone());
    subscription
  }

  /// Update the sync status of purchase `id`. Returns the updated record.
  pub async fn mark(&self, id: u64, sync: SyncStatus) -> Option<Subscription> {
    let mut records = self.records.write().await;
    let record = records.iter_mut().find(|s| s.id == id)?;
    record.sync = sync;
    Some(record.clone())
  }

  /// All purchases by `user_id`, most recent start first.
  pub async fn for_user(&self, user_id: SubjectId) -> Vec<Subscription> {
    let mut mine: Vec<Subscription> = self
      .records
      .read()
      .await
      .iter()
      .filter(|s| s.user_id == user_id)
      .cloned()
      .collect();
    mine.sort_by(|a, b| b.start_at.cmp(&a.start_at).then(b.id.cmp(&a.id)));
    mine
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
