//! Error types for `reel-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown plan identifier: {0:?}")]
  UnknownPlan(String),

  #[error("subject id must be a positive integer, got {0}")]
  InvalidSubjectId(u64),

  #[error("plan end date is out of range")]
  EndOutOfRange,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
