//! Subject identity: who the authenticated caller is.
//!
//! A subject lives in a request's extensions for the duration of that request
//! only. Absence of a [`Subject`] means the caller is unauthenticated.

use std::{fmt, num::NonZeroU64};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A positive user identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u64", into = "u64")]
pub struct SubjectId(NonZeroU64);

impl SubjectId {
  pub fn new(id: u64) -> Option<Self> { NonZeroU64::new(id).map(Self) }

  pub fn get(self) -> u64 { self.0.get() }
}

impl TryFrom<u64> for SubjectId {
  type Error = Error;

  fn try_from(id: u64) -> Result<Self> {
    Self::new(id).ok_or(Error::InvalidSubjectId(id))
  }
}

impl From<SubjectId> for u64 {
  fn from(id: SubjectId) -> Self { id.get() }
}

impl fmt::Display for SubjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// The identity extracted from a validly-signed credential.
///
/// A token whose subject claim is missing or not a positive integer still
/// verifies; it yields [`Subject::Anonymous`], which reports id `0` and must
/// never be treated as owning any record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
  Known(SubjectId),
  Anonymous,
}

impl Subject {
  /// The wire representation of the subject id; `0` for anonymous.
  pub fn id(&self) -> u64 {
    match self {
      Self::Known(id) => id.get(),
      Self::Anonymous => 0,
    }
  }

  pub fn known(&self) -> Option<SubjectId> {
    match self {
      Self::Known(id) => Some(*id),
      Self::Anonymous => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_is_not_a_subject_id() {
    assert!(SubjectId::new(0).is_none());
    assert!(matches!(SubjectId::try_from(0), Err(Error::InvalidSubjectId(0))));
  }

  #[test]
  fn anonymous_reports_sentinel_id() {
    assert_eq!(Subject::Anonymous.id(), 0);
    assert_eq!(Subject::Anonymous.known(), None);

    let seven = SubjectId::new(7).unwrap();
    assert_eq!(Subject::Known(seven).id(), 7);
    assert_eq!(Subject::Known(seven).known(), Some(seven));
  }

  #[test]
  fn serde_rejects_zero() {
    assert!(serde_json::from_str::<SubjectId>("0").is_err());
    let id: SubjectId = serde_json::from_str("42").unwrap();
    assert_eq!(id.get(), 42);
    assert_eq!(serde_json::to_string(&id).unwrap(), "42");
  }
}
