//! Entitlements: a subject's current plan and expiry, as reported by the
//! subscription authority.
//!
//! An entitlement is a derived fact: nothing in this crate stores one. It is
//! only ever evaluated against an instant via [`Entitlement::status`].

use chrono::{DateTime, Utc};

use crate::plan::Plan;

/// The expiry as it arrived on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expiry {
  /// Absent, `null`, empty, or not a string.
  Missing,
  /// Present but not an RFC 3339 timestamp. Holds the raw value.
  Malformed(String),
  At(DateTime<Utc>),
}

impl Expiry {
  /// Parse an optional RFC 3339 timestamp, the ISO-8601 profile the
  /// authority emits. Date-only and offset-less forms are malformed.
  pub fn parse(raw: Option<&str>) -> Self {
    match raw {
      None | Some("") => Self::Missing,
      Some(s) => DateTime::parse_from_rfc3339(s)
        .map(|dt| Self::At(dt.with_timezone(&Utc)))
        .unwrap_or_else(|_| Self::Malformed(s.to_owned())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entitlement {
  /// `None` means the authority reported `"none"` or no usable plan.
  pub plan:   Option<Plan>,
  pub expiry: Expiry,
}

/// Outcome of evaluating an [`Entitlement`] at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitlementStatus {
  Active,
  NoSubscription,
  /// Well-formed expiry at or before the evaluation instant.
  Expired,
  /// A plan with a missing or unparsable expiry.
  Indeterminate,
}

impl Entitlement {
  pub fn none() -> Self {
    Self { plan: None, expiry: Expiry::Missing }
  }

  pub fn new(plan: Plan, expires_at: DateTime<Utc>) -> Self {
    Self { plan: Some(plan), expiry: Expiry::At(expires_at) }
  }

  /// Active iff a plan is present and its expiry is strictly after `now`.
  pub fn status(&self, now: DateTime<Utc>) -> EntitlementStatus {
    if self.plan.is_none() {
      return EntitlementStatus::NoSubscription;
    }
    match self.expiry {
      Expiry::Missing | Expiry::Malformed(_) => EntitlementStatus::Indeterminate,
      Expiry::At(at) if at > now => EntitlementStatus::Active,
      Expiry::At(_) => EntitlementStatus::Expired,
    }
  }
}
