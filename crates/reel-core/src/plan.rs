//! Subscription plans: the closed set of entitlement types.
//!
//! The literal `"none"` is not a plan; it is modelled as `Option<Plan>::None`
//! and rendered through [`label`].

use std::{fmt, str::FromStr};

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Wire value meaning "no subscription".
pub const NONE: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plan {
  #[serde(rename = "monthly")]
  Monthly,
  #[serde(rename = "3months")]
  ThreeMonths,
  #[serde(rename = "yearly")]
  Yearly,
}

impl Plan {
  pub const ALL: [Plan; 3] = [Plan::Monthly, Plan::ThreeMonths, Plan::Yearly];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Monthly => "monthly",
      Self::ThreeMonths => "3months",
      Self::Yearly => "yearly",
    }
  }

  /// Price in the smallest currency unit.
  pub fn price(self) -> i64 {
    match self {
      Self::Monthly => 45_000,
      Self::ThreeMonths => 125_000,
      Self::Yearly => 1_620_000,
    }
  }

  /// Calendar length of the plan.
  pub fn duration(self) -> Months {
    match self {
      Self::Monthly => Months::new(1),
      Self::ThreeMonths => Months::new(3),
      Self::Yearly => Months::new(12),
    }
  }

  /// The instant a subscription started at `start` runs out.
  ///
  /// Month arithmetic clamps to the last day of shorter months, so a monthly
  /// plan bought on Jan 31 ends on the last day of February.
  pub fn ends_at(self, start: DateTime<Utc>) -> Result<DateTime<Utc>> {
    start
      .checked_add_months(self.duration())
      .ok_or(Error::EndOutOfRange)
  }

  /// Parse a wire value where `"none"` means no plan.
  pub fn parse_optional(raw: &str) -> Result<Option<Plan>> {
    if raw == NONE {
      Ok(None)
    } else {
      raw.parse().map(Some)
    }
  }
}

impl FromStr for Plan {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|p| p.as_str() == s)
      .ok_or_else(|| Error::UnknownPlan(s.to_owned()))
  }
}

impl fmt::Display for Plan {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Wire label for an optional plan.
pub fn label(plan: Option<Plan>) -> &'static str {
  plan.map_or(NONE, Plan::as_str)
}

/// Serde adapter for `Option<Plan>` using the `"none"` wire label.
///
/// ```rust,ignore
/// #[serde(default, with = "reel_core::plan::wire")]
/// subscription_type: Option<Plan>,
/// ```
pub mod wire {
  use super::*;

  pub fn serialize<S: Serializer>(plan: &Option<Plan>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(label(*plan))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Plan>, D::Error> {
    let raw = String::deserialize(d)?;
    Plan::parse_optional(&raw).map_err(serde::de::Error::custom)
  }
}
