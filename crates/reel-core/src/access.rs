//! The access decision engine.
//!
//! Given a content item's premium flag, the caller's identity and raw
//! credential, resolves to exactly one [`Verdict`]. Checks run in a fixed
//! order and the cheap local ones come first, so non-premium and
//! unauthenticated requests never reach the entitlement source:
//!
//! 1. not premium → allow
//! 2. no subject → deny (unauthenticated)
//! 3. no credential to forward → deny (unauthenticated)
//! 4. consult the [`EntitlementSource`] and judge its answer at the current
//!    instant
//!
//! The engine never fails: an unreachable source is itself a verdict.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
  entitlement::{Entitlement, EntitlementStatus},
  source::EntitlementSource,
  subject::Subject,
};

// ─── Verdicts ────────────────────────────────────────────────────────────────

/// Why a premium request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
  Unauthenticated,
  NoSubscription,
  Expired,
  /// The subscription authority could not be consulted. Reported to clients
  /// exactly like [`DenyReason::NoSubscription`].
  OracleUnreachable,
}

impl DenyReason {
  /// Stable machine-readable reason code returned to clients.
  pub fn code(self) -> &'static str {
    match self {
      Self::Expired => "subscription_expired",
      Self::Unauthenticated | Self::NoSubscription | Self::OracleUnreachable => {
        "subscription_required"
      }
    }
  }

  /// Human-readable explanation returned alongside [`DenyReason::code`].
  pub fn message(self) -> &'static str {
    match self {
      Self::Unauthenticated => "Please login & subscribe to access premium content.",
      Self::NoSubscription | Self::OracleUnreachable => {
        "Please subscribe to access premium content."
      }
      Self::Expired => "Subscription expired, please renew.",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
  Allow,
  Deny(DenyReason),
}

impl Verdict {
  pub fn is_allowed(self) -> bool { matches!(self, Self::Allow) }
}

// ─── Request ─────────────────────────────────────────────────────────────────

/// Everything the engine needs to know about one content fetch.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
  pub premium:    bool,
  /// Identity attached by the token verifier, if any.
  pub subject:    Option<Subject>,
  /// Raw `Authorization` header value, forwarded verbatim.
  pub credential: Option<&'a str>,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Map an entitlement status onto a verdict.
pub fn judge(status: EntitlementStatus) -> Verdict {
  match status {
    EntitlementStatus::Active => Verdict::Allow,
    EntitlementStatus::NoSubscription | EntitlementStatus::Indeterminate => {
      Verdict::Deny(DenyReason::NoSubscription)
    }
    EntitlementStatus::Expired => Verdict::Deny(DenyReason::Expired),
  }
}

/// Evaluate `entitlement` at `now`.
pub fn judge_at(entitlement: &Entitlement, now: DateTime<Utc>) -> Verdict {
  judge(entitlement.status(now))
}

/// Orchestrates the premium check against an [`EntitlementSource`].
#[derive(Debug, Clone)]
pub struct AccessEngine<O> {
  source: O,
}

impl<O: EntitlementSource> AccessEngine<O> {
  pub fn new(source: O) -> Self { Self { source } }

  /// Decide using the wall clock at the moment the source answers.
  pub async fn decide(&self, request: AccessRequest<'_>) -> Verdict {
    self.decide_with(request, Utc::now).await
  }

  /// Decide, reading the evaluation instant from `clock` only once the
  /// entitlement is known.
  pub async fn decide_with(
    &self,
    request: AccessRequest<'_>,
    clock: impl FnOnce() -> DateTime<Utc>,
  ) -> Verdict {
    if !request.premium {
      return Verdict::Allow;
    }

    let Some(subject) = request.subject else {
      tracing::debug!("premium content requested without an authenticated subject");
      return Verdict::Deny(DenyReason::Unauthenticated);
    };

    let Some(credential) = request.credential.filter(|c| !c.is_empty()) else {
      tracing::debug!(
        subject = subject.id(),
        "premium content requested without a credential to forward"
      );
      return Verdict::Deny(DenyReason::Unauthenticated);
    };

    let entitlement = match self.source.check_entitlement(credential).await {
      Ok(entitlement) => entitlement,
      Err(error) => {
        tracing::warn!(
          subject = subject.id(),
          error = %error,
          "subscription authority unreachable, denying premium access"
        );
        return Verdict::Deny(DenyReason::OracleUnreachable);
      }
    };

    let verdict = judge_at(&entitlement, clock());
    if let Verdict::Deny(reason) = verdict {
      tracing::debug!(
        subject = subject.id(),
        reason = reason.code(),
        ?entitlement,
        "premium access denied"
      );
    }
    verdict
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
