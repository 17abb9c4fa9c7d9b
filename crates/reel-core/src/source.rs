//! The `EntitlementSource` trait: the seam between the access engine and
//! whatever answers "does this caller hold an active plan?".
//!
//! The production implementation is the remote oracle client in
//! `reel-oracle`. Tests substitute fakes that count invocations.

use std::future::Future;

use crate::entitlement::Entitlement;

/// Abstraction over a subscription authority.
///
/// An `Ok` carries the business fact (which may well be "no plan"); an `Err`
/// means the authority could not be consulted at all. Implementations must
/// never turn an availability failure into `Ok(Entitlement::none())`.
pub trait EntitlementSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Look up the entitlement of whoever `credential` identifies.
  ///
  /// `credential` is the caller's raw `Authorization` header value; it is
  /// forwarded unmodified so the authority can verify it independently.
  fn check_entitlement<'a>(
    &'a self,
    credential: &'a str,
  ) -> impl Future<Output = Result<Entitlement, Self::Error>> + Send + 'a;
}

impl<T: EntitlementSource> EntitlementSource for std::sync::Arc<T> {
  type Error = T::Error;

  fn check_entitlement<'a>(
    &'a self,
    credential: &'a str,
  ) -> impl Future<Output = Result<Entitlement, Self::Error>> + Send + 'a {
    (**self).check_entitlement(credential)
  }
}
