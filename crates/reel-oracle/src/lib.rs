//! Outbound clients for the subscription authority (the user service).
//!
//! - [`SubscriptionOracle`] asks `GET {base}/profile` for the caller's
//!   entitlement and implements [`reel_core::source::EntitlementSource`].
//! - [`ProfileSync`] pushes a freshly bought plan with
//!   `PATCH {base}/subscribe`.
//!
//! Both forward the caller's `Authorization` header verbatim and bound every
//! call with an explicit timeout. Neither retries.

pub mod config;
pub mod error;
pub mod oracle;
pub mod sync;

pub use config::{AuthorityConfig, DEFAULT_TIMEOUT};
pub use error::OracleError;
pub use oracle::SubscriptionOracle;
pub use sync::ProfileSync;
