//! Bearer-token verification and issuance for Reel services.
//!
//! Tokens are HMAC-signed JWTs carrying a numeric `user_id` claim. Everything
//! here is pure: no I/O, no shared mutable state. A [`TokenVerifier`] can be
//! shared across any number of concurrent requests behind an `Arc`.

pub mod error;
pub mod issue;
pub mod verify;

pub use error::AuthError;
pub use issue::{Claims, TokenIssuer};
pub use verify::{TokenVerifier, bearer_token};

/// The scheme marker expected at the start of an `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";
