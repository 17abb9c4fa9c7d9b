//! Core types and trait definitions for the Reel premium-content services.
//!
//! No HTTP or cryptography here. The token verifier, the remote oracle
//! client and the axum services all build on these types.

// Native `async fn` in traits; the seam traits spell out their `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod entitlement;
pub mod error;
pub mod movie;
pub mod plan;
pub mod source;
pub mod subject;

pub use error::{Error, Result};
