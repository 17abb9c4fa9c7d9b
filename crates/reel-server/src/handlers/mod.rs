//! Route handlers, one module per service.

pub mod movies;
pub mod profiles;
pub mod subscriptions;
