//! Request middleware.
//!
//! - [`rate_limit`]: Per-client request quota on `/api`

pub mod rate_limit;
