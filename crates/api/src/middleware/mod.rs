//! Request extractors.
//!
//! - [`auth::AuthUser`] -- the authenticated account, from a JWT Bearer token.

pub mod auth;
