//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller, decoded from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role.
//! - [`AuthUser::require`](auth::AuthUser::require) -- permission checks inside handlers.

pub mod auth;
pub mod rbac;
