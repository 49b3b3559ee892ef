//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the identity behind a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- requires the `admin` role.
//! - [`rbac::RequireAuth`] -- requires any authenticated user.

pub mod auth;
pub mod rbac;
