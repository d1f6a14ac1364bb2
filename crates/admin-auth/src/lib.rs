//! # Admin Authorization
//!
//! Guard functions and route middleware deciding whether a user may proceed.
//!
//! ## Overview
//!
//! The admin-auth crate handles:
//! - **Guards**: `require_*` functions returning [`AuthResult`], and their
//!   `has_*` boolean twins
//! - **Middleware**: [`RouteAuthorization`] wraps a handler, evaluates an
//!   [`AuthorizationConfig`] and turns denials into structured [`Rejection`]s
//!
//! ## Decision model
//!
//! ```text
//! request ─→ UserResolver ─→ User (hydrated: roles + permissions)
//!                               │
//!            AuthorizationConfig┤  guards, in declaration order
//!                               ▼
//!            Outcome::Allowed(handler output) | Outcome::Denied(Rejection)
//! ```
//!
//! Only active users pass a guard. Ownership checks accept the resource owner
//! without consulting permissions.
//!
//! ## Usage
//!
//! ```rust
//! use admin_auth::guards::{require_permission, has_permission};
//! use admin_rbac::{Permission, Role};
//! use admin_users::User;
//!
//! let delete = Permission::create("Delete users", None, "users", "delete").unwrap();
//! let mut user = User::new("ops@example.com", "Ops").unwrap();
//! user.assign_role(Role::create("OPERATOR", None, false, vec![delete]).unwrap());
//!
//! assert!(require_permission(Some(&user), "users:delete").is_ok());
//! assert!(!has_permission(Some(&user), "roles:delete"));
//! assert!(!has_permission(None, "users:delete"));
//! ```

pub mod error;
pub mod guards;
pub mod middleware;

// Re-export main types
pub use error::{AuthError, AuthResult};
pub use middleware::{
    handler_fn, AuthorizationCheck, AuthorizationConfig, AuthorizedRequest, CheckError, FnCheck,
    Outcome, Rejection, RequestHandler, RouteAuthorization, RouteError, UserResolver,
};
