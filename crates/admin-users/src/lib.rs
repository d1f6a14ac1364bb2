//! # Admin Users
//!
//! The authorization facet of a user account: its status and assigned
//! roles, and the queries guards ask of it.
//!
//! ## Overview
//!
//! ```text
//! User
//!   ├─ status (ACTIVE | INACTIVE | SUSPENDED)
//!   └─ roles ─→ Role ─→ Permission ("resource:action")
//! ```
//!
//! A user's effective permissions are the union of its roles' permissions.
//! Only active users pass guard checks; see `admin-auth`.
//!
//! ## Usage
//!
//! ```rust
//! use admin_rbac::{Permission, Role};
//! use admin_users::User;
//!
//! let update = Permission::create("Update posts", None, "posts", "update").unwrap();
//! let read = Permission::create("Read posts", None, "posts", "read").unwrap();
//!
//! let mut user = User::new("editor@example.com", "Editor").unwrap();
//! user.assign_roles(vec![
//!     Role::create("EDITOR", None, false, vec![update]).unwrap(),
//!     Role::create("VIEWER", None, false, vec![read]).unwrap(),
//! ]);
//!
//! assert!(user.has_all_permissions(&["posts:update", "posts:read"]));
//! assert!(!user.is_admin());
//! ```

pub mod status;
pub mod user;

pub use status::UserStatus;
pub use user::{User, UserRecord};
