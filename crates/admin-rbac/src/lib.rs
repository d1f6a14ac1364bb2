//! # Admin RBAC (Role-Based Access Control)
//!
//! Domain entities of the admin console's authorization model.
//!
//! ## Overview
//!
//! The admin-rbac crate handles:
//! - **Permissions**: immutable `resource:action` capabilities
//! - **Roles**: named, mutable permission collections with system protection
//! - **Catalog**: the default resources, actions and system roles used for seeding
//!
//! ## Architecture
//!
//! ```text
//! Permission = resource + ":" + action
//!
//! Examples:
//!   "users:create"     - Create user accounts
//!   "roles:update"     - Change role details and permission sets
//!   "dashboard:read"   - Open the dashboard
//! ```
//!
//! Matching is exact. There are no wildcards and no implied actions: a role
//! holding `posts:update` does not hold `posts:read`.
//!
//! ## Usage
//!
//! ```rust
//! use admin_rbac::{Permission, Role, RbacError};
//!
//! let update = Permission::create("Update posts", None, "posts", "update").unwrap();
//! let mut editor = Role::create("EDITOR", None, false, vec![update]).unwrap();
//! assert!(editor.has_permission("posts:update"));
//!
//! // System roles cannot be changed.
//! let mut admin = Role::create("ADMIN", None, true, Vec::new()).unwrap();
//! let read = Permission::create("Read posts", None, "posts", "read").unwrap();
//! assert!(matches!(admin.add_permission(read), Err(RbacError::InvalidOperation(_))));
//! ```
//!
//! ## Integration with admin-users
//!
//! Users hold roles; a user's effective grant is the union of the
//! permissions of every assigned role.

pub mod catalog;
pub mod error;
pub mod permission;
pub mod role;

// Re-export main types for convenience
pub use catalog::{SystemRole, ADMIN_ROLE, SUPER_ADMIN_ROLE, USER_ROLE};
pub use error::{RbacError, RbacResult};
pub use permission::{Permission, PermissionRecord};
pub use role::{Role, RoleRecord};
