//! # Authorization Guards
//!
//! Pure functions deciding allow / deny for a user against a requirement.
//!
//! Every guard applies the same preconditions, in order, before its own
//! check:
//!
//! 1. no user → [`AuthError::AuthenticationRequired`]
//! 2. user not active → [`AuthError::AccountInactive`]
//!
//! Each `require_*` guard returns the authorized user on success. Its `has_*`
//! twin never fails: precondition failures and denials are both `false`.

use tracing::debug;
use uuid::Uuid;

use admin_users::User;

use crate::error::{AuthError, AuthResult};

/// Apply the uniform preconditions.
pub fn require_active(user: Option<&User>) -> AuthResult<&User> {
    let user = user.ok_or(AuthError::AuthenticationRequired)?;
    if !user.is_active() {
        debug!(user_id = %user.id(), status = %user.status(), "Denied inactive account");
        return Err(AuthError::AccountInactive);
    }
    Ok(user)
}

/// Require a single permission.
///
/// # Example
///
/// ```
/// use admin_auth::guards::require_permission;
/// use admin_auth::AuthError;
///
/// assert_eq!(
///     require_permission(None, "users:read").unwrap_err(),
///     AuthError::AuthenticationRequired
/// );
/// ```
pub fn require_permission<'a>(user: Option<&'a User>, permission: &str) -> AuthResult<&'a User> {
    let user = require_active(user)?;
    if !user.has_permission(permission) {
        return Err(deny(user, AuthError::PermissionDenied(permission.to_string())));
    }
    Ok(user)
}

/// Require at least one of `permissions`.
pub fn require_any_permission<'a, S: AsRef<str>>(
    user: Option<&'a User>,
    permissions: &[S],
) -> AuthResult<&'a User> {
    let user = require_active(user)?;
    if !user.has_any_permission(permissions) {
        return Err(deny(
            user,
            AuthError::PermissionDenied(format!("requires any of [{}]", join(permissions))),
        ));
    }
    Ok(user)
}

/// Require every one of `permissions`. An empty list only checks the
/// preconditions.
pub fn require_all_permissions<'a, S: AsRef<str>>(
    user: Option<&'a User>,
    permissions: &[S],
) -> AuthResult<&'a User> {
    let user = require_active(user)?;
    if !user.has_all_permissions(permissions) {
        return Err(deny(
            user,
            AuthError::PermissionDenied(format!("requires all of [{}]", join(permissions))),
        ));
    }
    Ok(user)
}

/// Require a role by name.
pub fn require_role<'a>(user: Option<&'a User>, role: &str) -> AuthResult<&'a User> {
    let user = require_active(user)?;
    if !user.has_role(role) {
        return Err(deny(user, AuthError::RoleRequired(role.to_string())));
    }
    Ok(user)
}

/// Require at least one of `roles`.
pub fn require_any_role<'a, S: AsRef<str>>(
    user: Option<&'a User>,
    roles: &[S],
) -> AuthResult<&'a User> {
    let user = require_active(user)?;
    if !user.has_any_role(roles) {
        return Err(deny(
            user,
            AuthError::RoleRequired(format!("any of [{}]", join(roles))),
        ));
    }
    Ok(user)
}

/// Require every one of `roles`.
pub fn require_all_roles<'a, S: AsRef<str>>(
    user: Option<&'a User>,
    roles: &[S],
) -> AuthResult<&'a User> {
    let user = require_active(user)?;
    if !user.has_all_roles(roles) {
        return Err(deny(
            user,
            AuthError::RoleRequired(format!("all of [{}]", join(roles))),
        ));
    }
    Ok(user)
}

/// Require the ADMIN or SUPER_ADMIN role.
pub fn require_admin(user: Option<&User>) -> AuthResult<&User> {
    let user = require_active(user)?;
    if !user.is_admin() {
        return Err(deny(user, AuthError::AdminRequired));
    }
    Ok(user)
}

/// Require the SUPER_ADMIN role.
pub fn require_super_admin(user: Option<&User>) -> AuthResult<&User> {
    let user = require_active(user)?;
    if !user.is_super_admin() {
        return Err(deny(user, AuthError::SuperAdminRequired));
    }
    Ok(user)
}

/// Allow the owner of a resource, or anyone holding `permission`.
///
/// Ownership bypasses the permission check entirely.
pub fn require_ownership_or_permission<'a>(
    user: Option<&'a User>,
    resource_owner_id: Uuid,
    permission: &str,
) -> AuthResult<&'a User> {
    let user = require_active(user)?;
    if user.id() == resource_owner_id || user.has_permission(permission) {
        return Ok(user);
    }
    Err(deny(
        user,
        AuthError::OwnershipRequired(format!(
            "must own the resource or have permission {}",
            permission
        )),
    ))
}

/// Allow the owner of a resource, or any admin.
pub fn require_ownership_or_admin(
    user: Option<&User>,
    resource_owner_id: Uuid,
) -> AuthResult<&User> {
    let user = require_active(user)?;
    if user.id() == resource_owner_id || user.is_admin() {
        return Ok(user);
    }
    Err(deny(
        user,
        AuthError::OwnershipRequired("must own the resource or be an admin".to_string()),
    ))
}

pub fn has_permission(user: Option<&User>, permission: &str) -> bool {
    require_permission(user, permission).is_ok()
}

pub fn has_any_permission<S: AsRef<str>>(user: Option<&User>, permissions: &[S]) -> bool {
    require_any_permission(user, permissions).is_ok()
}

pub fn has_all_permissions<S: AsRef<str>>(user: Option<&User>, permissions: &[S]) -> bool {
    require_all_permissions(user, permissions).is_ok()
}

pub fn has_role(user: Option<&User>, role: &str) -> bool {
    require_role(user, role).is_ok()
}

pub fn has_any_role<S: AsRef<str>>(user: Option<&User>, roles: &[S]) -> bool {
    require_any_role(user, roles).is_ok()
}

pub fn has_all_roles<S: AsRef<str>>(user: Option<&User>, roles: &[S]) -> bool {
    require_all_roles(user, roles).is_ok()
}

pub fn is_admin(user: Option<&User>) -> bool {
    require_admin(user).is_ok()
}

pub fn is_super_admin(user: Option<&User>) -> bool {
    require_super_admin(user).is_ok()
}

pub fn is_owner_or_has_permission(
    user: Option<&User>,
    resource_owner_id: Uuid,
    permission: &str,
) -> bool {
    require_ownership_or_permission(user, resource_owner_id, permission).is_ok()
}

pub fn is_owner_or_admin(user: Option<&User>, resource_owner_id: Uuid) -> bool {
    require_ownership_or_admin(user, resource_owner_id).is_ok()
}

fn deny(user: &User, error: AuthError) -> AuthError {
    debug!(user_id = %user.id(), reason = %error, "Authorization denied");
    error
}

fn join<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}
