//! User domain model (authorization facet)
//!
//! A user holds roles; every authorization question about a user is answered
//! from the roles it already carries. Users entering these methods are
//! expected to be fully hydrated by storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use admin_rbac::{RbacError, RbacResult, Role, RoleRecord, ADMIN_ROLE, SUPER_ADMIN_ROLE};

use crate::status::UserStatus;

/// A user account with its assigned roles.
///
/// # Examples
///
/// ```
/// use admin_rbac::{Permission, Role};
/// use admin_users::User;
///
/// let read = Permission::create("Read posts", None, "posts", "read").unwrap();
/// let viewer = Role::create("VIEWER", None, false, vec![read]).unwrap();
///
/// let mut user = User::new("ada@example.com", "Ada").unwrap();
/// user.assign_role(viewer);
///
/// assert!(user.has_permission("posts:read"));
/// assert!(!user.has_permission("posts:update"));
/// assert_eq!(user.role_names(), vec!["VIEWER".to_string()]);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct User {
    id: Uuid,
    email: String,
    name: String,
    status: UserStatus,
    roles: Vec<Role>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Storage representation of a user, with roles populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub status: UserStatus,
    #[serde(default)]
    pub roles: Vec<RoleRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new active user without roles.
    ///
    /// # Errors
    ///
    /// [`RbacError::Validation`] if the email or name is empty, or the email
    /// has no `@`.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> RbacResult<Self> {
        let email = email.into();
        let name = name.into();
        validate_profile(&email, &name)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(),
            email,
            name,
            status: UserStatus::Active,
            roles: Vec::new(),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitute a user from storage without validation.
    pub fn from_persistence(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            name: record.name,
            status: record.status,
            roles: record.roles.into_iter().map(Role::from_persistence).collect(),
            last_login_at: record.last_login_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// Convert to the storage representation.
    pub fn to_persistence(&self) -> UserRecord {
        UserRecord {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            status: self.status,
            roles: self.roles.iter().map(Role::to_persistence).collect(),
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Read-only view of the assigned roles.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    // ------------------------------------------------------------------
    // Role assignment
    // ------------------------------------------------------------------

    /// Assign a role. A role with the same name already assigned is a no-op.
    pub fn assign_role(&mut self, role: Role) {
        if self.has_role(role.name()) {
            return;
        }
        self.roles.push(role);
        self.touch();
    }

    /// Assign several roles.
    pub fn assign_roles<I>(&mut self, roles: I)
    where
        I: IntoIterator<Item = Role>,
    {
        for role in roles {
            self.assign_role(role);
        }
    }

    /// Remove a role by identifier. Touches even when the role is absent.
    pub fn remove_role(&mut self, role_id: Uuid) {
        self.roles.retain(|r| r.id() != role_id);
        self.touch();
    }

    /// Replace every role. Duplicate names collapse to the first occurrence.
    pub fn set_roles(&mut self, roles: Vec<Role>) {
        self.roles.clear();
        for role in roles {
            if !self.has_role(role.name()) {
                self.roles.push(role);
            }
        }
        self.touch();
    }

    // ------------------------------------------------------------------
    // Role queries
    // ------------------------------------------------------------------

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|r| r.name() == name)
    }

    pub fn has_any_role<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|n| self.has_role(n.as_ref()))
    }

    /// Vacuously true for an empty list.
    pub fn has_all_roles<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|n| self.has_role(n.as_ref()))
    }

    /// Get the names of the assigned roles in assignment order.
    pub fn role_names(&self) -> Vec<String> {
        self.roles.iter().map(|r| r.name().to_string()).collect()
    }

    // ------------------------------------------------------------------
    // Permission queries
    // ------------------------------------------------------------------

    /// Check whether any assigned role grants `permission`.
    ///
    /// The effective grant is the union over roles, never the intersection.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.roles.iter().any(|r| r.has_permission(permission))
    }

    pub fn has_any_permission<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions.iter().any(|p| self.has_permission(p.as_ref()))
    }

    /// Vacuously true for an empty list.
    pub fn has_all_permissions<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions.iter().all(|p| self.has_permission(p.as_ref()))
    }

    /// Get the deduplicated union of permission strings across all roles.
    pub fn all_permissions(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.roles
            .iter()
            .flat_map(Role::permission_strings)
            .filter(|p| seen.insert(p.clone()))
            .collect()
    }

    // ------------------------------------------------------------------
    // Shortcuts
    // ------------------------------------------------------------------

    /// Literal role-name check for `ADMIN` or `SUPER_ADMIN`, not a
    /// permission check.
    pub fn is_admin(&self) -> bool {
        self.has_any_role(&[ADMIN_ROLE, SUPER_ADMIN_ROLE])
    }

    pub fn is_super_admin(&self) -> bool {
        self.has_role(SUPER_ADMIN_ROLE)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn can_perform_admin_actions(&self) -> bool {
        self.is_active() && self.is_admin()
    }

    // ------------------------------------------------------------------
    // Account lifecycle
    // ------------------------------------------------------------------

    pub fn activate(&mut self) {
        self.set_status(UserStatus::Active);
    }

    pub fn deactivate(&mut self) {
        self.set_status(UserStatus::Inactive);
    }

    pub fn suspend(&mut self) {
        self.set_status(UserStatus::Suspended);
    }

    pub fn set_status(&mut self, status: UserStatus) {
        self.status = status;
        self.touch();
    }

    /// Record a successful sign-in.
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Change email and display name.
    pub fn update_profile(
        &mut self,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> RbacResult<()> {
        let email = email.into();
        let name = name.into();
        validate_profile(&email, &name)?;
        self.email = email;
        self.name = name;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn validate_profile(email: &str, name: &str) -> RbacResult<()> {
    if email.trim().is_empty() {
        return Err(RbacError::validation("Email is required"));
    }
    if !email.contains('@') {
        return Err(RbacError::validation(format!("Invalid email: {}", email)));
    }
    if name.trim().is_empty() {
        return Err(RbacError::validation("Name is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_rbac::Permission;

    fn perm(resource: &str, action: &str) -> Permission {
        Permission::create(format!("{} {}", action, resource), None, resource, action).unwrap()
    }

    fn role(name: &str, perms: &[(&str, &str)]) -> Role {
        Role::create(
            name,
            None,
            false,
            perms.iter().map(|(r, a)| perm(r, a)).collect(),
        )
        .unwrap()
    }

    fn user_with(roles: Vec<Role>) -> User {
        let mut user = User::new("user@example.com", "User").unwrap();
        user.set_roles(roles);
        user
    }

    #[test]
    fn test_user_creation() {
        let user = User::new("ada@example.com", "Ada").unwrap();
        assert!(user.is_active());
        assert!(user.roles().is_empty());
        assert!(user.last_login_at().is_none());
        assert!(User::new("", "Ada").is_err());
        assert!(User::new("not-an-email", "Ada").is_err());
        assert!(User::new("ada@example.com", " ").is_err());
    }

    #[test]
    fn test_assign_role_dedupes_by_name() {
        let mut user = User::new("ada@example.com", "Ada").unwrap();
        user.assign_role(role("EDITOR", &[("posts", "update")]));
        let before = user.updated_at();
        user.assign_role(role("EDITOR", &[("posts", "delete")]));

        assert_eq!(user.roles().len(), 1);
        assert_eq!(user.updated_at(), before);
        assert!(!user.has_permission("posts:delete"));
    }

    #[test]
    fn test_assign_roles() {
        let mut user = User::new("ada@example.com", "Ada").unwrap();
        user.assign_roles(vec![role("EDITOR", &[]), role("VIEWER", &[]), role("EDITOR", &[])]);
        assert_eq!(user.role_names(), vec!["EDITOR".to_string(), "VIEWER".to_string()]);
    }

    #[test]
    fn test_remove_role() {
        let editor = role("EDITOR", &[]);
        let editor_id = editor.id();
        let mut user = user_with(vec![editor, role("VIEWER", &[])]);

        user.remove_role(editor_id);
        assert_eq!(user.role_names(), vec!["VIEWER".to_string()]);

        // Unlike assign_role's no-op path, removal touches even when absent.
        let mut record = user.to_persistence();
        record.updated_at = Utc::now() - chrono::Duration::hours(1);
        let mut user = User::from_persistence(record);
        let before = user.updated_at();
        user.remove_role(Uuid::now_v7());
        assert_eq!(user.roles().len(), 1);
        assert!(user.updated_at() > before);
    }

    #[test]
    fn test_permission_union_across_roles() {
        let user = user_with(vec![
            role("EDITOR", &[("posts", "update")]),
            role("VIEWER", &[("posts", "read")]),
        ]);

        let all: HashSet<String> = user.all_permissions().into_iter().collect();
        let expected: HashSet<String> =
            ["posts:update", "posts:read"].iter().map(|s| s.to_string()).collect();
        assert_eq!(all, expected);

        assert!(user.has_all_permissions(&["posts:update", "posts:read"]));
        assert!(!user.has_all_permissions(&["posts:update", "posts:delete"]));
        assert!(user.has_any_permission(&["posts:delete", "posts:read"]));
    }

    #[test]
    fn test_has_permission_equals_role_disjunction() {
        let r1 = role("EDITOR", &[("posts", "update"), ("posts", "read")]);
        let r2 = role("VIEWER", &[("posts", "read"), ("users", "read")]);
        let user = user_with(vec![r1.clone(), r2.clone()]);

        for s in ["posts:update", "posts:read", "users:read", "users:delete", "x:y"] {
            assert_eq!(user.has_permission(s), r1.has_permission(s) || r2.has_permission(s));
        }
    }

    #[test]
    fn test_all_permissions_deduplicated() {
        let user = user_with(vec![
            role("EDITOR", &[("posts", "read")]),
            role("VIEWER", &[("posts", "read")]),
        ]);
        assert_eq!(user.all_permissions(), vec!["posts:read".to_string()]);
    }

    #[test]
    fn test_vacuous_all_checks() {
        let user = User::new("ada@example.com", "Ada").unwrap();
        assert!(user.has_all_permissions::<&str>(&[]));
        assert!(user.has_all_roles::<&str>(&[]));
        assert!(!user.has_any_role::<&str>(&[]));
    }

    #[test]
    fn test_admin_shortcuts() {
        let admin = user_with(vec![role("ADMIN", &[])]);
        assert!(admin.is_admin());
        assert!(!admin.is_super_admin());
        assert!(admin.can_perform_admin_actions());

        let super_admin = user_with(vec![role("SUPER_ADMIN", &[])]);
        assert!(super_admin.is_admin());
        assert!(super_admin.is_super_admin());

        // Permission-rich users are not admins without the role name.
        let editor = user_with(vec![role("EDITOR", &[("users", "delete")])]);
        assert!(!editor.is_admin());
    }

    #[test]
    fn test_inactive_admin_cannot_perform_admin_actions() {
        let mut admin = user_with(vec![role("ADMIN", &[])]);
        admin.suspend();
        assert!(admin.is_admin());
        assert!(!admin.can_perform_admin_actions());

        admin.activate();
        assert!(admin.can_perform_admin_actions());

        admin.deactivate();
        assert_eq!(admin.status(), UserStatus::Inactive);
    }

    #[test]
    fn test_record_login() {
        let mut user = User::new("ada@example.com", "Ada").unwrap();
        user.record_login();
        assert!(user.last_login_at().is_some());
    }

    #[test]
    fn test_update_profile() {
        let mut user = User::new("ada@example.com", "Ada").unwrap();
        user.update_profile("ada@lovelace.dev", "Ada L.").unwrap();
        assert_eq!(user.email(), "ada@lovelace.dev");
        assert!(user.update_profile("", "Ada").is_err());
        assert_eq!(user.email(), "ada@lovelace.dev");
    }

    #[test]
    fn test_persistence_round_trip() {
        let user = user_with(vec![role("EDITOR", &[("posts", "update")])]);
        let json = serde_json::to_string(&user.to_persistence()).unwrap();
        let record: UserRecord = serde_json::from_str(&json).unwrap();
        let restored = User::from_persistence(record);

        assert_eq!(restored.id(), user.id());
        assert_eq!(restored.role_names(), user.role_names());
        assert!(restored.has_permission("posts:update"));
    }
}
