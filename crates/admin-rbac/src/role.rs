//! # Roles
//!
//! A role is a named, mutable collection of permissions. System roles are
//! protected: every mutation method fails with
//! [`RbacError::InvalidOperation`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::{RbacError, RbacResult};
use crate::permission::{permission_string, Permission, PermissionRecord};

/// Maximum length of a role name.
pub const ROLE_NAME_MAX_LEN: usize = 50;

/// A named collection of permissions.
///
/// Permissions are deduplicated by permission string: adding a permission
/// equal by value to one already held is a no-op.
///
/// # Example
///
/// ```
/// use admin_rbac::{Permission, Role};
///
/// let mut editor = Role::create("EDITOR", None, false, Vec::new()).unwrap();
/// let update = Permission::create("Update posts", None, "posts", "update").unwrap();
///
/// editor.add_permission(update.clone()).unwrap();
/// editor.add_permission(update).unwrap();
///
/// assert_eq!(editor.permission_strings(), vec!["posts:update".to_string()]);
/// assert!(editor.has_resource_permission("posts", "update"));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Role {
    id: Uuid,
    name: String,
    description: Option<String>,
    is_system: bool,
    permissions: Vec<Permission>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Storage representation of a role, with its permissions populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_system: bool,
    #[serde(default)]
    pub permissions: Vec<PermissionRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Create a new role.
    ///
    /// # Errors
    ///
    /// Returns [`RbacError::Validation`] if the name is empty, longer than
    /// [`ROLE_NAME_MAX_LEN`] characters, or contains characters outside
    /// `[a-zA-Z0-9_]`.
    pub fn create(
        name: impl Into<String>,
        description: Option<String>,
        is_system: bool,
        permissions: Vec<Permission>,
    ) -> RbacResult<Self> {
        let name = name.into();
        validate_role_name(&name)?;

        let now = Utc::now();
        let mut role = Self {
            id: Uuid::now_v7(),
            name,
            description,
            is_system,
            permissions: Vec::with_capacity(permissions.len()),
            created_at: now,
            updated_at: now,
        };
        role.extend_unique(permissions);
        Ok(role)
    }

    /// Reconstitute a role from storage without validation.
    pub fn from_persistence(record: RoleRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            is_system: record.is_system,
            permissions: record
                .permissions
                .into_iter()
                .map(Permission::from_persistence)
                .collect(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// Convert to the storage representation.
    pub fn to_persistence(&self) -> RoleRecord {
        RoleRecord {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            is_system: self.is_system,
            permissions: self.permissions.iter().map(Permission::to_persistence).collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_system(&self) -> bool {
        self.is_system
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Read-only view of the permissions held by this role.
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Rename the role and replace its description.
    ///
    /// # Errors
    ///
    /// [`RbacError::InvalidOperation`] for system roles,
    /// [`RbacError::Validation`] for an empty or malformed name.
    pub fn update_details(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> RbacResult<()> {
        self.ensure_mutable("update")?;
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RbacError::validation("Role name is required"));
        }
        validate_role_name(&name)?;

        self.name = name;
        self.description = description;
        self.touch();
        Ok(())
    }

    /// Add a permission.
    ///
    /// Adding a permission whose string is already held returns early without
    /// touching `updated_at`.
    pub fn add_permission(&mut self, permission: Permission) -> RbacResult<()> {
        self.ensure_mutable("modify permissions of")?;
        if self.has_permission(&permission.permission_string()) {
            return Ok(());
        }
        self.permissions.push(permission);
        self.touch();
        Ok(())
    }

    /// Add several permissions; duplicates across the list collapse.
    pub fn add_permissions<I>(&mut self, permissions: I) -> RbacResult<()>
    where
        I: IntoIterator<Item = Permission>,
    {
        for permission in permissions {
            self.add_permission(permission)?;
        }
        Ok(())
    }

    /// Remove a permission by identifier.
    ///
    /// Removing an absent id is a silent no-op, but still touches
    /// `updated_at`.
    pub fn remove_permission(&mut self, permission_id: Uuid) -> RbacResult<()> {
        self.ensure_mutable("modify permissions of")?;
        self.permissions.retain(|p| p.id() != permission_id);
        self.touch();
        Ok(())
    }

    /// Replace every permission.
    pub fn set_permissions(&mut self, permissions: Vec<Permission>) -> RbacResult<()> {
        self.ensure_mutable("modify permissions of")?;
        self.permissions.clear();
        self.extend_unique(permissions);
        self.touch();
        Ok(())
    }

    /// Check whether the role holds `permission` (a `resource:action` string).
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p.matches_string(permission))
    }

    /// Check whether the role holds at least one of `permissions`.
    pub fn has_any_permission<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions.iter().any(|p| self.has_permission(p.as_ref()))
    }

    /// Check whether the role holds every one of `permissions`.
    ///
    /// An empty list is vacuously satisfied.
    pub fn has_all_permissions<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        permissions.iter().all(|p| self.has_permission(p.as_ref()))
    }

    /// Check for `resource:action`.
    pub fn has_resource_permission(&self, resource: &str, action: &str) -> bool {
        self.has_permission(&permission_string(resource, action))
    }

    /// Get the permission strings held by this role.
    pub fn permission_strings(&self) -> Vec<String> {
        self.permissions.iter().map(Permission::permission_string).collect()
    }

    /// Group the held permissions by resource.
    ///
    /// # Example
    ///
    /// ```
    /// use admin_rbac::{Permission, Role};
    ///
    /// let perms = vec![
    ///     Permission::create("Read users", None, "users", "read").unwrap(),
    ///     Permission::create("Delete users", None, "users", "delete").unwrap(),
    ///     Permission::create("Read roles", None, "roles", "read").unwrap(),
    /// ];
    /// let role = Role::create("AUDITOR", None, false, perms).unwrap();
    ///
    /// let grouped = role.permissions_by_resource();
    /// assert_eq!(grouped["users"], vec!["read".to_string(), "delete".to_string()]);
    /// assert_eq!(grouped["roles"], vec!["read".to_string()]);
    /// ```
    pub fn permissions_by_resource(&self) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for permission in &self.permissions {
            grouped
                .entry(permission.resource().to_string())
                .or_default()
                .push(permission.action().to_string());
        }
        grouped
    }

    fn ensure_mutable(&self, verb: &str) -> RbacResult<()> {
        if self.is_system {
            return Err(RbacError::invalid_operation(format!(
                "Cannot {} system role '{}'",
                verb, self.name
            )));
        }
        Ok(())
    }

    fn extend_unique(&mut self, permissions: Vec<Permission>) {
        for permission in permissions {
            if !self.has_permission(&permission.permission_string()) {
                self.permissions.push(permission);
            }
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl PartialEq for Role {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Role {}

/// Validate a role name: 1 to 50 characters of `[a-zA-Z0-9_]`.
pub fn validate_role_name(name: &str) -> RbacResult<()> {
    if name.is_empty() {
        return Err(RbacError::validation("Role name is required"));
    }
    if name.chars().count() > ROLE_NAME_MAX_LEN {
        return Err(RbacError::validation(format!(
            "Role name must be at most {} characters",
            ROLE_NAME_MAX_LEN
        )));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(RbacError::validation(
            "Role name may only contain letters, digits and underscores",
        ));
    }
    Ok(())
}
