//! # Permissions
//!
//! A permission is one `resource:action` capability. The permission string is
//! the equality and deduplication key everywhere else in the system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

use crate::error::{RbacError, RbacResult};

/// Separator between resource and action in a permission string.
pub const PERMISSION_SEPARATOR: char = ':';

/// A single `resource:action` capability.
///
/// Permissions are shared, immutable values: two permissions are equal when
/// their `(resource, action)` pairs are equal, regardless of identifier.
///
/// # Example
///
/// ```
/// use admin_rbac::Permission;
///
/// let perm = Permission::create("Create users", None, "users", "create").unwrap();
/// assert_eq!(perm.permission_string(), "users:create");
/// assert!(perm.matches("users", "create"));
/// assert!(perm.matches_string("users:create"));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Permission {
    id: Uuid,
    name: String,
    description: Option<String>,
    resource: String,
    action: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Storage representation of a permission.
///
/// Reconstituting a [`Permission`] from a record performs no validation;
/// storage is trusted state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Permission {
    /// Create a new validated permission.
    ///
    /// Resource and action are stored as given, without case folding.
    ///
    /// # Errors
    ///
    /// Returns [`RbacError::Validation`] if `name`, `resource` or `action` is
    /// empty, or if `resource` / `action` contain characters outside
    /// `[a-zA-Z0-9_-]`.
    pub fn create(
        name: impl Into<String>,
        description: Option<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> RbacResult<Self> {
        let name = name.into();
        let resource = resource.into();
        let action = action.into();

        if name.trim().is_empty() {
            return Err(RbacError::validation("Permission name is required"));
        }
        validate_token("resource", &resource)?;
        validate_token("action", &action)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::now_v7(),
            name,
            description,
            resource,
            action,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstitute a permission from storage without validation.
    pub fn from_persistence(record: PermissionRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            resource: record.resource,
            action: record.action,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// Convert to the storage representation.
    pub fn to_persistence(&self) -> PermissionRecord {
        PermissionRecord {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            resource: self.resource.clone(),
            action: self.action.clone(),
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

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Get the permission string, `resource:action`.
    pub fn permission_string(&self) -> String {
        format!("{}{}{}", self.resource, PERMISSION_SEPARATOR, self.action)
    }

    /// Check for exact equality on both resource and action.
    pub fn matches(&self, resource: &str, action: &str) -> bool {
        self.resource == resource && self.action == action
    }

    /// Check whether `permission` equals this permission's string.
    pub fn matches_string(&self, permission: &str) -> bool {
        permission == self.permission_string()
    }

    /// Replace the description. The only mutable attribute.
    pub fn update_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl PartialEq for Permission {
    fn eq(&self, other: &Self) -> bool {
        self.resource == other.resource && self.action == other.action
    }
}

impl Eq for Permission {}

impl Hash for Permission {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.resource.hash(state);
        self.action.hash(state);
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.resource, PERMISSION_SEPARATOR, self.action)
    }
}

/// Build a permission string from its parts.
pub fn permission_string(resource: &str, action: &str) -> String {
    format!("{}{}{}", resource, PERMISSION_SEPARATOR, action)
}

/// Split and validate a `resource:action` declaration.
///
/// # Example
///
/// ```
/// use admin_rbac::permission::parse_permission_string;
///
/// let (resource, action) = parse_permission_string("posts:update").unwrap();
/// assert_eq!(resource, "posts");
/// assert_eq!(action, "update");
/// assert!(parse_permission_string("posts").is_err());
/// assert!(parse_permission_string("a:b:c").is_err());
/// ```
pub fn parse_permission_string(permission: &str) -> RbacResult<(String, String)> {
    let (resource, action) = permission.split_once(PERMISSION_SEPARATOR).ok_or_else(|| {
        RbacError::validation(format!(
            "Permission '{}' must have the form resource:action",
            permission
        ))
    })?;
    validate_token("resource", resource)?;
    validate_token("action", action)?;
    Ok((resource.to_string(), action.to_string()))
}

/// Check whether a resource or action token only uses `[a-zA-Z0-9_-]`.
pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn validate_token(field: &str, value: &str) -> RbacResult<()> {
    if value.is_empty() {
        return Err(RbacError::validation(format!(
            "Permission {} is required",
            field
        )));
    }
    if !is_valid_token(value) {
        return Err(RbacError::validation(format!(
            "Permission {} '{}' may only contain letters, digits, underscores and hyphens",
            field, value
        )));
    }
    Ok(())
}
