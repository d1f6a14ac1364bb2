//! # Default Catalog
//!
//! Well-known resources, actions and system roles of the admin console.
//! Seed operations use this catalog to provision a fresh store; role-name
//! constants are relied upon by seed scripts and admin tooling, so they are
//! a stable external contract.

use serde::{Deserialize, Serialize};

use crate::error::RbacResult;
use crate::permission::{permission_string, Permission};
use crate::role::Role;

/// Name of the administrator system role.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Name of the super administrator system role.
pub const SUPER_ADMIN_ROLE: &str = "SUPER_ADMIN";

/// Name of the default user system role.
pub const USER_ROLE: &str = "USER";

/// Resources managed by the admin console.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// User accounts.
    Users,
    /// Roles and their permission sets.
    Roles,
    /// Permission definitions.
    Permissions,
    /// Dashboard pages and widgets.
    Dashboard,
    /// Application settings.
    Settings,
}

impl Resource {
    /// Get the string representation used in permission strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Users => "users",
            Resource::Roles => "roles",
            Resource::Permissions => "permissions",
            Resource::Dashboard => "dashboard",
            Resource::Settings => "settings",
        }
    }

    /// Parse a resource from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "users" => Some(Resource::Users),
            "roles" => Some(Resource::Roles),
            "permissions" => Some(Resource::Permissions),
            "dashboard" => Some(Resource::Dashboard),
            "settings" => Some(Resource::Settings),
            _ => None,
        }
    }

    /// Get all resources.
    pub fn all() -> Vec<Self> {
        vec![
            Resource::Users,
            Resource::Roles,
            Resource::Permissions,
            Resource::Dashboard,
            Resource::Settings,
        ]
    }

    /// Actions seeded for this resource.
    pub fn actions(&self) -> Vec<Action> {
        match self {
            Resource::Users | Resource::Roles | Resource::Permissions => vec![
                Action::Create,
                Action::Read,
                Action::Update,
                Action::Delete,
            ],
            Resource::Dashboard => vec![Action::Read],
            Resource::Settings => vec![Action::Read, Action::Manage],
        }
    }
}

/// Actions seeded by the default catalog.
///
/// Matching is exact: no action implies another.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create new instances.
    Create,
    /// View instances.
    Read,
    /// Modify existing instances.
    Update,
    /// Remove instances.
    Delete,
    /// Administer configuration.
    Manage,
}

impl Action {
    /// Get the string representation used in permission strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Manage => "manage",
        }
    }

    /// Parse an action from its string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Action::Create),
            "read" => Some(Action::Read),
            "update" => Some(Action::Update),
            "delete" => Some(Action::Delete),
            "manage" => Some(Action::Manage),
            _ => None,
        }
    }

    /// Check if this action modifies data.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Action::Create | Action::Update | Action::Delete | Action::Manage
        )
    }

    fn display_verb(&self) -> &'static str {
        match self {
            Action::Create => "Create",
            Action::Read => "Read",
            Action::Update => "Update",
            Action::Delete => "Delete",
            Action::Manage => "Manage",
        }
    }
}

/// A catalog entry: one seeded permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CatalogPermission {
    pub resource: Resource,
    pub action: Action,
}

impl CatalogPermission {
    /// Get the permission string, e.g. `users:create`.
    pub fn permission_string(&self) -> String {
        permission_string(self.resource.as_str(), self.action.as_str())
    }

    /// Build the [`Permission`] entity for this entry.
    pub fn to_permission(&self) -> RbacResult<Permission> {
        Permission::create(
            format!("{} {}", self.action.display_verb(), self.resource.as_str()),
            Some(format!(
                "Allows {} on {}",
                self.action.as_str(),
                self.resource.as_str()
            )),
            self.resource.as_str(),
            self.action.as_str(),
        )
    }
}

/// Every permission the default catalog seeds.
///
/// # Example
///
/// ```
/// use admin_rbac::catalog::default_permissions;
///
/// let strings: Vec<String> = default_permissions()
///     .iter()
///     .map(|p| p.permission_string())
///     .collect();
/// assert!(strings.contains(&"users:delete".to_string()));
/// assert!(strings.contains(&"dashboard:read".to_string()));
/// ```
pub fn default_permissions() -> Vec<CatalogPermission> {
    Resource::all()
        .into_iter()
        .flat_map(|resource| {
            resource
                .actions()
                .into_iter()
                .map(move |action| CatalogPermission { resource, action })
        })
        .collect()
}

/// System roles provisioned by seeding. They cannot be mutated once created.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemRole {
    /// Every catalog permission.
    SuperAdmin,
    /// Everything except permission definition changes and settings management.
    Admin,
    /// Dashboard access only.
    User,
}

impl SystemRole {
    /// Get the role name.
    pub fn name(&self) -> &'static str {
        match self {
            SystemRole::SuperAdmin => SUPER_ADMIN_ROLE,
            SystemRole::Admin => ADMIN_ROLE,
            SystemRole::User => USER_ROLE,
        }
    }

    /// Get the role description.
    pub fn description(&self) -> &'static str {
        match self {
            SystemRole::SuperAdmin => "Full access to every resource",
            SystemRole::Admin => "Manages users and roles",
            SystemRole::User => "Standard dashboard access",
        }
    }

    /// Get all system roles.
    pub fn all() -> Vec<Self> {
        vec![SystemRole::SuperAdmin, SystemRole::Admin, SystemRole::User]
    }

    /// Parse a system role from its name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            SUPER_ADMIN_ROLE => Some(SystemRole::SuperAdmin),
            ADMIN_ROLE => Some(SystemRole::Admin),
            USER_ROLE => Some(SystemRole::User),
            _ => None,
        }
    }

    /// Check whether this role receives a catalog permission.
    pub fn grants(&self, entry: &CatalogPermission) -> bool {
        match self {
            SystemRole::SuperAdmin => true,
            SystemRole::Admin => match entry.resource {
                Resource::Permissions => !entry.action.is_write(),
                Resource::Settings => entry.action != Action::Manage,
                _ => true,
            },
            SystemRole::User => {
                entry.resource == Resource::Dashboard && entry.action == Action::Read
            }
        }
    }

    /// Permission strings granted to this role by the catalog.
    pub fn default_permission_strings(&self) -> Vec<String> {
        default_permissions()
            .iter()
            .filter(|entry| self.grants(entry))
            .map(CatalogPermission::permission_string)
            .collect()
    }

    /// Build the system role from already-provisioned permissions.
    ///
    /// Only the permissions this role is granted are kept.
    pub fn build(&self, available: &[Permission]) -> RbacResult<Role> {
        let granted = self.default_permission_strings();
        let permissions = available
            .iter()
            .filter(|p| granted.contains(&p.permission_string()))
            .cloned()
            .collect();
        Role::create(
            self.name(),
            Some(self.description().to_string()),
            true,
            permissions,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_round_trip() {
        for resource in Resource::all() {
            assert_eq!(Resource::parse(resource.as_str()), Some(resource));
        }
        assert_eq!(Resource::parse("Users"), None);
    }

    #[test]
    fn test_default_permissions_are_valid() {
        let entries = default_permissions();
        assert_eq!(entries.len(), 4 + 4 + 4 + 1 + 2);
        for entry in entries {
            let permission = entry.to_permission().unwrap();
            assert_eq!(permission.permission_string(), entry.permission_string());
        }
    }

    #[test]
    fn test_system_role_grants() {
        let super_admin = SystemRole::SuperAdmin.default_permission_strings();
        assert_eq!(super_admin.len(), default_permissions().len());

        let admin = SystemRole::Admin.default_permission_strings();
        assert!(admin.contains(&"users:delete".to_string()));
        assert!(admin.contains(&"permissions:read".to_string()));
        assert!(!admin.contains(&"permissions:create".to_string()));
        assert!(!admin.contains(&"settings:manage".to_string()));

        assert_eq!(
            SystemRole::User.default_permission_strings(),
            vec!["dashboard:read".to_string()]
        );
    }

    #[test]
    fn test_build_system_role() {
        let available: Vec<Permission> = default_permissions()
            .iter()
            .map(|entry| entry.to_permission().unwrap())
            .collect();
        let role = SystemRole::User.build(&available).unwrap();
        assert!(role.is_system());
        assert_eq!(role.name(), USER_ROLE);
        assert_eq!(role.permission_strings(), vec!["dashboard:read".to_string()]);
    }

    #[test]
    fn test_system_role_parse() {
        for role in SystemRole::all() {
            assert_eq!(SystemRole::parse(role.name()), Some(role));
        }
        assert_eq!(SystemRole::parse("EDITOR"), None);
    }
}
