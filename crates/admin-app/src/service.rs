//! # RBAC Use Cases
//!
//! [`RbacService`] orchestrates the entities and the store: it loads
//! aggregates, lets the entities enforce their invariants and persists the
//! result. Entity errors reach the caller unchanged.
//!
//! ## Example
//!
//! ```rust
//! use admin_app::{MemoryStore, RbacService};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), admin_app::AppError> {
//! let service = RbacService::new(Arc::new(MemoryStore::new()));
//! service.seed_system_roles().await?;
//!
//! let user = service.create_user("ada@example.com", "Ada", &["ADMIN"]).await?;
//! assert!(user.is_admin());
//! assert!(user.has_permission("users:delete"));
//! assert!(!user.has_permission("settings:manage"));
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use admin_rbac::catalog::{default_permissions, SystemRole};
use admin_rbac::{Permission, RbacError, Role, SUPER_ADMIN_ROLE};
use admin_users::{User, UserStatus};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::store::AdminStore;

/// What a seeding run provisioned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub permissions_created: usize,
    pub roles_created: usize,
}

impl SeedReport {
    /// True when nothing had to be provisioned.
    pub fn is_noop(&self) -> bool {
        self.permissions_created == 0 && self.roles_created == 0
    }
}

/// Admin use cases over an injected store.
#[derive(Clone)]
pub struct RbacService {
    store: Arc<dyn AdminStore>,
}

impl RbacService {
    pub fn new(store: Arc<dyn AdminStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn AdminStore> {
        &self.store
    }

    // ------------------------------------------------------------------
    // Permissions
    // ------------------------------------------------------------------

    /// Define a new permission.
    ///
    /// # Errors
    ///
    /// - [`AppError::Rbac`] for a malformed name, resource or action
    /// - [`AppError::Conflict`] if `resource:action` is already defined
    pub async fn create_permission(
        &self,
        name: &str,
        description: Option<String>,
        resource: &str,
        action: &str,
    ) -> AppResult<Permission> {
        let permission = Permission::create(name, description, resource, action)?;
        if self
            .store
            .find_permission_by_key(resource, action)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                permission.permission_string()
            )));
        }
        self.store.save_permission(&permission).await?;
        info!(permission_id = %permission.id(), permission = %permission, "Created permission");
        Ok(permission)
    }

    pub async fn update_permission_description(
        &self,
        permission_id: Uuid,
        description: Option<String>,
    ) -> AppResult<Permission> {
        let mut permission = self.permission(permission_id).await?;
        permission.update_description(description);
        self.store.save_permission(&permission).await?;
        info!(permission_id = %permission_id, "Updated permission description");
        Ok(permission)
    }

    /// Delete a permission; roles holding it lose it.
    pub async fn delete_permission(&self, permission_id: Uuid) -> AppResult<()> {
        self.store.delete_permission(permission_id).await?;
        info!(permission_id = %permission_id, "Deleted permission");
        Ok(())
    }

    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(self.store.list_permissions().await?)
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    /// Create a custom (non-system) role with the given permissions.
    pub async fn create_role(
        &self,
        name: &str,
        description: Option<String>,
        permission_ids: &[Uuid],
    ) -> AppResult<Role> {
        let permissions = self.permissions(permission_ids).await?;
        let role = Role::create(name, description, false, permissions)?;
        self.ensure_role_name_free(role.name(), role.id()).await?;
        self.store.save_role(&role).await?;
        info!(role_id = %role.id(), role = role.name(), "Created role");
        Ok(role)
    }

    /// Rename a role and replace its description.
    ///
    /// # Errors
    ///
    /// - [`AppError::Rbac`] for system roles and malformed names
    /// - [`AppError::Conflict`] if another role already has the name
    pub async fn update_role(
        &self,
        role_id: Uuid,
        name: &str,
        description: Option<String>,
    ) -> AppResult<Role> {
        let mut role = self.role(role_id).await?;
        self.refuse_on_system(role.update_details(name, description))?;
        self.ensure_role_name_free(role.name(), role.id()).await?;
        self.store.save_role(&role).await?;
        info!(role_id = %role_id, role = role.name(), "Updated role");
        Ok(role)
    }

    /// Delete a custom role.
    ///
    /// System roles are refused with [`RbacError::InvalidOperation`]; roles
    /// still assigned to users are refused with [`AppError::Conflict`].
    pub async fn delete_role(&self, role_id: Uuid) -> AppResult<()> {
        let role = self.role(role_id).await?;
        if role.is_system() {
            warn!(role_id = %role_id, role = role.name(), "Refused to delete system role");
            return Err(RbacError::invalid_operation(format!(
                "Cannot delete system role '{}'",
                role.name()
            ))
            .into());
        }
        self.store.delete_role(role_id).await?;
        info!(role_id = %role_id, role = role.name(), "Deleted role");
        Ok(())
    }

    /// Replace every permission of a role.
    pub async fn set_role_permissions(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> AppResult<Role> {
        let mut role = self.role(role_id).await?;
        let permissions = self.permissions(permission_ids).await?;
        self.refuse_on_system(role.set_permissions(permissions))?;

        let ids: Vec<Uuid> = role.permissions().iter().map(Permission::id).collect();
        let role = self.store.replace_role_permissions(role_id, &ids).await?;
        info!(role_id = %role_id, count = ids.len(), "Replaced role permissions");
        Ok(role)
    }

    /// Grant additional permissions to a role. Already held ones are skipped.
    pub async fn add_permissions_to_role(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> AppResult<Role> {
        let mut role = self.role(role_id).await?;
        let permissions = self.permissions(permission_ids).await?;
        self.refuse_on_system(role.add_permissions(permissions))?;
        self.store.save_role(&role).await?;
        info!(role_id = %role_id, count = permission_ids.len(), "Added permissions to role");
        Ok(role)
    }

    pub async fn remove_permission_from_role(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> AppResult<Role> {
        let mut role = self.role(role_id).await?;
        self.refuse_on_system(role.remove_permission(permission_id))?;
        self.store.save_role(&role).await?;
        info!(role_id = %role_id, permission_id = %permission_id, "Removed permission from role");
        Ok(role)
    }

    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        Ok(self.store.list_roles().await?)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Create an active user holding the named roles.
    ///
    /// # Errors
    ///
    /// - [`AppError::Rbac`] for an invalid email or name
    /// - [`AppError::Conflict`] if the email is taken
    /// - [`AppError::NotFound`] if a role name is unknown
    pub async fn create_user<S: AsRef<str>>(
        &self,
        email: &str,
        name: &str,
        role_names: &[S],
    ) -> AppResult<User> {
        let mut user = User::new(email, name)?;
        if self.store.find_user_by_email(email).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "user with email '{}' already exists",
                email
            )));
        }
        user.assign_roles(self.roles_by_name(role_names).await?);
        self.store.save_user(&user).await?;
        info!(user_id = %user.id(), roles = ?user.role_names(), "Created user");
        Ok(user)
    }

    /// Assign roles by name on top of the ones the user already holds.
    pub async fn assign_roles_to_user<S: AsRef<str>>(
        &self,
        user_id: Uuid,
        role_names: &[S],
    ) -> AppResult<User> {
        let mut user = self.load_user(user_id).await?;
        user.assign_roles(self.roles_by_name(role_names).await?);
        self.store.save_user(&user).await?;
        info!(user_id = %user_id, roles = ?user.role_names(), "Assigned roles to user");
        Ok(user)
    }

    /// Replace every role of a user.
    pub async fn set_user_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> AppResult<User> {
        let mut user = self.load_user(user_id).await?;
        let mut roles = Vec::with_capacity(role_ids.len());
        for id in role_ids {
            roles.push(self.role(*id).await?);
        }
        user.set_roles(roles);

        let ids: Vec<Uuid> = user.roles().iter().map(Role::id).collect();
        let user = self.store.replace_user_roles(user_id, &ids).await?;
        info!(user_id = %user_id, roles = ?user.role_names(), "Replaced user roles");
        Ok(user)
    }

    pub async fn remove_role_from_user(&self, user_id: Uuid, role_id: Uuid) -> AppResult<User> {
        let mut user = self.load_user(user_id).await?;
        user.remove_role(role_id);
        self.store.save_user(&user).await?;
        info!(user_id = %user_id, role_id = %role_id, "Removed role from user");
        Ok(user)
    }

    /// Activate, deactivate or suspend an account.
    pub async fn set_user_status(&self, user_id: Uuid, status: UserStatus) -> AppResult<User> {
        let mut user = self.load_user(user_id).await?;
        user.set_status(status);
        self.store.save_user(&user).await?;
        info!(user_id = %user_id, status = %status, "Changed user status");
        Ok(user)
    }

    /// Record a successful sign-in.
    pub async fn record_login(&self, user_id: Uuid) -> AppResult<User> {
        let mut user = self.load_user(user_id).await?;
        user.record_login();
        self.store.save_user(&user).await?;
        Ok(user)
    }

    /// Load a fully hydrated user.
    pub async fn load_user(&self, user_id: Uuid) -> AppResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", user_id))
    }

    pub async fn delete_user(&self, user_id: Uuid) -> AppResult<()> {
        self.store.delete_user(user_id).await?;
        info!(user_id = %user_id, "Deleted user");
        Ok(())
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self.store.list_users().await?)
    }

    // ------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------

    /// Provision the default catalog and the system roles.
    ///
    /// Idempotent: existing permissions and roles are left as they are.
    pub async fn seed_system_roles(&self) -> AppResult<SeedReport> {
        let mut report = SeedReport::default();

        let mut provisioned = Vec::new();
        for entry in default_permissions() {
            let resource = entry.resource.as_str();
            let action = entry.action.as_str();
            match self.store.find_permission_by_key(resource, action).await? {
                Some(existing) => provisioned.push(existing),
                None => {
                    let permission = entry.to_permission()?;
                    self.store.save_permission(&permission).await?;
                    report.permissions_created += 1;
                    provisioned.push(permission);
                }
            }
        }

        for system_role in SystemRole::all() {
            if self
                .store
                .find_role_by_name(system_role.name())
                .await?
                .is_some()
            {
                continue;
            }
            let role = system_role.build(&provisioned)?;
            self.store.save_role(&role).await?;
            report.roles_created += 1;
        }

        info!(
            permissions_created = report.permissions_created,
            roles_created = report.roles_created,
            "Seeded system roles"
        );
        Ok(report)
    }

    /// Make sure an active super admin account exists for `email`.
    ///
    /// Requires the system roles to be seeded.
    pub async fn ensure_super_admin(&self, email: &str) -> AppResult<User> {
        match self.store.find_user_by_email(email).await? {
            Some(user) if user.is_super_admin() && user.is_active() => Ok(user),
            Some(mut user) => {
                user.assign_roles(self.roles_by_name(&[SUPER_ADMIN_ROLE]).await?);
                user.activate();
                self.store.save_user(&user).await?;
                info!(user_id = %user.id(), "Promoted user to super admin");
                Ok(user)
            }
            None => {
                let name = email.split('@').next().unwrap_or(email);
                let name = if name.trim().is_empty() { email } else { name };
                self.create_user(email, name, &[SUPER_ADMIN_ROLE]).await
            }
        }
    }

    /// Build a service from configuration and run the configured seeding.
    pub async fn bootstrap(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;
        let store = crate::config::build_store(config)?;
        info!(backend = store.backend_name(), "Admin store ready");

        let service = Self::new(store);
        if config.seed_system_roles {
            service.seed_system_roles().await?;
        }
        if let Some(email) = &config.seed_admin_email {
            service.ensure_super_admin(email).await?;
        }
        Ok(service)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    async fn permission(&self, id: Uuid) -> AppResult<Permission> {
        self.store
            .find_permission(id)
            .await?
            .ok_or_else(|| AppError::not_found("Permission", id))
    }

    async fn permissions(&self, ids: &[Uuid]) -> AppResult<Vec<Permission>> {
        let mut permissions = Vec::with_capacity(ids.len());
        for id in ids {
            permissions.push(self.permission(*id).await?);
        }
        Ok(permissions)
    }

    async fn role(&self, id: Uuid) -> AppResult<Role> {
        self.store
            .find_role(id)
            .await?
            .ok_or_else(|| AppError::not_found("Role", id))
    }

    async fn roles_by_name<S: AsRef<str>>(&self, names: &[S]) -> AppResult<Vec<Role>> {
        let mut roles = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let role = self
                .store
                .find_role_by_name(name)
                .await?
                .ok_or_else(|| AppError::not_found("Role", name))?;
            roles.push(role);
        }
        Ok(roles)
    }

    async fn ensure_role_name_free(&self, name: &str, role_id: Uuid) -> AppResult<()> {
        match self.store.find_role_by_name(name).await? {
            Some(existing) if existing.id() != role_id => Err(AppError::Conflict(format!(
                "role '{}' already exists",
                name
            ))),
            _ => Ok(()),
        }
    }

    fn refuse_on_system(&self, result: Result<(), RbacError>) -> AppResult<()> {
        if let Err(RbacError::InvalidOperation(reason)) = &result {
            warn!(reason = %reason, "Refused system role change");
        }
        Ok(result?)
    }
}
