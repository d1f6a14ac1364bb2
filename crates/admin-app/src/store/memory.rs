//! In-memory implementation of the admin store.
//!
//! # Purpose
//! Local development, tests and single-process deployments where durability
//! is not required. All state is lost on restart.
//!
//! # Layout
//! Tables are normalized the way a relational backend would store them:
//! entity rows keyed by id plus two link tables (`role_permissions`,
//! `user_roles`). Reads hydrate entities by following the links.
//!
//! # Consistency
//! Every table lives behind a single `tokio::sync::RwLock`, so a mutation
//! that touches a row and its links is atomic for concurrent readers.
//! Uniqueness constraints are checked under the same write lock.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use admin_rbac::{Permission, PermissionRecord, Role, RoleRecord};
use admin_users::{User, UserRecord};

use super::{AdminStore, PermissionStore, RoleStore, StoreError, StoreResult, UserStore};

#[derive(Debug, Default)]
struct Tables {
    permissions: HashMap<Uuid, PermissionRecord>,
    /// Role rows; `permissions` is always empty here, links live below.
    roles: HashMap<Uuid, RoleRecord>,
    role_permissions: HashMap<Uuid, Vec<Uuid>>,
    /// User rows; `roles` is always empty here, links live below.
    users: HashMap<Uuid, UserRecord>,
    user_roles: HashMap<Uuid, Vec<Uuid>>,
}

impl Tables {
    fn hydrate_role(&self, row: &RoleRecord) -> Role {
        let mut record = row.clone();
        record.permissions = self
            .role_permissions
            .get(&row.id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.permissions.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Role::from_persistence(record)
    }

    fn hydrate_user(&self, row: &UserRecord) -> User {
        let mut record = row.clone();
        record.roles = self
            .user_roles
            .get(&row.id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.roles.get(id))
                    .map(|role| self.hydrate_role(role).to_persistence())
                    .collect()
            })
            .unwrap_or_default();
        User::from_persistence(record)
    }

    fn ensure_permissions_exist(&self, ids: &[Uuid]) -> StoreResult<()> {
        match ids.iter().find(|id| !self.permissions.contains_key(id)) {
            Some(missing) => Err(StoreError::not_found("Permission", missing)),
            None => Ok(()),
        }
    }

    fn ensure_roles_exist(&self, ids: &[Uuid]) -> StoreResult<()> {
        match ids.iter().find(|id| !self.roles.contains_key(id)) {
            Some(missing) => Err(StoreError::not_found("Role", missing)),
            None => Ok(()),
        }
    }
}

/// Order-preserving deduplication of link ids.
fn unique_ids(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// In-memory admin store.
///
/// Cloning is cheap and every clone shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionStore for MemoryStore {
    async fn save_permission(&self, permission: &Permission) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let duplicate = tables.permissions.values().any(|p| {
            p.id != permission.id()
                && p.resource == permission.resource()
                && p.action == permission.action()
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "permission '{}' already exists",
                permission.permission_string()
            )));
        }
        tables
            .permissions
            .insert(permission.id(), permission.to_persistence());
        debug!(permission_id = %permission.id(), permission = %permission, "Saved permission");
        Ok(())
    }

    async fn find_permission(&self, id: Uuid) -> StoreResult<Option<Permission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .permissions
            .get(&id)
            .cloned()
            .map(Permission::from_persistence))
    }

    async fn find_permission_by_key(
        &self,
        resource: &str,
        action: &str,
    ) -> StoreResult<Option<Permission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .permissions
            .values()
            .find(|p| p.resource == resource && p.action == action)
            .cloned()
            .map(Permission::from_persistence))
    }

    async fn list_permissions(&self) -> StoreResult<Vec<Permission>> {
        let tables = self.tables.read().await;
        let mut permissions: Vec<Permission> = tables
            .permissions
            .values()
            .cloned()
            .map(Permission::from_persistence)
            .collect();
        permissions.sort_by_key(Permission::permission_string);
        Ok(permissions)
    }

    async fn delete_permission(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.permissions.remove(&id).is_none() {
            return Err(StoreError::not_found("Permission", id));
        }
        for links in tables.role_permissions.values_mut() {
            links.retain(|linked| *linked != id);
        }
        debug!(permission_id = %id, "Deleted permission");
        Ok(())
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn save_role(&self, role: &Role) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .roles
            .values()
            .any(|r| r.id != role.id() && r.name == role.name())
        {
            return Err(StoreError::Conflict(format!(
                "role '{}' already exists",
                role.name()
            )));
        }
        let links = unique_ids(role.permissions().iter().map(Permission::id));
        tables.ensure_permissions_exist(&links)?;

        let mut row = role.to_persistence();
        row.permissions.clear();
        tables.roles.insert(row.id, row);
        tables.role_permissions.insert(role.id(), links);
        debug!(role_id = %role.id(), role = role.name(), "Saved role");
        Ok(())
    }

    async fn find_role(&self, id: Uuid) -> StoreResult<Option<Role>> {
        let tables = self.tables.read().await;
        Ok(tables.roles.get(&id).map(|row| tables.hydrate_role(row)))
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let tables = self.tables.read().await;
        Ok(tables
            .roles
            .values()
            .find(|r| r.name == name)
            .map(|row| tables.hydrate_role(row)))
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let tables = self.tables.read().await;
        let mut roles: Vec<Role> = tables
            .roles
            .values()
            .map(|row| tables.hydrate_role(row))
            .collect();
        roles.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(roles)
    }

    async fn delete_role(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.roles.get(&id) else {
            return Err(StoreError::not_found("Role", id));
        };
        let holders = tables
            .user_roles
            .values()
            .filter(|links| links.contains(&id))
            .count();
        if holders > 0 {
            return Err(StoreError::Conflict(format!(
                "role '{}' is assigned to {} user(s)",
                row.name, holders
            )));
        }
        tables.roles.remove(&id);
        tables.role_permissions.remove(&id);
        debug!(role_id = %id, "Deleted role");
        Ok(())
    }

    async fn replace_role_permissions(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> StoreResult<Role> {
        let mut tables = self.tables.write().await;
        if !tables.roles.contains_key(&role_id) {
            return Err(StoreError::not_found("Role", role_id));
        }
        let links = unique_ids(permission_ids.iter().copied());
        tables.ensure_permissions_exist(&links)?;

        tables.role_permissions.insert(role_id, links);
        let row = match tables.roles.get_mut(&role_id) {
            Some(row) => {
                row.updated_at = Utc::now();
                row.clone()
            }
            None => return Err(StoreError::not_found("Role", role_id)),
        };
        debug!(role_id = %role_id, count = permission_ids.len(), "Replaced role permissions");
        Ok(tables.hydrate_role(&row))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn save_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.id != user.id() && u.email.eq_ignore_ascii_case(user.email()))
        {
            return Err(StoreError::Conflict(format!(
                "user with email '{}' already exists",
                user.email()
            )));
        }
        let links = unique_ids(user.roles().iter().map(Role::id));
        tables.ensure_roles_exist(&links)?;

        let mut row = user.to_persistence();
        row.roles.clear();
        tables.users.insert(row.id, row);
        tables.user_roles.insert(user.id(), links);
        debug!(user_id = %user.id(), "Saved user");
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|row| tables.hydrate_user(row)))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .map(|row| tables.hydrate_user(row)))
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .map(|row| tables.hydrate_user(row))
            .collect();
        users.sort_by(|a, b| a.email().cmp(b.email()));
        Ok(users)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(StoreError::not_found("User", id));
        }
        tables.user_roles.remove(&id);
        debug!(user_id = %id, "Deleted user");
        Ok(())
    }

    async fn replace_user_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::not_found("User", user_id));
        }
        let links = unique_ids(role_ids.iter().copied());
        tables.ensure_roles_exist(&links)?;

        tables.user_roles.insert(user_id, links);
        let row = match tables.users.get_mut(&user_id) {
            Some(row) => {
                row.updated_at = Utc::now();
                row.clone()
            }
            None => return Err(StoreError::not_found("User", user_id)),
        };
        debug!(user_id = %user_id, count = role_ids.len(), "Replaced user roles");
        Ok(tables.hydrate_user(&row))
    }
}

impl AdminStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
