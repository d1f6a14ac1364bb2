//! Storage collaborators.
//!
//! The core never talks to a database directly. It depends on the three
//! capability traits below, bundled as [`AdminStore`], and receives a
//! concrete backend at construction time.
//!
//! Every read returns fully hydrated entities: roles carry their permissions
//! and users carry their roles (with permissions).

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use admin_rbac::{Permission, Role};
use admin_users::User;

pub mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("unexpected storage failure: {0}")]
    Unexpected(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence of permission definitions.
///
/// `(resource, action)` is unique across all permissions.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Insert or update a permission.
    async fn save_permission(&self, permission: &Permission) -> StoreResult<()>;
    async fn find_permission(&self, id: Uuid) -> StoreResult<Option<Permission>>;
    async fn find_permission_by_key(
        &self,
        resource: &str,
        action: &str,
    ) -> StoreResult<Option<Permission>>;
    /// All permissions ordered by permission string.
    async fn list_permissions(&self) -> StoreResult<Vec<Permission>>;
    /// Delete a permission and unlink it from every role.
    async fn delete_permission(&self, id: Uuid) -> StoreResult<()>;
}

/// Persistence of roles and their permission links.
///
/// Role names are unique.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Insert or update a role together with its permission links.
    async fn save_role(&self, role: &Role) -> StoreResult<()>;
    async fn find_role(&self, id: Uuid) -> StoreResult<Option<Role>>;
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;
    /// All roles ordered by name.
    async fn list_roles(&self) -> StoreResult<Vec<Role>>;
    /// Delete a role.
    ///
    /// Fails with [`StoreError::Conflict`] while any user holds the role.
    async fn delete_role(&self, id: Uuid) -> StoreResult<()>;
    /// Atomically replace the full permission set of a role.
    async fn replace_role_permissions(
        &self,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> StoreResult<Role>;
}

/// Persistence of users and their role links.
///
/// Emails are unique, compared without ASCII case.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert or update a user together with its role links.
    async fn save_user(&self, user: &User) -> StoreResult<()>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// All users ordered by email.
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;
    /// Atomically replace the full role set of a user.
    async fn replace_user_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> StoreResult<User>;
}

/// The storage capability the core is built on.
pub trait AdminStore: PermissionStore + RoleStore + UserStore {
    fn backend_name(&self) -> &'static str;
}
