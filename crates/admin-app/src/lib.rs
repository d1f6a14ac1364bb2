//! # Admin Application Layer
//!
//! Wires the RBAC domain to storage.
//!
//! ## Overview
//!
//! The admin-app crate handles:
//! - **Store**: the [`AdminStore`] capability (permissions, roles, users)
//!   and the in-memory [`MemoryStore`] backend
//! - **Service**: [`RbacService`] use cases, including idempotent seeding of
//!   the default catalog and system roles
//! - **Resolver**: [`StoreUserResolver`], feeding hydrated users to the route
//!   middleware
//! - **Config**: [`AppConfig`] loaded from the environment
//!
//! ## Startup
//!
//! ```rust
//! use admin_app::{AppConfig, RbacService};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), admin_app::AppError> {
//! let config = AppConfig {
//!     seed_admin_email: Some("root@example.com".to_string()),
//!     ..AppConfig::default()
//! };
//! let service = RbacService::bootstrap(&config).await?;
//!
//! let roles: Vec<String> = service
//!     .list_roles()
//!     .await?
//!     .iter()
//!     .map(|r| r.name().to_string())
//!     .collect();
//! assert_eq!(roles, vec!["ADMIN", "SUPER_ADMIN", "USER"]);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod resolver;
pub mod service;
pub mod store;

// Re-export main types
pub use config::{build_store, AppConfig, ConfigError, StorageBackend};
pub use error::{AppError, AppResult};
pub use resolver::StoreUserResolver;
pub use service::{RbacService, SeedReport};
pub use store::{
    AdminStore, MemoryStore, PermissionStore, RoleStore, StoreError, StoreResult, UserStore,
};
