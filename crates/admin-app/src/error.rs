//! Error types for admin use cases
//!
//! Entity errors pass through untouched; storage errors are translated so
//! callers see one taxonomy with a stable status mapping.

use thiserror::Error;

use admin_rbac::RbacError;

use crate::config::ConfigError;
use crate::store::StoreError;

/// Use-case error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AppError {
    /// Referenced entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Uniqueness or reference constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Entity validation or invariant failure
    #[error(transparent)]
    Rbac(#[from] RbacError),

    /// Backend failure
    #[error("Storage error: {0}")]
    Store(StoreError),

    /// Invalid configuration at bootstrap
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for use cases.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        AppError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound { .. } => 404,
            AppError::Conflict(_) => 409,
            AppError::Rbac(e) => e.status_code(),
            AppError::Store(_) | AppError::Config(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Rbac(e) => e.error_code(),
            AppError::Store(_) => "STORAGE_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { entity, id } => AppError::NotFound { entity, id },
            StoreError::Conflict(message) => AppError::Conflict(message),
            other => AppError::Store(other),
        }
    }
}
