//! Error types for authorization decisions
//!
//! Guards raise [`AuthError`]; the route middleware is the single place that
//! catches it and converts it into a structured rejection.

use thiserror::Error;

/// Authorization error types.
///
/// Every variant is a denial. The message distinguishes "not authenticated",
/// "not active", the missing permission or role, or a custom reason.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No authenticated user
    #[error("Authentication required")]
    AuthenticationRequired,

    /// User is inactive or suspended
    #[error("Account is not active")]
    AccountInactive,

    /// User lacks a required permission
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// User lacks a required role
    #[error("Role required: {0}")]
    RoleRequired(String),

    /// User is neither ADMIN nor SUPER_ADMIN
    #[error("Admin access required")]
    AdminRequired,

    /// User is not SUPER_ADMIN
    #[error("Super admin access required")]
    SuperAdminRequired,

    /// User neither owns the resource nor holds the fallback grant
    #[error("Access denied: {0}")]
    OwnershipRequired(String),

    /// A custom check failed
    #[error("{0}")]
    Custom(String),
}

/// Result type for authorization decisions.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Check whether the caller was not authenticated at all.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, AuthError::AuthenticationRequired)
    }

    /// Get HTTP status code for this error.
    ///
    /// A missing user maps to 401; every other denial is a 403.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::AuthenticationRequired => 401,

            AuthError::AccountInactive
            | AuthError::PermissionDenied(_)
            | AuthError::RoleRequired(_)
            | AuthError::AdminRequired
            | AuthError::SuperAdminRequired
            | AuthError::OwnershipRequired(_)
            | AuthError::Custom(_) => 403,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::AuthenticationRequired => "UNAUTHENTICATED",
            AuthError::AccountInactive => "ACCOUNT_INACTIVE",
            AuthError::PermissionDenied(_) => "PERMISSION_DENIED",
            AuthError::RoleRequired(_) => "ROLE_REQUIRED",
            AuthError::AdminRequired => "ADMIN_REQUIRED",
            AuthError::SuperAdminRequired => "SUPER_ADMIN_REQUIRED",
            AuthError::OwnershipRequired(_) => "OWNERSHIP_REQUIRED",
            AuthError::Custom(_) => "FORBIDDEN",
        }
    }
}
