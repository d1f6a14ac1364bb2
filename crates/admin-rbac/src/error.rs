//! Error types for RBAC entity operations
//!
//! Entities raise these synchronously from constructors and mutators.
//! They are never silently corrected.

use thiserror::Error;

/// RBAC entity error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RbacError {
    /// Malformed input to a constructor or mutator (bad name, resource or
    /// action format, empty required field).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A well-formed request that violates a state invariant, such as
    /// mutating a system role.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for RBAC entity operations.
pub type RbacResult<T> = Result<T, RbacError>;

impl RbacError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        RbacError::Validation(message.into())
    }

    /// Shorthand for an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        RbacError::InvalidOperation(message.into())
    }

    /// Get HTTP status code a request boundary should map this error to.
    pub fn status_code(&self) -> u16 {
        match self {
            RbacError::Validation(_) => 400,
            RbacError::InvalidOperation(_) => 409,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            RbacError::Validation(_) => "VALIDATION_ERROR",
            RbacError::InvalidOperation(_) => "INVALID_OPERATION",
        }
    }
}
