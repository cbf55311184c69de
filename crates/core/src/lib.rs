//! Shared primitives for all Rust crates in Identra.

#![forbid(unsafe_code)]

/// Composite validation reporting.
pub mod validation;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use validation::{ErrorKind, ValidationReport};

/// Result type used across Identra crates.
pub type AppResult<T> = Result<T, AppError>;

/// Tenant identifier used as the partition key for configuration and audit data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tenant(String);

/// Name of the pre-defined tenant every deployment starts with.
pub const MASTER_TENANT: &str = "Master";

impl Tenant {
    /// Creates a validated tenant identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "tenant identifier must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the pre-defined master tenant.
    #[must_use]
    pub fn master() -> Self {
        Self(MASTER_TENANT.to_owned())
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for Tenant {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// One or more structural violations in a declarative resource definition.
    #[error("invalid resource definition: {0}")]
    InvalidResource(ValidationReport),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller is not authenticated or not allowed to access a resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::{AppError, ErrorKind, Tenant, ValidationReport};

    #[test]
    fn tenant_rejects_whitespace() {
        let result = Tenant::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn master_tenant_has_expected_name() {
        assert_eq!(Tenant::master().as_str(), "Master");
    }

    #[test]
    fn invalid_resource_error_lists_elements() {
        let mut report = ValidationReport::new();
        report.push(ErrorKind::InvalidProvision, "Null ObjectClass");

        let error = AppError::InvalidResource(report);
        assert!(error.to_string().contains("Null ObjectClass"));
    }
}
