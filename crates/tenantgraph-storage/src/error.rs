//! Storage error types for the tenant storage contracts.
//!
//! This module defines all error types that collaborators may report back to
//! the schema core.

use std::fmt;

/// Errors that can occur during registry lookups and query execution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    /// The requested tenant is not known to the registry.
    #[error("Tenant not found: {tenant_id}")]
    TenantNotFound {
        /// The tenant id that was looked up.
        tenant_id: String,
    },

    /// The requested table does not exist within the tenant.
    #[error("Table not found: {tenant_id}/{table}")]
    TableNotFound {
        /// The tenant that was searched.
        tenant_id: String,
        /// The missing table.
        table: String,
    },

    /// A table descriptor is malformed.
    #[error("Invalid table descriptor: {message}")]
    InvalidDescriptor {
        /// Description of why the descriptor is invalid.
        message: String,
    },

    /// A record or filter is malformed.
    #[error("Invalid record: {message}")]
    InvalidRecord {
        /// Description of why the record is invalid.
        message: String,
    },

    /// Failed to reach the storage backend.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `TenantNotFound` error.
    #[must_use]
    pub fn tenant_not_found(tenant_id: impl Into<String>) -> Self {
        Self::TenantNotFound {
            tenant_id: tenant_id.into(),
        }
    }

    /// Creates a new `TableNotFound` error.
    #[must_use]
    pub fn table_not_found(tenant_id: impl Into<String>, table: impl Into<String>) -> Self {
        Self::TableNotFound {
            tenant_id: tenant_id.into(),
            table: table.into(),
        }
    }

    /// Creates a new `InvalidDescriptor` error.
    #[must_use]
    pub fn invalid_descriptor(message: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRecord` error.
    #[must_use]
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is an unknown tenant error.
    #[must_use]
    pub fn is_tenant_not_found(&self) -> bool {
        matches!(self, Self::TenantNotFound { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TenantNotFound { .. } | Self::TableNotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidDescriptor { .. } | Self::InvalidRecord { .. } => {
                ErrorCategory::Validation
            }
            Self::ConnectionError { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Tenant or table not found.
    NotFound,
    /// Validation error.
    Validation,
    /// Infrastructure/connection error.
    Infrastructure,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::tenant_not_found("acme");
        assert_eq!(err.to_string(), "Tenant not found: acme");

        let err = StorageError::table_not_found("acme", "Invoice");
        assert_eq!(err.to_string(), "Table not found: acme/Invoice");
    }

    #[test]
    fn test_error_predicates() {
        assert!(StorageError::tenant_not_found("acme").is_tenant_not_found());
        assert!(!StorageError::internal("boom").is_tenant_not_found());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            StorageError::tenant_not_found("acme").category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            StorageError::invalid_record("not an object").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            StorageError::connection_error("refused").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(ErrorCategory::NotFound.to_string(), "not_found");
    }
}
