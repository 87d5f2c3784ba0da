//! Error types for schema synthesis and GraphQL request handling.
//!
//! Errors are designed to be converted to appropriate HTTP responses. Schema
//! building never caches a failure, so every variant is safe to retry.

use std::fmt;

use tenantgraph_storage::StorageError;

/// Errors that can occur while building or serving a tenant schema.
///
/// `Clone` so that a single failed build can be handed to every request that
/// was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphQLError {
    /// No tenant could be resolved for the request, or the tenant is unknown.
    TenantNotFound {
        /// The tenant id that was looked up, if one was resolved.
        tenant_id: Option<String>,
    },

    /// Schema build failed (malformed descriptors, name collisions, engine errors).
    SchemaBuildFailed(String),

    /// Invalid request (e.g. unparseable variables).
    InvalidRequest(String),

    /// Storage collaborator error.
    Storage(String),

    /// Internal server error.
    Internal(String),
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TenantNotFound { .. } => {
                write!(f, "Tenant not found")
            }
            Self::SchemaBuildFailed(msg) => {
                write!(f, "Failed to build GraphQL schema: {msg}")
            }
            Self::InvalidRequest(msg) => {
                write!(f, "Invalid GraphQL request: {msg}")
            }
            Self::Storage(msg) => {
                write!(f, "Storage error: {msg}")
            }
            Self::Internal(msg) => {
                write!(f, "Internal error: {msg}")
            }
        }
    }
}

impl std::error::Error for GraphQLError {}

impl GraphQLError {
    /// Creates a `TenantNotFound` error for a resolved but unknown tenant id.
    #[must_use]
    pub fn tenant_not_found(tenant_id: impl Into<String>) -> Self {
        Self::TenantNotFound {
            tenant_id: Some(tenant_id.into()),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::TenantNotFound { .. } => 404,
            Self::InvalidRequest(_) => 400,
            Self::SchemaBuildFailed(_) | Self::Storage(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TenantNotFound { .. } => "TENANT_NOT_FOUND",
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Converts the error to the JSON body returned to HTTP clients.
    ///
    /// A missing tenant is always reported as `{"error": "Tenant not found"}`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::TenantNotFound { .. } => serde_json::json!({ "error": "Tenant not found" }),
            other => serde_json::json!({
                "error": other.to_string(),
                "code": other.error_code(),
            }),
        }
    }
}

impl From<StorageError> for GraphQLError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TenantNotFound { tenant_id } => Self::TenantNotFound {
                tenant_id: Some(tenant_id),
            },
            StorageError::InvalidDescriptor { message } => Self::SchemaBuildFailed(message),
            other => Self::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(GraphQLError::tenant_not_found("acme").status_code(), 404);
        assert_eq!(GraphQLError::InvalidRequest("test".into()).status_code(), 400);
        assert_eq!(
            GraphQLError::SchemaBuildFailed("test".into()).status_code(),
            500
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            GraphQLError::TenantNotFound { tenant_id: None }.error_code(),
            "TENANT_NOT_FOUND"
        );
        assert_eq!(
            GraphQLError::Storage("down".into()).error_code(),
            "STORAGE_ERROR"
        );
    }

    #[test]
    fn test_tenant_not_found_body() {
        let body = GraphQLError::tenant_not_found("acme").to_json();
        assert_eq!(body, serde_json::json!({"error": "Tenant not found"}));

        let body = GraphQLError::SchemaBuildFailed("boom".into()).to_json();
        assert_eq!(body["code"], "SCHEMA_BUILD_FAILED");
    }

    #[test]
    fn test_from_storage_error() {
        let err: GraphQLError = StorageError::tenant_not_found("acme").into();
        assert_eq!(err, GraphQLError::tenant_not_found("acme"));

        let err: GraphQLError = StorageError::invalid_descriptor("bad").into();
        assert!(matches!(err, GraphQLError::SchemaBuildFailed(_)));

        let err: GraphQLError = StorageError::internal("boom").into();
        assert!(matches!(err, GraphQLError::Storage(_)));
    }
}
