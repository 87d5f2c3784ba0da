//! Collaborator traits consumed by the schema core.
//!
//! This module defines the contracts that storage backends must implement.

use async_trait::async_trait;

use crate::DynExecutor;
use crate::error::StorageError;
use crate::types::{Filter, QueryOptions, Record, TableSet};

/// Per-tenant storage schema registry.
///
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use tenantgraph_storage::{StorageError, TenantRegistry};
///
/// async fn table_count(registry: &dyn TenantRegistry, tenant: &str) -> Result<usize, StorageError> {
///     Ok(registry.tables(tenant).await?.len())
/// }
/// ```
#[async_trait]
pub trait TenantRegistry: Send + Sync {
    /// Returns all known tenant ids, in a stable order.
    async fn tenant_ids(&self) -> Result<Vec<String>, StorageError>;

    /// Returns the table descriptors of a tenant.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::TenantNotFound` if the tenant is unknown.
    async fn tables(&self, tenant_id: &str) -> Result<TableSet, StorageError>;

    /// Returns the query executor bound to a tenant's data.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::TenantNotFound` if the tenant is unknown.
    async fn executor(&self, tenant_id: &str) -> Result<DynExecutor, StorageError>;
}

/// Storage query execution for one tenant.
///
/// The filter is the generated `where` input converted to JSON and keyed by
/// raw column names; it is passed through unmodified. Filtering and
/// pagination are entirely the executor's responsibility.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Runs a query against `table`.
    ///
    /// An empty result is not an error.
    async fn query(
        &self,
        table: &str,
        filter: &Filter,
        options: &QueryOptions,
    ) -> Result<Vec<Record>, StorageError>;
}
