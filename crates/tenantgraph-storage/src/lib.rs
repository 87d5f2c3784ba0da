//! # tenantgraph-storage
//!
//! Storage collaborator contracts for the tenantgraph schema synthesizer.
//!
//! This crate defines the types and traits the schema core consumes from the
//! outside world. It does not contain any implementations - those are provided
//! by separate crates (see `tenantgraph-db-memory`).
//!
//! ## Overview
//!
//! - [`TenantRegistry`] enumerates tenants and describes their tables.
//! - [`QueryExecutor`] runs a filtered, paginated query against one tenant's data.
//! - [`TableDescriptor`] / [`ColumnDescriptor`] / [`RelationDescriptor`] describe
//!   the relational layout the GraphQL types are synthesized from.
//!
//! ## Example
//!
//! ```ignore
//! use tenantgraph_storage::{QueryExecutor, QueryOptions, StorageError};
//!
//! async fn first_invoices(executor: &dyn QueryExecutor) -> Result<usize, StorageError> {
//!     let filter = serde_json::Map::new();
//!     let rows = executor
//!         .query("Invoice", &filter, &QueryOptions::new().with_limit(10))
//!         .await?;
//!     Ok(rows.len())
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::{QueryExecutor, TenantRegistry};
pub use types::{
    ColumnDescriptor, Filter, QueryOptions, Record, RelationDescriptor, TableDescriptor, TableSet,
};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shareable query executor.
pub type DynExecutor = std::sync::Arc<dyn QueryExecutor>;

/// Type alias for a shareable tenant registry.
pub type DynRegistry = std::sync::Arc<dyn TenantRegistry>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use tenantgraph_storage::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ErrorCategory, StorageError};
    pub use crate::traits::{QueryExecutor, TenantRegistry};
    pub use crate::types::{
        ColumnDescriptor, Filter, QueryOptions, Record, RelationDescriptor, TableDescriptor,
        TableSet,
    };
    pub use crate::{DynExecutor, DynRegistry, StorageResult};
}
