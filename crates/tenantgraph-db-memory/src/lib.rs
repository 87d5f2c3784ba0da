//! In-memory storage backend for tenantgraph.
//!
//! This crate provides an in-memory implementation of the [`TenantRegistry`]
//! and [`QueryExecutor`] traits from `tenantgraph-storage`. It evaluates the
//! operators of the generated filter input types and `limit`/`offset`
//! pagination, which makes it suitable for tests and local development.
//!
//! # Example
//!
//! ```ignore
//! use tenantgraph_db_memory::InMemoryStore;
//! use tenantgraph_storage::{TableDescriptor, TenantRegistry};
//!
//! let store = InMemoryStore::new();
//! store
//!     .register_tenant("acme", TableDescriptor::into_set([
//!         TableDescriptor::new("User").with_column("id", "Int").with_column("name", "String"),
//!     ]))
//!     .await;
//! store.insert("acme", "User", serde_json::json!({"name": "Lool"})).await?;
//! ```

pub mod fixtures;
pub mod query;
pub mod storage;

pub use tenantgraph_storage::{QueryExecutor, StorageError, TenantRegistry};

pub use fixtures::{TenantFixture, TenantFixtures};
pub use query::{FilterOp, QueryFilter};
pub use storage::{InMemoryExecutor, InMemoryStore};

/// Creates a new shareable in-memory store.
pub fn create_store() -> std::sync::Arc<InMemoryStore> {
    std::sync::Arc::new(InMemoryStore::new())
}
