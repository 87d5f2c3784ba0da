//! GraphQL schema synthesis and caching.
//!
//! This module turns a tenant's table descriptors into an `async-graphql`
//! dynamic schema and caches the result per tenant.
//!
//! ## Components
//!
//! - [`ScalarKind`] - Storage column → GraphQL scalar mapping
//! - [`FilterTypeBuilder`] - Per-column filter input types
//! - [`EntityTypeBuilder`] - One output type per table, with relation fields
//! - [`QueryRootBuilder`] - Singular and plural root fields per table
//! - [`TenantSchemaAssembler`] - Single-tenant and global schema units
//! - [`SchemaCache`] - Bounded LRU cache of schema units
//!
//! ## Architecture
//!
//! 1. The first request for a tenant misses the cache
//! 2. The assembler loads the tenant's tables and executor from the registry
//! 3. Names are claimed up front so lossy sanitization cannot merge types
//! 4. Types are registered by name; forward and self references resolve at `finish()`
//! 5. The finished schema is cached until evicted or invalidated

mod assembler;
mod cache;
mod entity;
mod filter;
pub mod naming;
mod query_root;
mod scalars;

pub use assembler::{
    SchemaBuilderConfig, SchemaUnit, TenantSchemaAssembler, TenantSource, assemble_global_schema,
    assemble_tenant_schema,
};
pub use cache::{CacheKey, DEFAULT_CACHE_CAPACITY, GLOBAL_KEY, SchemaCache};
pub use entity::{EntityTypeBuilder, resolve_relation_target};
pub use filter::FilterTypeBuilder;
pub use naming::{NameRegistry, sanitize_name};
pub use query_root::{QueryRoot, QueryRootBuilder};
pub use scalars::ScalarKind;
