//! # tenantgraph-graphql
//!
//! Multi-tenant GraphQL schema synthesis for tenantgraph.
//!
//! Given the tables of a tenant (columns, storage types, relations), this crate
//! builds a GraphQL schema exposing a singular and a plural lookup per table,
//! with a generated filter input per column. Schemas are built on first use
//! and cached per tenant, plus one `global` schema spanning every tenant.
//!
//! ## Endpoints
//!
//! - `POST /graphql` / `GET /graphql` - Schema of the request's tenant
//! - `POST /global` / `GET /global` - Schema of all tenants
//!
//! ## Configuration
//!
//! Add to `tenantgraph.toml`:
//!
//! ```toml
//! [graphql]
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! playground = true
//! cache_capacity = 100
//! tenant_header = "x-tenant-id"
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration options
//! - [`schema`] - Type generation, schema assembly and caching
//! - [`resolvers`] - Field resolvers delegating to the tenant's executor
//! - [`tenant`] - Tenant id resolution from requests
//! - [`handler`] - Axum HTTP handlers
//! - [`error`] - Error types for GraphQL operations

pub mod config;
pub mod error;
pub mod handler;
pub mod resolvers;
pub mod schema;
pub mod tenant;

// Re-export main types
pub use config::GraphQLConfig;
pub use error::GraphQLError;
pub use handler::{GraphQLState, global_handler, global_handler_get, graphql_handler, graphql_handler_get, router};
pub use schema::{
    CacheKey, GLOBAL_KEY, ScalarKind, SchemaBuilderConfig, SchemaCache, SchemaUnit, TenantSchemaAssembler,
};
pub use tenant::{HeaderTenantResolver, TenantResolver};

/// Result type for GraphQL operations.
pub type Result<T> = std::result::Result<T, GraphQLError>;
