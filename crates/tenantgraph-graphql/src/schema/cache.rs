//! Tenant-keyed schema cache.
//!
//! Tenant schemas are keyed by raw tenant id and live apart from the global
//! schema, so a tenant named `global` never shares a slot with it. Concurrent
//! misses for one key share a single build, and failed builds are never stored.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use moka::future::Cache;
use moka::policy::EvictionPolicy;
use tracing::{debug, info};

use super::assembler::{SchemaUnit, TenantSchemaAssembler};
use crate::error::GraphQLError;

/// Cache key of the schema spanning all tenants.
pub const GLOBAL_KEY: &str = "global";

/// Default number of cached schemas.
pub const DEFAULT_CACHE_CAPACITY: u64 = 100;

/// Slot of a schema in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Schema of one tenant, by raw tenant id.
    Tenant(String),
    /// Schema spanning every tenant.
    Global,
}

impl CacheKey {
    pub fn tenant(tenant_id: impl Into<String>) -> Self {
        Self::Tenant(tenant_id.into())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tenant(tenant_id) => write!(f, "tenant:{tenant_id}"),
            Self::Global => f.write_str(GLOBAL_KEY),
        }
    }
}

/// Bounded LRU cache of assembled schemas.
#[derive(Clone)]
pub struct SchemaCache {
    schemas: Cache<CacheKey, Arc<SchemaUnit>>,
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl SchemaCache {
    /// Creates a cache holding at most `capacity` schemas.
    pub fn new(capacity: u64) -> Self {
        Self {
            schemas: Cache::builder()
                .max_capacity(capacity)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
        }
    }

    /// Returns the schema stored under `key`, building it with `build` on a miss.
    ///
    /// `build` runs at most once per miss even when many callers race for the
    /// same key; all of them receive the same `Arc`. An error is returned to
    /// every waiting caller and the key stays absent.
    pub async fn get_or_build<F, Fut>(
        &self,
        key: CacheKey,
        build: F,
    ) -> Result<Arc<SchemaUnit>, GraphQLError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<SchemaUnit, GraphQLError>>,
    {
        if let Some(unit) = self.schemas.get(&key).await {
            debug!(key = %key, "Schema cache hit");
            return Ok(unit);
        }

        let label = key.to_string();
        self.schemas
            .try_get_with(key, async move {
                info!(key = %label, "Schema cache miss, building");
                build().await.map(Arc::new)
            })
            .await
            .map_err(|e| (*e).clone())
    }

    /// Returns the schema of `tenant_id`, assembling it on a miss.
    pub async fn tenant_schema(
        &self,
        assembler: &TenantSchemaAssembler,
        tenant_id: &str,
    ) -> Result<Arc<SchemaUnit>, GraphQLError> {
        self.get_or_build(CacheKey::tenant(tenant_id), || assembler.assemble(tenant_id))
            .await
    }

    /// Returns the global schema, assembling it on a miss.
    pub async fn global_schema(
        &self,
        assembler: &TenantSchemaAssembler,
    ) -> Result<Arc<SchemaUnit>, GraphQLError> {
        self.get_or_build(CacheKey::Global, || assembler.assemble_global(GLOBAL_KEY))
            .await
    }

    /// Returns a cached schema without building.
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<SchemaUnit>> {
        self.schemas.get(key).await
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.schemas.contains_key(key)
    }

    /// Drops the schema stored under `key`; the next request rebuilds it.
    pub async fn invalidate(&self, key: &CacheKey) {
        self.schemas.invalidate(key).await;
        info!(key = %key, "Schema invalidated");
    }

    pub fn invalidate_all(&self) {
        self.schemas.invalidate_all();
        info!("All schemas invalidated");
    }

    /// Approximate number of cached schemas.
    ///
    /// Call [`SchemaCache::run_pending_tasks`] first for an exact count.
    pub fn entry_count(&self) -> u64 {
        self.schemas.entry_count()
    }

    /// Applies pending evictions and invalidations.
    pub async fn run_pending_tasks(&self) {
        self.schemas.run_pending_tasks().await;
    }
}
