use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use tenantgraph_storage::{
    DynExecutor, Filter, QueryExecutor, QueryOptions, Record, StorageError, TableSet,
    TenantRegistry,
};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::query::{QueryFilter, execute};

/// Data and table layout of a single tenant.
#[derive(Debug)]
pub struct TenantData {
    id: String,
    tables: TableSet,
    /// Rows per table, in insertion order.
    rows: RwLock<HashMap<String, Vec<Record>>>,
    /// Atomic counter for generating record ids
    id_counter: AtomicU64,
}

impl TenantData {
    fn new(id: String, tables: TableSet) -> Self {
        let rows = tables.keys().map(|name| (name.clone(), Vec::new())).collect();
        Self {
            id,
            tables,
            rows: RwLock::new(rows),
            id_counter: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> u64 {
        self.id_counter.fetch_add(1, Ordering::SeqCst)
    }
}

/// In-memory multi-tenant store.
///
/// This storage implementation provides:
/// - Tenant registration with table descriptors
/// - Record insertion with generated integer ids
/// - Filtered, paginated queries via [`InMemoryExecutor`]
///
/// Tenant ids are reported in registration order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tenants: RwLock<IndexMap<String, Arc<TenantData>>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a tenant with the given tables.
    ///
    /// Replacing a tenant drops its existing rows.
    pub async fn register_tenant(&self, tenant_id: impl Into<String>, tables: TableSet) {
        let tenant_id = tenant_id.into();
        debug!(tenant = %tenant_id, tables = tables.len(), "Registering tenant");
        let data = Arc::new(TenantData::new(tenant_id.clone(), tables));
        self.tenants.write().await.insert(tenant_id, data);
    }

    /// Inserts a record, assigning an integer `id` when the record has none.
    ///
    /// Returns the stored record.
    pub async fn insert(
        &self,
        tenant_id: &str,
        table: &str,
        record: Record,
    ) -> Result<Record, StorageError> {
        let tenant = self.tenant(tenant_id).await?;
        if !tenant.tables.contains_key(table) {
            return Err(StorageError::table_not_found(tenant_id, table));
        }

        let Value::Object(mut fields) = record else {
            return Err(StorageError::invalid_record(format!(
                "records inserted into {tenant_id}/{table} must be JSON objects"
            )));
        };
        if fields.get("id").is_none_or(Value::is_null) {
            fields.insert("id".to_string(), Value::from(tenant.next_id()));
        }
        let stored = Value::Object(fields);

        let mut rows = tenant.rows.write().await;
        rows.entry(table.to_string()).or_default().push(stored.clone());
        trace!(tenant = %tenant_id, table, "Inserted record");
        Ok(stored)
    }

    /// Returns the number of rows stored in a table.
    pub async fn count(&self, tenant_id: &str, table: &str) -> Result<usize, StorageError> {
        let tenant = self.tenant(tenant_id).await?;
        let rows = tenant.rows.read().await;
        rows.get(table)
            .map(Vec::len)
            .ok_or_else(|| StorageError::table_not_found(tenant_id, table))
    }

    async fn tenant(&self, tenant_id: &str) -> Result<Arc<TenantData>, StorageError> {
        self.tenants
            .read()
            .await
            .get(tenant_id)
            .cloned()
            .ok_or_else(|| StorageError::tenant_not_found(tenant_id))
    }
}

#[async_trait]
impl TenantRegistry for InMemoryStore {
    async fn tenant_ids(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.tenants.read().await.keys().cloned().collect())
    }

    async fn tables(&self, tenant_id: &str) -> Result<TableSet, StorageError> {
        Ok(self.tenant(tenant_id).await?.tables.clone())
    }

    async fn executor(&self, tenant_id: &str) -> Result<DynExecutor, StorageError> {
        let tenant = self.tenant(tenant_id).await?;
        Ok(Arc::new(InMemoryExecutor { tenant }))
    }
}

/// Query executor bound to one tenant of an [`InMemoryStore`].
#[derive(Debug, Clone)]
pub struct InMemoryExecutor {
    tenant: Arc<TenantData>,
}

#[async_trait]
impl QueryExecutor for InMemoryExecutor {
    async fn query(
        &self,
        table: &str,
        filter: &Filter,
        options: &QueryOptions,
    ) -> Result<Vec<Record>, StorageError> {
        let conditions = QueryFilter::parse_all(filter)?;
        let rows = self.tenant.rows.read().await;
        let table_rows = rows
            .get(table)
            .ok_or_else(|| StorageError::table_not_found(&self.tenant.id, table))?;

        let result = execute(table_rows, &conditions, options);
        debug!(
            tenant = %self.tenant.id,
            table,
            conditions = conditions.len(),
            matched = result.len(),
            "Executed in-memory query"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tenantgraph_storage::TableDescriptor;

    fn tables() -> TableSet {
        TableDescriptor::into_set([
            TableDescriptor::new("User")
                .with_column("id", "Int")
                .with_column("name", "String"),
            TableDescriptor::new("Invoice")
                .with_column("id", "Int")
                .with_column("total", "Float")
                .with_relation("user", "User"),
        ])
    }

    fn filter(value: Value) -> Filter {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_register_and_list_tenants_in_order() {
        let store = InMemoryStore::new();
        store.register_tenant("b", tables()).await;
        store.register_tenant("a", tables()).await;

        assert_eq!(store.tenant_ids().await.unwrap(), vec!["b", "a"]);
        assert_eq!(store.tables("a").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_tenant() {
        let store = InMemoryStore::new();
        let err = store.tables("missing").await.unwrap_err();
        assert!(err.is_tenant_not_found());
        assert!(store.executor("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let store = InMemoryStore::new();
        store.register_tenant("acme", tables()).await;

        let first = store.insert("acme", "User", json!({"name": "Lool"})).await.unwrap();
        let second = store.insert("acme", "User", json!({"name": "Ada"})).await.unwrap();
        let explicit = store
            .insert("acme", "User", json!({"id": 42, "name": "Eve"}))
            .await
            .unwrap();

        assert_eq!(first["id"], json!(1));
        assert_eq!(second["id"], json!(2));
        assert_eq!(explicit["id"], json!(42));
        assert_eq!(store.count("acme", "User").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_insert_rejects_bad_input() {
        let store = InMemoryStore::new();
        store.register_tenant("acme", tables()).await;

        assert!(store.insert("acme", "Nope", json!({})).await.is_err());
        assert!(store.insert("acme", "User", json!([1, 2])).await.is_err());
        assert!(store.insert("other", "User", json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_executor_query() {
        let store = InMemoryStore::new();
        store.register_tenant("acme", tables()).await;
        store.insert("acme", "Invoice", json!({"total": 10})).await.unwrap();
        store.insert("acme", "Invoice", json!({"total": 2})).await.unwrap();
        store.insert("acme", "Invoice", json!({"total": 30})).await.unwrap();

        let executor = store.executor("acme").await.unwrap();
        let big = executor
            .query("Invoice", &filter(json!({"total": {"gt": 5}})), &QueryOptions::new())
            .await
            .unwrap();
        assert_eq!(big.len(), 2);

        let page = executor
            .query("Invoice", &Filter::new(), &QueryOptions::new().with_limit(1).with_offset(2))
            .await
            .unwrap();
        assert_eq!(page, vec![json!({"total": 30, "id": 3})]);

        assert!(executor.query("Nope", &Filter::new(), &QueryOptions::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_executor_sees_later_inserts() {
        let store = InMemoryStore::new();
        store.register_tenant("acme", tables()).await;
        let executor = store.executor("acme").await.unwrap();

        store.insert("acme", "User", json!({"name": "Lool"})).await.unwrap();
        let users = executor
            .query("User", &Filter::new(), &QueryOptions::new())
            .await
            .unwrap();
        assert_eq!(users.len(), 1);
    }
}
