//! Tenant fixtures: table layouts and seed rows loaded from a JSON document.
//!
//! ```json
//! {
//!   "tenants": [{
//!     "id": "acme",
//!     "tables": [{"name": "User", "columns": [{"name": "id", "type": "Int"}]}],
//!     "rows": {"User": [{"name": "Lool"}]}
//!   }]
//! }
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tenantgraph_storage::{Record, StorageError, TableDescriptor};
use tracing::info;

use crate::storage::InMemoryStore;

/// A set of tenants to preload into an [`InMemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenantFixtures {
    #[serde(default)]
    pub tenants: Vec<TenantFixture>,
}

/// One tenant: its tables and optional seed rows per table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantFixture {
    pub id: String,
    #[serde(default)]
    pub tables: Vec<TableDescriptor>,
    #[serde(default)]
    pub rows: IndexMap<String, Vec<Record>>,
}

impl TenantFixtures {
    /// Reads fixtures from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StorageError::connection_error(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Parses fixtures from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw)
            .map_err(|e| StorageError::invalid_descriptor(format!("invalid fixtures: {e}")))
    }

    /// Registers every tenant and inserts its seed rows.
    ///
    /// Returns the number of rows inserted.
    pub async fn load_into(self, store: &InMemoryStore) -> Result<usize, StorageError> {
        let mut inserted = 0;
        for tenant in self.tenants {
            store
                .register_tenant(&tenant.id, TableDescriptor::into_set(tenant.tables))
                .await;
            for (table, rows) in tenant.rows {
                for row in rows {
                    store.insert(&tenant.id, &table, row).await?;
                    inserted += 1;
                }
            }
            info!(tenant = %tenant.id, "Loaded tenant fixture");
        }
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tenantgraph_storage::TenantRegistry;

    const FIXTURES: &str = r#"{
        "tenants": [
            {
                "id": "ipsum",
                "tables": [
                    {"name": "User", "columns": [{"name": "id", "type": "Int"}, {"name": "name", "type": "String"}]},
                    {"name": "Invoice", "columns": [{"name": "id", "type": "Int"}, {"name": "total", "type": "Float"}],
                     "relations": {"user": {"table": "User"}}}
                ],
                "rows": {"User": [{"name": "Lool"}], "Invoice": [{"total": 10, "userId": 1}]}
            },
            {
                "id": "llms",
                "tables": [{"name": "Model", "columns": [{"name": "name", "type": "String"}]}]
            }
        ]
    }"#;

    #[tokio::test]
    async fn test_load_fixtures() {
        let store = InMemoryStore::new();
        let inserted = TenantFixtures::from_json(FIXTURES)
            .unwrap()
            .load_into(&store)
            .await
            .unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(store.tenant_ids().await.unwrap(), vec!["ipsum", "llms"]);
        assert_eq!(store.count("ipsum", "Invoice").await.unwrap(), 1);
        assert_eq!(store.count("llms", "Model").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rows_for_unknown_table_fail() {
        let store = InMemoryStore::new();
        let fixtures = TenantFixtures::from_json(
            r#"{"tenants": [{"id": "t", "tables": [], "rows": {"Ghost": [{}]}}]}"#,
        )
        .unwrap();
        assert!(fixtures.load_into(&store).await.is_err());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURES.as_bytes()).unwrap();

        let fixtures = TenantFixtures::from_path(file.path()).unwrap();
        assert_eq!(fixtures.tenants.len(), 2);
        assert!(TenantFixtures::from_path("/nonexistent/fixtures.json").is_err());
        assert!(TenantFixtures::from_json("not json").is_err());
    }
}
