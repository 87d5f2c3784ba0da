//! Storage types for the tenant storage contracts.
//!
//! This module defines the data types shared between the storage collaborators
//! and the schema core.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single stored record, as returned by a [`QueryExecutor`](crate::QueryExecutor).
///
/// Records are JSON objects keyed by column name. Relation data, when the
/// backend materializes it, lives under the relation name (singular or plural).
pub type Record = Value;

/// A `where` filter: column name → operator mapping, e.g.
/// `{"total": {"gt": 5}, "name": {"startsWith": "A"}}`.
pub type Filter = Map<String, Value>;

/// The tables of one tenant, keyed by table name, in declaration order.
pub type TableSet = IndexMap<String, TableDescriptor>;

/// A column of a table: its name and the backend's storage type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// The column name.
    pub name: String,
    /// The storage type tag (e.g., "Int", "String", "Float", "BigInt").
    #[serde(rename = "type", alias = "storageType")]
    pub storage_type: String,
}

impl ColumnDescriptor {
    /// Creates a new `ColumnDescriptor`.
    #[must_use]
    pub fn new(name: impl Into<String>, storage_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage_type: storage_type.into(),
        }
    }
}

/// A relation from one table to another within the same tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDescriptor {
    /// The name of the target table.
    #[serde(rename = "table", alias = "targetTableName")]
    pub target_table: String,
}

impl RelationDescriptor {
    /// Creates a new `RelationDescriptor`.
    #[must_use]
    pub fn new(target_table: impl Into<String>) -> Self {
        Self {
            target_table: target_table.into(),
        }
    }
}

/// Description of a table as known to the tenant's schema registry.
///
/// The schema core only ever reads descriptors; it never mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// The table name (unique within a tenant).
    pub name: String,
    /// Columns in declaration order.
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    /// Relations keyed by relation name.
    #[serde(default)]
    pub relations: IndexMap<String, RelationDescriptor>,
}

impl TableDescriptor {
    /// Creates a new table descriptor without columns or relations.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            relations: IndexMap::new(),
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, storage_type: impl Into<String>) -> Self {
        self.columns.push(ColumnDescriptor::new(name, storage_type));
        self
    }

    /// Adds a relation to another table.
    #[must_use]
    pub fn with_relation(mut self, name: impl Into<String>, target_table: impl Into<String>) -> Self {
        self.relations
            .insert(name.into(), RelationDescriptor::new(target_table));
        self
    }

    /// Returns the column with the given name, if any.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Collects descriptors into a [`TableSet`] keyed by table name.
    #[must_use]
    pub fn into_set(tables: impl IntoIterator<Item = TableDescriptor>) -> TableSet {
        tables.into_iter().map(|t| (t.name.clone(), t)).collect()
    }
}

/// Pagination options for a query.
///
/// A `None` value means "not supplied": the executor applies its own default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Maximum number of records to return.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Number of matching records to skip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl QueryOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the limit.
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the offset.
    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Returns true if neither limit nor offset was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.offset.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_descriptor_builder() {
        let table = TableDescriptor::new("Invoice")
            .with_column("id", "Int")
            .with_column("total", "Float")
            .with_relation("user", "User");

        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.column("total").map(|c| c.storage_type.as_str()), Some("Float"));
        assert!(table.column("missing").is_none());
        assert_eq!(table.relations["user"].target_table, "User");
    }

    #[test]
    fn test_table_descriptor_deserialize() {
        let json = r#"{
            "name": "Invoice",
            "columns": [{"name": "id", "type": "Int"}, {"name": "userId", "storageType": "String"}],
            "relations": {"user": {"table": "User"}}
        }"#;

        let table: TableDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(table.columns[1].storage_type, "String");
        assert_eq!(table.relations["user"].target_table, "User");
    }

    #[test]
    fn test_into_set_preserves_order() {
        let set = TableDescriptor::into_set([
            TableDescriptor::new("User"),
            TableDescriptor::new("Invoice"),
        ]);
        let names: Vec<_> = set.keys().cloned().collect();
        assert_eq!(names, vec!["User", "Invoice"]);
    }

    #[test]
    fn test_query_options() {
        assert!(QueryOptions::new().is_empty());
        let opts = QueryOptions::new().with_limit(10).with_offset(5);
        assert_eq!(opts.limit, Some(10));
        assert_eq!(opts.offset, Some(5));
        assert_eq!(serde_json::to_value(QueryOptions::new()).unwrap(), serde_json::json!({}));
    }
}
