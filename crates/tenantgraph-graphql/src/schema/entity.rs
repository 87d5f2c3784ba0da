//! Entity output types.
//!
//! One object type per table. Relation fields reference their target by type
//! name only; the engine resolves names when the schema is finished, so self
//! and mutual references need no ordering.

use async_graphql::dynamic::{Field, Object, TypeRef};
use tenantgraph_storage::{TableDescriptor, TableSet};
use tracing::{debug, trace};

use super::naming::{entity_type_name, relation_field_name, sanitize_name};
use super::scalars::ScalarKind;
use crate::resolvers::{ColumnResolver, RelationResolver};

/// Finds the target table of a relation within a tenant.
///
/// Exact name match first, then a case-insensitive match.
pub fn resolve_relation_target<'a>(
    tables: &'a TableSet,
    target_table: &str,
) -> Option<&'a TableDescriptor> {
    tables.get(target_table).or_else(|| {
        tables
            .values()
            .find(|t| t.name.eq_ignore_ascii_case(target_table))
    })
}

/// Builds the output type of a single table.
pub struct EntityTypeBuilder;

impl EntityTypeBuilder {
    /// Builds the entity type for `table_name`, or `None` if the table is not
    /// part of `tables`.
    ///
    /// Every column becomes a nullable scalar field. Every relation whose
    /// target exists in `tables` becomes a `[Target]` field named
    /// `{relation}s`; relations to absent tables are dropped.
    pub fn build(tables: &TableSet, table_name: &str, name_prefix: &str) -> Option<Object> {
        let table = tables.get(table_name)?;
        let type_name = entity_type_name(name_prefix, &table.name);

        let mut object = Object::new(&type_name).description(format!("Record of table '{}'", table.name));

        for column in &table.columns {
            let kind = ScalarKind::from_column(&column.name, &column.storage_type);
            trace!(table = %table.name, column = %column.name, kind = ?kind, "Adding column field");
            object = object.field(Field::new(
                sanitize_name(&column.name),
                TypeRef::named(kind.type_name()),
                ColumnResolver::resolve(column.name.clone(), kind),
            ));
        }

        for (relation, descriptor) in &table.relations {
            let Some(target) = resolve_relation_target(tables, &descriptor.target_table) else {
                debug!(
                    table = %table.name,
                    relation = %relation,
                    target = %descriptor.target_table,
                    "Dropping relation to unknown table"
                );
                continue;
            };

            object = object.field(Field::new(
                relation_field_name(relation),
                TypeRef::named_list(entity_type_name(name_prefix, &target.name)),
                RelationResolver::resolve(relation.clone()),
            ));
        }

        Some(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> TableSet {
        TableDescriptor::into_set([
            TableDescriptor::new("User")
                .with_column("id", "Int")
                .with_column("name", "String"),
            TableDescriptor::new("Invoice")
                .with_column("id", "Int")
                .with_column("total", "Float")
                .with_relation("user", "user")
                .with_relation("ghost", "Ghost"),
        ])
    }

    #[test]
    fn test_resolve_relation_target() {
        let tables = tables();
        assert_eq!(resolve_relation_target(&tables, "User").map(|t| t.name.as_str()), Some("User"));
        assert_eq!(resolve_relation_target(&tables, "user").map(|t| t.name.as_str()), Some("User"));
        assert!(resolve_relation_target(&tables, "Ghost").is_none());
    }

    #[test]
    fn test_build_names_type() {
        let object = EntityTypeBuilder::build(&tables(), "Invoice", "Tenant_acme").unwrap();
        assert_eq!(object.type_name(), "Tenant_acme_Invoice");
    }

    #[test]
    fn test_build_unknown_table() {
        assert!(EntityTypeBuilder::build(&tables(), "Nope", "Tenant_acme").is_none());
    }
}
