//! Per-tenant query type with one singular and one plural field per table.
//!
//! ```graphql
//! type Tenant_acme {
//!   invoice(where: Tenant_acme_Invoice_WhereInput): Tenant_acme_Invoice
//!   invoices(where: Tenant_acme_Invoice_WhereInput, limit: Int, offset: Int): [Tenant_acme_Invoice]
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dynamic::{Field, InputObject, InputValue, Object, TypeRef};
use tenantgraph_storage::{DynExecutor, TableDescriptor, TableSet};
use tracing::trace;

use super::filter::FilterTypeBuilder;
use super::naming::{entity_type_name, root_field_names, sanitize_name, where_input_name};
use crate::resolvers::{ColumnNames, ReadResolver, SearchResolver};

/// The query type of one tenant and the input types its fields take.
pub struct QueryRoot {
    /// Object named after the tenant prefix.
    pub object: Object,
    /// `where` inputs and per-column filter inputs.
    pub inputs: Vec<InputObject>,
}

/// Builds the query type of a tenant.
pub struct QueryRootBuilder;

impl QueryRootBuilder {
    /// Builds the query type named `name_prefix` for every table in `tables`.
    ///
    /// Root fields delegate filtering and pagination to `executor`.
    pub fn build(tables: &TableSet, name_prefix: &str, executor: &DynExecutor) -> QueryRoot {
        let mut object = Object::new(name_prefix);
        let mut inputs = Vec::new();

        for table in tables.values() {
            let (where_input, filters) = Self::where_input(table, name_prefix);
            let where_name = where_input.type_name().to_string();
            inputs.push(where_input);
            inputs.extend(filters);

            let entity = entity_type_name(name_prefix, &table.name);
            let columns = column_names(table);
            let (singular, plural) = root_field_names(&table.name);

            trace!(table = %table.name, singular = %singular, plural = %plural, "Adding root fields");

            object = object
                .field(
                    Field::new(
                        singular,
                        TypeRef::named(&entity),
                        ReadResolver::resolve(table.name.clone(), executor.clone(), columns.clone()),
                    )
                    .argument(InputValue::new("where", TypeRef::named(&where_name)))
                    .description(format!("First '{}' record matching the filter", table.name)),
                )
                .field(
                    Field::new(
                        plural,
                        TypeRef::named_list(&entity),
                        SearchResolver::resolve(table.name.clone(), executor.clone(), columns),
                    )
                    .argument(InputValue::new("where", TypeRef::named(&where_name)))
                    .argument(InputValue::new("limit", TypeRef::named(TypeRef::INT)))
                    .argument(InputValue::new("offset", TypeRef::named(TypeRef::INT)))
                    .description(format!("'{}' records matching the filter", table.name)),
                );
        }

        QueryRoot { object, inputs }
    }

    /// Builds the `where` input of a table and the filter inputs it references.
    fn where_input(table: &TableDescriptor, name_prefix: &str) -> (InputObject, Vec<InputObject>) {
        let where_name = where_input_name(name_prefix, &table.name);
        let mut where_input = InputObject::new(&where_name)
            .description(format!("Filter for table '{}'", table.name));
        let mut filters = Vec::with_capacity(table.columns.len());

        for column in &table.columns {
            let filter = FilterTypeBuilder::build(&column.name, &column.storage_type, &where_name);
            where_input = where_input.field(InputValue::new(
                sanitize_name(&column.name),
                TypeRef::named(filter.type_name()),
            ));
            filters.push(filter);
        }

        (where_input, filters)
    }
}

fn column_names(table: &TableDescriptor) -> ColumnNames {
    let names: HashMap<String, String> = table
        .columns
        .iter()
        .map(|c| (sanitize_name(&c.name), c.name.clone()))
        .collect();
    Arc::new(names)
}
