//! Generated type and field names.
//!
//! Every name derived from tenant, table, column or relation identifiers goes
//! through [`sanitize_name`], so generated names only contain `[A-Za-z0-9_]`.
//! Sanitization is lossy (`a-b` and `a_b` both become `a_b`), so each schema
//! build claims its names in a [`NameRegistry`] and fails on a clash.

use std::collections::HashMap;

use crate::error::GraphQLError;

/// Name of the aggregated root type of the global schema.
pub const GLOBAL_ROOT: &str = "Global";

/// Replaces every character outside `[A-Za-z0-9_]` with `_`.
///
/// Empty input becomes `_`, and a leading digit gets a `_` prefix. Names
/// starting with `__` are reserved by GraphQL and get an `x` prefix.
pub fn sanitize_name(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if name.is_empty() {
        name.push('_');
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    } else if name.starts_with("__") {
        name.insert(0, 'x');
    }
    name
}

/// Tenant prefix, also the name of the tenant's query type: `Tenant_{id}`.
pub fn tenant_prefix(tenant_id: &str) -> String {
    format!("Tenant_{}", sanitize_name(tenant_id))
}

/// Schema root type of a single-tenant schema: `Query_{id}`.
pub fn query_root_name(tenant_id: &str) -> String {
    format!("Query_{}", sanitize_name(tenant_id))
}

/// Entity type of a table: `{prefix}_{table}`.
pub fn entity_type_name(prefix: &str, table: &str) -> String {
    format!("{prefix}_{}", sanitize_name(table))
}

/// `where` input type of a table: `{prefix}_{table}_WhereInput`.
pub fn where_input_name(prefix: &str, table: &str) -> String {
    format!("{prefix}_{}_WhereInput", sanitize_name(table))
}

/// Filter input type of a column: `{whereInput}_{column}_Filter`.
pub fn filter_type_name(where_input: &str, column: &str) -> String {
    format!("{where_input}_{}_Filter", sanitize_name(column))
}

/// Root field names of a table: `(singular, plural)`.
pub fn root_field_names(table: &str) -> (String, String) {
    let singular = sanitize_name(&table.to_lowercase());
    let plural = format!("{singular}s");
    (singular, plural)
}

/// Field name of a relation: `{relation}s`.
pub fn relation_field_name(relation: &str) -> String {
    format!("{}s", sanitize_name(relation))
}

/// Tracks generated names and the identifiers they were derived from.
///
/// Claiming a name twice for the same origin is a no-op; claiming it for a
/// different origin is a [`GraphQLError::SchemaBuildFailed`].
#[derive(Debug, Default)]
pub struct NameRegistry {
    scope: String,
    claimed: HashMap<String, String>,
}

impl NameRegistry {
    /// Creates an empty registry; `scope` appears in collision messages.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            claimed: HashMap::new(),
        }
    }

    /// Claims `name` on behalf of `origin`.
    pub fn claim(&mut self, name: &str, origin: impl Into<String>) -> Result<(), GraphQLError> {
        let origin = origin.into();
        match self.claimed.get(name) {
            Some(existing) if *existing == origin => Ok(()),
            Some(existing) => Err(GraphQLError::SchemaBuildFailed(format!(
                "name '{name}' in {} generated for both {existing} and {origin}",
                self.scope
            ))),
            None => {
                self.claimed.insert(name.to_string(), origin);
                Ok(())
            }
        }
    }

    /// Number of distinct names claimed.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}
