//! Field resolvers for generated schemas.
//!
//! - `read`: singular root fields (e.g., `invoice(where: ...)`)
//! - `search`: plural root fields (e.g., `invoices(where: ..., limit: 10)`)
//! - `relation`: relation list fields on entity types
//! - `column`: scalar column fields on entity types
//!
//! Root resolvers capture the tenant's query executor when the schema is
//! built; entity resolvers only read the parent record.

mod column;
mod read;
mod relation;
mod search;

pub use column::ColumnResolver;
pub use read::ReadResolver;
pub use relation::RelationResolver;
pub use search::SearchResolver;

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dynamic::ResolverContext;
use async_graphql::{Error, Value};
use tenantgraph_storage::{Filter, QueryOptions};

/// GraphQL field name → raw column name, for one table's `where` input.
pub type ColumnNames = Arc<HashMap<String, String>>;

/// Convert a serde_json::Value to async_graphql::Value.
pub(crate) fn json_to_graphql_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                Value::Number(
                    async_graphql::Number::from_f64(f).unwrap_or_else(|| async_graphql::Number::from(0)),
                )
            } else {
                Value::Null
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::List(arr.into_iter().map(json_to_graphql_value).collect())
        }
        serde_json::Value::Object(obj) => {
            let map: async_graphql::indexmap::IndexMap<async_graphql::Name, Value> = obj
                .into_iter()
                .map(|(k, v)| (async_graphql::Name::new(k), json_to_graphql_value(v)))
                .collect();
            Value::Object(map)
        }
    }
}

/// Converts the `where` argument into a storage filter keyed by raw column names.
///
/// An absent or null `where` yields an empty filter.
pub(crate) fn where_filter(ctx: &ResolverContext<'_>, columns: &ColumnNames) -> Result<Filter, Error> {
    let Some(arg) = ctx.args.get("where") else {
        return Ok(Filter::new());
    };

    let json = arg
        .as_value()
        .clone()
        .into_json()
        .map_err(|e| Error::new(format!("Invalid 'where' argument: {e}")))?;

    match json {
        serde_json::Value::Object(fields) => Ok(fields
            .into_iter()
            .map(|(field, ops)| {
                let column = columns.get(&field).cloned().unwrap_or(field);
                (column, ops)
            })
            .collect()),
        serde_json::Value::Null => Ok(Filter::new()),
        other => Err(Error::new(format!(
            "Invalid 'where' argument: expected an object, got {other}"
        ))),
    }
}

/// Reads an `Int` argument, keeping it only when strictly positive.
pub(crate) fn positive_arg(ctx: &ResolverContext<'_>, name: &str) -> Option<u64> {
    ctx.args
        .get(name)
        .and_then(|v| v.i64().ok())
        .and_then(|n| u64::try_from(n).ok())
        .filter(|n| *n > 0)
}

/// Builds query options from the `limit` and `offset` arguments.
pub(crate) fn query_options(ctx: &ResolverContext<'_>) -> QueryOptions {
    let mut options = QueryOptions::new();
    if let Some(limit) = positive_arg(ctx, "limit") {
        options = options.with_limit(limit);
    }
    if let Some(offset) = positive_arg(ctx, "offset") {
        options = options.with_offset(offset);
    }
    options
}
