//! Plural root field resolver.
//!
//! Implements resolvers for queries like `invoices(where: ..., limit: 10, offset: 20)`.

use async_graphql::Value;
use async_graphql::dynamic::{FieldFuture, ResolverContext};
use tenantgraph_storage::DynExecutor;
use tracing::{debug, warn};

use super::{ColumnNames, json_to_graphql_value, query_options, where_filter};

/// Resolver for filtered, paginated list lookups.
pub struct SearchResolver;

impl SearchResolver {
    /// Creates a resolver returning every record the executor yields.
    ///
    /// `limit` and `offset` are forwarded only when strictly positive, so the
    /// executor applies its own defaults otherwise.
    pub fn resolve(
        table: String,
        executor: DynExecutor,
        columns: ColumnNames,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let table = table.clone();
            let executor = executor.clone();
            let columns = columns.clone();
            FieldFuture::new(async move {
                let filter = where_filter(&ctx, &columns)?;
                let options = query_options(&ctx);

                debug!(
                    table = %table,
                    filter = ?filter,
                    options = ?options,
                    "Resolving list lookup"
                );

                let records = executor.query(&table, &filter, &options).await.map_err(|e| {
                    warn!(table = %table, error = %e, "Storage error during list lookup");
                    async_graphql::Error::new(format!("Query failed: {e}"))
                })?;

                let entries: Vec<Value> = records.into_iter().map(json_to_graphql_value).collect();

                debug!(table = %table, count = entries.len(), "List lookup completed");

                Ok(Some(Value::List(entries)))
            })
        }
    }
}
