//! Singular root field resolver.
//!
//! Implements resolvers for queries like `invoice(where: {total: {gt: 5}})`
//! that return the first matching record.

use async_graphql::dynamic::{FieldFuture, ResolverContext};
use tenantgraph_storage::{DynExecutor, QueryOptions};
use tracing::{debug, warn};

use super::{ColumnNames, json_to_graphql_value, where_filter};

/// Resolver for singular lookups.
pub struct ReadResolver;

impl ReadResolver {
    /// Creates a resolver returning the first record matching `where`, or null.
    ///
    /// No `limit` is forwarded; the executor returns its own default page and
    /// only the first record is used.
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

                debug!(table = %table, filter = ?filter, "Resolving singular lookup");

                let records = executor
                    .query(&table, &filter, &QueryOptions::new())
                    .await
                    .map_err(|e| {
                        warn!(table = %table, error = %e, "Storage error during lookup");
                        async_graphql::Error::new(format!("Query failed: {e}"))
                    })?;

                match records.into_iter().next() {
                    Some(record) => Ok(Some(json_to_graphql_value(record))),
                    None => {
                        debug!(table = %table, "No matching record");
                        Ok(None)
                    }
                }
            })
        }
    }
}
