//! Relation field resolver.
//!
//! Backends store related records either under the relation name
//! (`user`) or its plural (`users`). Both are read, singular first.

use async_graphql::Value;
use async_graphql::dynamic::{FieldFuture, ResolverContext};
use tracing::trace;

/// Resolver for the list field of a relation.
pub struct RelationResolver;

impl RelationResolver {
    /// Resolves `relation` off the parent record as a list.
    ///
    /// The first of `relation` / `{relation}s` that is present and non-null
    /// wins. A single object is wrapped into a one-element list; anything
    /// else yields an empty list.
    pub fn resolve(
        relation: String,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let relation = relation.clone();
            FieldFuture::new(async move {
                let related = match ctx.parent_value.as_value() {
                    Some(Value::Object(record)) => related_records(record, &relation),
                    _ => Vec::new(),
                };
                trace!(relation = %relation, count = related.len(), "Resolved relation");
                Ok(Some(Value::List(related)))
            })
        }
    }
}

fn related_records(
    record: &async_graphql::indexmap::IndexMap<async_graphql::Name, Value>,
    relation: &str,
) -> Vec<Value> {
    let plural = format!("{relation}s");
    let value = [relation, plural.as_str()]
        .into_iter()
        .filter_map(|key| record.get(key))
        .find(|v| !matches!(v, Value::Null));

    match value {
        Some(Value::List(items)) => items.clone(),
        Some(object @ Value::Object(_)) => vec![object.clone()],
        _ => Vec::new(),
    }
}
