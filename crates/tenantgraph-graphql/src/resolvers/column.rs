//! Scalar column field resolver.

use async_graphql::Value;
use async_graphql::dynamic::{FieldFuture, ResolverContext};

use crate::schema::ScalarKind;

/// Resolver for a column of an entity type.
pub struct ColumnResolver;

impl ColumnResolver {
    /// Reads the raw column name off the parent record.
    ///
    /// A missing column resolves to null.
    pub fn resolve(
        column: String,
        kind: ScalarKind,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let column = column.clone();
            FieldFuture::new(async move {
                if let Some(Value::Object(record)) = ctx.parent_value.as_value()
                    && let Some(value) = record.get(column.as_str())
                    && !matches!(value, Value::Null)
                {
                    return Ok(Some(kind.coerce(value.clone())));
                }
                Ok(None::<Value>)
            })
        }
    }
}
