//! Storage column → GraphQL scalar mapping.

use async_graphql::Value;
use async_graphql::dynamic::TypeRef;

/// The scalar kinds exposed by generated schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Integer,
    Float,
    Identifier,
    Text,
}

impl ScalarKind {
    /// Maps a column to its scalar kind.
    ///
    /// Rules, in order, on the lowercased storage type tag:
    /// 1. contains `int` → [`ScalarKind::Integer`]
    /// 2. contains `float`, `double` or `decimal` → [`ScalarKind::Float`]
    /// 3. column named `id` (any case) or tag contains `id` → [`ScalarKind::Identifier`]
    /// 4. otherwise → [`ScalarKind::Text`]
    ///
    /// An `id` column with an integer storage type is therefore `Integer`.
    pub fn from_column(column_name: &str, storage_type: &str) -> Self {
        let tag = storage_type.to_ascii_lowercase();

        if tag.contains("int") {
            Self::Integer
        } else if ["float", "double", "decimal"].iter().any(|t| tag.contains(t)) {
            Self::Float
        } else if column_name.eq_ignore_ascii_case("id") || tag.contains("id") {
            Self::Identifier
        } else {
            Self::Text
        }
    }

    /// Returns the built-in GraphQL type name for this kind.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Integer => TypeRef::INT,
            Self::Float => TypeRef::FLOAT,
            Self::Identifier => TypeRef::ID,
            Self::Text => TypeRef::STRING,
        }
    }

    /// Numeric kinds get range operators in filters; the others get text operators.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Coerces a stored value to the GraphQL representation of this kind.
    ///
    /// IDs and text are serialized as strings. Numbers and nulls pass through.
    pub fn coerce(self, value: Value) -> Value {
        match (self, value) {
            (Self::Identifier | Self::Text, Value::Number(n)) => Value::String(n.to_string()),
            (Self::Text, Value::Boolean(b)) => Value::String(b.to_string()),
            (_, other) => other,
        }
    }
}
