//! GraphQL configuration.
//!
//! Configuration is specified in `tenantgraph.toml` under the `[graphql]` section.
//!
//! # Example Configuration
//!
//! ```toml
//! [graphql]
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! playground = true
//! cache_capacity = 100
//! tenant_header = "x-tenant-id"
//! ```

use axum::http::HeaderName;
use serde::{Deserialize, Serialize};

use crate::schema::SchemaBuilderConfig;

/// GraphQL API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQLConfig {
    /// Maximum query depth allowed.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable GraphQL introspection queries.
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,

    /// Serve the GraphiQL page on `GET` requests without a query.
    /// Default: true
    #[serde(default = "default_playground")]
    pub playground: bool,

    /// Maximum number of assembled schemas kept in the cache.
    /// Least recently used schemas are evicted first.
    /// Default: 100
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,

    /// Request header carrying the tenant id.
    /// Default: "x-tenant-id"
    #[serde(default = "default_tenant_header")]
    pub tenant_header: String,
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

fn default_introspection() -> bool {
    true
}

fn default_playground() -> bool {
    true
}

fn default_cache_capacity() -> u64 {
    100
}

fn default_tenant_header() -> String {
    "x-tenant-id".to_string()
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_introspection(),
            playground: default_playground(),
            cache_capacity: default_cache_capacity(),
            tenant_header: default_tenant_header(),
        }
    }
}

impl GraphQLConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration values are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_depth == 0 {
            return Err("graphql.max_depth must be > 0".into());
        }
        if self.max_complexity == 0 {
            return Err("graphql.max_complexity must be > 0".into());
        }
        if self.cache_capacity == 0 {
            return Err("graphql.cache_capacity must be > 0".into());
        }
        if HeaderName::from_bytes(self.tenant_header.as_bytes()).is_err() {
            return Err(format!(
                "graphql.tenant_header '{}' is not a valid header name",
                self.tenant_header
            ));
        }
        Ok(())
    }

    /// Converts this config to a SchemaBuilderConfig.
    #[must_use]
    pub fn to_schema_builder_config(&self) -> SchemaBuilderConfig {
        SchemaBuilderConfig {
            max_depth: self.max_depth,
            max_complexity: self.max_complexity,
            introspection_enabled: self.introspection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GraphQLConfig::default();
        assert_eq!(config.max_depth, 15);
        assert_eq!(config.max_complexity, 500);
        assert!(config.introspection);
        assert!(config.playground);
        assert_eq!(config.cache_capacity, 100);
        assert_eq!(config.tenant_header, "x-tenant-id");
    }

    #[test]
    fn test_valid_config() {
        let config = GraphQLConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_max_depth() {
        let config = GraphQLConfig {
            max_depth: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_cache_capacity() {
        let config = GraphQLConfig {
            cache_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_tenant_header() {
        let config = GraphQLConfig {
            tenant_header: "x tenant".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let toml = r#"
            max_depth = 20
            max_complexity = 1000
            introspection = false
            cache_capacity = 5
        "#;

        let config: GraphQLConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.max_depth, 20);
        assert_eq!(config.max_complexity, 1000);
        assert!(!config.introspection);
        assert_eq!(config.cache_capacity, 5);
        assert_eq!(config.tenant_header, "x-tenant-id");

        let builder = config.to_schema_builder_config();
        assert_eq!(builder.max_depth, 20);
        assert!(!builder.introspection_enabled);
    }
}
