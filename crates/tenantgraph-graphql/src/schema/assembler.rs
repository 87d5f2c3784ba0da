//! Schema assembly for one tenant or for all tenants.
//!
//! A tenant schema looks like:
//!
//! ```graphql
//! type Query_acme { acme: Tenant_acme }
//! type Tenant_acme { invoice(...): Tenant_acme_Invoice  invoices(...): [Tenant_acme_Invoice] ... }
//! ```
//!
//! The global schema has a `Global` root with one such field per tenant.

use std::fmt;
use std::time::Instant;

use async_graphql::dynamic::{Field, FieldFuture, Object, Schema, SchemaBuilder, TypeRef};
use async_graphql::{Request, Response, Value};
use tenantgraph_storage::{DynExecutor, DynRegistry, TableSet};
use tracing::{debug, info, warn};

use super::entity::{EntityTypeBuilder, resolve_relation_target};
use super::naming::{
    GLOBAL_ROOT, NameRegistry, entity_type_name, filter_type_name, query_root_name,
    relation_field_name, root_field_names, sanitize_name, tenant_prefix, where_input_name,
};
use super::query_root::QueryRootBuilder;
use crate::error::GraphQLError;

/// Configuration for the schema builder.
#[derive(Debug, Clone)]
pub struct SchemaBuilderConfig {
    /// Maximum query depth allowed.
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    pub max_complexity: usize,

    /// Whether introspection is enabled.
    pub introspection_enabled: bool,
}

impl Default for SchemaBuilderConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            max_complexity: 500,
            introspection_enabled: true,
        }
    }
}

/// An assembled, immutable schema for one cache key.
#[derive(Clone)]
pub struct SchemaUnit {
    key: String,
    schema: Schema,
    tenants: Vec<String>,
}

impl SchemaUnit {
    /// The cache key this unit was built for.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The generated schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Tenants exposed by this unit, in root field order.
    pub fn tenants(&self) -> &[String] {
        &self.tenants
    }

    /// Executes a request against the schema.
    pub async fn execute(&self, request: impl Into<Request>) -> Response {
        self.schema.execute(request).await
    }

    /// Renders the schema in SDL.
    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }
}

impl fmt::Debug for SchemaUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaUnit")
            .field("key", &self.key)
            .field("tenants", &self.tenants)
            .finish_non_exhaustive()
    }
}

/// Everything needed to generate the types of one tenant.
pub struct TenantSource {
    pub tenant_id: String,
    pub tables: TableSet,
    pub executor: DynExecutor,
}

/// Builds the schema of a single tenant, keyed by its raw id.
///
/// # Errors
///
/// Returns `SchemaBuildFailed` for a tenant without tables, a table without
/// columns, a generated name claimed twice, or an engine rejection.
pub fn assemble_tenant_schema(
    source: TenantSource,
    config: &SchemaBuilderConfig,
) -> Result<SchemaUnit, GraphQLError> {
    let tenant_id = source.tenant_id.clone();
    if source.tables.is_empty() {
        return Err(GraphQLError::SchemaBuildFailed(format!(
            "tenant '{tenant_id}' has no tables"
        )));
    }

    let root_name = query_root_name(&tenant_id);
    let mut names = NameRegistry::new(format!("schema '{tenant_id}'"));
    names.claim(&root_name, "query root")?;
    check_tenant_names(&source, &mut names)?;

    let builder = Schema::build(&root_name, None, None);
    let (builder, root_field) = register_tenant(builder, source);
    let root = Object::new(&root_name).field(root_field);

    let schema = finish(builder.register(root), config)?;
    Ok(SchemaUnit {
        key: tenant_id.clone(),
        schema,
        tenants: vec![tenant_id],
    })
}

/// Builds one schema exposing every given tenant under the `Global` root.
///
/// # Errors
///
/// Returns `SchemaBuildFailed` when `sources` is empty or when any tenant
/// fails the checks of [`assemble_tenant_schema`], including two tenant ids
/// that sanitize to the same name.
pub fn assemble_global_schema(
    key: &str,
    sources: Vec<TenantSource>,
    config: &SchemaBuilderConfig,
) -> Result<SchemaUnit, GraphQLError> {
    if sources.is_empty() {
        return Err(GraphQLError::SchemaBuildFailed(
            "no tenants with tables to expose".into(),
        ));
    }

    let mut names = NameRegistry::new("global schema");
    let mut root_fields = NameRegistry::new(format!("type '{GLOBAL_ROOT}'"));
    names.claim(GLOBAL_ROOT, "global root")?;
    for source in &sources {
        if source.tables.is_empty() {
            return Err(GraphQLError::SchemaBuildFailed(format!(
                "tenant '{}' has no tables",
                source.tenant_id
            )));
        }
        root_fields.claim(
            &sanitize_name(&source.tenant_id),
            format!("tenant '{}'", source.tenant_id),
        )?;
        check_tenant_names(source, &mut names)?;
    }

    let tenants: Vec<String> = sources.iter().map(|s| s.tenant_id.clone()).collect();
    let mut builder = Schema::build(GLOBAL_ROOT, None, None);
    let mut root = Object::new(GLOBAL_ROOT);
    for source in sources {
        let (next, field) = register_tenant(builder, source);
        builder = next;
        root = root.field(field);
    }

    let schema = finish(builder.register(root), config)?;
    Ok(SchemaUnit {
        key: key.to_string(),
        schema,
        tenants,
    })
}

/// Claims every name a tenant's types will use.
fn check_tenant_names(source: &TenantSource, names: &mut NameRegistry) -> Result<(), GraphQLError> {
    let tenant = &source.tenant_id;
    let prefix = tenant_prefix(tenant);
    names.claim(&prefix, format!("tenant '{tenant}'"))?;

    let mut root_fields = NameRegistry::new(format!("type '{prefix}'"));
    for table in source.tables.values() {
        let origin = format!("table '{}' of tenant '{tenant}'", table.name);
        if table.columns.is_empty() {
            return Err(GraphQLError::SchemaBuildFailed(format!("{origin} has no columns")));
        }

        let (singular, plural) = root_field_names(&table.name);
        root_fields.claim(&singular, origin.clone())?;
        root_fields.claim(&plural, origin.clone())?;

        let entity = entity_type_name(&prefix, &table.name);
        let where_input = where_input_name(&prefix, &table.name);
        names.claim(&entity, format!("entity of {origin}"))?;
        names.claim(&where_input, format!("filter of {origin}"))?;

        let mut fields = NameRegistry::new(format!("type '{entity}'"));
        for column in &table.columns {
            let column_origin = format!("column '{}'", column.name);
            fields.claim(&sanitize_name(&column.name), column_origin.clone())?;
            names.claim(
                &filter_type_name(&where_input, &column.name),
                format!("{column_origin} filter of {origin}"),
            )?;
        }
        for (relation, descriptor) in &table.relations {
            if resolve_relation_target(&source.tables, &descriptor.target_table).is_some() {
                fields.claim(&relation_field_name(relation), format!("relation '{relation}'"))?;
            }
        }
    }
    Ok(())
}

/// Registers a tenant's types and returns its root field.
fn register_tenant(mut builder: SchemaBuilder, source: TenantSource) -> (SchemaBuilder, Field) {
    let prefix = tenant_prefix(&source.tenant_id);

    for table_name in source.tables.keys() {
        if let Some(entity) = EntityTypeBuilder::build(&source.tables, table_name, &prefix) {
            builder = builder.register(entity);
        }
    }

    let query = QueryRootBuilder::build(&source.tables, &prefix, &source.executor);
    for input in query.inputs {
        builder = builder.register(input);
    }
    builder = builder.register(query.object);

    let field = Field::new(sanitize_name(&source.tenant_id), TypeRef::named(&prefix), |_| {
        FieldFuture::new(async move { Ok(Some(Value::Object(Default::default()))) })
    })
    .description(format!("Tables of tenant '{}'", source.tenant_id));

    (builder, field)
}

fn finish(builder: SchemaBuilder, config: &SchemaBuilderConfig) -> Result<Schema, GraphQLError> {
    let mut builder = builder
        .limit_depth(config.max_depth)
        .limit_complexity(config.max_complexity);
    if !config.introspection_enabled {
        builder = builder.disable_introspection();
    }
    builder
        .finish()
        .map_err(|e| GraphQLError::SchemaBuildFailed(e.to_string()))
}

/// Assembles schema units from a tenant registry.
pub struct TenantSchemaAssembler {
    registry: DynRegistry,
    config: SchemaBuilderConfig,
}

impl TenantSchemaAssembler {
    #[must_use]
    pub fn new(registry: DynRegistry, config: SchemaBuilderConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &DynRegistry {
        &self.registry
    }

    /// Returns the tenant used when a request carries no tenant id.
    pub async fn fallback_tenant(&self) -> Result<Option<String>, GraphQLError> {
        Ok(self.registry.tenant_ids().await?.into_iter().next())
    }

    /// Builds the schema of one tenant.
    ///
    /// # Errors
    ///
    /// Returns `TenantNotFound` for an unknown tenant, `SchemaBuildFailed`
    /// for unusable descriptors.
    pub async fn assemble(&self, tenant_id: &str) -> Result<SchemaUnit, GraphQLError> {
        let start = Instant::now();
        info!(tenant = %tenant_id, "Building tenant GraphQL schema");

        let result = match self.source(tenant_id).await {
            Ok(source) => {
                let tables = source.tables.len();
                assemble_tenant_schema(source, &self.config).inspect(|_| {
                    info!(
                        tenant = %tenant_id,
                        tables,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Tenant GraphQL schema built"
                    );
                })
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            warn!(tenant = %tenant_id, error = %e, "Failed to build tenant GraphQL schema");
        }
        result
    }

    /// Builds the global schema over every tenant with tables.
    ///
    /// Tenants without tables, and tenants removed between listing and
    /// lookup, are skipped.
    pub async fn assemble_global(&self, key: &str) -> Result<SchemaUnit, GraphQLError> {
        let start = Instant::now();
        let tenant_ids = self.registry.tenant_ids().await?;
        info!(tenants = tenant_ids.len(), "Building global GraphQL schema");

        let mut sources = Vec::with_capacity(tenant_ids.len());
        for tenant_id in &tenant_ids {
            match self.source(tenant_id).await {
                Ok(source) if source.tables.is_empty() => {
                    warn!(tenant = %tenant_id, "Skipping tenant without tables");
                }
                Ok(source) => sources.push(source),
                Err(GraphQLError::TenantNotFound { .. }) => {
                    warn!(tenant = %tenant_id, "Skipping tenant removed during build");
                }
                Err(e) => return Err(e),
            }
        }

        let result = assemble_global_schema(key, sources, &self.config);
        match &result {
            Ok(unit) => info!(
                tenants = unit.tenants().len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Global GraphQL schema built"
            ),
            Err(e) => warn!(error = %e, "Failed to build global GraphQL schema"),
        }
        result
    }

    async fn source(&self, tenant_id: &str) -> Result<TenantSource, GraphQLError> {
        let tables = self.registry.tables(tenant_id).await?;
        let executor = self.registry.executor(tenant_id).await?;
        debug!(tenant = %tenant_id, tables = tables.len(), "Loaded tenant tables");
        Ok(TenantSource {
            tenant_id: tenant_id.to_string(),
            tables,
            executor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tenantgraph_db_memory::InMemoryStore;
    use tenantgraph_storage::{TableDescriptor, TenantRegistry};

    fn tables() -> TableSet {
        TableDescriptor::into_set([
            TableDescriptor::new("User")
                .with_column("id", "Int")
                .with_column("name", "String"),
            TableDescriptor::new("Invoice")
                .with_column("id", "Int")
                .with_column("total", "Float")
                .with_column("userId", "Int")
                .with_relation("user", "User"),
        ])
    }

    async fn source(tenant_id: &str, tables: TableSet) -> TenantSource {
        let store = InMemoryStore::new();
        store.register_tenant(tenant_id, tables.clone()).await;
        TenantSource {
            tenant_id: tenant_id.to_string(),
            tables,
            executor: store.executor(tenant_id).await.unwrap(),
        }
    }

    #[tokio::test]
    async fn test_tenant_schema_sdl() {
        let unit = assemble_tenant_schema(source("acme-co", tables()).await, &SchemaBuilderConfig::default())
            .unwrap();
        let sdl = unit.sdl();

        assert_eq!(unit.key(), "acme-co");
        assert!(sdl.contains("type Query_acme_co"));
        assert!(sdl.contains("acme_co: Tenant_acme_co"));
        assert!(sdl.contains("type Tenant_acme_co_Invoice"));
        assert!(sdl.contains("users: [Tenant_acme_co_User]"));
        assert!(sdl.contains("input Tenant_acme_co_Invoice_WhereInput_total_Filter"));
    }

    #[tokio::test]
    async fn test_tenant_without_tables_fails() {
        let result = assemble_tenant_schema(source("empty", TableSet::new()).await, &SchemaBuilderConfig::default());
        assert!(matches!(result, Err(GraphQLError::SchemaBuildFailed(_))));
    }

    #[tokio::test]
    async fn test_table_without_columns_fails() {
        let tables = TableDescriptor::into_set([TableDescriptor::new("Empty")]);
        let result = assemble_tenant_schema(source("acme", tables).await, &SchemaBuilderConfig::default());
        assert!(matches!(result, Err(GraphQLError::SchemaBuildFailed(_))));
    }

    #[tokio::test]
    async fn test_sanitized_column_collision_fails() {
        let tables = TableDescriptor::into_set([TableDescriptor::new("User")
            .with_column("first-name", "String")
            .with_column("first_name", "String")]);
        let result = assemble_tenant_schema(source("acme", tables).await, &SchemaBuilderConfig::default());
        assert!(matches!(result, Err(GraphQLError::SchemaBuildFailed(_))));
    }

    #[tokio::test]
    async fn test_root_field_collision_fails() {
        let tables = TableDescriptor::into_set([
            TableDescriptor::new("User").with_column("id", "Int"),
            TableDescriptor::new("Users").with_column("id", "Int"),
        ]);
        let result = assemble_tenant_schema(source("acme", tables).await, &SchemaBuilderConfig::default());
        assert!(matches!(result, Err(GraphQLError::SchemaBuildFailed(_))));
    }

    #[tokio::test]
    async fn test_double_underscore_names_are_rewritten() {
        let store = Arc::new(InMemoryStore::new());
        let tables = TableDescriptor::into_set([TableDescriptor::new("User")
            .with_column("id", "Int")
            .with_column("__v", "Int")
            .with_column("name", "String")]);
        store.register_tenant("__x", tables).await;
        store
            .insert("__x", "User", serde_json::json!({"__v": 3, "name": "Lool"}))
            .await
            .unwrap();
        store
            .insert("__x", "User", serde_json::json!({"__v": 4, "name": "Wile"}))
            .await
            .unwrap();

        let assembler = TenantSchemaAssembler::new(store, SchemaBuilderConfig::default());
        let unit = assembler.assemble("__x").await.unwrap();
        let response = unit
            .execute("{ x__x { user(where: { x__v: { eq: 4 } }) { x__v name } } }")
            .await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(
            response.data.into_json().unwrap(),
            serde_json::json!({"x__x": {"user": {"x__v": 4, "name": "Wile"}}})
        );
    }

    #[tokio::test]
    async fn test_global_tenant_collision_fails() {
        let sources = vec![source("a-b", tables()).await, source("a_b", tables()).await];
        let result = assemble_global_schema("global", sources, &SchemaBuilderConfig::default());
        assert!(matches!(result, Err(GraphQLError::SchemaBuildFailed(_))));
    }

    #[tokio::test]
    async fn test_global_without_tenants_fails() {
        let result = assemble_global_schema("global", Vec::new(), &SchemaBuilderConfig::default());
        assert!(matches!(result, Err(GraphQLError::SchemaBuildFailed(_))));
    }

    #[tokio::test]
    async fn test_assembler_unknown_tenant() {
        let store = Arc::new(InMemoryStore::new());
        let assembler = TenantSchemaAssembler::new(store, SchemaBuilderConfig::default());
        let err = assembler.assemble("ghost").await.unwrap_err();
        assert_eq!(err, GraphQLError::tenant_not_found("ghost"));
    }

    #[tokio::test]
    async fn test_assembler_global_skips_empty_tenants() {
        let store = Arc::new(InMemoryStore::new());
        store.register_tenant("a", tables()).await;
        store.register_tenant("empty", TableSet::new()).await;
        store.register_tenant("b", tables()).await;

        let assembler = TenantSchemaAssembler::new(store, SchemaBuilderConfig::default());
        let unit = assembler.assemble_global("global").await.unwrap();
        assert_eq!(unit.tenants(), ["a".to_string(), "b".to_string()]);
        assert_eq!(assembler.fallback_tenant().await.unwrap().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_introspection_can_be_disabled() {
        let config = SchemaBuilderConfig {
            introspection_enabled: false,
            ..Default::default()
        };
        let unit = assemble_tenant_schema(source("acme", tables()).await, &config).unwrap();
        let response = unit.execute("{ __schema { queryType { name } } }").await;
        assert!(!response.errors.is_empty());
    }
}
