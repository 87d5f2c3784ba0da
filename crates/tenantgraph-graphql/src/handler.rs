//! Axum HTTP handlers for GraphQL endpoints.
//!
//! - `POST /graphql` - Schema of the request's tenant
//! - `GET /graphql` - Same, query via URL params; GraphiQL when no query is given
//! - `POST /global` / `GET /global` - Schema spanning every tenant
//!
//! The tenant comes from the configured [`TenantResolver`], falling back to the
//! first registered tenant. With no tenant at all the response is
//! `404 {"error": "Tenant not found"}`.

use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql::{Request, Variables};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tenantgraph_storage::DynRegistry;
use tracing::{debug, warn};

use crate::config::GraphQLConfig;
use crate::error::GraphQLError;
use crate::schema::{SchemaCache, SchemaUnit, TenantSchemaAssembler};
use crate::tenant::{HeaderTenantResolver, TenantResolver};

/// Path of the per-tenant endpoint.
pub const TENANT_PATH: &str = "/graphql";

/// Path of the global endpoint.
pub const GLOBAL_PATH: &str = "/global";

/// State shared across GraphQL handlers.
#[derive(Clone)]
pub struct GraphQLState {
    /// Assembled schemas, keyed by tenant id and `global`.
    pub cache: SchemaCache,

    /// Builds schemas on cache misses.
    pub assembler: Arc<TenantSchemaAssembler>,

    /// Extracts the tenant id from request headers.
    pub tenant_resolver: Arc<dyn TenantResolver>,

    /// Serve GraphiQL on `GET` without a query.
    pub playground: bool,
}

impl GraphQLState {
    /// Creates handler state from a registry and the `[graphql]` config.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the configured tenant header is invalid.
    pub fn new(registry: DynRegistry, config: &GraphQLConfig) -> Result<Self, GraphQLError> {
        let tenant_resolver =
            HeaderTenantResolver::from_name(&config.tenant_header).map_err(GraphQLError::InvalidRequest)?;

        Ok(Self {
            cache: SchemaCache::new(config.cache_capacity),
            assembler: Arc::new(TenantSchemaAssembler::new(
                registry,
                config.to_schema_builder_config(),
            )),
            tenant_resolver: Arc::new(tenant_resolver),
            playground: config.playground,
        })
    }

    /// Replaces the tenant resolver.
    #[must_use]
    pub fn with_tenant_resolver(mut self, resolver: impl TenantResolver + 'static) -> Self {
        self.tenant_resolver = Arc::new(resolver);
        self
    }

    /// Resolves the request's tenant, falling back to the first registered one.
    async fn resolve_tenant(&self, headers: &HeaderMap) -> Result<String, GraphQLError> {
        if let Some(tenant_id) = self.tenant_resolver.resolve(headers) {
            return Ok(tenant_id);
        }
        match self.assembler.fallback_tenant().await? {
            Some(tenant_id) => {
                debug!(tenant = %tenant_id, "No tenant in request, using fallback tenant");
                Ok(tenant_id)
            }
            None => Err(GraphQLError::TenantNotFound { tenant_id: None }),
        }
    }

    async fn tenant_schema(&self, headers: &HeaderMap) -> Result<Arc<SchemaUnit>, GraphQLError> {
        let tenant_id = self.resolve_tenant(headers).await?;
        self.cache.tenant_schema(&self.assembler, &tenant_id).await
    }

    async fn global_schema(&self) -> Result<Arc<SchemaUnit>, GraphQLError> {
        self.cache.global_schema(&self.assembler).await
    }
}

/// GraphQL request body.
#[derive(Debug, Deserialize)]
pub struct GraphQLRequest {
    /// The GraphQL query string.
    pub query: String,

    /// Optional operation name for multi-operation documents.
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    /// Optional variables for the query.
    pub variables: Option<serde_json::Value>,
}

/// Query parameters for GET requests.
#[derive(Debug, Default, Deserialize)]
pub struct GraphQLQueryParams {
    /// The GraphQL query string.
    pub query: Option<String>,

    /// Optional operation name.
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,

    /// Optional variables (JSON string).
    pub variables: Option<String>,
}

/// Builds the router serving both endpoints.
pub fn router(state: GraphQLState) -> Router {
    Router::new()
        .route(TENANT_PATH, get(graphql_handler_get).post(graphql_handler))
        .route(GLOBAL_PATH, get(global_handler_get).post(global_handler))
        .with_state(state)
}

/// Handles POST requests to /graphql.
pub async fn graphql_handler(
    State(state): State<GraphQLState>,
    headers: HeaderMap,
    Json(request): Json<GraphQLRequest>,
) -> Response {
    debug!("Processing tenant GraphQL request");
    match state.tenant_schema(&headers).await {
        Ok(unit) => execute_graphql(&unit, request).await,
        Err(e) => error_response(e),
    }
}

/// Handles GET requests to /graphql.
pub async fn graphql_handler_get(
    State(state): State<GraphQLState>,
    headers: HeaderMap,
    Query(params): Query<GraphQLQueryParams>,
) -> Response {
    if params.query.is_none() && state.playground {
        return graphiql(TENANT_PATH);
    }
    let request = match params_to_request(params) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };

    debug!("Processing tenant GraphQL GET request");
    match state.tenant_schema(&headers).await {
        Ok(unit) => execute_graphql(&unit, request).await,
        Err(e) => error_response(e),
    }
}

/// Handles POST requests to /global.
pub async fn global_handler(
    State(state): State<GraphQLState>,
    Json(request): Json<GraphQLRequest>,
) -> Response {
    debug!("Processing global GraphQL request");
    match state.global_schema().await {
        Ok(unit) => execute_graphql(&unit, request).await,
        Err(e) => error_response(e),
    }
}

/// Handles GET requests to /global.
pub async fn global_handler_get(
    State(state): State<GraphQLState>,
    Query(params): Query<GraphQLQueryParams>,
) -> Response {
    if params.query.is_none() && state.playground {
        return graphiql(GLOBAL_PATH);
    }
    let request = match params_to_request(params) {
        Ok(request) => request,
        Err(e) => return error_response(e),
    };

    debug!("Processing global GraphQL GET request");
    match state.global_schema().await {
        Ok(unit) => execute_graphql(&unit, request).await,
        Err(e) => error_response(e),
    }
}

/// Executes a GraphQL request against a schema unit.
///
/// Execution errors are reported in the body with status 200.
async fn execute_graphql(unit: &SchemaUnit, request: GraphQLRequest) -> Response {
    let mut gql_request = Request::new(&request.query);

    if let Some(op_name) = request.operation_name {
        gql_request = gql_request.operation_name(op_name);
    }

    if let Some(vars) = request.variables {
        gql_request = gql_request.variables(Variables::from_json(vars));
    }

    debug!(schema = %unit.key(), query = %request.query, "Executing GraphQL query");
    let response = unit.execute(gql_request).await;

    (StatusCode::OK, Json(response)).into_response()
}

/// Converts GET query params to a GraphQL request.
fn params_to_request(params: GraphQLQueryParams) -> Result<GraphQLRequest, GraphQLError> {
    let query = params
        .query
        .ok_or_else(|| GraphQLError::InvalidRequest("missing 'query' parameter".into()))?;

    let variables = match params.variables {
        Some(vars) => Some(
            serde_json::from_str(&vars)
                .map_err(|e| GraphQLError::InvalidRequest(format!("invalid variables: {e}")))?,
        ),
        None => None,
    };

    Ok(GraphQLRequest {
        query,
        operation_name: params.operation_name,
        variables,
    })
}

fn graphiql(endpoint: &str) -> Response {
    Html(GraphiQLSource::build().endpoint(endpoint).finish()).into_response()
}

/// Returns an error response.
fn error_response(error: GraphQLError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        warn!(error = %error, "GraphQL request failed");
    } else {
        debug!(error = %error, "GraphQL request rejected");
    }

    (status, Json(error.to_json())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_request_deserialize() {
        let json = r#"{
            "query": "{ acme { users { id } } }",
            "operationName": "Users",
            "variables": {"foo": "bar"}
        }"#;

        let request: GraphQLRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.query, "{ acme { users { id } } }");
        assert_eq!(request.operation_name, Some("Users".to_string()));
        assert!(request.variables.is_some());
    }

    #[test]
    fn test_params_to_request() {
        let params = GraphQLQueryParams {
            query: Some("{ acme { users { id } } }".to_string()),
            operation_name: None,
            variables: Some(r#"{"limit": 2}"#.to_string()),
        };

        let request = params_to_request(params).unwrap();
        assert_eq!(request.variables, Some(serde_json::json!({"limit": 2})));
    }

    #[test]
    fn test_params_to_request_invalid() {
        let params = GraphQLQueryParams {
            query: Some("{ x }".to_string()),
            operation_name: None,
            variables: Some("not valid json".to_string()),
        };
        assert!(matches!(
            params_to_request(params),
            Err(GraphQLError::InvalidRequest(_))
        ));

        assert!(params_to_request(GraphQLQueryParams::default()).is_err());
    }

    #[test]
    fn test_error_response_status() {
        let response = error_response(GraphQLError::TenantNotFound { tenant_id: None });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = error_response(GraphQLError::SchemaBuildFailed("boom".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
