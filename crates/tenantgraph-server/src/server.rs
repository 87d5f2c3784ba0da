use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderMap, HeaderName},
    routing::get,
};
use tenantgraph_db_memory::{InMemoryStore, TenantFixtures};
use tenantgraph_graphql::GraphQLState;
use tenantgraph_storage::DynRegistry;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppConfig, handlers};

pub struct TenantgraphServer {
    addr: SocketAddr,
    app: Router,
}

/// Builds the HTTP application: health endpoints plus the GraphQL router.
pub fn build_app(cfg: &AppConfig, registry: DynRegistry) -> anyhow::Result<Router> {
    let state = GraphQLState::new(registry.clone(), &cfg.graphql)?;
    let body_limit = cfg.server.body_limit_bytes;
    let tenant_header = HeaderName::from_bytes(cfg.graphql.tenant_header.as_bytes())?;

    let health = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .with_state(registry);

    Ok(health
        .merge(tenantgraph_graphql::router(state))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        tenant = request_tenant(req.headers(), &tenant_header).unwrap_or("-"),
                        http.status_code = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        span.record("http.status_code", tracing::field::display(res.status().as_u16()));
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit)))
}

/// Tenant id carried by the configured tenant header, for request spans.
fn request_tenant<'a>(headers: &'a HeaderMap, tenant_header: &HeaderName) -> Option<&'a str> {
    headers
        .get(tenant_header)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Loads the configured tenant fixtures into `store`.
///
/// Returns the number of rows inserted, 0 when no fixtures are configured.
pub async fn load_fixtures(cfg: &AppConfig, store: &InMemoryStore) -> anyhow::Result<usize> {
    let Some(path) = &cfg.tenants.fixtures else {
        tracing::info!("No tenant fixtures configured, starting with an empty store");
        return Ok(0);
    };

    let fixtures = TenantFixtures::from_path(path)?;
    let tenants = fixtures.tenants.len();
    let rows = fixtures.load_into(store).await?;
    tracing::info!(path = %path.display(), tenants, rows, "Tenant fixtures loaded");
    Ok(rows)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
    store: Option<Arc<InMemoryStore>>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
            store: None,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Serves an existing store instead of a fresh one.
    pub fn with_store(mut self, store: Arc<InMemoryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub async fn build(self) -> anyhow::Result<TenantgraphServer> {
        let store = self.store.unwrap_or_else(tenantgraph_db_memory::create_store);
        load_fixtures(&self.config, &store).await?;

        let app = build_app(&self.config, store)?;

        Ok(TenantgraphServer {
            addr: self.addr,
            app,
        })
    }
}

impl TenantgraphServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_tenant_uses_configured_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-tenant-id", HeaderValue::from_static("acme"));
        headers.insert("x-org", HeaderValue::from_static(" globex "));

        let org = HeaderName::from_static("x-org");
        assert_eq!(request_tenant(&headers, &org), Some("globex"));

        let missing = HeaderName::from_static("x-team");
        assert_eq!(request_tenant(&headers, &missing), None);
    }
}
