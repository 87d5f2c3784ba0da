use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::json;
use tenantgraph_storage::DynRegistry;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "tenantgraph",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/graphql", "/global"],
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

/// Ready once the tenant registry answers.
pub async fn readyz(State(registry): State<DynRegistry>) -> impl IntoResponse {
    match registry.tenant_ids().await {
        Ok(tenants) => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "tenants": tenants.len() })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Tenant registry unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "error": e.to_string() })),
            )
        }
    }
}
