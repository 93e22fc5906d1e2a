//! Service information endpoint

use axum::{routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

/// GET / response
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Interactive API documentation
    pub docs: String,
    /// Machine readable OpenAPI document
    pub openapi: String,
    pub health: String,
}

/// GET /
#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses((status = 200, description = "Service information", body = ServiceInfo))
)]
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: "tagdesk-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Customer complaint intake with automatic category and sentiment tagging"
            .to_string(),
        docs: "/docs".to_string(),
        openapi: "/openapi.json".to_string(),
        health: "/health".to_string(),
    })
}

pub fn root_routes() -> Router<AppState> {
    Router::new().route("/", get(service_info))
}
