//! Liveness endpoints

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::core::constants::ROOT_BANNER_TEXT;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Plain-text banner served at `/`
pub async fn root_banner() -> &'static str {
    ROOT_BANNER_TEXT
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
