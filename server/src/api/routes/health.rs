//! Health check endpoint

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use utoipa::ToSchema;

use crate::data::AnalyticsRepository;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` or `degraded`
    pub status: &'static str,
    pub version: &'static str,
    /// `ok` or `unavailable`
    pub database: &'static str,
}

/// Health check endpoint
///
/// Reports degraded with 503 when the analytics store does not answer.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service and store are healthy", body = HealthResponse),
        (status = 503, description = "Analytics store unavailable", body = HealthResponse)
    )
)]
pub async fn health(State(repo): State<Arc<dyn AnalyticsRepository>>) -> impl IntoResponse {
    let (code, status, database) = match repo.ping().await {
        Ok(()) => (StatusCode::OK, "ok", "ok"),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: analytics store unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
        }
    };
    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
        }),
    )
}
