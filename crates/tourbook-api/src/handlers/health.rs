use axum::response::Response;
use serde::Serialize;

use crate::response::ok;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// GET /api/v1/health
pub async fn health_check() -> Response {
    ok(HealthStatus {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
