//! Health check endpoint.

use actix_web::{HttpResponse, web};
use quill_shared::HealthResponse;

use crate::state::AppState;

/// Liveness probe reporting the version and active storage backend.
///
/// GET /health/
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.repos.storage.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
