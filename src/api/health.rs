//! Composite health endpoint.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"; follows the database probe alone
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since the server started
    pub uptime: u64,
    pub services: ServicesStatus,
}

#[derive(Debug, Serialize)]
pub struct ServicesStatus {
    pub database: DatabaseStatus,
    pub cache: CacheStatus,
}

#[derive(Debug, Serialize)]
pub struct DatabaseStatus {
    pub status: &'static str,
    pub latency_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct CacheStatus {
    /// Whether a cache layer is configured. A static config check, not a
    /// liveness probe; an unconfigured cache never degrades overall status.
    pub configured: bool,
}

/// Aggregate service health
///
/// GET /api/health — 200 when the database probe succeeds, 503 otherwise.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();
    let db_ok = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .is_ok();
    let latency_ms = started.elapsed().as_millis() as u64;

    if !db_ok {
        tracing::error!("Database health probe failed");
    }

    let response = HealthResponse {
        status: if db_ok { "healthy" } else { "unhealthy" },
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime: state.start_time.elapsed().as_secs(),
        services: ServicesStatus {
            database: DatabaseStatus {
                status: if db_ok { "healthy" } else { "unhealthy" },
                latency_ms,
            },
            cache: CacheStatus {
                configured: state.config.cache.redis_url.is_some(),
            },
        },
    };

    let status_code = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
