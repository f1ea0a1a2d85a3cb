use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    database: DatabaseHealth,
    scheduler: SchedulerHealth,
}

#[derive(Serialize)]
pub struct DatabaseHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerHealth {
    is_running: bool,
    is_currently_scraping: bool,
}

#[derive(Serialize)]
pub struct TestResponse {
    message: String,
}

/// Health check endpoint
///
/// Returns 200 OK if the store answers, 503 Service Unavailable otherwise.
/// The scheduler flags are informational and never affect the status code.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let db_health = match state.store.health_check().await {
        Ok(()) => DatabaseHealth {
            status: "ok".to_string(),
            error: None,
        },
        Err(e) => DatabaseHealth {
            status: "error".to_string(),
            error: Some(e.to_string()),
        },
    };

    let status = state.scheduler.status().await;
    let scheduler = SchedulerHealth {
        is_running: status.is_running,
        is_currently_scraping: status.is_currently_scraping,
    };

    let is_healthy = db_health.status == "ok";

    let (status_code, overall_status) = if is_healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status: overall_status.to_string(),
            database: db_health,
            scheduler,
        }),
    )
}

/// GET /test
pub async fn test_handler() -> Json<TestResponse> {
    Json(TestResponse {
        message: "Server is working!".to_string(),
    })
}
