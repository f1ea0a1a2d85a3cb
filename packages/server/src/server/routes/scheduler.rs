use std::sync::Arc;

use axum::{extract::Extension, Json};
use serde::Serialize;

use crate::kernel::SchedulerStatus;
use crate::server::app::AppState;
use crate::server::routes::error::ApiResult;

#[derive(Debug, Serialize)]
pub struct SchedulerActionResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub success: bool,
    pub message: String,
    pub expired: u64,
    pub scraped: usize,
    pub saved: usize,
}

/// GET /api/scheduler/status
pub async fn scheduler_status_handler(
    Extension(state): Extension<AppState>,
) -> Json<SchedulerStatus> {
    Json(state.scheduler.status().await)
}

/// POST /api/scheduler/start
pub async fn start_scheduler_handler(
    Extension(state): Extension<AppState>,
) -> ApiResult<Json<SchedulerActionResponse>> {
    state.scheduler.start().await?;
    Ok(Json(SchedulerActionResponse {
        success: true,
        message: "Scheduler started successfully".to_string(),
    }))
}

/// POST /api/scheduler/stop
pub async fn stop_scheduler_handler(
    Extension(state): Extension<AppState>,
) -> ApiResult<Json<SchedulerActionResponse>> {
    state.scheduler.stop().await?;
    Ok(Json(SchedulerActionResponse {
        success: true,
        message: "Scheduler stopped successfully".to_string(),
    }))
}

/// POST /api/scheduler/trigger
///
/// Runs the full pipeline (expire → collect → ingest) before responding.
/// The run is spawned, so a client disconnect does not cancel it.
pub async fn trigger_scheduler_handler(
    Extension(state): Extension<AppState>,
) -> ApiResult<Json<TriggerResponse>> {
    let scheduler = Arc::clone(&state.scheduler);
    let report = tokio::spawn(async move { scheduler.trigger().await }).await??;
    Ok(Json(TriggerResponse {
        success: true,
        message: "Manual scraping completed successfully".to_string(),
        expired: report.expired,
        scraped: report.ingest.scraped,
        saved: report.ingest.saved,
    }))
}
