//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::{Extension, OriginalUri},
    http::{header::CONTENT_TYPE, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::{BaseEventStore, ScrapeScheduler};
use crate::server::routes::{
    create_event_handler, health_handler, list_events_handler, scheduler_status_handler,
    scrape_events_handler, start_scheduler_handler, stop_scheduler_handler, test_handler,
    trigger_scheduler_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BaseEventStore>,
    pub scheduler: Arc<ScrapeScheduler>,
}

impl AppState {
    pub fn new(store: Arc<dyn BaseEventStore>, scheduler: Arc<ScrapeScheduler>) -> Self {
        Self { store, scheduler }
    }
}

/// Catch-all for unknown routes
async fn not_found_handler(OriginalUri(uri): OriginalUri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "requestedUrl": uri.to_string(),
        })),
    )
}

/// Build the Axum application router
///
/// The scheduler is not started here; `main` decides whether to arm it.
pub fn build_app(state: AppState) -> Router {
    // CORS configuration - allow any origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        // Events
        .route(
            "/api/events",
            get(list_events_handler).post(create_event_handler),
        )
        .route("/api/events/scrape", get(scrape_events_handler))
        // Scheduler control
        .route("/api/scheduler/status", get(scheduler_status_handler))
        .route("/api/scheduler/start", post(start_scheduler_handler))
        .route("/api/scheduler/stop", post(stop_scheduler_handler))
        .route("/api/scheduler/trigger", post(trigger_scheduler_handler))
        // Liveness
        .route("/test", get(test_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
