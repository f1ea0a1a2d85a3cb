use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::utils::{normalize_date, normalize_tags};
use crate::domains::events::{Event, NewEvent};
use crate::server::app::AppState;
use crate::server::routes::error::{ApiError, ApiResult};

/// Body of `POST /api/events`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub deadline: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(alias = "hosted_by")]
    pub hosted_by: Option<String>,
    /// `true` or the string `"TRUE"`; anything else is unverified
    pub verified: Option<Value>,
    #[serde(rename = "redirectURL")]
    pub redirect_url: Option<String>,
}

impl CreateEventRequest {
    pub fn into_new_event(self) -> ApiResult<NewEvent> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ApiError::Validation("title is required".to_string()));
        }

        let hosted_by = self
            .hosted_by
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ApiError::Validation("hostedBy is required".to_string()))?;

        let verified = match &self.verified {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => text == "TRUE",
            _ => false,
        };

        Ok(NewEvent::builder()
            .title(title)
            .description(self.description.unwrap_or_default())
            .event_type(
                self.event_type
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| "hackathon".to_string()),
            )
            .start_date(parse_optional_date("startDate", self.start_date.as_deref())?)
            .end_date(parse_optional_date("endDate", self.end_date.as_deref())?)
            .deadline(parse_optional_date("deadline", self.deadline.as_deref())?)
            .tags(normalize_tags(self.tags.unwrap_or_default()))
            .hosted_by(hosted_by)
            .verified(verified)
            .redirect_url(self.redirect_url.unwrap_or_default())
            .build())
    }
}

fn parse_optional_date(field: &str, value: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => normalize_date(raw)
            .map(Some)
            .ok_or_else(|| ApiError::Validation(format!("{} is not a valid date: {}", field, raw))),
    }
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub success: bool,
    pub message: String,
    pub scraped: usize,
    pub saved: usize,
}

/// GET /api/events
pub async fn list_events_handler(
    Extension(state): Extension<AppState>,
) -> ApiResult<Json<Vec<Event>>> {
    let events = state.store.list_by_deadline().await?;
    Ok(Json(events))
}

/// POST /api/events
pub async fn create_event_handler(
    Extension(state): Extension<AppState>,
    body: Result<Json<CreateEventRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Vec<Event>>)> {
    let Json(request) = body.map_err(|e| ApiError::Validation(e.body_text()))?;
    let event = request.into_new_event()?;

    match state.store.insert(&event).await? {
        Some(saved) => {
            tracing::info!(title = %saved.title, hosted_by = %saved.hosted_by, "Event created");
            Ok((StatusCode::CREATED, Json(vec![saved])))
        }
        None => Err(ApiError::Validation(format!(
            "An event titled '{}' hosted by '{}' already exists",
            event.title, event.hosted_by
        ))),
    }
}

/// GET /api/events/scrape
///
/// Collect from every source and ingest synchronously, without expiry.
/// Runs on its own task so it completes even if the client goes away.
pub async fn scrape_events_handler(
    Extension(state): Extension<AppState>,
) -> ApiResult<Json<ScrapeResponse>> {
    tracing::info!("Starting manual scraping");
    let scheduler = Arc::clone(&state.scheduler);
    let summary = tokio::spawn(async move { scheduler.scrape_now().await }).await??;

    if summary.scraped == 0 {
        return Ok(Json(ScrapeResponse {
            success: false,
            message: "No events found from scraping".to_string(),
            scraped: 0,
            saved: 0,
        }));
    }

    Ok(Json(ScrapeResponse {
        success: true,
        message: format!(
            "Scraping completed. Scraped {} events, saved {} new events",
            summary.scraped, summary.saved
        ),
        scraped: summary.scraped,
        saved: summary.saved,
    }))
}
