//! Devpost - paginated hackathon JSON API.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::common::utils::{normalize_tags, parse_date_range_in, parse_relative_deadline_on, today};
use crate::domains::events::NewEvent;
use crate::domains::sources::error::SourceResult;
use crate::kernel::http_client::fetch_json;
use crate::kernel::BaseEventSource;

pub const DEFAULT_BASE_URL: &str = "https://devpost.com";

/// Hard cap on pages requested per run
pub const MAX_PAGES: u32 = 4;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevpostResponse {
    /// Kept raw so one malformed record does not sink the page
    pub hackathons: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevpostHackathon {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub themes: Vec<DevpostTheme>,
    pub submission_period_dates: Option<String>,
    pub time_left_to_submission: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevpostTheme {
    pub name: Option<String>,
}

pub struct DevpostSource {
    client: reqwest::Client,
    base_url: String,
}

impl DevpostSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn page_url(&self, page: u32) -> String {
        format!("{}/api/hackathons/?page={}", self.base_url, page)
    }

    async fn fetch_page(&self, page: u32) -> SourceResult<DevpostResponse> {
        fetch_json(&self.client, &self.page_url(page)).await
    }

    pub fn process_items(items: Vec<Value>, today: NaiveDate) -> Vec<NewEvent> {
        items
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<DevpostHackathon>(raw) {
                Ok(hackathon) => Self::to_event(hackathon, today),
                Err(e) => {
                    error!(source = "devpost", error = %e, "Error processing DevPost event");
                    None
                }
            })
            .collect()
    }

    pub fn to_event(hackathon: DevpostHackathon, today: NaiveDate) -> Option<NewEvent> {
        let Some(title) = hackathon.title.filter(|t| !t.trim().is_empty()) else {
            warn!(source = "devpost", "Skipping DevPost record without a title");
            return None;
        };

        let (start_date, end_date) = hackathon
            .submission_period_dates
            .as_deref()
            .map(|dates| parse_date_range_in(dates, today.year()))
            .unwrap_or((None, None));

        let deadline = hackathon
            .time_left_to_submission
            .as_deref()
            .and_then(|left| parse_relative_deadline_on(left, today));

        let themes = normalize_tags(hackathon.themes.into_iter().filter_map(|t| t.name));
        let tags = if themes.is_empty() {
            vec!["devpost".to_string()]
        } else {
            themes
        };

        Some(
            NewEvent::builder()
                .title(title)
                .description(
                    hackathon
                        .description
                        .filter(|d| !d.trim().is_empty())
                        .unwrap_or_else(|| "DevPost hackathon".to_string()),
                )
                .tags(tags)
                .start_date(start_date)
                .end_date(end_date)
                .deadline(deadline)
                .redirect_url(
                    hackathon
                        .url
                        .filter(|u| !u.is_empty())
                        .unwrap_or_else(|| "https://devpost.com".to_string()),
                )
                .hosted_by("Devpost")
                .build(),
        )
    }
}

#[async_trait]
impl BaseEventSource for DevpostSource {
    fn name(&self) -> &str {
        "devpost"
    }

    async fn fetch(&self) -> Vec<NewEvent> {
        let today = today();
        let mut events = Vec::new();

        for page in 1..=MAX_PAGES {
            let response = match self.fetch_page(page).await {
                Ok(response) => response,
                Err(e) => {
                    error!(source = "devpost", page, error = %e, "Error fetching DevPost page");
                    break;
                }
            };

            let items = response.hackathons.unwrap_or_default();
            if items.is_empty() {
                break;
            }

            events.extend(Self::process_items(items, today));
        }

        info!(source = "devpost", count = events.len(), "DevPost scrape complete");
        events
    }
}
