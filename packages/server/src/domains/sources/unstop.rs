//! Unstop - paginated public search API for hackathon opportunities.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::common::utils::{normalize_date, normalize_tags, today, truncate_chars};
use crate::domains::events::NewEvent;
use crate::domains::sources::error::SourceResult;
use crate::kernel::http_client::fetch_json;
use crate::kernel::BaseEventSource;

pub const DEFAULT_BASE_URL: &str = "https://unstop.com";

/// Hard cap on pages requested per run
pub const MAX_PAGES: u32 = 3;

const MIN_TITLE_CHARS: usize = 5;
const MAX_DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnstopResponse {
    pub data: Option<UnstopPage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnstopPage {
    /// Either a JSON array or an object keyed by position
    #[serde(default)]
    pub data: Value,
    pub next_page_url: Option<String>,
}

impl UnstopPage {
    fn raw_items(&self) -> Vec<Value> {
        match &self.data {
            Value::Array(items) => items.clone(),
            Value::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                // Positional keys sort numerically; anything else keeps map order at the end
                entries.sort_by_key(|(key, _)| key.parse::<usize>().unwrap_or(usize::MAX));
                entries.into_iter().map(|(_, item)| item.clone()).collect()
            }
            _ => vec![],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnstopOpportunity {
    pub title: Option<String>,
    pub featured_title: Option<String>,
    #[serde(default)]
    pub seo_details: Vec<UnstopSeoDetails>,
    #[serde(rename = "type")]
    pub opportunity_type: Option<String>,
    pub subtype: Option<String>,
    pub region: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(rename = "regnRequirements")]
    pub regn_requirements: Option<UnstopRegistration>,
    pub organisation: Option<UnstopOrganisation>,
    pub public_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnstopSeoDetails {
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnstopRegistration {
    pub end_regn_dt: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnstopOrganisation {
    pub name: Option<String>,
}

pub struct UnstopSource {
    client: reqwest::Client,
    base_url: String,
}

impl UnstopSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn page_url(&self, page: u32) -> String {
        format!(
            "{}/api/public/opportunity/search-result?opportunity=hackathons&page={}",
            self.base_url, page
        )
    }

    async fn fetch_page(&self, page: u32) -> SourceResult<UnstopResponse> {
        fetch_json(&self.client, &self.page_url(page)).await
    }

    /// Map raw page items, dropping short titles, finished events and undecodable records.
    pub fn process_items(items: Vec<Value>, today: NaiveDate) -> Vec<NewEvent> {
        items
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<UnstopOpportunity>(raw) {
                Ok(item) => Self::to_event(item, today),
                Err(e) => {
                    warn!(source = "unstop", error = %e, "Skipping undecodable Unstop record");
                    None
                }
            })
            .collect()
    }

    pub fn to_event(item: UnstopOpportunity, today: NaiveDate) -> Option<NewEvent> {
        let title = item
            .title
            .clone()
            .filter(|t| t.trim().chars().count() >= MIN_TITLE_CHARS)?;

        let end_date = item.end_date.as_deref().and_then(normalize_date);
        if end_date.is_some_and(|end| end < today) {
            debug!(source = "unstop", title = %title, "Skipping finished event");
            return None;
        }

        let deadline = item
            .regn_requirements
            .as_ref()
            .and_then(|r| r.end_regn_dt.as_deref())
            .and_then(normalize_date);

        let redirect_url = match item.public_url.as_deref() {
            Some(path) if !path.is_empty() => {
                format!("https://unstop.com/{}", path.trim_start_matches('/'))
            }
            _ => "https://unstop.com".to_string(),
        };

        Some(
            NewEvent::builder()
                .title(title)
                .description(Self::description(&item))
                .event_type("hackathons")
                .start_date(item.start_date.as_deref().and_then(normalize_date))
                .end_date(end_date)
                .deadline(deadline)
                .tags(Self::tags(&item))
                .hosted_by(Self::hosted_by(&item))
                .redirect_url(redirect_url)
                .build(),
        )
    }

    fn description(item: &UnstopOpportunity) -> String {
        let description = item
            .featured_title
            .clone()
            .filter(|d| !d.trim().is_empty())
            .or_else(|| {
                item.seo_details
                    .first()
                    .and_then(|seo| seo.description.clone())
                    .filter(|d| !d.trim().is_empty())
            })
            .unwrap_or_else(|| {
                format!(
                    "{} - Competition/Hackathon on Unstop",
                    item.title.as_deref().unwrap_or("Hackathon")
                )
            });

        truncate_chars(&description, MAX_DESCRIPTION_CHARS)
    }

    fn tags(item: &UnstopOpportunity) -> Vec<String> {
        let mut tags = vec!["unstop".to_string()];

        match item.opportunity_type.as_deref() {
            Some("hackathons") => tags.push("hackathon".to_string()),
            Some("competitions") => tags.push("competition".to_string()),
            _ => {}
        }
        if let Some(subtype) = &item.subtype {
            tags.push(subtype.replace('_', " "));
        }
        if let Some(region) = &item.region {
            tags.push(region.clone());
        }

        normalize_tags(tags)
    }

    fn hosted_by(item: &UnstopOpportunity) -> String {
        item.organisation
            .as_ref()
            .and_then(|o| o.name.clone())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "Unstop".to_string())
    }
}

#[async_trait]
impl BaseEventSource for UnstopSource {
    fn name(&self) -> &str {
        "unstop"
    }

    async fn fetch(&self) -> Vec<NewEvent> {
        let today = today();
        let mut events = Vec::new();

        for page in 1..=MAX_PAGES {
            let response = match self.fetch_page(page).await {
                Ok(response) => response,
                Err(e) => {
                    error!(source = "unstop", page, error = %e, "Error fetching Unstop page");
                    break;
                }
            };

            let Some(page_data) = response.data else {
                debug!(source = "unstop", page, "Unstop page has no data");
                break;
            };

            let items = page_data.raw_items();
            if items.is_empty() {
                break;
            }

            events.extend(Self::process_items(items, today));

            if page_data.next_page_url.is_none() {
                break;
            }
        }

        info!(source = "unstop", count = events.len(), "Unstop scrape complete");
        events
    }
}
