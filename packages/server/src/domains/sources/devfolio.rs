//! Devfolio - public JSON API, single page of open hackathons.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::common::utils::{normalize_date, normalize_tags};
use crate::domains::events::NewEvent;
use crate::domains::sources::error::SourceResult;
use crate::kernel::http_client::fetch_json;
use crate::kernel::BaseEventSource;

pub const DEFAULT_BASE_URL: &str = "https://api.devfolio.co";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevfolioResponse {
    #[serde(default)]
    pub result: Vec<DevfolioHackathon>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevfolioHackathon {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub tagline: Option<String>,
    pub slug: Option<String>,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub hackathon_setting: Option<DevfolioSetting>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevfolioSetting {
    pub reg_ends_at: Option<String>,
}

pub struct DevfolioSource {
    client: reqwest::Client,
    base_url: String,
}

impl DevfolioSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn listings_url(&self) -> String {
        format!(
            "{}/api/hackathons?filter=application_open&page=1",
            self.base_url
        )
    }

    async fn fetch_listings(&self) -> SourceResult<Vec<DevfolioHackathon>> {
        let response: DevfolioResponse = fetch_json(&self.client, &self.listings_url()).await?;
        Ok(response.result)
    }

    /// Map one API record to a canonical listing; records without a name are dropped.
    pub fn to_event(hackathon: DevfolioHackathon) -> Option<NewEvent> {
        let title = hackathon.name.filter(|n| !n.trim().is_empty())?;

        let tags = match hackathon.tagline.filter(|t| !t.trim().is_empty()) {
            Some(tagline) => normalize_tags([tagline]),
            None => vec!["hackathon".to_string()],
        };

        let deadline = hackathon
            .hackathon_setting
            .and_then(|s| s.reg_ends_at)
            .and_then(|d| normalize_date(&d));

        let redirect_url = match hackathon.slug {
            Some(slug) if !slug.is_empty() => format!("https://{}.devfolio.co", slug),
            _ => "https://devfolio.co".to_string(),
        };

        Some(
            NewEvent::builder()
                .title(title)
                .description(hackathon.desc.unwrap_or_default())
                .tags(tags)
                .start_date(hackathon.starts_at.as_deref().and_then(normalize_date))
                .end_date(hackathon.ends_at.as_deref().and_then(normalize_date))
                .deadline(deadline)
                .redirect_url(redirect_url)
                .hosted_by("Devfolio")
                .build(),
        )
    }
}

#[async_trait]
impl BaseEventSource for DevfolioSource {
    fn name(&self) -> &str {
        "devfolio"
    }

    async fn fetch(&self) -> Vec<NewEvent> {
        let listings = match self.fetch_listings().await {
            Ok(listings) => listings,
            Err(e) => {
                error!(source = "devfolio", error = %e, "Error fetching Devfolio hackathons");
                return vec![];
            }
        };

        let total = listings.len();
        let events: Vec<NewEvent> = listings.into_iter().filter_map(Self::to_event).collect();

        if events.len() < total {
            warn!(
                source = "devfolio",
                skipped = total - events.len(),
                "Skipped Devfolio records without a name"
            );
        }
        info!(source = "devfolio", count = events.len(), "Devfolio scrape complete");

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_maps_api_record() {
        let record: DevfolioHackathon = serde_json::from_value(json!({
            "name": "ETHIndia",
            "desc": "Asia's largest Ethereum hackathon",
            "tagline": "Build on Ethereum",
            "slug": "ethindia2025",
            "starts_at": "2025-12-05T04:30:00.000Z",
            "ends_at": "2025-12-07T12:30:00.000Z",
            "hackathon_setting": { "reg_ends_at": "2025-11-20T18:29:00.000Z" }
        }))
        .unwrap();

        let event = DevfolioSource::to_event(record).unwrap();
        assert_eq!(event.title, "ETHIndia");
        assert_eq!(event.hosted_by, "Devfolio");
        assert_eq!(event.tags, vec!["Build on Ethereum"]);
        assert_eq!(event.start_date, NaiveDate::from_ymd_opt(2025, 12, 5));
        assert_eq!(event.end_date, NaiveDate::from_ymd_opt(2025, 12, 7));
        assert_eq!(event.deadline, NaiveDate::from_ymd_opt(2025, 11, 20));
        assert_eq!(event.redirect_url, "https://ethindia2025.devfolio.co");
        assert!(event.verified);
        assert_eq!(event.event_type, "hackathon");
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let record: DevfolioHackathon = serde_json::from_value(json!({
            "name": "Quiet Hack",
            "starts_at": "garbage"
        }))
        .unwrap();

        let event = DevfolioSource::to_event(record).unwrap();
        assert_eq!(event.tags, vec!["hackathon"]);
        assert_eq!(event.description, "");
        assert_eq!(event.start_date, None);
        assert_eq!(event.deadline, None);
    }

    #[test]
    fn test_nameless_record_dropped() {
        assert!(DevfolioSource::to_event(DevfolioHackathon::default()).is_none());
    }
}
