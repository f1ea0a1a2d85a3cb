//! Eventbrite - HTML scraping of the online hackathon search page.
//!
//! There is no API for this listing, so cards are picked out of the page with
//! CSS selectors and filtered by keyword. Unstructured scraping is noisy: the
//! result is capped at [`MAX_RESULTS`] listings.

use async_trait::async_trait;
use chrono::Datelike;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error, info};
use url::Url;

use crate::common::utils::{collapse_whitespace, normalize_date_in, normalize_tags, today};
use crate::domains::events::NewEvent;
use crate::kernel::http_client::fetch_text;
use crate::kernel::BaseEventSource;

pub const DEFAULT_BASE_URL: &str = "https://www.eventbrite.com";

/// Maximum listings kept per run
pub const MAX_RESULTS: usize = 3;

const CARD_SELECTOR: &str =
    r#".event-card, .search-event-card, [class*="event-card"], .eds-event-card"#;
const TITLE_SELECTOR: &str = r#"h1, h2, h3, .event-title, [class*="title"]"#;
const DESCRIPTION_SELECTOR: &str = r#"p, .event-description, [class*="description"]"#;
const DATE_SELECTOR: &str = r#".event-date, .date-time, [class*="date"]"#;
const PRICE_SELECTOR: &str = r#".event-price, .price, [class*="price"]"#;
const LINK_SELECTOR: &str = "a";

const MIN_DESCRIPTION_CHARS: usize = 20;
const MIN_TITLE_CHARS: usize = 3;

/// Titles containing any of these are scams, not events.
pub const SPAM_KEYWORDS: [&str; 10] = [
    "recover lost crypto",
    "crypto scam",
    "fake investment",
    "get rich quick",
    "miracle cure",
    "work from home",
    "make money fast",
    "investment opportunity",
    "bitcoin recovery",
    "forex trading",
];

/// A title must contain at least one of these to count as a hackathon.
pub const HACKATHON_KEYWORDS: [&str; 10] = [
    "hackathon",
    "hack day",
    "coding competition",
    "programming contest",
    "developer challenge",
    "tech challenge",
    "innovation challenge",
    "startup weekend",
    "code sprint",
    "dev fest",
];

pub fn is_spam(title: &str) -> bool {
    let title = title.to_lowercase();
    SPAM_KEYWORDS.iter().any(|keyword| title.contains(keyword))
}

pub fn is_hackathon_related(title: &str) -> bool {
    let title = title.to_lowercase();
    HACKATHON_KEYWORDS.iter().any(|keyword| title.contains(keyword))
}

pub struct EventbriteSource {
    client: reqwest::Client,
    base_url: String,
}

impl EventbriteSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self) -> String {
        format!("{}/d/online/hackathon/", self.base_url)
    }

    /// Extract filtered listings from a search results page.
    pub fn parse_listings(html: &str, base_url: &str, default_year: i32) -> Vec<NewEvent> {
        let Ok(card_selector) = Selector::parse(CARD_SELECTOR) else {
            return vec![];
        };
        let base = Url::parse(base_url).ok();
        let document = Html::parse_document(html);

        let mut events: Vec<NewEvent> = Vec::new();
        for card in document.select(&card_selector) {
            let Some(event) = Self::card_to_event(card, base.as_ref(), default_year) else {
                continue;
            };
            // Nested card wrappers match the selector more than once
            if events.iter().any(|e| e.title == event.title) {
                continue;
            }
            events.push(event);
        }

        info!(
            source = "eventbrite",
            count = events.len(),
            "Found legitimate hackathon events from Eventbrite"
        );

        events.truncate(MAX_RESULTS);
        events
    }

    fn card_to_event(card: ElementRef<'_>, base: Option<&Url>, default_year: i32) -> Option<NewEvent> {
        let title = first_text(card, TITLE_SELECTOR).unwrap_or_default();

        if is_spam(&title) {
            debug!(source = "eventbrite", title = %title, "Dropping spam listing");
            return None;
        }
        if !is_hackathon_related(&title) {
            return None;
        }
        if title.chars().count() <= MIN_TITLE_CHARS {
            return None;
        }

        let description = first_text(card, DESCRIPTION_SELECTOR)
            .filter(|d| d.chars().count() > MIN_DESCRIPTION_CHARS)
            .unwrap_or_default();

        let href = first_element(card, LINK_SELECTOR)
            .and_then(|a| a.value().attr("href"))
            .or_else(|| card.value().attr("href"));
        let redirect_url = href
            .map(|href| resolve_url(href, base))
            .unwrap_or_default();

        let date = first_text(card, DATE_SELECTOR).and_then(|d| normalize_date_in(&d, default_year));

        let mut tags = Vec::new();
        if first_text(card, PRICE_SELECTOR).is_some_and(|p| p.to_lowercase().contains("free")) {
            tags.push("free".to_string());
        }
        tags.push("hackathon".to_string());
        tags.push("eventbrite".to_string());

        Some(
            NewEvent::builder()
                .title(title)
                .description(description)
                .start_date(date)
                .deadline(date)
                .tags(normalize_tags(tags))
                .hosted_by("Eventbrite")
                .redirect_url(redirect_url)
                .build(),
        )
    }
}

fn first_element<'a>(element: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    element.select(&selector).next()
}

fn first_text(element: ElementRef<'_>, css: &str) -> Option<String> {
    first_element(element, css)
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}

fn resolve_url(href: &str, base: Option<&Url>) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    base.and_then(|b| b.join(href).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| format!("{}{}", DEFAULT_BASE_URL, href))
}

#[async_trait]
impl BaseEventSource for EventbriteSource {
    fn name(&self) -> &str {
        "eventbrite"
    }

    async fn fetch(&self) -> Vec<NewEvent> {
        info!(source = "eventbrite", "Scraping Eventbrite...");

        let html = match fetch_text(&self.client, &self.search_url()).await {
            Ok(html) => html,
            Err(e) => {
                error!(source = "eventbrite", error = %e, "Error scraping Eventbrite");
                return vec![];
            }
        };

        Self::parse_listings(&html, &self.base_url, today().year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn card(title: &str, extra: &str) -> String {
        format!(
            r#"<div class="search-event-card">
                 <a href="/e/{slug}-tickets-1">
                   <h3>{title}</h3>
                 </a>
                 <p>An online weekend of building, mentoring and demos for everyone.</p>
                 <div class="event-date">Sat, Jun 28, 9:00 AM</div>
                 {extra}
               </div>"#,
            slug = title.to_lowercase().replace(' ', "-"),
            title = title,
            extra = extra,
        )
    }

    fn page(cards: &[String]) -> String {
        format!("<html><body><main>{}</main></body></html>", cards.join("\n"))
    }

    #[test]
    fn test_keyword_filters() {
        assert!(is_spam("Recover Lost Crypto Hackathon"));
        assert!(!is_spam("Climate Hackathon"));
        assert!(is_hackathon_related("Global AI HACKATHON 2025"));
        assert!(is_hackathon_related("Google Dev Fest Online"));
        assert!(!is_hackathon_related("Networking Mixer"));
    }

    #[test]
    fn test_parses_card() {
        let html = page(&[card("Climate Hackathon", r#"<span class="price">Free</span>"#)]);
        let events = EventbriteSource::parse_listings(&html, "https://www.eventbrite.com", 2025);

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.title, "Climate Hackathon");
        assert_eq!(event.hosted_by, "Eventbrite");
        assert_eq!(
            event.redirect_url,
            "https://www.eventbrite.com/e/climate-hackathon-tickets-1"
        );
        assert_eq!(
            event.description,
            "An online weekend of building, mentoring and demos for everyone."
        );
        assert_eq!(event.start_date, NaiveDate::from_ymd_opt(2025, 6, 28));
        assert_eq!(event.deadline, event.start_date);
        assert_eq!(event.tags, vec!["free", "hackathon", "eventbrite"]);
    }

    #[test]
    fn test_spam_and_off_topic_cards_dropped() {
        let html = page(&[
            card("Bitcoin Recovery Hackathon", ""),
            card("Wine Tasting Evening", ""),
            card("Open Source Code Sprint", ""),
        ]);
        let events = EventbriteSource::parse_listings(&html, "https://www.eventbrite.com", 2025);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Open Source Code Sprint");
        assert_eq!(events[0].tags, vec!["hackathon", "eventbrite"]);
    }

    #[test]
    fn test_results_capped() {
        let cards: Vec<String> = (1..=6)
            .map(|i| card(&format!("Hackathon Number {}", i), ""))
            .collect();
        let events = EventbriteSource::parse_listings(&page(&cards), "https://www.eventbrite.com", 2025);

        assert_eq!(events.len(), MAX_RESULTS);
        assert_eq!(events[0].title, "Hackathon Number 1");
    }

    #[test]
    fn test_page_without_cards() {
        let events =
            EventbriteSource::parse_listings("<html><body>nothing</body></html>", "https://www.eventbrite.com", 2025);
        assert!(events.is_empty());
    }
}
