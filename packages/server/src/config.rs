use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::domains::sources::{devfolio, devpost, eventbrite, unstop};
use crate::kernel::scheduled_tasks::DEFAULT_SCRAPE_CRON;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Six-field cron expression (seconds first), evaluated in UTC
    pub scrape_cron: String,
    /// Arm the scrape job at startup
    pub scheduler_autostart: bool,
    pub http_timeout: Duration,
    pub sources: SourcesConfig,
}

/// Base URLs of the listing sites, overridable for staging and tests
#[derive(Debug, Clone)]
pub struct SourcesConfig {
    pub devfolio_base_url: String,
    pub unstop_base_url: String,
    pub devpost_base_url: String,
    pub eventbrite_base_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            devfolio_base_url: devfolio::DEFAULT_BASE_URL.to_string(),
            unstop_base_url: unstop::DEFAULT_BASE_URL.to_string(),
            devpost_base_url: devpost::DEFAULT_BASE_URL.to_string(),
            eventbrite_base_url: eventbrite::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl SourcesConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            devfolio_base_url: env::var("DEVFOLIO_BASE_URL").unwrap_or(defaults.devfolio_base_url),
            unstop_base_url: env::var("UNSTOP_BASE_URL").unwrap_or(defaults.unstop_base_url),
            devpost_base_url: env::var("DEVPOST_BASE_URL").unwrap_or(defaults.devpost_base_url),
            eventbrite_base_url: env::var("EVENTBRITE_BASE_URL")
                .unwrap_or(defaults.eventbrite_base_url),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            scrape_cron: env::var("SCRAPE_CRON").unwrap_or_else(|_| DEFAULT_SCRAPE_CRON.to_string()),
            scheduler_autostart: parse_bool(env::var("SCHEDULER_AUTOSTART").ok().as_deref(), true)
                .context("SCHEDULER_AUTOSTART must be true or false")?,
            http_timeout: Duration::from_secs(
                env::var("HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            sources: SourcesConfig::from_env(),
        })
    }
}

fn parse_bool(value: Option<&str>, default: bool) -> Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if v.is_empty() => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => anyhow::bail!("invalid boolean: {}", other),
        },
    }
}
