//! Test fixtures for creating test data.
//!
//! Titles carry a random suffix so tests sharing the Postgres container
//! never collide on `(title, hosted_by)`.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use hackradar_core::domains::events::{Event, NewEvent};
use sqlx::PgPool;
use uuid::Uuid;

/// A unique title with a readable prefix
pub fn unique_title(prefix: &str) -> String {
    format!("{} {}", prefix, Uuid::new_v4().simple())
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// A listing with a title, host and optional deadline
pub fn new_event(title: &str, hosted_by: &str, deadline: Option<NaiveDate>) -> NewEvent {
    NewEvent::builder()
        .title(title)
        .hosted_by(hosted_by)
        .description("Fixture hackathon")
        .tags(vec!["hackathon".to_string()])
        .deadline(deadline)
        .build()
}

/// Insert a listing directly through the model
pub async fn create_test_event(
    pool: &PgPool,
    title: &str,
    hosted_by: &str,
    deadline: Option<NaiveDate>,
) -> Result<Event> {
    Event::create(&new_event(title, hosted_by, deadline), pool)
        .await?
        .context("fixture event already exists")
}
