use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use typed_builder::TypedBuilder;
use uuid::Uuid;

use crate::domains::events::error::StoreResult;

/// A listing as persisted in the `events` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub tags: Vec<String>,
    pub hosted_by: String,
    pub verified: bool,
    #[serde(rename = "redirectURL")]
    pub redirect_url: String,
    pub created_at: DateTime<Utc>,
}

/// Canonical listing produced by a source adapter, not yet persisted.
///
/// `(title, hosted_by)` is the identity used for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(setter(into)))]
pub struct NewEvent {
    pub title: String,
    #[builder(default)]
    pub description: String,
    #[serde(rename = "type")]
    #[builder(default = String::from("hackathon"))]
    pub event_type: String,
    #[builder(default)]
    pub start_date: Option<NaiveDate>,
    #[builder(default)]
    pub end_date: Option<NaiveDate>,
    #[builder(default)]
    pub deadline: Option<NaiveDate>,
    #[builder(default)]
    pub tags: Vec<String>,
    pub hosted_by: String,
    #[builder(default = true)]
    pub verified: bool,
    #[serde(rename = "redirectURL")]
    #[builder(default)]
    pub redirect_url: String,
}

impl NewEvent {
    /// The deduplication key.
    pub fn identity(&self) -> (&str, &str) {
        (&self.title, &self.hosted_by)
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Materialize the row the store would return for this listing.
    pub fn into_event(self, id: Uuid, created_at: DateTime<Utc>) -> Event {
        Event {
            id,
            title: self.title,
            description: self.description,
            event_type: self.event_type,
            start_date: self.start_date,
            end_date: self.end_date,
            deadline: self.deadline,
            tags: self.tags,
            hosted_by: self.hosted_by,
            verified: self.verified,
            redirect_url: self.redirect_url,
            created_at,
        }
    }
}

impl Event {
    /// Point lookup on the deduplication key
    pub async fn find_by_title_and_host(
        title: &str,
        hosted_by: &str,
        pool: &PgPool,
    ) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM events WHERE title = $1 AND hosted_by = $2 LIMIT 1",
        )
        .bind(title)
        .bind(hosted_by)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Insert a listing.
    ///
    /// Returns `None` when a row with the same `(title, hosted_by)` already
    /// exists, including one inserted concurrently by another run.
    pub async fn create(event: &NewEvent, pool: &PgPool) -> StoreResult<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO events (
                id, title, description, event_type, start_date, end_date,
                deadline, tags, hosted_by, verified, redirect_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (title, hosted_by) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.event_type)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.deadline)
        .bind(&event.tags)
        .bind(&event.hosted_by)
        .bind(event.verified)
        .bind(&event.redirect_url)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Delete every listing whose deadline is strictly before `as_of`.
    ///
    /// Rows without a deadline are never expired.
    pub async fn delete_expired(as_of: NaiveDate, pool: &PgPool) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM events WHERE deadline < $1")
            .bind(as_of)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// All listings, soonest deadline first, undated listings last
    pub async fn find_all_by_deadline(pool: &PgPool) -> StoreResult<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM events ORDER BY deadline ASC NULLS LAST, created_at ASC, id ASC",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
