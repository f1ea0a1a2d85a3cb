//! PostgreSQL-backed event store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::domains::events::error::{StoreError, StoreResult};
use crate::domains::events::models::{Event, NewEvent};
use crate::kernel::BaseEventStore;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Event store backed by the `events` table.
#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BaseEventStore for PostgresEventStore {
    async fn find_by_title_and_host(
        &self,
        title: &str,
        hosted_by: &str,
    ) -> StoreResult<Option<Event>> {
        Event::find_by_title_and_host(title, hosted_by, &self.pool).await
    }

    async fn insert(&self, event: &NewEvent) -> StoreResult<Option<Event>> {
        Event::create(event, &self.pool).await
    }

    async fn delete_expired(&self, as_of: NaiveDate) -> StoreResult<u64> {
        Event::delete_expired(as_of, &self.pool).await
    }

    async fn list_by_deadline(&self) -> StoreResult<Vec<Event>> {
        Event::find_all_by_deadline(&self.pool).await
    }

    async fn health_check(&self) -> StoreResult<()> {
        match tokio::time::timeout(
            HEALTH_CHECK_TIMEOUT,
            sqlx::query("SELECT 1").execute(&self.pool),
        )
        .await
        {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(StoreError::Database(sqlx::Error::PoolTimedOut)),
        }
    }
}
