// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Dedupe, expiry and scheduling are domain functions that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseEventSource, BaseEventStore)

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domains::events::error::StoreResult;
use crate::domains::events::models::{Event, NewEvent};

// =============================================================================
// Event Source Trait (one implementation per listing site)
// =============================================================================

#[async_trait]
pub trait BaseEventSource: Send + Sync {
    /// Short identifier used in logs ("devfolio", "unstop", ...)
    fn name(&self) -> &str;

    /// Fetch and normalize the current listings.
    ///
    /// Never fails: network, decode and per-item errors are logged inside the
    /// implementation, which returns whatever it managed to collect.
    async fn fetch(&self) -> Vec<NewEvent>;
}

// =============================================================================
// Event Store Trait (durable storage)
// =============================================================================

#[async_trait]
pub trait BaseEventStore: Send + Sync {
    /// Look up a listing by its deduplication key
    async fn find_by_title_and_host(&self, title: &str, hosted_by: &str)
        -> StoreResult<Option<Event>>;

    /// Insert a listing, returning `None` if the `(title, hosted_by)` pair already exists
    async fn insert(&self, event: &NewEvent) -> StoreResult<Option<Event>>;

    /// Delete listings whose deadline is strictly before `as_of`, returning the count
    async fn delete_expired(&self, as_of: NaiveDate) -> StoreResult<u64>;

    /// All listings ordered by deadline ascending, undated listings last
    async fn list_by_deadline(&self) -> StoreResult<Vec<Event>>;

    /// Cheap connectivity check for the health endpoint
    async fn health_check(&self) -> StoreResult<()>;
}
