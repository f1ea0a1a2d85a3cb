// TestDependencies - mock implementations for testing
//
// Provides in-memory sources and storage that can be wired into the
// pipeline and scheduler without network or database access.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::scheduled_tasks::ScrapeScheduler;
use super::{BaseEventSource, BaseEventStore};
use crate::domains::events::{Event, EventGate, NewEvent, StoreError, StoreResult};
use crate::domains::scraping::ScrapePipeline;
use crate::domains::sources::Aggregator;

// =============================================================================
// Mock Event Source
// =============================================================================

pub struct MockEventSource {
    name: String,
    events: Vec<NewEvent>,
    delay: Option<Duration>,
    panics: bool,
    calls: AtomicUsize,
}

impl MockEventSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            events: Vec::new(),
            delay: None,
            panics: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Listings returned by every fetch
    pub fn with_events(mut self, events: Vec<NewEvent>) -> Self {
        self.events = events;
        self
    }

    /// Add a listing with only a title and host set
    pub fn with_event(mut self, title: &str, hosted_by: &str) -> Self {
        self.events
            .push(NewEvent::builder().title(title).hosted_by(hosted_by).build());
        self
    }

    /// Sleep before returning, to keep a run in flight
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Panic instead of returning
    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    /// Number of times fetch was called
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BaseEventSource for MockEventSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Vec<NewEvent> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panics {
            panic!("mock source '{}' panicked", self.name);
        }

        self.events.clone()
    }
}

// =============================================================================
// Memory Event Store
// =============================================================================

/// In-memory event store with the same uniqueness and ordering rules as the
/// `events` table. Individual operations can be made to fail.
#[derive(Default)]
pub struct MemoryEventStore {
    events: RwLock<Vec<Event>>,
    fail_lookups: AtomicBool,
    fail_inserts_for: Mutex<Vec<String>>,
    fail_deletes: AtomicBool,
    fail_lists: AtomicBool,
    fail_health: AtomicBool,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a stored listing directly, bypassing the uniqueness check
    pub fn with_event(self, event: NewEvent) -> Self {
        self.events
            .write()
            .unwrap()
            .push(event.into_event(Uuid::new_v4(), Utc::now()));
        self
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    /// Make inserts of the listing with this title fail
    pub fn fail_insert_of(&self, title: &str) {
        self.fail_inserts_for.lock().unwrap().push(title.to_string());
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn fail_health(&self, fail: bool) {
        self.fail_health.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.events.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn titles(&self) -> Vec<String> {
        self.events
            .read()
            .unwrap()
            .iter()
            .map(|e| e.title.clone())
            .collect()
    }

    fn unavailable() -> StoreError {
        StoreError::Database(sqlx::Error::PoolTimedOut)
    }
}

#[async_trait]
impl BaseEventStore for MemoryEventStore {
    async fn find_by_title_and_host(
        &self,
        title: &str,
        hosted_by: &str,
    ) -> StoreResult<Option<Event>> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }

        Ok(self
            .events
            .read()
            .unwrap()
            .iter()
            .find(|e| e.title == title && e.hosted_by == hosted_by)
            .cloned())
    }

    async fn insert(&self, event: &NewEvent) -> StoreResult<Option<Event>> {
        if self
            .fail_inserts_for
            .lock()
            .unwrap()
            .iter()
            .any(|t| *t == event.title)
        {
            return Err(Self::unavailable());
        }
        if !event.has_title() {
            return Err(StoreError::Rejected("title must not be empty".to_string()));
        }

        let mut events = self.events.write().unwrap();
        if events
            .iter()
            .any(|e| e.title == event.title && e.hosted_by == event.hosted_by)
        {
            return Ok(None);
        }

        let stored = event.clone().into_event(Uuid::new_v4(), Utc::now());
        events.push(stored.clone());
        Ok(Some(stored))
    }

    async fn delete_expired(&self, as_of: NaiveDate) -> StoreResult<u64> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }

        let mut events = self.events.write().unwrap();
        let before = events.len();
        events.retain(|e| e.deadline.map_or(true, |deadline| deadline >= as_of));
        Ok((before - events.len()) as u64)
    }

    async fn list_by_deadline(&self) -> StoreResult<Vec<Event>> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }

        let mut events = self.events.read().unwrap().clone();
        // Undated listings sort after every dated one
        events.sort_by(|a, b| {
            (a.deadline.is_none(), a.deadline, a.created_at)
                .cmp(&(b.deadline.is_none(), b.deadline, b.created_at))
        });
        Ok(events)
    }

    async fn health_check(&self) -> StoreResult<()> {
        if self.fail_health.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(())
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub store: Arc<MemoryEventStore>,
    pub sources: Vec<Arc<MockEventSource>>,
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryEventStore::new()),
            sources: Vec::new(),
        }
    }

    pub fn mock_store(mut self, store: MemoryEventStore) -> Self {
        self.store = Arc::new(store);
        self
    }

    pub fn mock_source(mut self, source: MockEventSource) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    pub fn aggregator(&self) -> Aggregator {
        self.sources
            .iter()
            .fold(Aggregator::default(), |aggregator, source| {
                aggregator.with_source(source.clone())
            })
    }

    pub fn gate(&self) -> EventGate {
        EventGate::new(self.store.clone())
    }

    pub fn pipeline(&self) -> Arc<ScrapePipeline> {
        Arc::new(ScrapePipeline::new(self.aggregator(), self.gate()))
    }

    /// Scheduler on the default hourly cron, not started
    pub fn scheduler(&self) -> Arc<ScrapeScheduler> {
        Arc::new(ScrapeScheduler::with_default_schedule(self.pipeline()))
    }

    /// Scheduler on a custom cron expression, not started
    pub fn scheduler_with_cron(&self, cron: &str) -> Arc<ScrapeScheduler> {
        Arc::new(ScrapeScheduler::new(self.pipeline(), cron))
    }
}
