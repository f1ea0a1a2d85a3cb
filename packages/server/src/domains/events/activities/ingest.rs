//! Deduplication and persistence gate.
//!
//! Every scraped listing passes through here before it reaches storage.
//! A listing is written at most once per `(title, hosted_by)` pair; anything
//! that goes wrong with a single listing is logged and the batch moves on.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::domains::events::models::{Event, NewEvent};
use crate::kernel::BaseEventStore;

/// Outcome of one ingest pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    /// Listings offered to the gate
    pub scraped: usize,
    /// Listings newly written to the store
    pub saved: usize,
    pub saved_events: Vec<Event>,
}

/// Dedupe-before-insert gate over an event store.
#[derive(Clone)]
pub struct EventGate {
    store: Arc<dyn BaseEventStore>,
}

impl EventGate {
    pub fn new(store: Arc<dyn BaseEventStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn BaseEventStore> {
        &self.store
    }

    /// Persist every listing not already stored, in input order.
    pub async fn ingest(&self, events: Vec<NewEvent>) -> IngestSummary {
        if events.is_empty() {
            info!("No events received to process");
            return IngestSummary::default();
        }

        let scraped = events.len();
        let mut saved_events = Vec::new();

        for event in events {
            if let Some(saved) = self.ingest_one(&event).await {
                saved_events.push(saved);
            }
        }

        info!(scraped, saved = saved_events.len(), "Ingest complete");

        IngestSummary {
            scraped,
            saved: saved_events.len(),
            saved_events,
        }
    }

    async fn ingest_one(&self, event: &NewEvent) -> Option<Event> {
        if !event.has_title() {
            warn!(hosted_by = %event.hosted_by, "Skipping event without a title");
            return None;
        }

        let (title, hosted_by) = event.identity();

        match self.store.find_by_title_and_host(title, hosted_by).await {
            Ok(Some(_)) => {
                debug!(title, hosted_by, "Event already stored");
                return None;
            }
            Ok(None) => {}
            Err(e) => {
                error!(title, hosted_by, error = %e, "Duplicate check failed, skipping event");
                return None;
            }
        }

        match self.store.insert(event).await {
            Ok(Some(saved)) => Some(saved),
            Ok(None) => {
                debug!(title, hosted_by, "Event stored concurrently, skipping");
                None
            }
            Err(e) => {
                error!(title, hosted_by, error = %e, "Error saving event");
                None
            }
        }
    }

    /// Delete listings whose deadline is strictly before `as_of`.
    ///
    /// Returns the number of rows removed; store failures count as zero.
    pub async fn expire(&self, as_of: NaiveDate) -> u64 {
        match self.store.delete_expired(as_of).await {
            Ok(deleted) => {
                info!(%as_of, deleted, "Expired events removed");
                deleted
            }
            Err(e) => {
                error!(%as_of, error = %e, "Error deleting expired events");
                0
            }
        }
    }
}
