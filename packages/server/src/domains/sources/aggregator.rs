//! Runs every registered source in order and concatenates their listings.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info};

use crate::domains::events::NewEvent;
use crate::kernel::BaseEventSource;

/// Sequential fan-in over the registered sources.
///
/// Sources run one at a time, never concurrently, so at most one outbound
/// request is in flight. A source that panics is logged and contributes
/// nothing; the remaining sources still run.
#[derive(Clone, Default)]
pub struct Aggregator {
    sources: Vec<Arc<dyn BaseEventSource>>,
}

impl Aggregator {
    pub fn new(sources: Vec<Arc<dyn BaseEventSource>>) -> Self {
        Self { sources }
    }

    pub fn with_source(mut self, source: Arc<dyn BaseEventSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Collect listings from every source, in registration order.
    pub async fn collect(&self) -> Vec<NewEvent> {
        let mut all_events = Vec::new();

        for source in &self.sources {
            match AssertUnwindSafe(source.fetch()).catch_unwind().await {
                Ok(events) => {
                    info!(source = %source.name(), count = events.len(), "Source finished");
                    all_events.extend(events);
                }
                Err(_) => {
                    error!(source = %source.name(), "Source panicked, skipping");
                }
            }
        }

        info!(total = all_events.len(), "Total events scraped");
        all_events
    }
}
