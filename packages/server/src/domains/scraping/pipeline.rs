//! Scrape pipeline: expire → collect → ingest.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::domains::events::{EventGate, IngestSummary};
use crate::domains::sources::Aggregator;

/// Result of one full pipeline pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReport {
    pub expired: u64,
    #[serde(flatten)]
    pub ingest: IngestSummary,
}

/// Wires the aggregator to the gate. Every step is fail-open, so a run
/// always produces a report.
#[derive(Clone)]
pub struct ScrapePipeline {
    aggregator: Aggregator,
    gate: EventGate,
}

impl ScrapePipeline {
    pub fn new(aggregator: Aggregator, gate: EventGate) -> Self {
        Self { aggregator, gate }
    }

    pub fn gate(&self) -> &EventGate {
        &self.gate
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Scheduled run: drop listings that expired before `today`, then scrape and ingest.
    pub async fn run(&self, today: NaiveDate) -> PipelineReport {
        info!(%today, "Starting scrape pipeline");

        let expired = self.gate.expire(today).await;
        let ingest = self.scrape().await;

        info!(
            expired,
            scraped = ingest.scraped,
            saved = ingest.saved,
            "Scrape pipeline finished"
        );

        PipelineReport { expired, ingest }
    }

    /// Collect from every source and ingest the result, without expiry.
    pub async fn scrape(&self) -> IngestSummary {
        let events = self.aggregator.collect().await;
        self.gate.ingest(events).await
    }
}
