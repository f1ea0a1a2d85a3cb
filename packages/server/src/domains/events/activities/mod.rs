pub mod ingest;

pub use ingest::{EventGate, IngestSummary};
