//! Events domain - canonical listings, their storage, and the ingest gate

pub mod activities;
pub mod error;
pub mod models;
pub mod store;

pub use activities::{EventGate, IngestSummary};
pub use error::{StoreError, StoreResult};
pub use models::{Event, NewEvent};
pub use store::PostgresEventStore;
