//! Kernel module - server infrastructure and dependencies.

pub mod http_client;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use http_client::{build_http_client, BROWSER_USER_AGENT};
pub use scheduled_tasks::{
    ScrapeScheduler, SchedulerError, SchedulerResult, SchedulerStatus, DEFAULT_SCRAPE_CRON,
};
pub use test_dependencies::{MemoryEventStore, MockEventSource, TestDependencies};
pub use traits::*;
