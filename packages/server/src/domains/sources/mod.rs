//! Sources domain - one adapter per external listing site
//!
//! Each adapter implements [`BaseEventSource`](crate::kernel::BaseEventSource):
//! fetch raw listings, map them onto [`NewEvent`](crate::domains::events::NewEvent),
//! and swallow its own failures.

pub mod aggregator;
pub mod devfolio;
pub mod devpost;
pub mod error;
pub mod eventbrite;
pub mod unstop;

use std::sync::Arc;

pub use aggregator::Aggregator;
pub use devfolio::DevfolioSource;
pub use devpost::DevpostSource;
pub use error::{SourceError, SourceResult};
pub use eventbrite::EventbriteSource;
pub use unstop::UnstopSource;

use crate::config::SourcesConfig;
use crate::kernel::BaseEventSource;

/// The production source lineup, in collection order.
pub fn default_sources(
    config: &SourcesConfig,
    client: reqwest::Client,
) -> Vec<Arc<dyn BaseEventSource>> {
    vec![
        Arc::new(DevfolioSource::new(client.clone(), &config.devfolio_base_url)),
        Arc::new(UnstopSource::new(client.clone(), &config.unstop_base_url)),
        Arc::new(DevpostSource::new(client.clone(), &config.devpost_base_url)),
        Arc::new(EventbriteSource::new(client, &config.eventbrite_base_url)),
    ]
}
