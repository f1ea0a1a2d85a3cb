//! Scraping domain - the end-to-end pipeline run by the scheduler and on demand

pub mod pipeline;

pub use pipeline::{PipelineReport, ScrapePipeline};
