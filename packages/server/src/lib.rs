// HackRadar - hackathon listing aggregator
//
// Scrapes hackathon listings from public sites on a schedule, deduplicates
// them by (title, host) and serves them over a small JSON API.
//
// Domains live under domains/*; shared infrastructure under kernel/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
