pub mod events;
pub mod scraping;
pub mod sources;
