use thiserror::Error;

/// Failures while pulling listings from an external source.
///
/// These never leave an adapter: they are logged and the affected page or
/// item is dropped.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Malformed response: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;
