//! Shared HTTP plumbing for source adapters (reqwest).

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domains::sources::error::{SourceError, SourceResult};

/// Browser-like User-Agent; some listing sites serve bots an empty shell.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Build the client shared by all adapters.
pub fn build_http_client(timeout: Duration) -> SourceResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT_LANGUAGE,
        reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
    );

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;

    Ok(client)
}

/// GET `url` and return the body, failing on non-2xx statuses.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> SourceResult<String> {
    debug!(url = %url, "Fetching");
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    Ok(response.text().await?)
}

/// GET `url` and decode the body as JSON.
pub async fn fetch_json<T: DeserializeOwned>(client: &reqwest::Client, url: &str) -> SourceResult<T> {
    let body = fetch_text(client, url).await?;
    Ok(serde_json::from_str(&body)?)
}
