//! HTTP fetcher
//!
//! Sends browser-like requests (Chrome user agent and header set) so that
//! ordinary news sites serve the same markup they serve a browser. Every
//! fetch failure (timeout, transport error, non-success status) collapses
//! to `None`; the URL is abandoned, never retried.

use crate::config::CrawlerConfig;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36";

const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

/// Builds the HTTP client shared by all workers
///
/// # Arguments
///
/// * `config` - Crawler configuration supplying the per-fetch timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert("accept", HeaderValue::from_static(ACCEPT));
    headers.insert(
        "sec-ch-ua",
        HeaderValue::from_static(r#""Google Chrome";v="135", "Not-A.Brand";v="8", "Chromium";v="135""#),
    );
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static(r#""Linux""#));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("none"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(Duration::from_millis(config.fetch_timeout_ms))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL's body, following redirects
///
/// # Returns
///
/// The response body on a successful status, `None` on timeout, transport
/// error, or a non-success status
pub async fn fetch_document(client: &Client, url: &str) -> Option<String> {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(url, error = %e, "Fetch failed");
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::debug!(url, status = %response.status(), "Non-success status");
        return None;
    }

    match response.text().await {
        Ok(body) => Some(body),
        Err(e) => {
            tracing::debug!(url, error = %e, "Failed to read body");
            None
        }
    }
}
