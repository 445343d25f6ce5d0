//! Page fetching
//!
//! This module provides:
//! - Shared HTTP client construction with configurable timeouts
//! - Single-page fetching
//! - Sitemap XML parsing

mod sitemap;

pub use sitemap::*;

use crate::config::CrawlConfig;
use crate::error::{Error, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Build the HTTP client used for sitemap and page fetches.
pub fn http_client(config: &CrawlConfig) -> Result<Client> {
    Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .gzip(true)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))
}

/// Fetch a single page and return its body.
///
/// Transport failures and non-success statuses both surface as
/// [`Error::Network`].
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    debug!("Fetching: {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Network(format!("{}: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Network(format!("HTTP {}: {}", status, url)));
    }

    response
        .text()
        .await
        .map_err(|e| Error::Network(format!("{}: {}", url, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_page_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let client = http_client(&CrawlConfig::default()).unwrap();
        let body = fetch_page(&client, &format!("{}/page", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<html></html>");
    }

    #[tokio::test]
    async fn test_fetch_page_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = http_client(&CrawlConfig::default()).unwrap();
        let err = fetch_page(&client, &format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
