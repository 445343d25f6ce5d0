//! Sitemap XML parsing
//!
//! Handles standard `<urlset>` sitemaps and plain-text URL lists. Entries
//! are returned in document order, duplicates included.

use crate::error::{Error, Result};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

/// Fetch a sitemap and return every page URL it lists.
///
/// Fails with [`Error::Network`] on transport failure or non-success status
/// and with [`Error::EmptySitemap`] when no URLs are found (including
/// malformed XML that yields none).
pub async fn fetch_sitemap(client: &Client, sitemap_url: &str) -> Result<Vec<String>> {
    info!("Fetching sitemap: {}", sitemap_url);

    let response = client
        .get(sitemap_url)
        .send()
        .await
        .map_err(|e| Error::Network(format!("{}: {}", sitemap_url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Network(format!("HTTP {}: {}", status, sitemap_url)));
    }

    let content = response
        .text()
        .await
        .map_err(|e| Error::Network(format!("{}: {}", sitemap_url, e)))?;

    let urls = parse_sitemap(&content);
    if urls.is_empty() {
        return Err(Error::EmptySitemap);
    }

    debug!("Found {} URLs in sitemap", urls.len());
    Ok(urls)
}

/// Parse sitemap content into page URLs.
pub fn parse_sitemap(content: &str) -> Vec<String> {
    if content.contains("<urlset") {
        parse_urlset(content)
    } else {
        parse_plain_text(content)
    }
}

/// Parse a urlset sitemap.
///
/// Simple XML parsing using string operations; a full XML parser would be
/// better but this keeps dependencies minimal.
fn parse_urlset(content: &str) -> Vec<String> {
    let mut urls = Vec::new();

    for url_block in content.split("<url>").skip(1) {
        if let Some(end) = url_block.find("</url>") {
            let block = &url_block[..end];

            if let Some(loc) = extract_tag(block, "loc") {
                // Drop entries that are not absolute URLs
                if Url::parse(&loc).is_ok() {
                    urls.push(loc);
                }
            }
        }
    }

    urls
}

/// Parse a plain text list of URLs.
fn parse_plain_text(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("http://") || line.starts_with("https://"))
        .filter(|line| Url::parse(line).is_ok())
        .map(str::to_string)
        .collect()
}

/// Extract text content from an XML tag.
fn extract_tag(content: &str, tag: &str) -> Option<String> {
    let start_tag = format!("<{}>", tag);
    let end_tag = format!("</{}>", tag);

    content.find(&start_tag).and_then(|start| {
        let value_start = start + start_tag.len();
        content[value_start..]
            .find(&end_tag)
            .map(|end| content[value_start..value_start + end].trim().to_string())
    })
}
