//! Add-site command implementation
//!
//! The ingestion pipeline: fetch the sitemap, extract every listed page,
//! persist the page texts, build the site's search index, and only then
//! register the site. A failure at any stage aborts before registration.

use crate::config::Config;
use crate::crawl::{fetch_page, fetch_sitemap, http_client};
use crate::error::{Error, Result};
use crate::index::{build_index, INDEX_DIR_NAME};
use crate::parse::{extract_page, ExtractedPage};
use crate::registry::{Site, SiteRegistry};
use crate::storage::FileStore;
use indicatif::ProgressBar;
use tracing::{info, warn};
use url::Url;

/// Statistics from an ingestion run
#[derive(Debug, Default)]
pub struct IngestStats {
    pub urls_found: usize,
    pub pages_extracted: usize,
    pub pages_skipped: usize,
}

/// Run the full ingestion pipeline and register the site.
pub async fn cmd_add_site(
    config: &Config,
    files: &FileStore,
    registry: &mut SiteRegistry,
    name: &str,
    sitemap_url: &str,
) -> Result<(Site, IngestStats)> {
    let client = http_client(&config.crawl)?;

    // 1. fetch and parse the sitemap
    let mut urls = fetch_sitemap(&client, sitemap_url).await?;
    let mut stats = IngestStats {
        urls_found: urls.len(),
        ..IngestStats::default()
    };

    if urls.len() > config.crawl.max_pages as usize {
        warn!(
            "Sitemap lists {} URLs, limiting to {}",
            urls.len(),
            config.crawl.max_pages
        );
        urls.truncate(config.crawl.max_pages as usize);
    }

    // 2. fetch all pages concurrently, isolating per-URL failures
    let fetches = urls.iter().map(|url| fetch_page(&client, url));
    let bodies = futures::future::join_all(fetches).await;

    // 3. extract title and text from each page
    let pb = ProgressBar::new(urls.len() as u64);
    let mut pages: Vec<ExtractedPage> = Vec::new();
    for (url, body) in urls.iter().zip(bodies) {
        pb.inc(1);
        match body.and_then(|html| extract_page(&html, url)) {
            Ok(page) => pages.push(page),
            Err(e) => {
                warn!("Skipping {}: {}", url, e);
                stats.pages_skipped += 1;
            }
        }
    }
    pb.finish_and_clear();

    if pages.is_empty() {
        return Err(Error::NoContentExtracted);
    }

    // 4. persist the page texts; the storage backend misbehaves under
    //    concurrent writes, so these stay strictly sequential
    let mut stored: Vec<ExtractedPage> = Vec::new();
    for page in pages {
        match files.write(&page.id, &page.text) {
            Ok(()) => stored.push(page),
            Err(e) => {
                warn!("Skipping {}: {}", page.id, e);
                stats.pages_skipped += 1;
            }
        }
    }

    if stored.is_empty() {
        return Err(Error::Other(
            "failed to store any extracted documents".to_string(),
        ));
    }
    stats.pages_extracted = stored.len();

    // 5. build and persist the search index under the site's hostname
    let hostname = Url::parse(sitemap_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .ok_or_else(|| {
            Error::IndexPersist(format!("cannot derive hostname from {}", sitemap_url))
        })?;

    let index_path = format!("{}/{}", hostname, INDEX_DIR_NAME);
    build_index(&stored, &files.resolve(&index_path))?;

    // 6. register the site, now that every prior stage has succeeded
    let site = Site::new(
        name.to_string(),
        hostname,
        sitemap_url.to_string(),
        index_path,
    );
    registry.add(site.clone())?;

    info!(
        "Registered {} with {} indexed pages",
        site.hostname, stats.pages_extracted
    );
    Ok((site, stats))
}
