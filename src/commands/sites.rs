//! Site listing and removal commands

use crate::error::Result;
use crate::registry::{Site, SiteRegistry};
use crate::storage::FileStore;

/// Remove a site by id, hostname, or name.
///
/// Returns false when no matching site exists; removal is idempotent.
pub fn cmd_remove_site(
    registry: &mut SiteRegistry,
    files: &FileStore,
    reference: &str,
) -> Result<bool> {
    let Some(id) = registry.find(reference).map(|s| s.id) else {
        return Ok(false);
    };
    registry.remove(id, files)
}

/// Print sites in a human-readable table.
pub fn print_sites(sites: &[Site]) {
    if sites.is_empty() {
        println!("No sites registered. Add one with 'stampy add <name> <sitemap-url>'.");
        return;
    }

    for site in sites {
        println!("{}  {}", site.id, site.name);
        println!("    hostname: {}", site.hostname);
        println!("    sitemap:  {}", site.sitemap_url);
        println!("    index:    {}", site.index_path);
    }
}
