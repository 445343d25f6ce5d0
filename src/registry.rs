//! Site registry
//!
//! The registry is the single source of truth for which sites (and thus
//! which indexes) exist. It lives under the key-value key `"websites"` as
//! the full site list; every mutation rewrites the entire list.

use crate::error::{Error, Result};
use crate::storage::{FileStore, KvStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Key under which the site list is persisted.
pub const REGISTRY_KEY: &str = "websites";

/// A registered website
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: Uuid,
    pub name: String,
    pub hostname: String,
    pub sitemap_url: String,
    /// Storage-relative path of the site's serialized search index
    pub index_path: String,
    pub created_at: DateTime<Utc>,
}

impl Site {
    pub fn new(name: String, hostname: String, sitemap_url: String, index_path: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            hostname,
            sitemap_url,
            index_path,
            created_at: Utc::now(),
        }
    }
}

/// The in-session site list, loaded once from the key-value store.
pub struct SiteRegistry {
    kv: KvStore,
    sites: Vec<Site>,
}

impl SiteRegistry {
    /// Load the registry, defaulting to empty when nothing is persisted.
    pub fn load(kv: KvStore) -> Result<Self> {
        let sites = match kv.get(REGISTRY_KEY)? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| Error::RegistryPersist(format!("corrupt site list: {}", e)))?,
            None => Vec::new(),
        };
        Ok(Self { kv, sites })
    }

    /// Current sites, in registration order.
    pub fn list(&self) -> &[Site] {
        &self.sites
    }

    /// Find a site by id, hostname, or name.
    pub fn find(&self, reference: &str) -> Option<&Site> {
        self.sites.iter().find(|s| {
            s.id.to_string() == reference || s.hostname == reference || s.name == reference
        })
    }

    /// Register a site, persisting the full updated list.
    ///
    /// Hostnames are unique: re-adding a hostname replaces the previous
    /// entry.
    pub fn add(&mut self, site: Site) -> Result<()> {
        if let Some(pos) = self.sites.iter().position(|s| s.hostname == site.hostname) {
            let old = self.sites.remove(pos);
            info!("Replacing existing site for {}", old.hostname);
        }
        self.sites.push(site);
        self.persist()
    }

    /// Remove a site by id and delete its hostname-scoped storage tree.
    ///
    /// Removing an unknown id leaves the list unchanged and returns false.
    pub fn remove(&mut self, id: Uuid, files: &FileStore) -> Result<bool> {
        let Some(pos) = self.sites.iter().position(|s| s.id == id) else {
            return Ok(false);
        };

        let site = self.sites.remove(pos);
        self.persist()?;

        if let Err(e) = files.delete_prefix(&site.hostname) {
            warn!("Failed to delete stored content for {}: {}", site.hostname, e);
        }

        info!("Removed site {} ({})", site.name, site.hostname);
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        let value = serde_json::to_value(&self.sites)
            .map_err(|e| Error::RegistryPersist(e.to_string()))?;
        self.kv
            .set(REGISTRY_KEY, value)
            .map_err(|e| Error::RegistryPersist(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_site(name: &str, hostname: &str) -> Site {
        Site::new(
            name.to_string(),
            hostname.to_string(),
            format!("https://{}/sitemap.xml", hostname),
            format!("{}/index", hostname),
        )
    }

    fn open(tmp: &TempDir) -> (SiteRegistry, FileStore) {
        let kv = KvStore::new(tmp.path().join("kv.json"));
        let files = FileStore::new(tmp.path().join("data"));
        (SiteRegistry::load(kv).unwrap(), files)
    }

    #[test]
    fn test_load_defaults_to_empty() {
        let tmp = TempDir::new().unwrap();
        let (registry, _) = open(&tmp);
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_add_persists_full_list() {
        let tmp = TempDir::new().unwrap();
        let (mut registry, _) = open(&tmp);

        registry.add(test_site("Docs", "docs.example.com")).unwrap();
        registry.add(test_site("Blog", "blog.example.com")).unwrap();

        // reload from disk
        let (reloaded, _) = open(&tmp);
        assert_eq!(reloaded.list().len(), 2);
        assert_eq!(reloaded.list()[0].name, "Docs");
        assert_eq!(reloaded.list()[1].name, "Blog");
    }

    #[test]
    fn test_add_replaces_same_hostname() {
        let tmp = TempDir::new().unwrap();
        let (mut registry, _) = open(&tmp);

        registry.add(test_site("Old", "docs.example.com")).unwrap();
        registry.add(test_site("New", "docs.example.com")).unwrap();

        assert_eq!(registry.list().len(), 1);
        assert_eq!(registry.list()[0].name, "New");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let (mut registry, files) = open(&tmp);

        let site = test_site("Docs", "docs.example.com");
        let id = site.id;
        registry.add(site).unwrap();

        assert!(registry.remove(id, &files).unwrap());
        assert!(!registry.remove(id, &files).unwrap());
        assert!(registry.list().is_empty());

        // persisted list excludes the removed site
        let (reloaded, _) = open(&tmp);
        assert!(reloaded.list().is_empty());
    }

    #[test]
    fn test_remove_deletes_hostname_tree() {
        let tmp = TempDir::new().unwrap();
        let (mut registry, files) = open(&tmp);

        files
            .write("docs.example.com/a#content.txt", "body")
            .unwrap();
        let site = test_site("Docs", "docs.example.com");
        let id = site.id;
        registry.add(site).unwrap();

        registry.remove(id, &files).unwrap();
        assert!(files.read("docs.example.com/a#content.txt").is_err());
    }

    #[test]
    fn test_find_by_id_hostname_or_name() {
        let tmp = TempDir::new().unwrap();
        let (mut registry, _) = open(&tmp);

        let site = test_site("Docs", "docs.example.com");
        let id = site.id;
        registry.add(site).unwrap();

        assert!(registry.find(&id.to_string()).is_some());
        assert!(registry.find("docs.example.com").is_some());
        assert!(registry.find("Docs").is_some());
        assert!(registry.find("nope").is_none());
    }
}
