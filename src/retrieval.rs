//! Retrieval adapter
//!
//! Loads a selected site's search index and answers `search_documents` tool
//! calls. Index loading is a per-site state machine:
//!
//! ```text
//! Unloaded -> Loading -> Ready
//!                     \-> LoadFailed
//! ```
//!
//! A failed load never fails the chat session; queries against anything but
//! `Ready` short-circuit with a fixed message instead.

use crate::index::SiteIndex;
use crate::registry::Site;
use crate::storage::FileStore;
use tracing::{debug, info, warn};

/// Returned when the query matches nothing in the index.
pub const NO_RESULTS_MESSAGE: &str = "No relevant documents found for your query.";

/// Returned when the selected site's index could not be loaded.
pub const INDEX_UNAVAILABLE_MESSAGE: &str = "The search index is not available for this site.";

/// Load state of the selected site's index.
pub enum IndexState {
    Unloaded,
    Loading,
    Ready(SiteIndex),
    LoadFailed,
}

impl IndexState {
    fn label(&self) -> &'static str {
        match self {
            IndexState::Unloaded => "unloaded",
            IndexState::Loading => "loading",
            IndexState::Ready(_) => "ready",
            IndexState::LoadFailed => "load_failed",
        }
    }
}

pub struct RetrievalAdapter {
    files: FileStore,
    state: IndexState,
    top_k: usize,
}

impl RetrievalAdapter {
    pub fn new(files: FileStore, top_k: usize) -> Self {
        Self {
            files,
            state: IndexState::Unloaded,
            top_k,
        }
    }

    /// Current load state, as a label (for status output and tests).
    pub fn state(&self) -> &'static str {
        self.state.label()
    }

    /// Load the index for a newly selected site.
    ///
    /// Returns whether the index is ready; on failure the adapter stays
    /// usable and reports unavailability per query.
    pub fn select_site(&mut self, site: &Site) -> bool {
        self.state = IndexState::Loading;
        let dir = self.files.resolve(&site.index_path);

        match SiteIndex::open(&dir) {
            Ok(index) => {
                info!("Loaded index for {}", site.hostname);
                self.state = IndexState::Ready(index);
                true
            }
            Err(e) => {
                warn!("Failed to load index for {}: {}", site.hostname, e);
                self.state = IndexState::LoadFailed;
                false
            }
        }
    }

    /// Execute a search tool call and return the passage text for the model.
    ///
    /// Never fails the chat turn: load and lookup problems degrade to fixed
    /// messages, and individual document reads that fail are skipped.
    pub fn search(&self, query: &str) -> String {
        let IndexState::Ready(index) = &self.state else {
            return INDEX_UNAVAILABLE_MESSAGE.to_string();
        };

        let hits = match index.search(query, self.top_k) {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Search failed for {:?}: {}", query, e);
                return NO_RESULTS_MESSAGE.to_string();
            }
        };

        if hits.is_empty() {
            return NO_RESULTS_MESSAGE.to_string();
        }

        debug!("Query {:?} matched {} documents", query, hits.len());

        let mut bodies = Vec::new();
        for hit in &hits {
            match self.files.read(&hit.id) {
                Ok(text) => bodies.push(text),
                Err(e) => warn!("Skipping unreadable document {}: {}", hit.id, e),
            }
        }

        if bodies.is_empty() {
            return NO_RESULTS_MESSAGE.to_string();
        }

        bodies.join("\n\n")
    }
}
