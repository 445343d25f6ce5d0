//! Per-site full-text index
//!
//! Each registered site owns one tantivy index over the `title` and `text`
//! fields of its extracted pages, with the page's storage id stored for
//! lookups. Indexes are built once per ingestion from the full page batch;
//! a rebuild always starts from an empty directory.

use crate::error::{Error, Result};
use crate::parse::ExtractedPage;
use std::path::Path;
use tantivy::collector::TopDocs;
use tantivy::query::QueryParser;
use tantivy::schema::{Field, Schema, Value, STORED, STRING, TEXT};
use tantivy::{doc, Index, TantivyDocument};
use tracing::debug;

/// Storage-relative directory name of a site's index, under its hostname.
pub const INDEX_DIR_NAME: &str = "index";

/// A ranked search hit.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
}

fn build_schema() -> Schema {
    let mut schema_builder = Schema::builder();
    schema_builder.add_text_field("id", STRING | STORED);
    schema_builder.add_text_field("title", TEXT);
    schema_builder.add_text_field("text", TEXT);
    schema_builder.build()
}

/// Build a fresh index from the full page batch and persist it in `dir`.
///
/// Any existing index at `dir` is replaced. All pages are added through a
/// single writer and committed once.
pub fn build_index(pages: &[ExtractedPage], dir: &Path) -> Result<()> {
    let persist = |e: tantivy::TantivyError| Error::IndexPersist(e.to_string());

    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| Error::IndexPersist(e.to_string()))?;
    }
    std::fs::create_dir_all(dir).map_err(|e| Error::IndexPersist(e.to_string()))?;

    let schema = build_schema();
    let index = Index::create_in_dir(dir, schema.clone()).map_err(persist)?;

    let id_field = schema.get_field("id").map_err(persist)?;
    let title_field = schema.get_field("title").map_err(persist)?;
    let text_field = schema.get_field("text").map_err(persist)?;

    let mut writer = index.writer(50_000_000).map_err(persist)?;
    for page in pages {
        writer
            .add_document(doc!(
                id_field => page.id.clone(),
                title_field => page.title.clone(),
                text_field => page.text.clone(),
            ))
            .map_err(persist)?;
    }
    writer.commit().map_err(persist)?;

    debug!("Indexed {} pages into {:?}", pages.len(), dir);
    Ok(())
}

/// A site's index opened for querying.
#[derive(Debug)]
pub struct SiteIndex {
    index: Index,
    id_field: Field,
    title_field: Field,
    text_field: Field,
}

impl SiteIndex {
    /// Open a previously built index.
    pub fn open(dir: &Path) -> Result<Self> {
        let unavailable = |e: tantivy::TantivyError| Error::RetrievalUnavailable(e.to_string());

        let index = Index::open_in_dir(dir).map_err(unavailable)?;
        let schema = index.schema();
        let id_field = schema.get_field("id").map_err(unavailable)?;
        let title_field = schema.get_field("title").map_err(unavailable)?;
        let text_field = schema.get_field("text").map_err(unavailable)?;

        Ok(Self {
            index,
            id_field,
            title_field,
            text_field,
        })
    }

    /// Run a ranked query over title and text, returning up to `limit` hits.
    ///
    /// A query the parser rejects yields no hits rather than an error.
    pub fn search(&self, query_text: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let reader = self
            .index
            .reader()
            .map_err(|e| Error::Other(e.to_string()))?;
        let searcher = reader.searcher();

        let parser = QueryParser::for_index(&self.index, vec![self.title_field, self.text_field]);
        let query = match parser.parse_query(query_text) {
            Ok(q) => q,
            Err(e) => {
                debug!("Unparsable query {:?}: {}", query_text, e);
                return Ok(Vec::new());
            }
        };

        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .map_err(|e| Error::Other(e.to_string()))?;

        let mut hits = Vec::new();
        for (score, addr) in top_docs {
            let doc: TantivyDocument = searcher.doc(addr).map_err(|e| Error::Other(e.to_string()))?;
            let id = doc
                .get_first(self.id_field)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            hits.push(SearchHit { id, score });
        }
        Ok(hits)
    }
}
