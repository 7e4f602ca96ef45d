//! Joins search-index results against the website registry
//!
//! The search index outlives the websites it references: a website can be
//! deleted while its files are still indexed. Every enrichment call takes a
//! fresh snapshot of the registry and resolves each `website_id` to a URL,
//! substituting [`DELETED_WEBSITE`] when the website is gone. Missing
//! websites never fail the call or drop a hit.

mod types;

pub use types::{HitsEnvelope, IndexedDocument, ScatterEntry, SearchHit, SearchPage, SiteStats};

use crate::storage::{StorageResult, WebsiteRegistry};
use std::collections::HashMap;

/// Placeholder URL for websites that no longer exist
pub const DELETED_WEBSITE: &str = "[DELETED]";

/// Resolves a website ID against a registry snapshot
fn resolve(websites: &HashMap<i64, String>, website_id: i64) -> String {
    websites
        .get(&website_id)
        .cloned()
        .unwrap_or_else(|| DELETED_WEBSITE.to_string())
}

/// Attaches website URLs to search engine output
pub struct SearchEnrichment<'a, R: ?Sized> {
    registry: &'a R,
}

impl<'a, R: WebsiteRegistry + ?Sized> SearchEnrichment<'a, R> {
    pub fn new(registry: &'a R) -> Self {
        Self { registry }
    }

    /// Sets `website_url` on every hit of a search page
    pub fn enrich_search_page(&self, mut page: SearchPage) -> StorageResult<SearchPage> {
        let websites = self.registry.all_websites()?;

        let mut deleted = 0usize;
        for hit in &mut page.hits.hits {
            let url = resolve(&websites, hit.source.website_id);
            if url == DELETED_WEBSITE {
                deleted += 1;
            }
            hit.source.website_url = Some(url);
        }

        if deleted > 0 {
            tracing::debug!(
                deleted,
                hits = page.hits.hits.len(),
                "search hits reference deleted websites"
            );
        }
        Ok(page)
    }

    /// Lazily sets `website_url` on each document of a scan
    ///
    /// The registry snapshot is taken up front; documents are resolved one
    /// at a time as the returned iterator is advanced.
    pub fn enrich_docs<I>(&self, docs: I) -> StorageResult<EnrichedDocs<I::IntoIter>>
    where
        I: IntoIterator<Item = SearchHit>,
    {
        Ok(EnrichedDocs {
            websites: self.registry.all_websites()?,
            docs: docs.into_iter(),
        })
    }

    /// Sets `website_url` on every point of the website scatter series
    pub fn enrich_stats_scatter(&self, stats: &mut SiteStats) -> StorageResult<()> {
        let websites = self.registry.all_websites()?;

        for entry in &mut stats.website_scatter {
            entry.website_url = Some(resolve(&websites, entry.website_id));
        }

        Ok(())
    }
}

/// Iterator returned by [`SearchEnrichment::enrich_docs`]
pub struct EnrichedDocs<I> {
    websites: HashMap<i64, String>,
    docs: I,
}

impl<I: Iterator<Item = SearchHit>> Iterator for EnrichedDocs<I> {
    type Item = SearchHit;

    fn next(&mut self) -> Option<SearchHit> {
        let mut doc = self.docs.next()?;
        doc.source.website_url = Some(resolve(&self.websites, doc.source.website_id));
        Some(doc)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.docs.size_hint()
    }
}
