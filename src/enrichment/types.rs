//! Search engine result structures
//!
//! These mirror the shapes the search index returns (`_id`, `_score`,
//! `_source`). Fields this crate does not interpret are carried through
//! untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One page of a search response
///
/// Hits are nested under `hits.hits`, as the search engine returns them.
/// Everything else in the response (`took`, `aggregations`, ...) is carried
/// through in `fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub hits: HitsEnvelope,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SearchPage {
    /// Creates a page holding only the given hits
    pub fn from_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits: HitsEnvelope {
                hits,
                ..HitsEnvelope::default()
            },
            fields: Map::new(),
        }
    }
}

/// The `hits` object of a search response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitsEnvelope {
    /// Match count as reported by the engine: a number or a
    /// `{"value", "relation"}` object depending on the engine version
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub total: Value,

    #[serde(default)]
    pub hits: Vec<SearchHit>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// A single search hit or scanned document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "_score", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(rename = "_source")]
    pub source: IndexedDocument,
}

/// The indexed file record behind a hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub website_id: i64,

    /// Resolved by enrichment; `"[DELETED]"` if the website is gone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl IndexedDocument {
    /// Creates a document with no extra fields
    pub fn new(website_id: i64) -> Self {
        Self {
            website_id,
            website_url: None,
            fields: Map::new(),
        }
    }
}

/// Index-wide statistics with a per-website scatter series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteStats {
    #[serde(default)]
    pub website_scatter: Vec<ScatterEntry>,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// One point of the website scatter series
///
/// The engine emits each point as a `[website_id, value]` pair; struct-shaped
/// points are accepted as well. `value` is whatever the aggregation produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterEntry {
    pub website_id: i64,
    pub value: Value,

    /// Resolved by enrichment; `"[DELETED]"` if the website is gone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
}
