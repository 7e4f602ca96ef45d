use crate::temp_store;
use crawl_ledger::enrichment::{SearchHit, SearchPage, SiteStats};
use crawl_ledger::storage::WebsiteRegistry;
use crawl_ledger::{SearchEnrichment, DELETED_WEBSITE};
use serde_json::json;

#[test]
fn test_engine_page_enriched_after_delete() {
    let (_dir, store) = temp_store();
    let a = store.insert_website("http://a.com/", None, None).unwrap();
    let b = store.insert_website("http://b.com/", None, None).unwrap();
    store.delete_website(b).unwrap();

    let page: SearchPage = serde_json::from_value(json!({
        "took": 4,
        "hits": {
            "total": 2,
            "max_score": 1.5,
            "hits": [
                {"_id": "x", "_score": 1.5, "_source": {"website_id": a, "name": "file.iso"}},
                {"_id": "y", "_score": 0.5, "_source": {"website_id": b, "name": "old.zip"}}
            ]
        }
    }))
    .unwrap();

    let page = SearchEnrichment::new(&store).enrich_search_page(page).unwrap();
    let out = serde_json::to_value(&page).unwrap();

    assert_eq!(out["hits"]["hits"][0]["_source"]["website_url"], json!("http://a.com/"));
    assert_eq!(out["hits"]["hits"][1]["_source"]["website_url"], json!(DELETED_WEBSITE));
    assert_eq!(out["hits"]["hits"][1]["_source"]["name"], json!("old.zip"));
    assert_eq!(out["hits"]["total"], json!(2));
    assert_eq!(out["took"], json!(4));
}

#[test]
fn test_scan_sees_registry_at_call_time() {
    let (_dir, store) = temp_store();
    let a = store.insert_website("http://a.com/", None, None).unwrap();

    let hits: Vec<SearchHit> = serde_json::from_value(json!([
        {"_id": "1", "_source": {"website_id": a}},
        {"_id": "2", "_source": {"website_id": a}}
    ]))
    .unwrap();

    let docs = SearchEnrichment::new(&store).enrich_docs(hits).unwrap();
    store.delete_website(a).unwrap();

    let urls: Vec<String> = docs.filter_map(|d| d.source.website_url).collect();
    assert_eq!(urls, vec!["http://a.com/", "http://a.com/"]);
}

#[test]
fn test_stats_scatter_from_engine_json() {
    let (_dir, store) = temp_store();
    let a = store.insert_website("http://a.com/", None, None).unwrap();

    let mut stats: SiteStats = serde_json::from_value(json!({
        "total_size": 1024,
        "website_scatter": [[a, 12], [777, 3.5]]
    }))
    .unwrap();

    SearchEnrichment::new(&store)
        .enrich_stats_scatter(&mut stats)
        .unwrap();

    assert_eq!(stats.website_scatter[0].website_url.as_deref(), Some("http://a.com/"));
    assert_eq!(stats.website_scatter[1].website_url.as_deref(), Some(DELETED_WEBSITE));
    assert_eq!(stats.website_scatter[1].value, json!(3.5));
    assert_eq!(stats.fields.get("total_size"), Some(&json!(1024)));
}
