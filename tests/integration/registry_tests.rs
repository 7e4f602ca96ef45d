use crate::temp_store;
use crawl_ledger::config::parse_config;
use crawl_ledger::storage::{
    get_schema_version, BlacklistPolicy, SqliteStore, StorageError, StoreOptions,
    WebsiteRegistry, SCHEMA_VERSION,
};
use crawl_ledger::{submit_website, Submission};
use std::collections::HashSet;
use std::thread;
use std::time::Duration;

#[test]
fn test_exists_is_prefix_match() {
    let (_dir, store) = temp_store();
    let id = store
        .insert_website("http://a.com/pub/", Some("10.0.0.1"), None)
        .unwrap();

    assert_eq!(store.website_exists("http://a.com/pub/iso/x").unwrap(), Some(id));
    assert_eq!(store.website_exists("http://a.com/pub/").unwrap(), Some(id));
    assert_eq!(store.website_exists("http://a.com/").unwrap(), None);
}

#[test]
fn test_reopen_keeps_data_and_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    let id = {
        let store = SqliteStore::open(&path).unwrap();
        store.add_blacklist("http://spam.example/").unwrap();
        store.insert_website("http://a.com/", None, None).unwrap()
    };

    let store = SqliteStore::open(&path).unwrap();
    let website = store.website_by_id(id).unwrap().unwrap();
    assert_eq!(website.url, "http://a.com/");
    assert!(store.is_blacklisted("http://spam.example/x/y").unwrap());
    assert_eq!(store.list_blacklist().unwrap().len(), 1);
}

#[test]
fn test_schema_version_recorded_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    SqliteStore::open(&path).unwrap();
    SqliteStore::open(&path).unwrap();

    let conn = rusqlite::Connection::open(&path).unwrap();
    assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
}

#[test]
fn test_open_in_missing_directory_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let config = parse_config(&format!(
        "[database]\npath = \"{}\"\n",
        dir.path().join("no_such_dir").join("ledger.db").display()
    ))
    .unwrap();

    let started = std::time::Instant::now();
    let result = SqliteStore::from_config(&config.database);

    assert!(matches!(result, Err(StorageError::Connectivity(_))));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_open_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("configured.db");
    let config = parse_config(&format!(
        "[database]\npath = \"{}\"\npool-size = 2\n",
        db_path.display()
    ))
    .unwrap();

    let store = SqliteStore::from_config(&config.database).unwrap();
    store.insert_website("http://a.com/", None, None).unwrap();
    assert!(db_path.exists());
}

#[test]
fn test_clones_share_pool_across_threads() {
    let dir = tempfile::tempdir().unwrap();
    let options = StoreOptions {
        pool_size: 4,
        ..StoreOptions::default()
    };
    let store = SqliteStore::open_with(&dir.path().join("ledger.db"), &options).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = store.clone();
            thread::spawn(move || {
                (0..25)
                    .map(|i| {
                        store
                            .insert_website(&format!("http://w{}.com/{}/", worker, i), None, None)
                            .unwrap()
                    })
                    .collect::<Vec<i64>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        ids.extend(handle.join().unwrap());
    }

    assert_eq!(ids.len(), 100);
    assert_eq!(store.all_websites().unwrap().len(), 100);
}

#[test]
fn test_submission_flow() {
    let (_dir, store) = temp_store();

    let root = submit_website(&store, "http://a.com/pub/", Some("1.2.3.4"), None).unwrap();
    let Submission::Inserted(root_id) = root else {
        panic!("expected insertion, got {:?}", root);
    };

    assert_eq!(
        submit_website(&store, "http://a.com/pub/music/", None, None).unwrap(),
        Submission::AlreadyCovered(root_id)
    );

    store.add_blacklist("https://b.com:8443/anything").unwrap();
    assert_eq!(
        submit_website(&store, "https://b.com:8443/files/", None, None).unwrap(),
        Submission::Blacklisted
    );
    assert!(matches!(
        submit_website(&store, "https://b.com/files/", None, None).unwrap(),
        Submission::Inserted(_)
    ));
}

#[test]
fn test_stale_websites_and_touch() {
    let (_dir, store) = temp_store();
    let a = store.insert_website("http://a.com/", None, None).unwrap();
    let b = store.insert_website("http://b.com/", None, None).unwrap();

    assert!(store
        .websites_older_than(chrono::Duration::hours(1))
        .unwrap()
        .is_empty());

    thread::sleep(Duration::from_millis(20));
    let mut stale = store.websites_older_than(chrono::Duration::zero()).unwrap();
    stale.sort();
    assert_eq!(stale, vec![a, b]);

    let before = store.website_by_id(a).unwrap().unwrap().last_modified;
    store.touch_website(a).unwrap();
    let after = store.website_by_id(a).unwrap().unwrap().last_modified;
    assert!(after > before);
}

#[test]
fn test_listing_newest_first_with_prefix() {
    let (_dir, store) = temp_store();
    let a = store.insert_website("http://a.com/one/", None, None).unwrap();
    thread::sleep(Duration::from_millis(5));
    let b = store.insert_website("http://a.com/two/", None, None).unwrap();
    thread::sleep(Duration::from_millis(5));
    store.insert_website("http://z.com/", None, None).unwrap();

    let listed: Vec<i64> = store
        .list_websites(10, 0, "http://a.com/")
        .unwrap()
        .into_iter()
        .map(|w| w.id)
        .collect();
    assert_eq!(listed, vec![b, a]);

    let second_page = store.list_websites(1, 1, "http://a.com/").unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].id, a);
}
