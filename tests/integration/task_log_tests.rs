use crate::{crawl_server, temp_store};
use chrono::{DateTime, TimeZone, Utc};
use crawl_ledger::output::load_fleet_statistics;
use crawl_ledger::storage::{
    CrawlFleetRegistry, ServerStats, StorageError, TaskResult, TaskResultLog, WebsiteRegistry,
};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap() + chrono::Duration::seconds(secs)
}

fn task(server_id: i64, website_id: i64, file_count: i64, start: i64, end: i64) -> TaskResult {
    TaskResult {
        server_id,
        website_id,
        status_code: 200,
        file_count,
        start_time: at(start),
        end_time: at(end),
        indexed_time: Some(at(end + 60)),
        server_name: None,
    }
}

#[test]
fn test_stats_by_server() {
    let (_dir, store) = temp_store();
    let s1 = store.register_server(&crawl_server("s1", 4)).unwrap();
    let w = store.insert_website("http://a.com/", None, None).unwrap();

    store.append_result(&task(s1, w, 10, 0, 5)).unwrap();
    store.append_result(&task(s1, w, 20, 100, 115)).unwrap();

    let stats = store.stats_by_server().unwrap();
    assert_eq!(
        stats["s1"],
        ServerStats {
            file_count: 30,
            time: 20.0,
            task_count: 2,
            time_avg: 10.0,
            file_count_avg: 15.0,
        }
    );
}

#[test]
fn test_log_carries_server_name_newest_first() {
    let (_dir, store) = temp_store();
    let s1 = store.register_server(&crawl_server("s1", 4)).unwrap();
    let s2 = store.register_server(&crawl_server("s2", 2)).unwrap();
    let w = store.insert_website("http://a.com/", None, None).unwrap();

    store.append_result(&task(s1, w, 1, 0, 10)).unwrap();
    store.append_result(&task(s2, w, 2, 0, 30)).unwrap();

    let log = store.list_results().unwrap();
    let names: Vec<&str> = log.iter().filter_map(|r| r.server_name.as_deref()).collect();
    assert_eq!(names, vec!["s2", "s1"]);
    assert_eq!(log[0].indexed_time, Some(at(90)));
}

#[test]
fn test_deleted_website_leaves_log_and_stats() {
    let (_dir, store) = temp_store();
    let s1 = store.register_server(&crawl_server("s1", 4)).unwrap();
    let kept = store.insert_website("http://a.com/", None, None).unwrap();
    let gone = store.insert_website("http://b.com/", None, None).unwrap();

    store.append_result(&task(s1, kept, 3, 0, 2)).unwrap();
    store.append_result(&task(s1, gone, 7, 0, 4)).unwrap();
    store.delete_website(gone).unwrap();

    let log = store.list_results().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].website_id, kept);

    let stats = store.stats_by_server().unwrap();
    assert_eq!(stats["s1"].task_count, 1);
    assert_eq!(stats["s1"].file_count, 3);
}

#[test]
fn test_append_requires_known_server_and_website() {
    let (_dir, store) = temp_store();
    let s1 = store.register_server(&crawl_server("s1", 4)).unwrap();
    let w = store.insert_website("http://a.com/", None, None).unwrap();

    assert!(matches!(
        store.append_result(&task(s1 + 100, w, 1, 0, 1)),
        Err(StorageError::ConstraintViolation(_))
    ));
    assert!(matches!(
        store.append_result(&task(s1, w + 100, 1, 0, 1)),
        Err(StorageError::ConstraintViolation(_))
    ));
    assert!(store.list_results().unwrap().is_empty());
}

#[test]
fn test_fleet_statistics_summary() {
    let (_dir, store) = temp_store();
    let s1 = store.register_server(&crawl_server("s1", 4)).unwrap();
    store.register_server(&crawl_server("idle", 1)).unwrap();
    let w = store.insert_website("http://a.com/", None, None).unwrap();

    store.append_result(&task(s1, w, 4, 0, 2)).unwrap();
    store.append_result(&task(s1, w, 6, 0, 2)).unwrap();

    let summary = load_fleet_statistics(&store).unwrap();
    assert_eq!(summary.registered_servers, 2);
    assert_eq!(summary.total_tasks, 2);
    assert_eq!(summary.total_files, 10);
    assert_eq!(summary.servers.len(), 1);
    assert_eq!(summary.servers[0].0, "s1");
}
