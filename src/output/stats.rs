//! Fleet statistics reporting
//!
//! This module turns the task result log into per-server figures and prints
//! them for operators.

use crate::storage::{CrawlFleetRegistry, ServerStats, StorageResult, TaskResult, TaskResultLog};

/// Fleet-wide statistics summary
#[derive(Debug, Clone, Default)]
pub struct FleetStatistics {
    /// Number of registered crawl servers
    pub registered_servers: usize,

    /// Per-server statistics, sorted by server name
    pub servers: Vec<(String, ServerStats)>,

    /// Tasks across all servers
    pub total_tasks: i64,

    /// Files across all servers
    pub total_files: i64,
}

/// Loads fleet statistics from storage
///
/// # Arguments
///
/// * `store` - A store providing both the fleet and its task log
///
/// # Returns
///
/// * `Ok(FleetStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_fleet_statistics<S>(store: &S) -> StorageResult<FleetStatistics>
where
    S: CrawlFleetRegistry + TaskResultLog + ?Sized,
{
    let registered_servers = store.list_servers()?.len();

    let mut servers: Vec<(String, ServerStats)> = store.stats_by_server()?.into_iter().collect();
    servers.sort_by(|a, b| a.0.cmp(&b.0));

    let total_tasks = servers.iter().map(|(_, s)| s.task_count).sum();
    let total_files = servers.iter().map(|(_, s)| s.file_count).sum();

    Ok(FleetStatistics {
        registered_servers,
        servers,
        total_tasks,
        total_files,
    })
}

/// Prints fleet statistics to stdout in a formatted manner
pub fn print_fleet_statistics(stats: &FleetStatistics) {
    println!("=== Fleet Statistics ===\n");

    println!("Overview:");
    println!("  Registered servers: {}", stats.registered_servers);
    println!("  Servers with results: {}", stats.servers.len());
    println!("  Total tasks: {}", stats.total_tasks);
    println!("  Total files: {}", stats.total_files);
    println!();

    if stats.servers.is_empty() {
        println!("No task results logged yet.");
        return;
    }

    println!(
        "  {:<24} {:>8} {:>12} {:>12} {:>10} {:>12}",
        "server", "tasks", "files", "time (s)", "avg (s)", "avg files"
    );
    for (name, server) in &stats.servers {
        println!(
            "  {:<24} {:>8} {:>12} {:>12.1} {:>10.1} {:>12.1}",
            name,
            server.task_count,
            server.file_count,
            server.time,
            server.time_avg,
            server.file_count_avg
        );
    }
}

/// Prints the task log, most recent first
pub fn print_task_log(results: &[TaskResult]) {
    println!("=== Task Log ({} results) ===\n", results.len());

    for result in results {
        let indexed = result
            .indexed_time
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "  {} server={} website={} status={} files={} took={:.1}s indexed={}",
            result.end_time.to_rfc3339(),
            result.server_name.as_deref().unwrap_or("?"),
            result.website_id,
            result.status_code,
            result.file_count,
            result.duration_secs(),
            indexed
        );
    }
}
