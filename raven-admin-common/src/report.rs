//! Derived figures and human-readable formatting for statistics snapshots

use crate::config::DatabaseSort;
use crate::stats::{AdminStatistics, LoadedDatabaseStatistics};
use std::cmp::Ordering;

/// Aggregates over all loaded databases of a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub databases: usize,
    pub documents: i64,
    pub attachments: i64,
    pub total_size: i64,
}

impl Totals {
    pub fn of(stats: &AdminStatistics) -> Self {
        let databases = stats.loaded_databases().unwrap_or_default();
        databases.iter().fold(
            Totals {
                databases: databases.len(),
                ..Totals::default()
            },
            |acc, db| Totals {
                documents: acc.documents.saturating_add(db.count_of_documents()),
                attachments: acc.attachments.saturating_add(db.count_of_attachments()),
                total_size: acc.total_size.saturating_add(db.total_database_size()),
                ..acc
            },
        )
    }
}

/// Loaded databases in the requested order
///
/// Sorting is stable; ties keep the order the server reported.
pub fn sorted_databases(
    stats: &AdminStatistics,
    sort: DatabaseSort,
) -> Vec<&LoadedDatabaseStatistics> {
    let mut databases: Vec<_> = stats.loaded_databases().unwrap_or_default().iter().collect();
    match sort {
        DatabaseSort::Name => databases.sort_by(|a, b| compare_names(a.name(), b.name())),
        DatabaseSort::Size => {
            databases.sort_by(|a, b| b.total_database_size().cmp(&a.total_database_size()))
        }
        DatabaseSort::Documents => {
            databases.sort_by(|a, b| b.count_of_documents().cmp(&a.count_of_documents()))
        }
        // unparsable timestamps sort last
        DatabaseSort::Activity => {
            databases.sort_by(|a, b| b.last_activity_at().cmp(&a.last_activity_at()))
        }
    }
    databases
}

fn compare_names(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Format an uptime in milliseconds in human-readable form
pub fn format_uptime(millis: i64) -> String {
    if millis < 0 {
        return format!("-{}", format_uptime(millis.saturating_neg()));
    }
    let secs = millis / 1000;
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Format a byte count in human-readable form
pub fn format_bytes(bytes: i64) -> String {
    const KB: i64 = 1024;
    const MB: i64 = KB * 1024;
    const GB: i64 = MB * 1024;

    let abs = bytes.saturating_abs();
    if abs >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if abs >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if abs >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a size already expressed in megabytes
pub fn format_megabytes(megabytes: f64) -> String {
    if megabytes >= 1024.0 {
        format!("{:.2} GB", megabytes / 1024.0)
    } else {
        format!("{:.2} MB", megabytes)
    }
}

/// Plain-text report of a snapshot
pub fn render_text(stats: &AdminStatistics) -> String {
    let totals = Totals::of(stats);
    let mut out = String::new();

    out.push_str(&format!("Server:    {}\n", stats.server_name().unwrap_or("(unknown)")));
    out.push_str(&format!("Requests:  {}\n", stats.total_number_of_requests()));
    out.push_str(&format!("Uptime:    {}\n", format_uptime(stats.uptime())));

    match stats.memory() {
        Some(memory) => {
            out.push_str(&format!(
                "Memory:    {} process, {} managed, {} cache\n",
                format_megabytes(memory.total_process_memory_size_in_mb()),
                format_megabytes(memory.managed_memory_size_in_mb()),
                format_megabytes(memory.database_cache_size_in_mb()),
            ));
        }
        None => out.push_str("Memory:    (not reported)\n"),
    }

    out.push_str(&format!(
        "Databases: {} loaded, {} documents, {} attachments, {}\n",
        totals.databases,
        totals.documents,
        totals.attachments,
        format_bytes(totals.total_size),
    ));

    for db in sorted_databases(stats, DatabaseSort::Name) {
        out.push_str(&format!(
            "  {:<24} {:>10} docs  {:>12}\n",
            db.name().unwrap_or("(unnamed)"),
            db.count_of_documents(),
            format_bytes(db.total_database_size()),
        ));
    }

    out
}
