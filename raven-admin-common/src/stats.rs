//! Administrative statistics reported by a database server

use crate::snapshot::{lenient, lenient_millis, lenient_seq};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Snapshot of server administrative state at the moment it was fetched
///
/// Every field is optional on the wire and freely settable; nothing here
/// checks consistency between fields. Use `snapshot::decode` to read
/// documents that may use camelCase field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AdminStatistics {
    /// Human-readable server identifier
    #[serde(deserialize_with = "lenient")]
    server_name: Option<String>,

    /// Total requests served since the server started
    #[serde(deserialize_with = "lenient")]
    total_number_of_requests: i32,

    /// Elapsed time since server start, in milliseconds
    #[serde(deserialize_with = "lenient_millis")]
    uptime: i64,

    /// Memory usage breakdown
    #[serde(deserialize_with = "lenient")]
    memory: Option<AdminMemoryStatistics>,

    /// One entry per currently loaded database
    #[serde(deserialize_with = "lenient_seq")]
    loaded_databases: Option<Vec<LoadedDatabaseStatistics>>,
}

impl AdminStatistics {
    /// Create an empty record with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server_name(&self) -> Option<&str> {
        self.server_name.as_deref()
    }

    pub fn set_server_name(&mut self, server_name: Option<String>) {
        self.server_name = server_name;
    }

    pub fn total_number_of_requests(&self) -> i32 {
        self.total_number_of_requests
    }

    pub fn set_total_number_of_requests(&mut self, total_number_of_requests: i32) {
        self.total_number_of_requests = total_number_of_requests;
    }

    /// Uptime in milliseconds
    pub fn uptime(&self) -> i64 {
        self.uptime
    }

    pub fn set_uptime(&mut self, uptime: i64) {
        self.uptime = uptime;
    }

    pub fn memory(&self) -> Option<&AdminMemoryStatistics> {
        self.memory.as_ref()
    }

    pub fn set_memory(&mut self, memory: Option<AdminMemoryStatistics>) {
        self.memory = memory;
    }

    pub fn loaded_databases(&self) -> Option<&[LoadedDatabaseStatistics]> {
        self.loaded_databases.as_deref()
    }

    pub fn set_loaded_databases(&mut self, loaded_databases: Option<Vec<LoadedDatabaseStatistics>>) {
        self.loaded_databases = loaded_databases;
    }
}

/// Server process memory usage, in megabytes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminMemoryStatistics {
    #[serde(
        rename = "DatabaseCacheSizeInMB",
        deserialize_with = "lenient"
    )]
    database_cache_size_in_mb: f64,

    #[serde(
        rename = "ManagedMemorySizeInMB",
        deserialize_with = "lenient"
    )]
    managed_memory_size_in_mb: f64,

    #[serde(
        rename = "TotalProcessMemorySizeInMB",
        deserialize_with = "lenient"
    )]
    total_process_memory_size_in_mb: f64,
}

impl AdminMemoryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn database_cache_size_in_mb(&self) -> f64 {
        self.database_cache_size_in_mb
    }

    pub fn set_database_cache_size_in_mb(&mut self, value: f64) {
        self.database_cache_size_in_mb = value;
    }

    pub fn managed_memory_size_in_mb(&self) -> f64 {
        self.managed_memory_size_in_mb
    }

    pub fn set_managed_memory_size_in_mb(&mut self, value: f64) {
        self.managed_memory_size_in_mb = value;
    }

    pub fn total_process_memory_size_in_mb(&self) -> f64 {
        self.total_process_memory_size_in_mb
    }

    pub fn set_total_process_memory_size_in_mb(&mut self, value: f64) {
        self.total_process_memory_size_in_mb = value;
    }
}

/// Storage and activity figures for one loaded database
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LoadedDatabaseStatistics {
    #[serde(deserialize_with = "lenient")]
    name: Option<String>,

    /// ISO-8601 timestamp exactly as the server sent it
    #[serde(deserialize_with = "lenient")]
    last_activity: Option<String>,

    #[serde(deserialize_with = "lenient")]
    transactional_storage_allocated_size: i64,

    #[serde(deserialize_with = "lenient")]
    transactional_storage_allocated_size_humane_size: Option<String>,

    #[serde(deserialize_with = "lenient")]
    transactional_storage_used_size: i64,

    #[serde(deserialize_with = "lenient")]
    transactional_storage_used_size_humane_size: Option<String>,

    #[serde(deserialize_with = "lenient")]
    index_storage_size: i64,

    #[serde(deserialize_with = "lenient")]
    index_storage_humane_size: Option<String>,

    #[serde(deserialize_with = "lenient")]
    total_database_size: i64,

    #[serde(deserialize_with = "lenient")]
    total_database_humane_size: Option<String>,

    #[serde(deserialize_with = "lenient")]
    count_of_documents: i64,

    #[serde(deserialize_with = "lenient")]
    count_of_attachments: i64,

    #[serde(
        rename = "DatabaseTransactionVersionSizeInMB",
        deserialize_with = "lenient"
    )]
    database_transaction_version_size_in_mb: f64,

    #[serde(deserialize_with = "lenient")]
    metrics: Option<DatabaseMetrics>,
}

impl LoadedDatabaseStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn last_activity(&self) -> Option<&str> {
        self.last_activity.as_deref()
    }

    pub fn set_last_activity(&mut self, last_activity: Option<String>) {
        self.last_activity = last_activity;
    }

    /// Parse the last activity timestamp
    ///
    /// Timestamps carrying an offset are normalized to UTC. Naive timestamps
    /// (the server's usual form, with up to seven fractional digits) are
    /// returned as-is. Returns `None` when the value is absent or unparsable.
    pub fn last_activity_at(&self) -> Option<NaiveDateTime> {
        let raw = self.last_activity.as_deref()?.trim();
        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Some(with_offset.naive_utc());
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }

    pub fn transactional_storage_allocated_size(&self) -> i64 {
        self.transactional_storage_allocated_size
    }

    pub fn set_transactional_storage_allocated_size(&mut self, value: i64) {
        self.transactional_storage_allocated_size = value;
    }

    pub fn transactional_storage_allocated_size_humane_size(&self) -> Option<&str> {
        self.transactional_storage_allocated_size_humane_size.as_deref()
    }

    pub fn set_transactional_storage_allocated_size_humane_size(&mut self, value: Option<String>) {
        self.transactional_storage_allocated_size_humane_size = value;
    }

    pub fn transactional_storage_used_size(&self) -> i64 {
        self.transactional_storage_used_size
    }

    pub fn set_transactional_storage_used_size(&mut self, value: i64) {
        self.transactional_storage_used_size = value;
    }

    pub fn transactional_storage_used_size_humane_size(&self) -> Option<&str> {
        self.transactional_storage_used_size_humane_size.as_deref()
    }

    pub fn set_transactional_storage_used_size_humane_size(&mut self, value: Option<String>) {
        self.transactional_storage_used_size_humane_size = value;
    }

    pub fn index_storage_size(&self) -> i64 {
        self.index_storage_size
    }

    pub fn set_index_storage_size(&mut self, value: i64) {
        self.index_storage_size = value;
    }

    pub fn index_storage_humane_size(&self) -> Option<&str> {
        self.index_storage_humane_size.as_deref()
    }

    pub fn set_index_storage_humane_size(&mut self, value: Option<String>) {
        self.index_storage_humane_size = value;
    }

    pub fn total_database_size(&self) -> i64 {
        self.total_database_size
    }

    pub fn set_total_database_size(&mut self, value: i64) {
        self.total_database_size = value;
    }

    pub fn total_database_humane_size(&self) -> Option<&str> {
        self.total_database_humane_size.as_deref()
    }

    pub fn set_total_database_humane_size(&mut self, value: Option<String>) {
        self.total_database_humane_size = value;
    }

    pub fn count_of_documents(&self) -> i64 {
        self.count_of_documents
    }

    pub fn set_count_of_documents(&mut self, value: i64) {
        self.count_of_documents = value;
    }

    pub fn count_of_attachments(&self) -> i64 {
        self.count_of_attachments
    }

    pub fn set_count_of_attachments(&mut self, value: i64) {
        self.count_of_attachments = value;
    }

    pub fn database_transaction_version_size_in_mb(&self) -> f64 {
        self.database_transaction_version_size_in_mb
    }

    pub fn set_database_transaction_version_size_in_mb(&mut self, value: f64) {
        self.database_transaction_version_size_in_mb = value;
    }

    pub fn metrics(&self) -> Option<&DatabaseMetrics> {
        self.metrics.as_ref()
    }

    pub fn set_metrics(&mut self, metrics: Option<DatabaseMetrics>) {
        self.metrics = metrics;
    }
}

/// Per-database throughput rates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DatabaseMetrics {
    #[serde(deserialize_with = "lenient")]
    docs_writes_per_second: f64,

    #[serde(deserialize_with = "lenient")]
    indexed_per_second: f64,

    #[serde(deserialize_with = "lenient")]
    reduced_per_second: f64,

    #[serde(deserialize_with = "lenient")]
    requests_per_second: f64,
}

impl DatabaseMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn docs_writes_per_second(&self) -> f64 {
        self.docs_writes_per_second
    }

    pub fn set_docs_writes_per_second(&mut self, value: f64) {
        self.docs_writes_per_second = value;
    }

    pub fn indexed_per_second(&self) -> f64 {
        self.indexed_per_second
    }

    pub fn set_indexed_per_second(&mut self, value: f64) {
        self.indexed_per_second = value;
    }

    pub fn reduced_per_second(&self) -> f64 {
        self.reduced_per_second
    }

    pub fn set_reduced_per_second(&mut self, value: f64) {
        self.reduced_per_second = value;
    }

    pub fn requests_per_second(&self) -> f64 {
        self.requests_per_second
    }

    pub fn set_requests_per_second(&mut self, value: f64) {
        self.requests_per_second = value;
    }
}
