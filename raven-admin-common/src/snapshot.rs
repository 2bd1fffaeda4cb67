//! Decoding of administrative statistics documents
//!
//! Decoding is tolerant at the field level: a missing field, an explicit
//! `null` or a value of the wrong shape leaves that field at its default.
//! Only a document that is not a JSON object fails to decode.
//!
//! Field names are PascalCase. camelCase spellings are folded onto them
//! before decoding; when a document carries both, the PascalCase value wins.

use crate::stats::AdminStatistics;
use crate::timespan::parse_timespan;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// Decode a statistics document
pub fn decode(content: &str) -> Result<AdminStatistics, SnapshotError> {
    let mut value: Value =
        serde_json::from_str(content).map_err(|e| SnapshotError::ParseError(e.to_string()))?;
    if !value.is_object() {
        return Err(SnapshotError::ParseError(format!(
            "expected a JSON object, found {}",
            kind_of(&value)
        )));
    }
    fold_field_names(&mut value);
    serde_json::from_value(value).map_err(|e| SnapshotError::ParseError(e.to_string()))
}

/// Encode a statistics document as pretty-printed JSON
pub fn encode_pretty(stats: &AdminStatistics) -> Result<String, SnapshotError> {
    serde_json::to_string_pretty(stats).map_err(|e| SnapshotError::SerializeError(e.to_string()))
}

/// Load a statistics document from a file
pub fn load<P: AsRef<Path>>(path: P) -> Result<AdminStatistics, SnapshotError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| SnapshotError::IoError(format!("{}: {}", path.display(), e)))?;
    debug!("Read {} bytes from {}", content.len(), path.display());
    decode(&content)
}

/// Snapshot error types
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

/// Rewrite camelCase object keys to PascalCase, recursively
fn fold_field_names(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let (canonical, camel): (Vec<_>, Vec<_>) = std::mem::take(map)
                .into_iter()
                .partition(|(key, _)| pascal_case(key) == *key);

            for (key, mut child) in canonical {
                fold_field_names(&mut child);
                map.insert(key, child);
            }
            for (key, mut child) in camel {
                let pascal = pascal_case(&key);
                if map.contains_key(&pascal) {
                    warn!("Ignoring field {} in favour of {}", key, pascal);
                    continue;
                }
                fold_field_names(&mut child);
                map.insert(pascal, child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(fold_field_names),
        _ => {}
    }
}

fn pascal_case(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Field deserializer that falls back to `T::default()` on null or mismatched values
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(parsed),
        Err(e) => {
            warn!("Ignoring malformed field value: {}", e);
            Ok(T::default())
        }
    }
}

/// List deserializer that decodes entries one by one
///
/// Entries that are not objects or fail to decode are skipped; the rest keep
/// their order. A value that is not an array at all decodes as `None`.
pub(crate) fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(None),
        Value::Array(items) => items,
        other => {
            warn!("Ignoring malformed list: expected an array, found {}", kind_of(&other));
            return Ok(None);
        }
    };

    let parsed = items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            if !item.is_object() {
                warn!("Skipping list entry {}: expected an object, found {}", idx, kind_of(&item));
                return None;
            }
            match serde_json::from_value(item) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping malformed list entry {}: {}", idx, e);
                    None
                }
            }
        })
        .collect();
    Ok(Some(parsed))
}

/// Millisecond field that also accepts a `TimeSpan` string
pub(crate) fn lenient_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let millis = match &value {
        Value::Null => Some(0),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => parse_timespan(s).or_else(|| s.trim().parse().ok()),
        _ => None,
    };
    Ok(millis.unwrap_or_else(|| {
        warn!("Ignoring malformed duration: {}", value);
        0
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER_DOCUMENT: &str = r#"{
        "ServerName": "raven-01",
        "TotalNumberOfRequests": 42,
        "Uptime": "1.02:03:04.5670000",
        "Memory": {
            "DatabaseCacheSizeInMB": 12.5,
            "ManagedMemorySizeInMB": 256,
            "TotalProcessMemorySizeInMB": 1024.75
        },
        "LoadedDatabases": [
            {
                "Name": "Northwind",
                "LastActivity": "2014-05-12T10:11:12.1234567",
                "TransactionalStorageAllocatedSize": 25165824,
                "TransactionalStorageAllocatedSizeHumaneSize": "24 MBytes",
                "TransactionalStorageUsedSize": 8388608,
                "TransactionalStorageUsedSizeHumaneSize": "8 MBytes",
                "IndexStorageSize": 1048576,
                "IndexStorageHumaneSize": "1 MBytes",
                "TotalDatabaseSize": 26214400,
                "TotalDatabaseHumaneSize": "25 MBytes",
                "CountOfDocuments": 1059,
                "CountOfAttachments": 0,
                "DatabaseTransactionVersionSizeInMB": 0.5,
                "Metrics": {
                    "DocsWritesPerSecond": 1.5,
                    "IndexedPerSecond": 20,
                    "ReducedPerSecond": 0,
                    "RequestsPerSecond": 3.25
                }
            }
        ],
        "LoadedFileSystems": []
    }"#;

    #[test]
    fn test_decode_server_document() {
        let stats = decode(SERVER_DOCUMENT).unwrap();
        assert_eq!(stats.server_name(), Some("raven-01"));
        assert_eq!(stats.total_number_of_requests(), 42);
        assert_eq!(stats.uptime(), 93_784_567);

        let memory = stats.memory().unwrap();
        assert_eq!(memory.database_cache_size_in_mb(), 12.5);
        assert_eq!(memory.managed_memory_size_in_mb(), 256.0);
        assert_eq!(memory.total_process_memory_size_in_mb(), 1024.75);

        let databases = stats.loaded_databases().unwrap();
        assert_eq!(databases.len(), 1);
        let northwind = &databases[0];
        assert_eq!(northwind.name(), Some("Northwind"));
        assert_eq!(northwind.last_activity(), Some("2014-05-12T10:11:12.1234567"));
        assert_eq!(northwind.transactional_storage_allocated_size(), 25_165_824);
        assert_eq!(northwind.transactional_storage_used_size_humane_size(), Some("8 MBytes"));
        assert_eq!(northwind.index_storage_size(), 1_048_576);
        assert_eq!(northwind.total_database_size(), 26_214_400);
        assert_eq!(northwind.count_of_documents(), 1059);
        assert_eq!(northwind.database_transaction_version_size_in_mb(), 0.5);
        assert_eq!(northwind.metrics().unwrap().requests_per_second(), 3.25);
    }

    #[test]
    fn test_decode_camel_case_document() {
        let stats = decode(
            r#"{
                "serverName": "raven-01",
                "totalNumberOfRequests": 42,
                "uptime": 360000,
                "memory": { "databaseCacheSizeInMB": 1.0 },
                "loadedDatabases": [ { "name": "Orders", "countOfDocuments": 7 } ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            (stats.server_name(), stats.total_number_of_requests(), stats.uptime()),
            (Some("raven-01"), 42, 360_000)
        );
        assert_eq!(stats.memory().unwrap().database_cache_size_in_mb(), 1.0);
        assert_eq!(stats.loaded_databases().unwrap()[0].count_of_documents(), 7);
    }

    #[test]
    fn test_decode_both_casings() {
        let stats = decode(
            r#"{ "serverName": "b", "ServerName": "a", "TotalNumberOfRequests": 7 }"#,
        )
        .unwrap();
        assert_eq!(stats.server_name(), Some("a"));
        assert_eq!(stats.total_number_of_requests(), 7);

        let stats = decode(
            r#"{
                "Memory": { "databaseCacheSizeInMB": 2, "DatabaseCacheSizeInMB": 1 },
                "loadedDatabases": [ { "name": "Orders", "Name": "Northwind" } ],
                "LoadedDatabases": []
            }"#,
        )
        .unwrap();
        assert_eq!(stats.memory().unwrap().database_cache_size_in_mb(), 1.0);
        assert_eq!(stats.loaded_databases(), Some(&[][..]));
    }

    #[test]
    fn test_decode_skips_malformed_database_entries() {
        let stats = decode(
            r#"{ "LoadedDatabases": [ { "Name": "a" }, 5, "b", [1], { "Name": "c" } ] }"#,
        )
        .unwrap();
        let names: Vec<_> = stats
            .loaded_databases()
            .unwrap()
            .iter()
            .map(|db| db.name().unwrap())
            .collect();
        assert_eq!(names, vec!["a", "c"]);

        let stats = decode(r#"{ "LoadedDatabases": [ 5 ] }"#).unwrap();
        assert_eq!(stats.loaded_databases(), Some(&[][..]));
    }

    #[test]
    fn test_decode_empty_object_gives_unset_record() {
        assert_eq!(decode("{}").unwrap(), AdminStatistics::new());
    }

    #[test]
    fn test_decode_nulls_as_defaults() {
        let stats = decode(
            r#"{
                "ServerName": null,
                "TotalNumberOfRequests": null,
                "Uptime": null,
                "Memory": null,
                "LoadedDatabases": null
            }"#,
        )
        .unwrap();
        assert_eq!(stats, AdminStatistics::new());
    }

    #[test]
    fn test_decode_keeps_empty_database_list() {
        let stats = decode(r#"{ "LoadedDatabases": [] }"#).unwrap();
        assert_eq!(stats.loaded_databases(), Some(&[][..]));
    }

    #[test]
    fn test_decode_malformed_fields_fall_back() {
        let stats = decode(
            r#"{
                "ServerName": 17,
                "TotalNumberOfRequests": "many",
                "Uptime": "a while",
                "Memory": "plenty",
                "LoadedDatabases": { "Name": "not a list" }
            }"#,
        )
        .unwrap();
        assert_eq!(stats, AdminStatistics::new());
    }

    #[test]
    fn test_decode_uptime_forms() {
        assert_eq!(decode(r#"{ "Uptime": 360000 }"#).unwrap().uptime(), 360_000);
        assert_eq!(decode(r#"{ "Uptime": 1500.9 }"#).unwrap().uptime(), 1500);
        assert_eq!(decode(r#"{ "Uptime": "360000" }"#).unwrap().uptime(), 360_000);
        assert_eq!(decode(r#"{ "Uptime": "00:06:00" }"#).unwrap().uptime(), 360_000);
    }

    #[test]
    fn test_decode_rejects_non_object() {
        assert!(matches!(decode("not json"), Err(SnapshotError::ParseError(_))));
        assert!(matches!(decode("[1, 2]"), Err(SnapshotError::ParseError(_))));
        assert!(matches!(decode("null"), Err(SnapshotError::ParseError(_))));
    }

    #[test]
    fn test_encode_uses_server_field_names() {
        let mut stats = AdminStatistics::new();
        stats.set_server_name(Some("raven-01".to_string()));
        stats.set_uptime(360_000);

        let encoded = encode_pretty(&stats).unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value["ServerName"], "raven-01");
        assert_eq!(value["TotalNumberOfRequests"], 0);
        assert_eq!(value["Uptime"], 360_000);
        assert!(value["Memory"].is_null());
        assert!(value["LoadedDatabases"].is_null());
    }

    #[test]
    fn test_encoded_document_decodes_to_same_record() {
        let stats = decode(SERVER_DOCUMENT).unwrap();
        let encoded = encode_pretty(&stats).unwrap();
        assert_eq!(decode(&encoded).unwrap(), stats);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load("/nonexistent/admin-stats.json").unwrap_err();
        assert!(matches!(err, SnapshotError::IoError(_)));
    }
}
