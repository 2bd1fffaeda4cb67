//! Configuration types for the statistics viewer

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ViewerConfig {
    /// Snapshot source settings
    #[serde(default)]
    pub snapshot: SnapshotConfig,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Where the statistics document comes from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotConfig {
    /// Path of the statistics document
    #[serde(default = "default_snapshot_path")]
    pub path: PathBuf,

    /// Reload automatically when the file changes
    #[serde(default = "default_true")]
    pub watch: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
            watch: true,
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Redraw and watcher poll interval in milliseconds
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Number of status messages kept
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,

    /// Initial ordering of the databases table
    #[serde(default)]
    pub database_sort: DatabaseSort,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            max_messages: default_max_messages(),
            database_sort: DatabaseSort::default(),
        }
    }
}

/// Ordering of loaded databases
///
/// # Examples
///
/// ```toml
/// [display]
/// database_sort = "size"  # or "name", "documents", "activity"
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseSort {
    /// Alphabetical by database name
    #[default]
    Name,
    /// Largest total database size first
    Size,
    /// Most documents first
    Documents,
    /// Most recently active first
    Activity,
}

impl DatabaseSort {
    pub fn all() -> &'static [DatabaseSort] {
        &[
            DatabaseSort::Name,
            DatabaseSort::Size,
            DatabaseSort::Documents,
            DatabaseSort::Activity,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            DatabaseSort::Name => "name",
            DatabaseSort::Size => "size",
            DatabaseSort::Documents => "documents",
            DatabaseSort::Activity => "activity",
        }
    }

    /// The ordering after this one, wrapping around
    pub fn next(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|&s| s == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }
}

// Default value functions
fn default_snapshot_path() -> PathBuf {
    PathBuf::from("admin-stats.json")
}

fn default_true() -> bool {
    true
}

fn default_refresh_interval_ms() -> u64 {
    1000
}

fn default_max_messages() -> usize {
    10
}

impl ViewerConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        std::fs::write(path.as_ref(), content)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Convert to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Reject settings the viewer cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.snapshot.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "snapshot path cannot be empty".to_string(),
            ));
        }
        if self.display.refresh_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "refresh interval cannot be 0".to_string(),
            ));
        }
        if self.display.max_messages == 0 {
            return Err(ConfigError::ValidationError(
                "max messages cannot be 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
