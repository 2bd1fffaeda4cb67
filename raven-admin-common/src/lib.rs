//! Raven Admin Common - Administrative statistics model, snapshot decoding and viewer configuration

pub mod config;
pub mod report;
pub mod snapshot;
pub mod stats;
pub mod timespan;

pub use config::*;
pub use snapshot::SnapshotError;
pub use stats::*;
