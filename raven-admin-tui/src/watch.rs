//! Snapshot file watching for live reload

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Quiet period after the last file event before a reload is signalled
const DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Watch error: {0}")]
    Notify(#[from] notify::Error),

    #[error("Invalid snapshot path: {0}")]
    InvalidPath(String),
}

/// Watches the directory holding the snapshot and reports changes to it
pub struct SnapshotWatcher {
    // dropping the watcher stops event delivery
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<()>,
    debouncer: Debouncer,
}

impl SnapshotWatcher {
    pub fn new(path: &Path) -> Result<Self, WatchError> {
        let file_name: OsString = path
            .file_name()
            .ok_or_else(|| WatchError::InvalidPath(path.display().to_string()))?
            .to_os_string();

        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let ours = event
                        .paths
                        .iter()
                        .any(|p| p.file_name() == Some(file_name.as_os_str()));
                    if ours && (event.kind.is_modify() || event.kind.is_create()) {
                        let _ = tx.send(());
                    }
                }
            },
            Config::default(),
        )?;

        // Watch the parent directory so editors that replace the file are seen
        let watch_path = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        watcher.watch(watch_path, RecursiveMode::NonRecursive)?;

        info!("Watching {} for changes", path.display());

        Ok(Self {
            _watcher: watcher,
            rx,
            debouncer: Debouncer::new(DEBOUNCE),
        })
    }

    /// Drain pending events; true once the file has settled after a change
    pub fn changed(&mut self) -> bool {
        let now = Instant::now();
        while self.rx.try_recv().is_ok() {
            debug!("Snapshot file event");
            self.debouncer.record(now);
        }
        self.debouncer.ready(now)
    }
}

/// Trailing-edge debounce over a burst of events
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_event: None,
        }
    }

    pub fn record(&mut self, at: Instant) {
        self.last_event = Some(at);
    }

    /// True exactly once per burst, after `quiet` has passed since its last event
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last_event {
            Some(last) if now.duration_since(last) >= self.quiet => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }
}
