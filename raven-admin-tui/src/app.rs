//! Application state and logic

use crate::watch::SnapshotWatcher;
use crossterm::event::{KeyCode, KeyEvent};
use raven_admin_common::{report, snapshot, AdminStatistics, DatabaseSort, ViewerConfig};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Application state
pub struct App {
    /// Statistics document being displayed
    pub snapshot_path: PathBuf,

    /// Last successfully loaded statistics
    pub stats: Option<AdminStatistics>,

    /// When `stats` was loaded
    pub loaded_at: Option<Instant>,

    /// Current tab
    pub current_tab: Tab,

    /// Status messages
    pub messages: Vec<StatusMessage>,
    max_messages: usize,

    /// Selected row in the databases table
    pub selected_database: usize,

    /// Ordering of the databases table
    pub database_sort: DatabaseSort,

    watcher: Option<SnapshotWatcher>,
}

/// Available tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Databases,
    Memory,
    Help,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Overview, Tab::Databases, Tab::Memory, Tab::Help]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Databases => "Databases",
            Tab::Memory => "Memory",
            Tab::Help => "Help",
        }
    }
}

/// Status message for display
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl App {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            snapshot_path: config.snapshot.path.clone(),
            stats: None,
            loaded_at: None,
            current_tab: Tab::Overview,
            messages: Vec::new(),
            max_messages: config.display.max_messages,
            selected_database: 0,
            database_sort: config.display.database_sort,
            watcher: None,
        }
    }

    /// Load the snapshot from disk, keeping the previous one on failure
    pub fn reload(&mut self) {
        match snapshot::load(&self.snapshot_path) {
            Ok(stats) => {
                info!(
                    "Loaded statistics for {} from {}",
                    stats.server_name().unwrap_or("(unknown)"),
                    self.snapshot_path.display()
                );
                self.stats = Some(stats);
                self.loaded_at = Some(Instant::now());
                self.clamp_selection();
                self.add_message(
                    &format!("Loaded {}", self.snapshot_path.display()),
                    false,
                );
            }
            Err(e) => {
                warn!("Failed to load snapshot: {}", e);
                self.add_message(&format!("Load failed: {}", e), true);
            }
        }
    }

    /// Start reloading automatically when the snapshot file changes
    pub fn start_watching(&mut self) {
        match SnapshotWatcher::new(&self.snapshot_path) {
            Ok(watcher) => self.watcher = Some(watcher),
            Err(e) => {
                warn!("Cannot watch snapshot: {}", e);
                self.add_message(&format!("Live reload disabled: {}", e), true);
            }
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Reload if the watcher reported a settled change
    pub fn process_file_events(&mut self) {
        let changed = self
            .watcher
            .as_mut()
            .map(|watcher| watcher.changed())
            .unwrap_or(false);
        if changed {
            debug!("Snapshot changed on disk");
            self.reload();
        }
    }

    /// Add a status message
    pub fn add_message(&mut self, text: &str, is_error: bool) {
        self.messages.push(StatusMessage {
            text: text.to_string(),
            is_error,
        });

        if self.messages.len() > self.max_messages {
            let excess = self.messages.len() - self.max_messages;
            self.messages.drain(..excess);
        }
    }

    fn database_count(&self) -> usize {
        self.stats
            .as_ref()
            .and_then(|stats| stats.loaded_databases())
            .map_or(0, |databases| databases.len())
    }

    fn clamp_selection(&mut self) {
        self.selected_database = self
            .selected_database
            .min(self.database_count().saturating_sub(1));
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            // Tab navigation
            KeyCode::Tab => {
                let tabs = Tab::all();
                let current_idx = tabs.iter().position(|&t| t == self.current_tab).unwrap_or(0);
                self.current_tab = tabs[(current_idx + 1) % tabs.len()];
            }
            KeyCode::BackTab => {
                let tabs = Tab::all();
                let current_idx = tabs.iter().position(|&t| t == self.current_tab).unwrap_or(0);
                self.current_tab = tabs[(current_idx + tabs.len() - 1) % tabs.len()];
            }

            // Number keys for direct tab selection
            KeyCode::Char('1') => self.current_tab = Tab::Overview,
            KeyCode::Char('2') => self.current_tab = Tab::Databases,
            KeyCode::Char('3') => self.current_tab = Tab::Memory,
            KeyCode::Char('4') => self.current_tab = Tab::Help,

            KeyCode::Char('r') => self.reload(),

            KeyCode::Char('s') => {
                if self.current_tab == Tab::Databases {
                    self.database_sort = self.database_sort.next();
                    self.selected_database = 0;
                    self.add_message(
                        &format!("Sorting databases by {}", self.database_sort.name()),
                        false,
                    );
                }
            }

            // List navigation
            KeyCode::Up | KeyCode::Char('k') => {
                if self.current_tab == Tab::Databases && self.selected_database > 0 {
                    self.selected_database -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.current_tab == Tab::Databases
                    && self.selected_database < self.database_count().saturating_sub(1)
                {
                    self.selected_database += 1;
                }
            }

            _ => {}
        }
    }

    /// Summary line for the footer
    pub fn summary(&self) -> String {
        match self.stats {
            Some(ref stats) => {
                let totals = report::Totals::of(stats);
                format!(
                    "{} | {} databases | up {}",
                    stats.server_name().unwrap_or("(unknown)"),
                    totals.databases,
                    report::format_uptime(stats.uptime())
                )
            }
            None => "No snapshot loaded".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use std::path::Path;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn write_snapshot(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "raven-admin-tui-{}-{}.json",
            std::process::id(),
            name
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    fn app_for(path: &Path) -> App {
        let mut config = ViewerConfig::default();
        config.snapshot.path = path.to_path_buf();
        config.display.max_messages = 3;
        App::new(&config)
    }

    const THREE_DATABASES: &str = r#"{
        "ServerName": "raven-01",
        "TotalNumberOfRequests": 42,
        "Uptime": 360000,
        "LoadedDatabases": [ { "Name": "a" }, { "Name": "b" }, { "Name": "c" } ]
    }"#;

    #[test]
    fn test_tab_cycling() {
        let mut app = app_for(Path::new("unused.json"));
        assert_eq!(app.current_tab, Tab::Overview);

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.current_tab, Tab::Databases);

        app.handle_key(key(KeyCode::BackTab));
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.current_tab, Tab::Help);

        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.current_tab, Tab::Memory);
    }

    #[test]
    fn test_reload_and_navigate() {
        let path = write_snapshot("navigate", THREE_DATABASES);
        let mut app = app_for(&path);
        app.reload();

        let stats = app.stats.as_ref().unwrap();
        assert_eq!(stats.server_name(), Some("raven-01"));
        assert!(app.loaded_at.is_some());
        assert_eq!(app.summary(), "raven-01 | 3 databases | up 6m 0s");

        app.handle_key(key(KeyCode::Char('2')));
        for _ in 0..5 {
            app.handle_key(key(KeyCode::Char('j')));
        }
        assert_eq!(app.selected_database, 2);

        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.selected_database, 1);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_failed_reload_keeps_previous_stats() {
        let path = write_snapshot("keep", THREE_DATABASES);
        let mut app = app_for(&path);
        app.reload();

        std::fs::write(&path, "not json").unwrap();
        app.reload();

        assert!(app.stats.is_some());
        assert!(app.messages.last().unwrap().is_error);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_snapshot() {
        let mut app = app_for(Path::new("/nonexistent/admin-stats.json"));
        app.reload();
        assert!(app.stats.is_none());
        assert_eq!(app.summary(), "No snapshot loaded");
        assert!(app.messages[0].text.starts_with("Load failed"));
    }

    #[test]
    fn test_selection_clamped_after_reload() {
        let path = write_snapshot("clamp", THREE_DATABASES);
        let mut app = app_for(&path);
        app.reload();
        app.selected_database = 2;

        std::fs::write(&path, r#"{ "LoadedDatabases": [ { "Name": "a" } ] }"#).unwrap();
        app.reload();
        assert_eq!(app.selected_database, 0);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_sort_only_on_databases_tab() {
        let mut app = app_for(Path::new("unused.json"));
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.database_sort, DatabaseSort::Name);

        app.current_tab = Tab::Databases;
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.database_sort, DatabaseSort::Size);
    }

    #[test]
    fn test_messages_are_capped() {
        let mut app = app_for(Path::new("unused.json"));
        for i in 0..5 {
            app.add_message(&format!("message {}", i), false);
        }
        let texts: Vec<_> = app.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["message 2", "message 3", "message 4"]);
    }

    #[test]
    fn test_not_watching_by_default() {
        let mut app = app_for(Path::new("unused.json"));
        assert!(!app.is_watching());
        app.process_file_events();
        assert!(app.stats.is_none());
    }
}
