//! Raven Admin TUI - Terminal viewer for RavenDB administrative statistics snapshots

mod app;
mod ui;
mod watch;

use anyhow::{bail, Context, Result};
use app::App;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use raven_admin_common::{report, snapshot, ViewerConfig};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_FILE: &str = "raven-admin.toml";

/// Command line options
#[derive(Debug, Default, PartialEq)]
struct Options {
    snapshot: Option<PathBuf>,
    config: Option<PathBuf>,
    print: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Options> {
    let mut options = Options::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--print" => options.print = true,
            "--config" => {
                let path = args.next().context("--config requires a file argument")?;
                options.config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
            _ if options.snapshot.is_none() => options.snapshot = Some(PathBuf::from(&arg)),
            _ => bail!("Unexpected argument: {}", arg),
        }
    }
    Ok(options)
}

fn load_config(options: &Options) -> Result<ViewerConfig> {
    let mut config = match options.config {
        Some(ref path) => ViewerConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            info!("Loading configuration from {}", DEFAULT_CONFIG_FILE);
            ViewerConfig::load(DEFAULT_CONFIG_FILE)?
        }
        None => ViewerConfig::default(),
    };

    if let Some(ref snapshot) = options.snapshot {
        config.snapshot.path = snapshot.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Warnings from both the viewer and the decoding library reach stderr
fn log_filter(base: EnvFilter) -> Result<EnvFilter> {
    Ok(base
        .add_directive("raven_admin_tui=warn".parse()?)
        .add_directive("raven_admin_common=warn".parse()?))
}

fn main() -> Result<()> {
    // Log to stderr, stdout belongs to the terminal UI and --print
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter(EnvFilter::from_default_env())?)
        .init();

    let options = parse_args(std::env::args().skip(1))?;
    let config = load_config(&options)?;

    if options.print {
        let stats = snapshot::load(&config.snapshot.path)?;
        print!("{}", report::render_text(&stats));
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config);
    let res = run_app(&mut terminal, &mut app, &config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = res {
        error!("Application error: {}", e);
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    config: &ViewerConfig,
) -> Result<()> {
    app.reload();
    if config.snapshot.watch {
        app.start_watching();
    }

    let tick = Duration::from_millis(config.display.refresh_interval_ms);

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                if key.code == KeyCode::Char('q') && key.modifiers.is_empty() {
                    return Ok(());
                }
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                app.handle_key(key);
            }
        }

        app.process_file_events();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_log_filter_covers_library() {
        let filter = log_filter(EnvFilter::new("")).unwrap().to_string();
        assert!(filter.contains("raven_admin_tui=warn"));
        assert!(filter.contains("raven_admin_common=warn"));
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(parse_args(args(&[])).unwrap(), Options::default());
    }

    #[test]
    fn test_parse_all_options() {
        let options =
            parse_args(args(&["stats.json", "--config", "viewer.toml", "--print"])).unwrap();
        assert_eq!(options.snapshot, Some(PathBuf::from("stats.json")));
        assert_eq!(options.config, Some(PathBuf::from("viewer.toml")));
        assert!(options.print);
    }

    #[test]
    fn test_parse_rejects_bad_args() {
        assert!(parse_args(args(&["--config"])).is_err());
        assert!(parse_args(args(&["--verbose"])).is_err());
        assert!(parse_args(args(&["a.json", "b.json"])).is_err());
    }

    #[test]
    fn test_snapshot_argument_overrides_config() {
        let options = Options {
            snapshot: Some(PathBuf::from("other.json")),
            config: None,
            print: false,
        };
        let config = load_config(&options).unwrap();
        assert_eq!(config.snapshot.path, PathBuf::from("other.json"));
    }
}
