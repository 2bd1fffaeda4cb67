//! TUI rendering

use crate::app::{App, Tab};
use raven_admin_common::report::{self, format_bytes, format_megabytes, format_uptime, Totals};
use raven_admin_common::timespan::format_timespan;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, TableState, Tabs, Wrap,
    },
    Frame,
};

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header/tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(5), // Status messages
            Constraint::Length(1), // Footer
        ])
        .split(f.size());

    draw_tabs(f, app, chunks[0]);
    draw_main_content(f, app, chunks[1]);
    draw_messages(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);
}

/// Draw tab bar
fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::all()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            Line::from(vec![
                Span::styled(format!("{}:", i + 1), Style::default().fg(Color::Yellow)),
                Span::raw(t.name()),
            ])
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Raven Admin"))
        .select(
            Tab::all()
                .iter()
                .position(|&t| t == app.current_tab)
                .unwrap_or(0),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    f.render_widget(tabs, area);
}

fn draw_main_content(f: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Overview => draw_overview(f, app, area),
        Tab::Databases => draw_databases(f, app, area),
        Tab::Memory => draw_memory(f, app, area),
        Tab::Help => draw_help(f, area),
    }
}

fn labelled<'a>(label: &'a str, value: String, color: Color) -> Line<'a> {
    Line::from(vec![
        Span::raw(label),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn no_data(text: &str) -> Line<'_> {
    Line::styled(text, Style::default().fg(Color::DarkGray))
}

fn draw_overview(f: &mut Frame, app: &App, area: Rect) {
    let watch_status = if app.is_watching() {
        Span::styled("● Watching", Style::default().fg(Color::Green))
    } else {
        Span::styled("● Manual reload", Style::default().fg(Color::DarkGray))
    };

    let mut lines = vec![
        Line::from(vec![
            Span::raw("Snapshot: "),
            Span::styled(
                app.snapshot_path.display().to_string(),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw("  "),
            watch_status,
        ]),
    ];
    if let Some(loaded_at) = app.loaded_at {
        lines.push(labelled(
            "Loaded: ",
            format!("{} ago", format_uptime(loaded_at.elapsed().as_millis() as i64)),
            Color::DarkGray,
        ));
    }
    lines.push(Line::raw(""));

    if let Some(ref stats) = app.stats {
        let totals = Totals::of(stats);
        lines.extend(vec![
            labelled(
                "Server: ",
                stats.server_name().unwrap_or("(unknown)").to_string(),
                Color::Yellow,
            ),
            labelled(
                "Total Requests: ",
                stats.total_number_of_requests().to_string(),
                Color::Magenta,
            ),
            labelled(
                "Uptime: ",
                format!(
                    "{} ({})",
                    format_uptime(stats.uptime()),
                    format_timespan(stats.uptime())
                ),
                Color::Green,
            ),
            Line::raw(""),
            labelled("Loaded Databases: ", totals.databases.to_string(), Color::Blue),
            labelled("Documents: ", totals.documents.to_string(), Color::Blue),
            labelled("Attachments: ", totals.attachments.to_string(), Color::Blue),
            labelled("Total Size: ", format_bytes(totals.total_size), Color::Cyan),
        ]);
    } else {
        lines.push(no_data("No statistics loaded (press 'r' to reload)"));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Server Overview"))
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

fn draw_databases(f: &mut Frame, app: &App, area: Rect) {
    let header_cells = ["Name", "Documents", "Attachments", "Size", "Indexes", "Req/s", "Last Activity"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = if let Some(ref stats) = app.stats {
        report::sorted_databases(stats, app.database_sort)
            .into_iter()
            .map(|db| {
                let last_activity = db
                    .last_activity_at()
                    .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| db.last_activity().unwrap_or("-").to_string());
                let requests_per_second = db
                    .metrics()
                    .map(|m| format!("{:.2}", m.requests_per_second()))
                    .unwrap_or_else(|| "-".to_string());

                Row::new(vec![
                    Cell::from(db.name().unwrap_or("(unnamed)").to_string()),
                    Cell::from(db.count_of_documents().to_string()),
                    Cell::from(db.count_of_attachments().to_string()),
                    Cell::from(format_bytes(db.total_database_size())),
                    Cell::from(format_bytes(db.index_storage_size())),
                    Cell::from(requests_per_second),
                    Cell::from(last_activity),
                ])
            })
            .collect()
    } else {
        vec![]
    };

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(22),
            Constraint::Percentage(12),
            Constraint::Percentage(12),
            Constraint::Percentage(12),
            Constraint::Percentage(12),
            Constraint::Percentage(10),
            Constraint::Percentage(20),
        ],
    )
    .header(header)
    .highlight_style(Style::default().bg(Color::DarkGray))
    .block(Block::default().borders(Borders::ALL).title(format!(
        "Databases by {} (s: sort, j/k: navigate)",
        app.database_sort.name()
    )));

    // The state's offset scrolls the table so the selected row stays visible
    let mut state = TableState::default().with_selected(Some(app.selected_database));
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_memory(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];

    match app.stats.as_ref().and_then(|stats| stats.memory()) {
        Some(memory) => {
            lines.extend(vec![
                labelled(
                    "Total Process Memory: ",
                    format_megabytes(memory.total_process_memory_size_in_mb()),
                    Color::Green,
                ),
                labelled(
                    "Managed Memory: ",
                    format_megabytes(memory.managed_memory_size_in_mb()),
                    Color::Yellow,
                ),
                labelled(
                    "Database Cache: ",
                    format_megabytes(memory.database_cache_size_in_mb()),
                    Color::Cyan,
                ),
            ]);
        }
        None => lines.push(no_data("No memory statistics available")),
    }

    if let Some(databases) = app.stats.as_ref().and_then(|stats| stats.loaded_databases()) {
        if !databases.is_empty() {
            lines.push(Line::raw(""));
            lines.push(Line::styled(
                "Transaction Version Storage:",
                Style::default().add_modifier(Modifier::BOLD),
            ));
            for db in databases {
                lines.push(Line::from(vec![
                    Span::raw(format!("  {}: ", db.name().unwrap_or("(unnamed)"))),
                    Span::styled(
                        format_megabytes(db.database_transaction_version_size_in_mb()),
                        Style::default().fg(Color::Magenta),
                    ),
                ]));
            }
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Memory"))
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help_text = vec![
        Line::styled("Navigation", Style::default().add_modifier(Modifier::BOLD)),
        Line::raw("  Tab / Shift+Tab - Switch between tabs"),
        Line::raw("  1-4            - Jump to specific tab"),
        Line::raw("  j/k or ↑/↓     - Navigate the databases table"),
        Line::raw(""),
        Line::styled("Actions", Style::default().add_modifier(Modifier::BOLD)),
        Line::raw("  r              - Reload the snapshot file"),
        Line::raw("  s              - Cycle database sort order (Databases tab)"),
        Line::raw("  q              - Quit"),
        Line::raw(""),
        Line::styled("Notes", Style::default().add_modifier(Modifier::BOLD)),
        Line::raw("  With snapshot.watch enabled the file is reloaded when it changes."),
        Line::raw("  A snapshot that fails to load leaves the previous one on screen."),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, area);
}

fn draw_messages(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .messages
        .iter()
        .rev()
        .take(3)
        .map(|msg| {
            let style = if msg.is_error {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Green)
            };
            ListItem::new(Line::styled(&msg.text, style))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Messages"));

    f.render_widget(list, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let footer = Paragraph::new(format!(
        "{} | 'q' quit | Tab switch views | 'r' reload",
        app.summary()
    ))
    .style(Style::default().fg(Color::DarkGray));

    f.render_widget(footer, area);
}
