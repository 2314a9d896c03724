//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar (which doubles as
//! the input prompt), and help overlay.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, ConnectionBadge, InputMode, View};
use crate::data::HealthStatus;

/// Render the header bar with the fleet overview and connection badge.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let summary = app.summary();

    let status_style = if summary.down > 0 {
        app.theme.status_style(HealthStatus::Unhealthy)
    } else {
        app.theme.status_style(HealthStatus::Healthy)
    };

    let badge = app.connection_badge();
    let badge_style = match badge {
        ConnectionBadge::Live => Style::default().fg(Color::Black).bg(app.theme.healthy),
        ConnectionBadge::Idle => Style::default().add_modifier(Modifier::DIM | Modifier::REVERSED),
        ConnectionBadge::Disconnected => Style::default().fg(Color::White).bg(app.theme.critical),
    }
    .add_modifier(Modifier::BOLD);

    let line = Line::from(vec![
        Span::styled(" ● ", status_style),
        Span::styled("PULSEWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            format!("{}", summary.up),
            Style::default().fg(app.theme.healthy),
        ),
        Span::raw(" up "),
        if summary.down > 0 {
            Span::styled(
                format!("{}", summary.down),
                Style::default().fg(app.theme.critical).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        },
        Span::raw(" down │ "),
        Span::styled(
            format!("{}", summary.total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" targets │ "),
        Span::styled(format!(" {} ", badge.label()), badge_style),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let incidents = app.incidents().len();
    let titles: Vec<Line> = View::ALL
        .iter()
        .map(|view| match view {
            View::Incidents if incidents > 0 => Line::from(vec![
                Span::raw(format!(" {}:{} ", view.index() + 1, view.label())),
                Span::styled(
                    format!("({}) ", incidents),
                    Style::default().fg(app.theme.critical),
                ),
            ]),
            _ => Line::from(format!(" {}:{} ", view.index() + 1, view.label())),
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the open prompt if any, then temporary status messages, then the
/// view name, source, last update, and available controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let prompt = match app.input_mode {
        InputMode::StartUrl => Some(("Monitor URL", "Enter:start Esc:cancel")),
        InputMode::StatusPageName => Some(("Status page name", "Enter:create Esc:cancel")),
        InputMode::Search | InputMode::Normal => None,
    };
    if let Some((label, controls)) = prompt {
        let line = Line::from(vec![
            Span::styled(format!(" {}: ", label), app.theme.header),
            Span::raw(format!("{}_", app.input)),
            Span::styled(
                format!("  {}", controls),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        _ if app.input_mode == InputMode::Search => "Type to search | Enter:apply Esc:cancel",
        View::Monitoring => "/:search f:filter n:new x:stop Tab:switch ?:help q:quit",
        View::Incidents => "↑↓:select Tab:switch ?:help q:quit",
        View::StatusPages => "p:new page Tab:switch ?:help q:quit",
        View::Settings => "Tab:switch ?:help q:quit",
    };

    let reconciled_at = app.sync().session().and_then(|s| s.last_reconciled_at);
    let freshness = match (app.sync().pending_start(), reconciled_at) {
        (Some(pending), _) => format!("Starting {}...", pending),
        (None, Some(at)) => {
            let secs = (chrono::Utc::now() - at).num_milliseconds().max(0) as f64 / 1000.0;
            format!("Updated {:.1}s ago", secs)
        }
        (None, None) if app.sync().session().is_some() => "Waiting for data".to_string(),
        (None, None) => "Not monitoring".to_string(),
    };

    let status = match app.sync().last_error() {
        Some(err) if app.sync().session().is_some() => {
            format!(" {} | {} | Error: {} | {}", app.current_view.label(), app.source_description(), err, controls)
        }
        _ => format!(
            " {} | {} | {} | {}",
            app.current_view.label(),
            app.source_description(),
            freshness,
            controls,
        ),
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().add_modifier(Modifier::BOLD),
        )])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  1-4         Jump to view"),
        Line::from("  ↑/↓ j/k     Navigate list"),
        Line::from("  PgUp/PgDn   Jump 10 items"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from("  Esc         Go back"),
        Line::from(""),
        section(" Monitoring"),
        Line::from("  n         Start monitoring a URL"),
        Line::from("  x         Stop monitoring"),
        Line::from("  /         Search targets"),
        Line::from("  f         Cycle all/up/down"),
        Line::from("  c         Clear search and filter"),
        Line::from(""),
        section(" General"),
        Line::from("  p         New status page"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 26u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
