//! Incidents view rendering.
//!
//! A table of every target currently classified unhealthy, in source order.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_latency;

/// Render the Incidents view.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let incidents = app.incidents();
    let count = incidents.len();

    let block = Block::default()
        .title(format!(" Incidents ({}) ", count))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if incidents.is_empty() {
        let message = if app.targets().is_empty() {
            "No incidents. Nothing is being monitored yet."
        } else {
            "No incidents. All monitored targets are up."
        };
        let paragraph = Paragraph::new(message)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec!["Target", "Status", "Latency", "Last seen"])
        .height(1)
        .style(app.theme.header);

    let critical = Style::default().fg(app.theme.critical);
    let rows: Vec<Row> = incidents
        .iter()
        .map(|t| {
            Row::new(vec![
                Cell::from(t.address.clone()),
                Cell::from(t.status_message.clone()).style(critical),
                Cell::from(format_latency(t.current_latency_ms)),
                Cell::from(
                    t.last_seen_at
                        .with_timezone(&chrono::Local)
                        .format("%H:%M:%S")
                        .to_string(),
                ),
            ])
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(3),
        Constraint::Min(9),
        Constraint::Min(10),
    ];

    let selected = app.selected_index.min(count.saturating_sub(1));
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
    app.list_offset = state.offset();
}
