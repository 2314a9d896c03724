//! Status pages view rendering.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;

/// Render the built-in status page followed by the pages created this session.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(format!(" Status Pages ({}) [p:new] ", app.status_pages.len() + 1))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let dim = Style::default().add_modifier(Modifier::DIM);
    let header = Row::new(vec!["Name", "Covers", "Created"]).style(app.theme.header);

    let mut rows = vec![Row::new(vec![
        Cell::from("Status page"),
        Cell::from("All monitors"),
        Cell::from("Published").style(dim),
    ])];
    rows.extend(app.status_pages.iter().map(|page| {
        Row::new(vec![
            Cell::from(page.name.clone()),
            Cell::from("Custom"),
            Cell::from(page.created_at.format("%Y-%m-%d %H:%M").to_string()),
        ])
    }));

    let selected = app.selected_index.min(rows.len() - 1);
    let table = Table::new(
        rows,
        [Constraint::Fill(1), Constraint::Length(14), Constraint::Length(18)],
    )
    .header(header)
    .block(block)
    .row_highlight_style(app.theme.selected)
    .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(table, area, &mut state);
    app.list_offset = state.offset();
}
