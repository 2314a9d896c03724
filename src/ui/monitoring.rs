//! Monitoring view rendering.
//!
//! Lists the filtered targets, each as a two-line card: status glyph and
//! address on top, status message and latencies below, with the latency trend
//! chart on the right. A stats sidebar sits beside the list on wide terminals.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, InputMode};
use crate::data::duration::format_latency;
use crate::data::{DisplayState, Target};

use super::stats;

/// Terminal rows per target: two lines of content plus a spacer.
pub const ROW_HEIGHT: u16 = 3;

/// Below this width the stats sidebar is hidden.
const SIDEBAR_MIN_WIDTH: u16 = 90;
const SIDEBAR_WIDTH: u16 = 30;

/// Status glyph for a target.
pub fn status_glyph(state: DisplayState) -> &'static str {
    match state {
        DisplayState::Idle => "○",
        DisplayState::Up => "●",
        DisplayState::Down => "✖",
    }
}

/// Render the Monitoring view.
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let list_area = if area.width >= SIDEBAR_MIN_WIDTH {
        let [list, sidebar] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(SIDEBAR_WIDTH)]).areas(area);
        stats::render(frame, app, sidebar);
        list
    } else {
        area
    };

    render_list(frame, app, list_area);
}

fn render_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = app.theme.clone();
    let total = app.targets().len();
    let searching = app.input_mode == InputMode::Search;
    let search_term = app.filter.search_term.clone();
    let status_filter = app.filter.status_filter;
    let has_session = app.sync().session().is_some();
    let selected = app.selected_index;

    let block_area = area;
    let inner = Block::default().borders(Borders::ALL).inner(block_area);
    let rows_fit = (inner.height / ROW_HEIGHT).max(1) as usize;

    let (visible, trends) = app.monitoring_parts();
    let count = visible.len();
    let selected = selected.min(count.saturating_sub(1));
    let offset = if selected >= rows_fit {
        selected + 1 - rows_fit
    } else {
        0
    };

    let filter_info = if searching {
        format!(" /{}_", search_term)
    } else if !search_term.is_empty() {
        format!(" /{}/ [c:clear]", search_term)
    } else {
        String::new()
    };
    let position_info = if count > 0 {
        format!(" [{}/{}]", selected + 1, count)
    } else {
        String::new()
    };
    let title = format!(
        " Targets ({}/{}) [f:{}]{}{} ",
        count,
        total,
        status_filter.label(),
        filter_info,
        position_info
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border));
    frame.render_widget(block, block_area);

    if visible.is_empty() {
        let message = if total > 0 {
            "No targets match the current filter."
        } else if has_session {
            "Waiting for the first snapshot..."
        } else {
            "Not monitoring. Press n to add a URL."
        };
        let paragraph = Paragraph::new(message).style(Style::default().add_modifier(Modifier::DIM));
        frame.render_widget(paragraph, inner);
        app.list_offset = 0;
        return;
    }

    for (row, target) in visible.iter().enumerate().skip(offset).take(rows_fit) {
        let y = inner.y + ((row - offset) as u16) * ROW_HEIGHT;
        let height = 2.min(inner.bottom().saturating_sub(y));
        if height == 0 {
            break;
        }
        let card = Rect::new(inner.x, y, inner.width, height);
        let is_selected = row == selected;

        let [text_area, chart_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Percentage(45)]).areas(card);

        let state = target.display_state();
        let paragraph = Paragraph::new(card_lines(target, is_selected, &theme.display_style(state)));
        let paragraph = if is_selected {
            paragraph.style(theme.selected)
        } else {
            paragraph
        };
        frame.render_widget(paragraph, text_area);

        trends.render(&target.address, &target.history, chart_area, frame.buffer_mut());
    }

    app.list_offset = offset;
}

fn card_lines(target: &Target, selected: bool, status_style: &Style) -> Vec<Line<'static>> {
    let marker = if selected { "▶ " } else { "  " };
    let state = target.display_state();

    let mut detail = vec![
        Span::raw("    "),
        Span::styled(target.status_message.clone(), *status_style),
    ];
    if state != DisplayState::Idle {
        detail.push(Span::raw(format!(
            " · {} · base {}",
            format_latency(target.current_latency_ms),
            format_latency(target.baseline_avg_ms)
        )));
    }

    vec![
        Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{} ", status_glyph(state)), *status_style),
            Span::styled(
                target.address.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(detail).style(Style::default().add_modifier(Modifier::DIM)),
    ]
}
