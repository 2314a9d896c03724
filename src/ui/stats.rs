//! Stats sidebar: fleet counts, uptime, and the active session.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_latency;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let summary = app.summary();
    let label = |text: &'static str| Span::styled(text, Style::default().add_modifier(Modifier::DIM));

    let avg = summary
        .avg_latency_ms
        .map(format_latency)
        .unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        Line::from(vec![
            label(" Total     "),
            Span::styled(format!("{}", summary.total), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            label(" Up        "),
            Span::styled(format!("{}", summary.up), Style::default().fg(app.theme.healthy)),
        ]),
        Line::from(vec![
            label(" Down      "),
            Span::styled(format!("{}", summary.down), Style::default().fg(app.theme.critical)),
        ]),
        Line::from(vec![label(" Uptime    "), Span::raw(format!("{:.2}%", summary.uptime_percent))]),
        Line::from(vec![label(" Avg       "), Span::raw(avg)]),
        Line::from(""),
    ];

    match app.sync().session() {
        Some(session) => {
            lines.push(Line::from(label(" Session")));
            lines.push(Line::from(format!(" {}", session.target)));
            lines.push(Line::from(vec![
                label(" Since     "),
                Span::raw(
                    session
                        .started_at
                        .with_timezone(&chrono::Local)
                        .format("%H:%M:%S")
                        .to_string(),
                ),
            ]));
            lines.push(Line::from(vec![
                label(" Every     "),
                Span::raw(app.poll_interval_label()),
            ]));
        }
        None => lines.push(Line::from(label(" No active session"))),
    }

    let block = Block::default()
        .title(" Overview ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
