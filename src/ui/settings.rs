//! Settings view: the effective configuration, read-only.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_duration;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let settings = app.settings();
    let row = |key: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!(" {:<22}", key), Style::default().add_modifier(Modifier::DIM)),
            Span::raw(value),
        ])
    };

    let lines = vec![
        row("Status source", settings.status_url.clone()),
        row("Poll interval", format_duration(settings.poll_interval)),
        row("Request timeout", format_duration(settings.request_timeout)),
        row("History samples", settings.history_capacity.to_string()),
        row("Unhealthy latency", format!("{}ms", settings.unhealthy_latency_ms)),
        row("Chart range floor", format!("{}ms", settings.range_floor_ms)),
        row("Accepted schemes", settings.accepted_schemes.join(", ")),
        row(
            "Log file",
            settings
                .log_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "disabled".to_string()),
        ),
        Line::from(""),
        Line::from(Span::styled(
            " Edit the config file or PULSEWATCH_* variables and restart to change these.",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(" Settings ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::app_with;
    use crate::source::testing::ScriptedSource;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_shows_effective_settings() {
        let source = ScriptedSource::new();
        let app = app_with(&source);

        let mut terminal = Terminal::new(TestBackend::new(90, 14)).unwrap();
        terminal.draw(|frame| render(frame, &app, frame.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();

        assert!(text.contains("http://localhost:8000"));
        assert!(text.contains("1.0s"));
        assert!(text.contains("http://, https://"));
    }
}
