//! Terminal UI rendering using ratatui.
//!
//! This module contains all the view-specific rendering logic for the TUI.
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`monitoring`]: Target list with per-target trend charts
//! - [`stats`]: Sidebar with counts, uptime, and session details
//! - [`incidents`]: Targets currently classified unhealthy
//! - [`status_pages`]: Status pages created this session
//! - [`settings`]: Effective configuration
//! - [`trend`]: Filled latency line charts and their render cache
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! The main loop calls [`draw`] once per frame:
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (monitoring/incidents/...::render)   │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar / Prompt                  │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top:
//!    - common::render_help
//! ```

pub mod common;
pub mod incidents;
pub mod monitoring;
pub mod settings;
pub mod stats;
pub mod status_pages;
pub mod theme;
pub mod trend;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};

/// Minimum terminal size for usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 12;

/// Row where view content starts (after header and tabs).
pub const CONTENT_START_ROW: u16 = 2;

/// Render one full frame.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5.min(area.height));
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(8),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    match app.current_view {
        View::Monitoring => monitoring::render(frame, app, chunks[2]),
        View::Incidents => incidents::render(frame, app, chunks[2]),
        View::StatusPages => status_pages::render(frame, app, chunks[2]),
        View::Settings => settings::render(frame, app, chunks[2]),
    }

    common::render_status_bar(frame, app, chunks[3]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::{app_with, live_app};
    use crate::app::InputMode;
    use crate::source::testing::ScriptedSource;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[tokio::test]
    async fn test_full_frame() {
        let (mut app, _) = live_app(&[("https://a.test", 120.0, "Operational")]).await;
        let text = screen(&mut app, 120, 20);
        assert!(text.contains("PULSEWATCH"));
        assert!(text.contains(" LIVE "));
        assert!(text.contains("1:Monitoring"));
        assert!(text.contains("https://a.test"));
    }

    #[tokio::test]
    async fn test_prompt_replaces_status_bar() {
        let (mut app, _) = live_app(&[("https://a.test", 120.0, "Operational")]).await;
        app.open_prompt(InputMode::StartUrl);
        app.input_push('h');
        let text = screen(&mut app, 120, 20);
        assert!(text.contains("Monitor URL: h_"));
    }

    #[tokio::test]
    async fn test_pending_start_shown_in_status_bar() {
        let source = ScriptedSource::new();
        let mut app = app_with(&source);
        app.start_monitoring("https://ok.test");
        app.status_message = None;

        let text = screen(&mut app, 120, 20);
        assert!(text.contains("Starting https://ok.test..."));
    }

    #[tokio::test]
    async fn test_too_small() {
        let (mut app, _) = live_app(&[]).await;
        assert!(screen(&mut app, 40, 10).contains("Terminal too small"));
    }

    #[tokio::test]
    async fn test_help_overlay() {
        let (mut app, _) = live_app(&[]).await;
        app.toggle_help();
        assert!(screen(&mut app, 100, 30).contains("Keyboard Shortcuts"));
    }
}
