use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, InputMode, View};
use crate::ui::monitoring::ROW_HEIGHT;

/// File written by the in-app export key.
pub const EXPORT_PATH: &str = "pulsewatch_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.input_mode != InputMode::Normal {
        handle_text_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        KeyCode::Char('1') => app.set_view(View::Monitoring),
        KeyCode::Char('2') => app.set_view(View::Incidents),
        KeyCode::Char('3') => app.set_view(View::StatusPages),
        KeyCode::Char('4') => app.set_view(View::Settings),

        // Navigation (up/down for items, left/right for tabs)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        KeyCode::Char('?') => app.toggle_help(),

        // Monitoring control
        KeyCode::Char('n') => app.open_prompt(InputMode::StartUrl),
        KeyCode::Char('x') => app.stop_monitoring(),

        // Search and filter
        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Char('f') => {
            app.set_view(View::Monitoring);
            app.cycle_status_filter();
        }
        KeyCode::Char('c') => {
            if app.filter.is_active() {
                app.clear_filter();
            }
        }

        // Status pages
        KeyCode::Char('p') => {
            app.set_view(View::StatusPages);
            app.open_prompt(InputMode::StatusPageName);
        }

        // Export
        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_PATH);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while a prompt or the search box is active
fn handle_text_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_input(),

        // Cancel (search keeps its text)
        KeyCode::Esc => app.cancel_input(),

        // Clear and exit
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if app.input_mode == InputMode::Search {
                app.clear_filter();
            } else {
                app.cancel_input();
            }
        }

        KeyCode::Backspace => app.input_pop(),

        KeyCode::Char(c) => app.input_push(c),

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        // Click to select
        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Content begins below the block border (and the table header for tables).
            if clicked_row > content_start_row {
                let offset_row = (clicked_row - content_start_row - 1) as usize;
                let item = match app.current_view {
                    View::Monitoring => Some(app.list_offset + offset_row / ROW_HEIGHT as usize),
                    View::Incidents | View::StatusPages => offset_row
                        .checked_sub(1)
                        .map(|row| app.list_offset + row),
                    View::Settings => None,
                };
                if let Some(item) = item {
                    if item < app.list_len() {
                        app.selected_index = item;
                    }
                }
            }

            // Tab clicks (row 1, after header)
            if clicked_row + 1 == content_start_row {
                if let Some(view) = tab_at(mouse.column) {
                    app.set_view(view);
                }
            }
        }

        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}

/// Approximate tab positions for " 1:Monitoring | 2:Incidents | 3:Status Pages | 4:Settings ".
fn tab_at(column: u16) -> Option<View> {
    match column {
        0..=13 => Some(View::Monitoring),
        14..=31 => Some(View::Incidents),
        32..=48 => Some(View::StatusPages),
        49..=61 => Some(View::Settings),
        _ => None,
    }
}
