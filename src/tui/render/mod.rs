pub mod help_overlay;
pub mod staff;
pub mod status_row;
pub mod tab_view;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::{App, Mode};
use super::layout::CursorLine;
use crate::util::unicode::display_width;

/// Main render function: tablature above the status row, help on top
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: tablature | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let tab_area = chunks[0];

    app.layout
        .resize(usize::from(tab_area.width), usize::from(tab_area.height));

    tab_view::render_tab_view(frame, app, tab_area);
    status_row::render_status_row(frame, app, chunks[1]);

    if app.show_help {
        help_overlay::render_help_overlay(frame, app, area);
        return;
    }

    let (x, y) = match app.mode {
        Mode::Command => {
            let typed = &app.line.buffer()[..app.line.cursor()];
            (1 + display_width(typed), usize::from(chunks[1].y))
        }
        mode => {
            let line = if mode == Mode::Normal {
                CursorLine::Meta
            } else {
                CursorLine::String(app.string)
            };
            let (col, row) = app.layout.cursor_cell(&app.tab, line);
            (usize::from(tab_area.x) + col, usize::from(tab_area.y) + row)
        }
    };
    if x < usize::from(area.width) && y < usize::from(area.height) {
        frame.set_cursor_position((x as u16, y as u16));
    }
}
