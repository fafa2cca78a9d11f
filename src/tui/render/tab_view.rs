use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::tui::app::{App, Mode};
use crate::util::unicode::clip_to_width;

use super::staff::staff_block;

/// Draw the visible bars into `area`
pub fn render_tab_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let staff_style = Style::default().fg(app.theme.text).bg(bg);
    let incomplete_style = Style::default().fg(app.theme.yellow).bg(bg);
    let fret_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let cursor_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let meta_style = Style::default().fg(app.theme.cyan).bg(bg);
    let overflow_style = Style::default().fg(app.theme.red).bg(bg);

    let width = usize::from(area.width);
    let cursor = app.tab.cursor;
    let buf = frame.buffer_mut();

    // Clipped to the area; text starting past the right edge is dropped
    let mut put = |col: usize, row: usize, text: &str, style: Style| {
        if col >= width || row >= usize::from(area.height) {
            return;
        }
        let text = clip_to_width(text, width - col);
        buf.set_string(area.x + col as u16, area.y + row as u16, text, style);
    };

    for (n, p) in app.layout.placements(&app.tab).iter().enumerate() {
        let block = staff_block(&app.tab, p.bar, app.visible_meta, n == 0);
        let bar = &app.tab.bars[p.bar - 1];
        let line_style = if bar.is_complete() {
            staff_style
        } else {
            incomplete_style
        };

        for (col, text) in &block.meta {
            put(p.x + col, p.y, text, meta_style);
        }
        for (s, line) in block.lines.iter().enumerate() {
            put(p.x, p.staff_top() + s, line, line_style);
        }
        for fret in &block.frets {
            let on_cursor =
                app.mode == Mode::Normal && p.bar == cursor.bar && fret.chord + 1 == cursor.chord;
            let style = if on_cursor { cursor_style } else { fret_style };
            // Frets are never drawn over the right border
            let room = (p.width + 1).saturating_sub(fret.col);
            let text = clip_to_width(&fret.text, room);
            put(p.x + fret.col, p.staff_top() + usize::from(fret.string), text, style);
        }
        if p.overflow && width > 0 {
            put(width - 1, p.y, ">", overflow_style);
        }
    }
}
