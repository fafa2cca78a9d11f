use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::music::len_str;
use crate::tui::app::{App, Mode};
use crate::tui::keymap::Operator;
use crate::util::unicode::display_width;

/// Right-hand indicators: typed count, meter warning, chord length and
/// cursor position
fn indicators(app: &App) -> String {
    let mut parts = Vec::new();
    let typed = match app.pending {
        Some(p) => {
            let op = match p.op {
                Operator::Delete => 'd',
                Operator::Change => 'c',
                Operator::Yank => 'y',
            };
            let count = p.count.map(|c| c.to_string()).unwrap_or_default();
            let motion = p.motion_count.map(|c| c.to_string()).unwrap_or_default();
            format!("{count}{op}{motion}")
        }
        None => app.count.map(|c| c.to_string()).unwrap_or_default(),
    };
    if !typed.is_empty() {
        parts.push(typed);
    }
    if !app.tab.get_cursor_bar().is_complete() {
        parts.push("M".to_string());
    }
    parts.push(len_str(app.tab.get_cursor_chord().duration));
    let cursor = app.tab.cursor;
    parts.push(format!("{},{}", cursor.bar, cursor.chord));
    parts.join("  ")
}

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mode_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(app.theme.text).bg(bg);

    let mut spans = match app.mode {
        Mode::Insert => vec![Span::styled("-- INSERT --", mode_style)],
        Mode::Replace => vec![Span::styled("-- REPLACE --", mode_style)],
        Mode::Command => vec![Span::styled(
            format!(":{}", app.line.buffer()),
            Style::default().fg(app.theme.text_bright).bg(bg),
        )],
        Mode::Normal => vec![Span::styled(app.status.clone(), text_style)],
    };

    // Indicators go flush right when they fit
    let hint = indicators(app);
    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = hint.chars().count();
    if app.mode != Mode::Command && content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
