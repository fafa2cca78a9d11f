use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::tui::keymap::CommandKind;

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Center the overlay, leaving some margin
    let overlay_area = centered_rect(70, 90, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    let sections: [(&str, fn(&CommandKind) -> bool); 3] = [
        (" Motions", |k| matches!(k, CommandKind::Motion(_))),
        (" Operators", |k| matches!(k, CommandKind::Operator(_))),
        (" Actions", |k| matches!(k, CommandKind::Action(_))),
    ];
    for (title, wanted) in sections {
        lines.push(Line::from(Span::styled(title, header_style)));
        for d in app.keymap.descriptors().iter().filter(|d| wanted(&d.kind)) {
            add_binding(&mut lines, format!(" {}", d.key_label()), d.help, key_style, desc_style);
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(" Commands", header_style)));
    for c in app.commands.commands() {
        add_binding(&mut lines, format!(" :{}", c.usage), c.help, key_style, desc_style);
    }

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: String,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 24;
    let padded_key = format!("{:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}

/// Create a centered rectangle of the given percentage of the parent
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Config, Tablature};
    use crate::tui::render::test_helpers::render_to_string;

    #[test]
    fn lists_bindings_from_keymap() {
        let app = App::new(Tablature::default(), None, &Config::default(), std::env::temp_dir());
        let out = render_to_string(100, 80, |frame, area| render_help_overlay(frame, &app, area));
        assert!(out.contains("Motions"));
        assert!(out.contains("Operators"));
        assert!(out.contains("Commands"));
        assert!(out.contains(":meter N D"));
    }
}
