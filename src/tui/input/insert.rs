use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::{Position, STRING_COUNT, Symbol};
use crate::ops::{chord_ops, motions};
use crate::tui::app::{App, Mode};

/// Staff row selected by a string-name shortcut; row 0 is the top line
fn string_shortcut(c: char) -> Option<u8> {
    match c {
        'E' => Some(5),
        'A' => Some(4),
        'D' => Some(3),
        'G' => Some(2),
        'B' => Some(1),
        'e' => Some(0),
        _ => None,
    }
}

pub(super) fn handle_insert(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => leave(app),
        KeyCode::Char('c') if ctrl => leave(app),
        _ if ctrl => {}

        KeyCode::Char(c @ '0'..='9') => {
            chord_ops::type_digit(&mut app.tab, app.string, c as u8 - b'0');
            app.edited(app.tab.cursor.bar);
        }
        KeyCode::Delete | KeyCode::Char('x') => {
            if chord_ops::clear_string(&mut app.tab, app.string) {
                app.edited(app.tab.cursor.bar);
            }
        }

        KeyCode::Up | KeyCode::Char('k') => app.string = app.string.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => {
            app.string = (app.string + 1).min(STRING_COUNT as u8 - 1);
        }
        KeyCode::Char(c) if string_shortcut(c).is_some() => {
            app.string = string_shortcut(c).unwrap_or(app.string);
        }

        KeyCode::Char(' ') => {
            let bar = chord_ops::insert_after_cursor(&mut app.tab, app.insert_duration);
            app.edited(bar);
            let cursor = app.tab.cursor;
            app.move_cursor(cursor);
            app.insert_end = Position::new(app.insert_end.bar, app.insert_end.chord + 1);
        }

        KeyCode::Right | KeyCode::Char('l') => move_right(app),
        KeyCode::Left | KeyCode::Char('h') => move_left(app),

        KeyCode::Char(c) => {
            if let Some(symbol) = Symbol::from_toggle_key(c)
                && chord_ops::toggle_symbol(&mut app.tab, app.string, symbol)
            {
                app.edited(app.tab.cursor.bar);
            }
        }
        _ => {}
    }
}

fn leave(app: &mut App) {
    app.mode = Mode::Normal;
    log::debug!(
        "left insert mode, edited {}..{}",
        app.insert_beg,
        app.insert_end
    );
}

/// Insert mode grows the edited span on demand; replace mode moves freely
fn move_right(app: &mut App) {
    if app.mode == Mode::Replace {
        if let Some(target) = motions::right(&app.tab, None) {
            app.move_cursor(target);
        }
        return;
    }
    let Position { bar, chord } = app.tab.cursor;
    let right = Position::new(bar, chord + 1);
    if right > app.insert_end {
        let first = chord_ops::insert_after_cursor(&mut app.tab, app.insert_duration);
        app.edited(first);
        app.insert_end = right;
    }
    app.move_cursor(right);
}

/// Insert mode never leaves the span started at `insert_beg`
fn move_left(app: &mut App) {
    let Some(target) = motions::left(&app.tab, None) else {
        return;
    };
    if app.mode == Mode::Replace || target >= app.insert_beg {
        app.move_cursor(target);
    }
}
