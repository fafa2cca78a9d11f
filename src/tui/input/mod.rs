mod command;
mod insert;
mod normal;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    // The help overlay swallows the key that closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    let key = normalize_key(key);
    match app.mode {
        Mode::Normal => normal::handle_normal(app, key),
        Mode::Insert | Mode::Replace => insert::handle_insert(app, key),
        Mode::Command => command::handle_command(app, key),
    }
}

/// A left click on the tablature moves the cursor there (normal mode only)
pub fn handle_click(app: &mut App, column: u16, row: u16) {
    if app.mode != Mode::Normal || app.show_help {
        return;
    }
    if let Some(target) = app
        .layout
        .position_at(&app.tab, usize::from(column), usize::from(row))
    {
        log::debug!("click at {column},{row} -> {target}");
        app.move_cursor(target);
    }
}

/// Map a shifted symbol key to its shifted character (US layout)
fn shift_symbol(c: char) -> Option<char> {
    match c {
        '`' => Some('~'),
        '4' => Some('$'),
        ';' => Some(':'),
        '/' => Some('?'),
        '\'' => Some('"'),
        _ => None,
    }
}

/// Terminals speaking the kitty keyboard protocol report `Char('g') + SHIFT`
/// where others send `Char('G')`; fold both into the latter.
fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
    {
        if c.is_ascii_lowercase() {
            key.code = KeyCode::Char(c.to_ascii_uppercase());
        } else if let Some(shifted) = shift_symbol(c) {
            key.code = KeyCode::Char(shifted);
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
    }
    key
}
