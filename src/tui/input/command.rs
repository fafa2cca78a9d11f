use crossterm::event::KeyEvent;

use crate::tui::app::{App, Mode};
use crate::tui::commands;
use crate::tui::line_editor::LineEvent;

/// Feed a key to the command line; submitting or cancelling always returns
/// to normal mode
pub(super) fn handle_command(app: &mut App, key: KeyEvent) {
    let names = app.commands.names();
    match app.line.handle_key(key, &names) {
        LineEvent::Pending => {}
        LineEvent::Cancel => app.mode = Mode::Normal,
        LineEvent::Submit(line) => {
            app.mode = Mode::Normal;
            log::info!(":{line}");
            if let Err(e) = commands::execute(app, &line) {
                log::debug!("command failed: {e}");
                app.set_status(e.to_string());
            }
        }
        LineEvent::List(candidates) => {
            let listing: Vec<String> = candidates
                .iter()
                .filter_map(|name| app.commands.get(name))
                .map(|c| format!("{} ({})", c.usage, c.help))
                .collect();
            app.set_status(listing.join("  "));
        }
    }
}
