//! Normal-mode actions bound in the keymap. Each receives the typed count.

use crate::model::{ChordRange, PartialPosition};
use crate::ops::{bar_ops, chord_ops, motions};

use super::app::{App, Mode};

pub fn insert(app: &mut App, _count: Option<usize>) {
    let bar = chord_ops::insert_before_cursor(&mut app.tab, app.insert_duration);
    app.edited(bar);
    app.enter_insert(Mode::Insert);
}

pub fn append(app: &mut App, _count: Option<usize>) {
    let bar = chord_ops::insert_after_cursor(&mut app.tab, app.insert_duration);
    app.edited(bar);
    app.enter_insert(Mode::Insert);
}

/// Edit the cursor chord in place
pub fn set_chord(app: &mut App, _count: Option<usize>) {
    app.enter_insert(Mode::Insert);
}

pub fn replace(app: &mut App, _count: Option<usize>) {
    app.enter_insert(Mode::Replace);
}

pub fn insert_at_start(app: &mut App, count: Option<usize>) {
    if let Some(target) = motions::bar_start(&app.tab, None) {
        app.move_cursor(target);
    }
    insert(app, count);
}

pub fn append_at_end(app: &mut App, count: Option<usize>) {
    if let Some(target) = motions::bar_end(&app.tab, None) {
        app.move_cursor(target);
    }
    append(app, count);
}

pub fn append_bar(app: &mut App, _count: Option<usize>) {
    let bar = bar_ops::insert_bar_after(&mut app.tab, app.insert_duration);
    app.edited(bar);
    app.enter_insert(Mode::Insert);
}

pub fn insert_bar(app: &mut App, _count: Option<usize>) {
    let bar = bar_ops::insert_bar_before(&mut app.tab, app.insert_duration);
    app.edited(bar);
    app.enter_insert(Mode::Insert);
}

pub fn delete_chord(app: &mut App, count: Option<usize>) {
    let bar = chord_ops::delete_at_cursor(&mut app.tab, count.unwrap_or(1));
    app.edited(bar);
    let cursor = app.tab.cursor;
    app.move_cursor(cursor);
}

pub fn shorten(app: &mut App, count: Option<usize>) {
    let bar = chord_ops::shorten_cursor_chord(&mut app.tab, count);
    app.edited(bar);
}

pub fn lengthen(app: &mut App, _count: Option<usize>) {
    let bar = chord_ops::lengthen_cursor_chord(&mut app.tab);
    app.edited(bar);
}

pub fn join(app: &mut App, _count: Option<usize>) {
    match bar_ops::join_with_next(&mut app.tab) {
        Some(bar) => app.edited(bar),
        None => app.set_status("No bar to join"),
    }
}

fn paste(app: &mut App, after: bool) {
    let Some(bar) = app.register.take() else {
        app.set_status("Nothing to paste");
        return;
    };
    let first = bar_ops::paste_bar(&mut app.tab, &bar, after);
    app.register = Some(bar);
    app.edited(first);
    let cursor = app.tab.cursor;
    app.move_cursor(cursor);
}

pub fn paste_after(app: &mut App, _count: Option<usize>) {
    paste(app, true);
}

pub fn paste_before(app: &mut App, _count: Option<usize>) {
    paste(app, false);
}

pub fn scroll_down(app: &mut App, count: Option<usize>) {
    let delta = count.unwrap_or(1).min(isize::MAX as usize) as isize;
    app.layout.scroll(&mut app.tab, delta);
}

pub fn scroll_up(app: &mut App, count: Option<usize>) {
    let delta = count.unwrap_or(1).min(isize::MAX as usize) as isize;
    app.layout.scroll(&mut app.tab, -delta);
}

pub fn play_from_cursor(app: &mut App, _count: Option<usize>) {
    let last = app.tab.last_position();
    if let Ok(range) = ChordRange::new(&app.tab, app.tab.cursor, last) {
        app.play(range);
    }
}

pub fn play_all(app: &mut App, _count: Option<usize>) {
    let last = app.tab.last_position();
    if let Ok(range) = ChordRange::new(&app.tab, PartialPosition::bar(1), last) {
        app.play(range);
    }
}

pub fn help(app: &mut App, _count: Option<usize>) {
    app.show_help = true;
}

pub fn command_line(app: &mut App, _count: Option<usize>) {
    app.line.reset();
    app.mode = Mode::Command;
}

pub fn redraw(app: &mut App, _count: Option<usize>) {
    app.layout.invalidate();
    app.clear_requested = true;
}

pub fn quit_hint(app: &mut App, _count: Option<usize>) {
    app.set_status("Use :q<Enter> to quit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bar, Chord, Config, Duration, Position, Tablature};
    use pretty_assertions::assert_eq;

    fn app_with(counts: &[usize]) -> App {
        let mut tab = Tablature::default();
        tab.bars = counts
            .iter()
            .map(|&n| {
                let mut bar = Bar::default();
                bar.chords = vec![Chord::new(Duration::QUARTER); n];
                bar
            })
            .collect();
        App::new(tab, None, &Config::default(), std::env::temp_dir())
    }

    #[test]
    fn insert_and_append_enter_insert_mode() {
        let mut app = app_with(&[2]);
        app.tab.cursor = Position::new(1, 2);
        insert(&mut app, None);
        assert_eq!(app.mode, Mode::Insert);
        assert_eq!(app.tab.bars[0].chords.len(), 3);
        assert_eq!(app.tab.cursor, Position::new(1, 2));
        assert_eq!(app.insert_beg, Position::new(1, 2));
        assert_eq!(app.insert_end, Position::new(1, 2));

        let mut app = app_with(&[2]);
        append(&mut app, None);
        assert_eq!(app.tab.cursor, Position::new(1, 2));
        assert_eq!(app.tab.bars[0].chords.len(), 3);
    }

    #[test]
    fn capital_variants_jump_to_bar_ends() {
        let mut app = app_with(&[3]);
        app.tab.cursor = Position::new(1, 2);
        insert_at_start(&mut app, None);
        assert_eq!(app.tab.cursor, Position::new(1, 1));
        assert_eq!(app.tab.bars[0].chords.len(), 4);

        let mut app = app_with(&[3]);
        append_at_end(&mut app, None);
        assert_eq!(app.tab.cursor, Position::new(1, 4));
    }

    #[test]
    fn new_bars_share_signature() {
        let mut app = app_with(&[1, 1]);
        app.tab.bars[0].sig_num = 3;
        append_bar(&mut app, None);
        assert_eq!(app.tab.bars.len(), 3);
        assert_eq!(app.tab.cursor, Position::new(2, 1));
        assert_eq!(app.tab.bars[1].sig_num, 3);
        assert_eq!(app.mode, Mode::Insert);

        let mut app = app_with(&[1]);
        insert_bar(&mut app, None);
        assert_eq!(app.tab.bars.len(), 2);
        assert_eq!(app.tab.cursor, Position::new(1, 1));
    }

    #[test]
    fn delete_with_count_stays_in_bar() {
        let mut app = app_with(&[4, 2]);
        app.tab.cursor = Position::new(1, 3);
        delete_chord(&mut app, Some(5));
        assert_eq!(app.tab.bars[0].chords.len(), 2);
        assert_eq!(app.tab.bars[1].chords.len(), 2);
        assert_eq!(app.tab.cursor, Position::new(1, 2));
    }

    #[test]
    fn lengths() {
        let mut app = app_with(&[1]);
        shorten(&mut app, None);
        assert_eq!(app.tab.get_cursor_chord().duration, Duration::new(1, 8));
        shorten(&mut app, Some(2));
        assert_eq!(app.tab.get_cursor_chord().duration, Duration::new(1, 2));
        lengthen(&mut app, None);
        assert_eq!(app.tab.get_cursor_chord().duration, Duration::WHOLE);
    }

    #[test]
    fn join_last_bar_reports() {
        let mut app = app_with(&[1, 2]);
        join(&mut app, None);
        assert_eq!(app.tab.bars.len(), 1);
        assert_eq!(app.tab.bars[0].chords.len(), 3);
        join(&mut app, None);
        assert_eq!(app.status, "No bar to join");
    }

    #[test]
    fn paste_needs_register() {
        let mut app = app_with(&[1]);
        paste_after(&mut app, None);
        assert_eq!(app.status, "Nothing to paste");
        assert_eq!(app.tab.bars.len(), 1);

        let mut bar = Bar::default();
        bar.label = Some("riff".into());
        app.register = Some(bar);
        paste_after(&mut app, None);
        paste_before(&mut app, None);
        let labels: Vec<Option<&str>> = app.tab.bars.iter().map(|b| b.label.as_deref()).collect();
        assert_eq!(labels, vec![None, Some("riff"), Some("riff")]);
        assert_eq!(app.tab.cursor, Position::new(2, 1));
        assert!(app.register.is_some());
    }

    #[test]
    fn play_actions_queue_ranges() {
        let mut app = app_with(&[2, 2]);
        app.tab.cursor = Position::new(1, 2);
        play_from_cursor(&mut app, None);
        let score = app.pending_playback.take().unwrap();
        assert_eq!(score.chords.len(), 3);
        assert_eq!(score.beginning, Position::new(1, 2));

        play_all(&mut app, None);
        let score = app.pending_playback.take().unwrap();
        assert_eq!(score.chords.len(), 4);
        assert_eq!(score.beginning, Position::new(1, 1));
    }

    #[test]
    fn ctrl_c_hint() {
        let mut app = app_with(&[1]);
        quit_hint(&mut app, None);
        assert_eq!(app.status, "Use :q<Enter> to quit");
        assert!(!app.should_quit);
    }
}
