use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::ChordRange;
use crate::tui::app::{App, PendingOperator};
use crate::tui::keymap::{CommandKind, Key};

/// Fold a typed digit into a count. A leading `0` is not a digit.
fn push_digit(count: Option<usize>, key: &KeyEvent) -> Option<Option<usize>> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    let KeyCode::Char(c) = key.code else {
        return None;
    };
    let digit = c.to_digit(10)? as usize;
    if digit == 0 && count.is_none() {
        return None;
    }
    Some(Some(
        count.unwrap_or(0).saturating_mul(10).saturating_add(digit),
    ))
}

/// Count for a motion run under an operator: the two counts multiply, an
/// absent one counting as 1
fn combined_count(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (None, None) => None,
        _ => Some(a.unwrap_or(1).saturating_mul(b.unwrap_or(1))),
    }
}

pub(super) fn handle_normal(app: &mut App, key: KeyEvent) {
    app.status.clear();

    if key.code == KeyCode::Esc {
        app.count = None;
        app.pending = None;
        return;
    }

    if let Some(mut pending) = app.pending.take() {
        if let Some(count) = push_digit(pending.motion_count, &key) {
            pending.motion_count = count;
            app.pending = Some(pending);
            return;
        }
        finish_operator(app, pending, Key::from_event(&key));
        return;
    }

    if let Some(count) = push_digit(app.count, &key) {
        app.count = count;
        return;
    }

    let count = app.count.take();
    let Some(descriptor) = app.keymap.lookup(Key::from_event(&key)) else {
        return;
    };
    let (kind, pure) = (descriptor.kind, descriptor.no_side_effects);
    log::debug!("{} (count {count:?})", descriptor.name);
    match kind {
        CommandKind::Motion(motion) => {
            if let Some(target) = motion(&app.tab, count) {
                app.move_cursor(target);
            }
        }
        CommandKind::Operator(op) => {
            app.pending = Some(PendingOperator {
                op,
                count,
                motion_count: None,
            });
        }
        CommandKind::Action(action) => {
            action(app, count);
            if !pure {
                app.mark_changed();
            }
        }
    }
}

/// Second key of an operator: its own key again for the whole bar, or a
/// motion. Anything else cancels the operator.
fn finish_operator(app: &mut App, pending: PendingOperator, key: Key) {
    let range = if key == pending.op.whole_bar_key() {
        ChordRange::whole_bar(&app.tab, app.tab.cursor.bar).ok()
    } else if let Some(motion) = app.keymap.motion(key) {
        let count = combined_count(pending.count, pending.motion_count);
        motion(&app.tab, count).and_then(|target| ChordRange::new(&app.tab, app.tab.cursor, target).ok())
    } else {
        log::debug!("operator {:?} cancelled by {key}", pending.op);
        None
    };
    if let Some(range) = range {
        app.apply_operator(pending.op, range);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bar, Chord, Config, Duration, Position, Tablature};
    use crate::tui::app::Mode;
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

    fn press(app: &mut App, keys: &str) {
        for c in keys.chars() {
            handle_normal(app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn chord_counts(app: &App) -> Vec<usize> {
        app.tab.bars.iter().map(|b| b.chords.len()).collect()
    }

    #[test]
    fn counts_accumulate_and_leading_zero_is_a_motion() {
        let mut app = app_with(&[5, 5]);
        press(&mut app, "3l");
        assert_eq!(app.tab.cursor, Position::new(1, 4));
        press(&mut app, "0");
        assert_eq!(app.tab.cursor, Position::new(1, 1));
        assert_eq!(app.count, None);
        press(&mut app, "10");
        assert_eq!(app.count, Some(10));
        press(&mut app, "l");
        assert_eq!(app.tab.cursor, Position::new(2, 1));
    }

    #[test]
    fn g_with_count_goes_to_bar() {
        let mut app = app_with(&[1, 1, 1, 1]);
        press(&mut app, "G");
        assert_eq!(app.tab.cursor, Position::new(4, 1));
        press(&mut app, "2G");
        assert_eq!(app.tab.cursor, Position::new(2, 1));
        press(&mut app, "g");
        assert_eq!(app.tab.cursor, Position::new(1, 1));
    }

    #[test]
    fn motions_do_not_dirty_the_document() {
        let mut app = app_with(&[3, 3]);
        press(&mut app, "lljkh$0Gg");
        assert!(!app.tab.changed);
    }

    #[test]
    fn delete_to_bar_end_collapses_single_bar() {
        let mut app = app_with(&[3]);
        press(&mut app, "d$");
        assert_eq!(chord_counts(&app), vec![1]);
        assert_eq!(app.tab.bars[0].chords[0], Chord::new(Duration::QUARTER));
        assert_eq!(app.tab.cursor, Position::new(1, 1));
        assert!(app.tab.changed);
    }

    #[test]
    fn delete_to_bar_end_removes_bar_among_others() {
        let mut app = app_with(&[3, 2]);
        press(&mut app, "d$");
        assert_eq!(chord_counts(&app), vec![2]);
    }

    #[test]
    fn operator_and_motion_counts_multiply() {
        let mut app = app_with(&[8]);
        press(&mut app, "2d2l");
        // deletes chords 1..=5 (cursor plus four to the right)
        assert_eq!(chord_counts(&app), vec![3]);
        assert_eq!(app.pending, None);
    }

    #[test]
    fn operator_whole_bar_shortcut() {
        let mut app = app_with(&[2, 3, 4]);
        press(&mut app, "jdd");
        assert_eq!(chord_counts(&app), vec![2, 4]);
        assert_eq!(app.tab.cursor, Position::new(2, 1));
    }

    #[test]
    fn operator_with_leading_zero_motion() {
        let mut app = app_with(&[4]);
        press(&mut app, "$hd0");
        assert_eq!(chord_counts(&app), vec![1]);
        assert_eq!(app.tab.cursor, Position::new(1, 1));
    }

    #[test]
    fn unknown_key_cancels_operator() {
        let mut app = app_with(&[3]);
        press(&mut app, "dz");
        assert_eq!(app.pending, None);
        assert_eq!(chord_counts(&app), vec![3]);
        press(&mut app, "x");
        assert_eq!(chord_counts(&app), vec![2]);
    }

    #[test]
    fn change_enters_insert_at_gap() {
        let mut app = app_with(&[4]);
        press(&mut app, "lcl");
        assert_eq!(app.mode, Mode::Insert);
        assert_eq!(chord_counts(&app), vec![3]);
        assert_eq!(app.tab.cursor, Position::new(1, 2));
    }

    #[test]
    fn change_whole_bar_replaces_it() {
        let mut app = app_with(&[4, 2]);
        app.tab.bars[0].sig_num = 3;
        press(&mut app, "cc");
        assert_eq!(chord_counts(&app), vec![1, 2]);
        assert_eq!(app.tab.bars[0].sig_num, 3);
        assert_eq!(app.mode, Mode::Insert);
    }

    #[test]
    fn yank_and_paste() {
        let mut app = app_with(&[2, 3]);
        press(&mut app, "yy");
        assert!(!app.tab.changed);
        press(&mut app, "jp");
        assert_eq!(chord_counts(&app), vec![2, 3, 2]);
        assert_eq!(app.tab.cursor, Position::new(3, 1));
        press(&mut app, "gP");
        assert_eq!(chord_counts(&app), vec![2, 2, 3, 2]);
    }

    #[test]
    fn escape_clears_count_and_operator() {
        let mut app = app_with(&[3]);
        press(&mut app, "5d");
        handle_normal(&mut app, KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(app.pending, None);
        assert_eq!(app.count, None);
        press(&mut app, "l");
        assert_eq!(app.tab.cursor, Position::new(1, 2));
    }

    #[test]
    fn status_is_cleared_by_next_key() {
        let mut app = app_with(&[1]);
        handle_normal(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(app.status, "Use :q<Enter> to quit");
        press(&mut app, "l");
        assert_eq!(app.status, "");
    }

    #[test]
    fn colon_enters_command_mode() {
        let mut app = app_with(&[1]);
        press(&mut app, ":");
        assert_eq!(app.mode, Mode::Command);
    }
}
