//! Cursor motions. Each takes the document and an optional count and
//! returns where the cursor should go, without touching the document.
//! Out-of-range targets are clamped to the document bounds.

use crate::model::{Position, Tablature};

/// Signature shared by every motion
pub type MotionFn = fn(&Tablature, Option<usize>) -> Option<Position>;

fn count(n: Option<usize>) -> usize {
    n.unwrap_or(1).max(1)
}

/// `h`: `count` chords left; stepping past the bar start lands on the
/// previous bar's last chord
pub fn left(tab: &Tablature, n: Option<usize>) -> Option<Position> {
    let Position { bar, chord } = tab.cursor;
    if chord <= count(n) {
        if bar > 1 {
            Some(Position::new(bar - 1, tab.chord_count(bar - 1)))
        } else {
            Some(Position::new(1, 1))
        }
    } else {
        Some(Position::new(bar, chord - count(n)))
    }
}

/// `l`: `count` chords right; stepping past the bar end lands on the next
/// bar's first chord
pub fn right(tab: &Tablature, n: Option<usize>) -> Option<Position> {
    let Position { bar, chord } = tab.cursor;
    if chord + count(n) > tab.chord_count(bar) {
        if bar < tab.bars.len() {
            Some(Position::new(bar + 1, 1))
        } else {
            Some(tab.last_position())
        }
    } else {
        Some(Position::new(bar, chord + count(n)))
    }
}

/// `j`: first chord of the bar `count` bars down
pub fn next_bar(tab: &Tablature, n: Option<usize>) -> Option<Position> {
    let bar = (tab.cursor.bar + count(n)).min(tab.bars.len());
    Some(Position::new(bar, 1))
}

/// `k`: first chord of the bar `count` bars up
pub fn prev_bar(tab: &Tablature, n: Option<usize>) -> Option<Position> {
    let bar = tab.cursor.bar.saturating_sub(count(n)).max(1);
    Some(Position::new(bar, 1))
}

/// `0`: first chord of the cursor bar
pub fn bar_start(tab: &Tablature, _n: Option<usize>) -> Option<Position> {
    Some(Position::new(tab.cursor.bar, 1))
}

/// `$`: last chord of the cursor bar
pub fn bar_end(tab: &Tablature, _n: Option<usize>) -> Option<Position> {
    let bar = tab.cursor.bar;
    Some(Position::new(bar, tab.chord_count(bar)))
}

/// `G`: the last bar, or bar `count`
pub fn last_bar(tab: &Tablature, n: Option<usize>) -> Option<Position> {
    let bar = match n {
        Some(n) => n.clamp(1, tab.bars.len()),
        None => tab.bars.len(),
    };
    Some(Position::new(bar, 1))
}

/// `g`: the first bar
pub fn first_bar(_tab: &Tablature, _n: Option<usize>) -> Option<Position> {
    Some(Position::new(1, 1))
}
