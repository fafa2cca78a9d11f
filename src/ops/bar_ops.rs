//! Bar-level and range edits. Like the chord edits, every mutating
//! function returns the first bar whose layout may have changed.

use crate::model::{Bar, Chord, ChordRange, Duration, Position, Tablature};

/// Delete the chords of `range` and restore the document invariants. The
/// cursor lands on the range's beginning, clamped into what remains.
pub fn delete_range(tab: &mut Tablature, range: ChordRange) -> usize {
    range.delete_all(tab);
    tab.cursor = range.beginning;
    tab.repair();
    range.beginning.bar.min(tab.bars.len())
}

/// Delete the range and leave one empty chord of `duration` in its place,
/// with the cursor on it. A range of whole bars becomes a single bar with
/// the first removed bar's signature.
pub fn change_range(tab: &mut Tablature, range: ChordRange, duration: Duration) -> usize {
    let begin = range.beginning;
    if range.whole_bars(tab) {
        let first = &tab.bars[begin.bar - 1];
        let replacement = Bar::new(first.sig_num, first.sig_den, duration);
        range.delete_all(tab);
        let index = (begin.bar - 1).min(tab.bars.len());
        tab.bars.insert(index, replacement);
        tab.cursor = Position::new(index + 1, 1);
    } else {
        range.delete_all(tab);
        tab.bars[begin.bar - 1]
            .chords
            .insert(begin.chord - 1, Chord::new(duration));
        tab.cursor = begin;
    }
    tab.repair();
    begin.bar
}

/// Insert a new bar before the cursor bar, sharing its signature
pub fn insert_bar_before(tab: &mut Tablature, duration: Duration) -> usize {
    let bar = tab.cursor.bar;
    let current = tab.get_cursor_bar();
    let new = Bar::new(current.sig_num, current.sig_den, duration);
    tab.bars.insert(bar - 1, new);
    tab.cursor = Position::new(bar, 1);
    bar
}

/// Insert a new bar after the cursor bar, sharing its signature
pub fn insert_bar_after(tab: &mut Tablature, duration: Duration) -> usize {
    let bar = tab.cursor.bar;
    let current = tab.get_cursor_bar();
    let new = Bar::new(current.sig_num, current.sig_den, duration);
    tab.bars.insert(bar, new);
    tab.cursor = Position::new(bar + 1, 1);
    bar + 1
}

/// Append the chords of the following bar to the cursor bar. Returns
/// `None` when the cursor is on the last bar.
pub fn join_with_next(tab: &mut Tablature) -> Option<usize> {
    let bar = tab.cursor.bar;
    if bar >= tab.bars.len() {
        return None;
    }
    let next = tab.bars.remove(bar);
    tab.bars[bar - 1].chords.extend(next.chords);
    Some(bar)
}

/// Copy of the cursor bar, for the yank register
pub fn yank_bar(tab: &Tablature) -> Bar {
    tab.get_cursor_bar().clone()
}

/// Paste a copy of `bar` after (or before) the cursor bar; the cursor
/// moves to the first chord of the pasted bar
pub fn paste_bar(tab: &mut Tablature, bar: &Bar, after: bool) -> usize {
    let index = if after {
        tab.cursor.bar
    } else {
        tab.cursor.bar - 1
    };
    tab.bars.insert(index, bar.clone());
    tab.cursor = Position::new(index + 1, 1);
    index + 1
}

/// Set the time signature of every bar the range touches
pub fn set_meter(tab: &mut Tablature, range: ChordRange, num: u32, den: u32) -> usize {
    for bar in &mut tab.bars[range.beginning.bar - 1..range.end.bar] {
        bar.sig_num = num;
        bar.sig_den = den;
    }
    range.beginning.bar
}

/// Label (or unlabel) every bar the range touches
pub fn set_label(tab: &mut Tablature, range: ChordRange, label: Option<&str>) -> usize {
    for bar in &mut tab.bars[range.beginning.bar - 1..range.end.bar] {
        bar.label = label.map(str::to_string);
    }
    range.beginning.bar
}
