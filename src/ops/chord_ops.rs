//! Chord-level edits. Each mutating function returns the 1-based index of
//! the first bar whose width may have changed.

use crate::model::{Chord, ChordRange, Duration, Fret, Position, STRING_COUNT, Symbol, Tablature};

use super::bar_ops::delete_range;

/// Insert an empty chord before the cursor; the cursor lands on it
pub fn insert_before_cursor(tab: &mut Tablature, duration: Duration) -> usize {
    let Position { bar, chord } = tab.cursor;
    tab.bars[bar - 1].chords.insert(chord - 1, Chord::new(duration));
    bar
}

/// Insert an empty chord after the cursor; the cursor lands on it
pub fn insert_after_cursor(tab: &mut Tablature, duration: Duration) -> usize {
    let Position { bar, chord } = tab.cursor;
    tab.bars[bar - 1].chords.insert(chord, Chord::new(duration));
    tab.cursor.chord += 1;
    bar
}

/// Delete `count` chords starting at the cursor, staying inside the cursor
/// bar, then repair the document
pub fn delete_at_cursor(tab: &mut Tablature, count: usize) -> usize {
    let Position { bar, chord } = tab.cursor;
    let last = (chord + count.max(1) - 1).min(tab.chord_count(bar));
    match ChordRange::new(tab, tab.cursor, Position::new(bar, last)) {
        Ok(range) => delete_range(tab, range),
        Err(_) => bar,
    }
}

/// `q`: halve the cursor chord, or with a count set it to 1/count
pub fn shorten_cursor_chord(tab: &mut Tablature, count: Option<usize>) -> usize {
    let chord = tab.get_cursor_chord_mut();
    let new = match count {
        Some(n) => Duration::reciprocal_of(n as u64),
        None => chord.duration.halved(),
    };
    if let Some(d) = new {
        chord.duration = d;
    }
    tab.cursor.bar
}

/// `Q`: double the cursor chord
pub fn lengthen_cursor_chord(tab: &mut Tablature) -> usize {
    let chord = tab.get_cursor_chord_mut();
    if let Some(d) = chord.duration.doubled() {
        chord.duration = d;
    }
    tab.cursor.bar
}

/// Give every chord in `range` the same length
pub fn set_duration(tab: &mut Tablature, range: ChordRange, duration: Duration) -> usize {
    let (first_bar, last_bar) = (range.beginning.bar, range.end.bar);
    for b in first_bar..=last_bar {
        let bar = &mut tab.bars[b - 1];
        let from = if b == first_bar { range.beginning.chord - 1 } else { 0 };
        let to = if b == last_bar {
            range.end.chord
        } else {
            bar.chords.len()
        };
        for chord in &mut bar.chords[from..to] {
            chord.duration = duration;
        }
    }
    first_bar
}

/// Type a digit into `string` of the cursor chord
pub fn type_digit(tab: &mut Tablature, string: u8, digit: u8) {
    if usize::from(string) >= STRING_COUNT {
        return;
    }
    tab.get_cursor_chord_mut()
        .strings
        .entry(string)
        .and_modify(|f| f.push_digit(digit))
        .or_insert_with(|| Fret::new(digit));
}

/// Silence `string` of the cursor chord. Returns whether anything changed.
pub fn clear_string(tab: &mut Tablature, string: u8) -> bool {
    tab.get_cursor_chord_mut().strings.remove(&string).is_some()
}

/// Toggle `symbol` on the fret at `string` of the cursor chord, if any
pub fn toggle_symbol(tab: &mut Tablature, string: u8, symbol: Symbol) -> bool {
    match tab.get_cursor_chord_mut().fret_mut(string) {
        Some(fret) => {
            fret.toggle(symbol);
            true
        }
        None => false,
    }
}
