use std::fmt;

use serde::{Deserialize, Serialize};

use super::bar::{Bar, Chord, STRING_COUNT};
use super::music::STANDARD_E;

/// A document position: 1-based bar and chord indices. Orders by bar,
/// then chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub bar: usize,
    pub chord: usize,
}

impl Position {
    pub fn new(bar: usize, chord: usize) -> Self {
        Position { bar, chord }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.bar, self.chord)
    }
}

/// A position whose chord may be left open (a whole-bar reference)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialPosition {
    pub bar: usize,
    pub chord: Option<usize>,
}

impl From<Position> for PartialPosition {
    fn from(p: Position) -> Self {
        PartialPosition {
            bar: p.bar,
            chord: Some(p.chord),
        }
    }
}

impl PartialPosition {
    pub fn bar(bar: usize) -> Self {
        PartialPosition { bar, chord: None }
    }
}

/// The document: bars, cursor and playback metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tablature {
    pub bars: Vec<Bar>,
    #[serde(default = "default_cursor")]
    pub cursor: Position,
    /// MIDI note of each open string, by string index
    #[serde(default = "default_tuning")]
    pub tuning: [u8; STRING_COUNT],
    #[serde(default = "default_bpm")]
    pub bpm: u32,
    /// MIDI program number
    #[serde(default = "default_instrument")]
    pub instrument: u8,
    /// Dirty flag, never persisted
    #[serde(skip)]
    pub changed: bool,
}

fn default_cursor() -> Position {
    Position::new(1, 1)
}

fn default_tuning() -> [u8; STRING_COUNT] {
    STANDARD_E
}

fn default_bpm() -> u32 {
    120
}

fn default_instrument() -> u8 {
    24
}

impl Default for Tablature {
    fn default() -> Self {
        Tablature {
            bars: vec![Bar::default()],
            cursor: default_cursor(),
            tuning: default_tuning(),
            bpm: default_bpm(),
            instrument: default_instrument(),
            changed: false,
        }
    }
}

impl Tablature {
    pub fn get_cursor_bar(&self) -> &Bar {
        &self.bars[self.cursor.bar - 1]
    }

    pub fn get_cursor_bar_mut(&mut self) -> &mut Bar {
        &mut self.bars[self.cursor.bar - 1]
    }

    pub fn get_cursor_chord(&self) -> &Chord {
        &self.get_cursor_bar().chords[self.cursor.chord - 1]
    }

    pub fn get_cursor_chord_mut(&mut self) -> &mut Chord {
        let chord = self.cursor.chord - 1;
        &mut self.get_cursor_bar_mut().chords[chord]
    }

    pub fn cursor_position(&self) -> Position {
        self.cursor
    }

    pub fn last_position(&self) -> Position {
        let bar_count = self.bars.len();
        Position::new(bar_count, self.bars[bar_count - 1].chords.len())
    }

    /// Number of chords in 1-based bar `bar`, or 0 if there is no such bar
    pub fn chord_count(&self, bar: usize) -> usize {
        bar.checked_sub(1)
            .and_then(|i| self.bars.get(i))
            .map_or(0, |b| b.chords.len())
    }

    /// Whether `pos` names an existing chord
    pub fn contains(&self, pos: Position) -> bool {
        pos.chord >= 1 && pos.chord <= self.chord_count(pos.bar)
    }

    /// Clamp an arbitrary position into the document
    pub fn clamp(&self, pos: Position) -> Position {
        let bar = pos.bar.clamp(1, self.bars.len());
        let chord = pos.chord.clamp(1, self.chord_count(bar));
        Position::new(bar, chord)
    }

    /// Restore the document invariants after a deletion: no empty bars, at
    /// least one bar, cursor inside the document. If the cursor bar was
    /// removed the cursor goes to the end of the new last bar.
    pub fn repair(&mut self) {
        self.bars.retain(|b| !b.chords.is_empty());
        if self.bars.is_empty() {
            self.bars.push(Bar::default());
        }
        if self.cursor.bar > self.bars.len() {
            self.cursor = self.last_position();
        } else {
            self.cursor.bar = self.cursor.bar.max(1);
            let count = self.chord_count(self.cursor.bar);
            self.cursor.chord = self.cursor.chord.clamp(1, count);
        }
    }

    /// Find the first bar after the cursor (wrapping) whose label satisfies
    /// `matches`
    pub fn find_label(&self, matches: impl Fn(&str) -> bool) -> Option<usize> {
        let n = self.bars.len();
        (0..n)
            .map(|i| (self.cursor.bar + i) % n)
            .find(|&i| self.bars[i].label.as_deref().is_some_and(&matches))
            .map(|i| i + 1)
    }
}

/// Parse a position token for `:for`: `.` is the cursor, `$` the last
/// chord, `b,c` an explicit chord and `b` a whole bar.
pub fn parse_position(tab: &Tablature, desc: &str) -> Option<PartialPosition> {
    match desc {
        "." => Some(tab.cursor_position().into()),
        "$" => Some(tab.last_position().into()),
        _ => match desc.split_once(',') {
            Some((b, c)) => Some(PartialPosition {
                bar: b.trim().parse().ok()?,
                chord: Some(c.trim().parse().ok()?),
            }),
            None => Some(PartialPosition::bar(desc.trim().parse().ok()?)),
        },
    }
}
