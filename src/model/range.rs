use super::bar::{Bar, Chord};
use super::tablature::{PartialPosition, Position, Tablature};

/// Error for a range endpoint that names no bar or chord in the document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("no such bar: {0}")]
    NoSuchBar(usize),
    #[error("no such chord: {0}")]
    NoSuchChord(Position),
}

/// A span of chords between two document positions, inclusive at both
/// ends, possibly crossing bar boundaries. `beginning <= end` always.
///
/// The range only stores positions; the document is passed to each query
/// so that the same range can be read and then applied to a mutable
/// document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordRange {
    pub beginning: Position,
    pub end: Position,
}

impl ChordRange {
    /// Build a normalized range. An open chord index defaults to the first
    /// chord for the beginning and the last chord of its bar for the end.
    /// Endpoints are ordered by bar; within one bar the argument order
    /// decides which endpoint is the beginning.
    pub fn new(
        tab: &Tablature,
        a: impl Into<PartialPosition>,
        b: impl Into<PartialPosition>,
    ) -> Result<Self, RangeError> {
        let (a, b) = (a.into(), b.into());
        let (first, last) = if a.bar <= b.bar {
            (a, b)
        } else {
            (b, a)
        };
        let beginning = resolve(tab, first, |_| 1)?;
        let end = resolve(tab, last, |count| count)?;
        Ok(ChordRange {
            beginning: beginning.min(end),
            end: beginning.max(end),
        })
    }

    /// The whole of one bar
    pub fn whole_bar(tab: &Tablature, bar: usize) -> Result<Self, RangeError> {
        Self::new(tab, PartialPosition::bar(bar), PartialPosition::bar(bar))
    }

    pub fn is_single_bar(&self) -> bool {
        self.beginning.bar == self.end.bar
    }

    /// True when the range starts at its first bar's first chord and ends at
    /// its last bar's last chord
    pub fn whole_bars(&self, tab: &Tablature) -> bool {
        self.beginning.chord == 1 && self.end.chord == tab.chord_count(self.end.bar)
    }

    /// Chords covered by the range, in document order. Restartable: call
    /// again for a fresh pass.
    pub fn chords<'a>(self, tab: &'a Tablature) -> impl Iterator<Item = &'a Chord> + 'a {
        let first_bar = self.beginning.bar - 1;
        let last_bar = self.end.bar - 1;
        let first_chord = self.beginning.chord - 1;
        let last_chord = self.end.chord;
        tab.bars[first_bar..=last_bar]
            .iter()
            .enumerate()
            .flat_map(move |(i, bar)| {
                let bar_index = first_bar + i;
                let from = if bar_index == first_bar { first_chord } else { 0 };
                let to = if bar_index == last_bar {
                    last_chord
                } else {
                    bar.chords.len()
                };
                bar.chords[from..to].iter()
            })
    }

    /// Every bar touched by the range, whole
    pub fn bars<'a>(self, tab: &'a Tablature) -> impl Iterator<Item = &'a Bar> + 'a {
        tab.bars[self.beginning.bar - 1..self.end.bar].iter()
    }

    /// Number of chords covered
    pub fn len(&self, tab: &Tablature) -> usize {
        self.chords(tab).count()
    }

    /// Remove the covered chords, deleting any bar left empty. The caller
    /// must run [`Tablature::repair`] afterwards.
    pub fn delete_all(&self, tab: &mut Tablature) {
        let first_bar = self.beginning.bar - 1;
        let first_chord = self.beginning.chord - 1;
        let last_bar = self.end.bar - 1;
        let last_chord = self.end.chord;

        if self.is_single_bar() {
            tab.bars[first_bar].chords.drain(first_chord..last_chord);
            if tab.bars[first_bar].chords.is_empty() {
                tab.bars.remove(first_bar);
            }
        } else {
            tab.bars[last_bar].chords.drain(..last_chord);
            if tab.bars[last_bar].chords.is_empty() {
                tab.bars.remove(last_bar);
            }

            tab.bars.drain(first_bar + 1..last_bar);

            tab.bars[first_bar].chords.truncate(first_chord);
            if tab.bars[first_bar].chords.is_empty() {
                tab.bars.remove(first_bar);
            }
        }
    }
}

fn resolve(
    tab: &Tablature,
    pos: PartialPosition,
    open_chord: impl Fn(usize) -> usize,
) -> Result<Position, RangeError> {
    let count = tab.chord_count(pos.bar);
    if count == 0 {
        return Err(RangeError::NoSuchBar(pos.bar));
    }
    let chord = pos.chord.unwrap_or_else(|| open_chord(count));
    let resolved = Position::new(pos.bar, chord);
    if tab.contains(resolved) {
        Ok(resolved)
    } else {
        Err(RangeError::NoSuchChord(resolved))
    }
}
