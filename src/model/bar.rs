use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::duration::Duration;
use super::fret::Fret;

/// Number of strings on the instrument (and staff lines per bar)
pub const STRING_COUNT: usize = 6;

/// A time-slice of notes. Silent strings are absent from `strings`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Chord {
    /// String index (0 = top staff line) to fret
    #[serde(default)]
    pub strings: BTreeMap<u8, Fret>,
    pub duration: Duration,
}

impl Chord {
    pub fn new(duration: Duration) -> Self {
        Chord {
            strings: BTreeMap::new(),
            duration,
        }
    }

    pub fn fret(&self, string: u8) -> Option<&Fret> {
        self.strings.get(&string)
    }

    pub fn fret_mut(&mut self, string: u8) -> Option<&mut Fret> {
        self.strings.get_mut(&string)
    }

    #[cfg(test)]
    pub fn is_silent(&self) -> bool {
        self.strings.is_empty()
    }

    /// Display width of this chord in cells, given its bar's display unit
    pub fn width(&self, gcd: &Duration) -> usize {
        self.duration.units_of(gcd) as usize * 2 + 1
    }
}

/// A measure: a non-empty run of chords under one time signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub chords: Vec<Chord>,
    pub sig_num: u32,
    pub sig_den: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Default for Bar {
    fn default() -> Self {
        Bar::new(4, 4, Duration::QUARTER)
    }
}

impl Bar {
    /// A bar holding one empty chord of `first_chord_len`
    pub fn new(sig_num: u32, sig_den: u32, first_chord_len: Duration) -> Self {
        Bar {
            chords: vec![Chord::new(first_chord_len)],
            sig_num,
            sig_den,
            label: None,
        }
    }

    /// Duration as specified by the signature
    pub fn required_duration(&self) -> Duration {
        if self.sig_den == 0 {
            return Duration::ZERO;
        }
        Duration::new(u64::from(self.sig_num), u64::from(self.sig_den))
    }

    /// Sum of chord durations
    pub fn real_duration(&self) -> Duration {
        self.chords.iter().map(|c| c.duration).sum()
    }

    /// Greatest common divisor of the chord durations: the display unit
    pub fn gcd(&self) -> Duration {
        self.chords
            .iter()
            .fold(Duration::ZERO, |acc, c| acc.gcd(&c.duration))
    }

    /// Rendered width in cells: two border cells, one separator per chord
    /// and two cells per display unit. A bar with no duration is 2 wide.
    pub fn total_width(&self, gcd: &Duration) -> usize {
        let real = self.real_duration();
        if real.is_zero() {
            return 2;
        }
        real.units_of(gcd) as usize * 2 + self.chords.len() + 2
    }

    /// `total_width` with the bar's own display unit
    pub fn width(&self) -> usize {
        self.total_width(&self.gcd())
    }

    /// Whether the chords fill the signature exactly
    pub fn is_complete(&self) -> bool {
        self.real_duration() == self.required_duration()
    }

    /// Cell offset of chord `index` (0-based) from the bar's left border
    pub fn chord_offset(&self, index: usize) -> usize {
        let gcd = self.gcd();
        1 + self
            .chords
            .iter()
            .take(index)
            .map(|c| c.width(&gcd))
            .sum::<usize>()
    }

    pub fn same_signature(&self, other: &Bar) -> bool {
        self.sig_num == other.sig_num && self.sig_den == other.sig_den
    }
}
