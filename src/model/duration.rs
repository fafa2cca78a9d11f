use std::fmt;
use std::ops::{Add, Div};
use std::str::FromStr;

use num_integer::Integer;
use num_rational::Ratio;
use serde::{Deserialize, Serialize};

/// Every checked duration is a whole multiple of `1/RESOLUTION` whole notes
/// (2^8 * 3^3 * 5^2 * 7). Denominators of a bar's chords therefore share a
/// bounded lcm, and sums and gcds stay far below `u64::MAX`.
pub const RESOLUTION: u64 = 1_209_600;

/// Longest checked duration, in whole notes
pub const MAX_WHOLE_NOTES: u64 = 1 << 16;

/// An exact note length, measured in whole notes (1/4 is a quarter note).
///
/// Arithmetic is rational so that bar widths derived from ratios of
/// durations are exact. Serialized as an `"n/d"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Duration(Ratio<u64>);

/// Error returned when a duration string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid duration: {0:?}")]
pub struct ParseDurationError(pub String);

impl Duration {
    pub const ZERO: Duration = Duration(Ratio::new_raw(0, 1));
    pub const WHOLE: Duration = Duration(Ratio::new_raw(1, 1));
    pub const QUARTER: Duration = Duration(Ratio::new_raw(1, 4));

    /// Build `numer/denom` without range checks. Panics on a zero
    /// denominator, like `Ratio::new`; use [`Duration::checked`] for
    /// untrusted input.
    pub fn new(numer: u64, denom: u64) -> Self {
        Duration(Ratio::new(numer, denom))
    }

    /// Build `numer/denom`, or `None` when the denominator is zero, the
    /// reduced denominator does not divide [`RESOLUTION`] or the length
    /// exceeds [`MAX_WHOLE_NOTES`].
    pub fn checked(numer: u64, denom: u64) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        let ratio = Ratio::new(numer, denom);
        if RESOLUTION % ratio.denom() != 0 || ratio.to_integer() >= MAX_WHOLE_NOTES {
            return None;
        }
        Some(Duration(ratio))
    }

    /// `1/n`, as set by a count before `q`.
    pub fn reciprocal_of(n: u64) -> Option<Self> {
        Self::checked(1, n)
    }

    pub fn numer(&self) -> u64 {
        *self.0.numer()
    }

    pub fn denom(&self) -> u64 {
        *self.0.denom()
    }

    pub fn is_zero(&self) -> bool {
        self.numer() == 0
    }

    pub fn ratio(&self) -> Ratio<u64> {
        self.0
    }

    /// Half of this duration, or `None` if the denominator would overflow.
    pub fn halved(&self) -> Option<Self> {
        let denom = self.denom().checked_mul(2)?;
        Self::checked(self.numer(), denom)
    }

    /// Twice this duration, or `None` if the numerator would overflow.
    pub fn doubled(&self) -> Option<Self> {
        let numer = self.numer().checked_mul(2)?;
        Self::checked(numer, self.denom())
    }

    /// Multiply by an exact ratio (used for dotted and triplet names).
    pub fn scaled(&self, numer: u64, denom: u64) -> Self {
        Duration(self.0 * Ratio::new(numer, denom))
    }

    /// Largest duration that divides both `self` and `other` a whole number
    /// of times. `gcd(0, x) == x`, so folding from [`Duration::ZERO`] works.
    pub fn gcd(&self, other: &Duration) -> Duration {
        let numer = self.numer().gcd(&other.numer());
        if numer == 0 {
            return Duration::ZERO;
        }
        let denom = self.denom().lcm(&other.denom());
        Duration(Ratio::new(numer, denom))
    }

    /// How many whole `unit`s fit in this duration, rounded down. Zero when
    /// `unit` is zero.
    pub fn units_of(&self, unit: &Duration) -> u64 {
        if unit.is_zero() {
            return 0;
        }
        (self.0 / unit.0).to_integer()
    }

    /// Length in seconds at `bpm` quarter notes per minute (a whole note is
    /// `240 / bpm` seconds).
    pub fn to_std(&self, bpm: u32) -> std::time::Duration {
        if bpm == 0 {
            return std::time::Duration::ZERO;
        }
        let nanos = self.numer() as u128 * 240_000_000_000u128
            / (self.denom() as u128 * bpm as u128);
        std::time::Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
    }
}

impl Default for Duration {
    fn default() -> Self {
        Duration::QUARTER
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

impl Div for Duration {
    type Output = Ratio<u64>;

    fn div(self, rhs: Duration) -> Ratio<u64> {
        self.0 / rhs.0
    }
}

impl std::iter::Sum for Duration {
    fn sum<I: Iterator<Item = Duration>>(iter: I) -> Duration {
        iter.fold(Duration::ZERO, |a, b| a + b)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom() == 1 {
            write!(f, "{}", self.numer())
        } else {
            write!(f, "{}/{}", self.numer(), self.denom())
        }
    }
}

impl FromStr for Duration {
    type Err = ParseDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseDurationError(s.to_string());
        let s = s.trim();
        match s.split_once('/') {
            Some((n, d)) => {
                let n: u64 = n.trim().parse().map_err(|_| err())?;
                let d: u64 = d.trim().parse().map_err(|_| err())?;
                Duration::checked(n, d).ok_or_else(err)
            }
            None => {
                let n: u64 = s.parse().map_err(|_| err())?;
                Duration::checked(n, 1).ok_or_else(err)
            }
        }
    }
}

impl TryFrom<String> for Duration {
    type Error = ParseDurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Duration> for String {
    fn from(d: Duration) -> String {
        d.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcd_of_mixed_lengths() {
        let eighth = Duration::new(1, 8);
        let quarter = Duration::QUARTER;
        assert_eq!(eighth.gcd(&quarter), eighth);
        assert_eq!(Duration::new(1, 3).gcd(&quarter), Duration::new(1, 12));
        assert_eq!(Duration::ZERO.gcd(&quarter), quarter);
        assert_eq!(Duration::ZERO.gcd(&Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn gcd_divides_both_operands() {
        let pairs = [(3, 8), (2, 3), (5, 6), (1, 16), (7, 12)];
        for &(an, ad) in &pairs {
            for &(bn, bd) in &pairs {
                let a = Duration::new(an, ad);
                let b = Duration::new(bn, bd);
                let g = a.gcd(&b);
                assert!((a / g).is_integer(), "{} / {}", a, g);
                assert!((b / g).is_integer(), "{} / {}", b, g);
            }
        }
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("1/4".parse::<Duration>().unwrap(), Duration::QUARTER);
        assert_eq!("2/8".parse::<Duration>().unwrap(), Duration::QUARTER);
        assert_eq!("1".parse::<Duration>().unwrap(), Duration::WHOLE);
        assert!("1/0".parse::<Duration>().is_err());
        assert!("x/4".parse::<Duration>().is_err());
        assert_eq!(Duration::new(3, 8).to_string(), "3/8");
        assert_eq!(Duration::WHOLE.to_string(), "1");
    }

    #[test]
    fn halving_and_doubling() {
        assert_eq!(Duration::QUARTER.halved(), Some(Duration::new(1, 8)));
        assert_eq!(Duration::QUARTER.doubled(), Some(Duration::new(1, 2)));
        assert_eq!(Duration::new(1, u64::MAX).halved(), None);
    }

    #[test]
    fn lengths_outside_the_grid_are_rejected() {
        assert_eq!(Duration::checked(1, 12), Some(Duration::new(1, 12)));
        assert_eq!(Duration::checked(3, 256), Some(Duration::new(3, 256)));
        // reduced before checking
        assert_eq!(Duration::checked(11, 44), Some(Duration::QUARTER));
        assert_eq!(Duration::checked(1, 11), None);
        assert_eq!(Duration::checked(1, 18446744073709551557), None);
        assert_eq!(Duration::checked(1, 512), None);
        assert_eq!(Duration::checked(MAX_WHOLE_NOTES, 1), None);
        assert!("1/13".parse::<Duration>().is_err());
        assert!("99999999".parse::<Duration>().is_err());
    }

    #[test]
    fn halving_stops_at_the_grid() {
        let mut d = Duration::QUARTER;
        let mut steps = 0;
        while let Some(next) = d.halved() {
            d = next;
            steps += 1;
        }
        assert_eq!(d, Duration::new(1, 256));
        assert_eq!(steps, 6);

        let mut d = Duration::QUARTER;
        while let Some(next) = d.doubled() {
            d = next;
        }
        assert_eq!(d, Duration::new(MAX_WHOLE_NOTES / 2, 1));
    }

    #[test]
    fn real_time_length() {
        // A quarter note at 120 bpm lasts half a second.
        assert_eq!(
            Duration::QUARTER.to_std(120),
            std::time::Duration::from_millis(500)
        );
        assert_eq!(Duration::WHOLE.to_std(60), std::time::Duration::from_secs(4));
    }

    #[test]
    fn serde_as_string() {
        let json = serde_json::to_string(&Duration::new(3, 16)).unwrap();
        assert_eq!(json, "\"3/16\"");
        let back: Duration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Duration::new(3, 16));
    }
}
