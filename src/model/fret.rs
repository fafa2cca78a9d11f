use std::fmt;

use serde::{Deserialize, Serialize};

/// An ornament drawn around a fret number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Symbol {
    Bend,
    Release,
    HammerOn,
    PullOff,
    Vibrato,
    Tremolo,
    SlideUp,
    SlideDown,
}

impl Symbol {
    pub const ALL: [Symbol; 8] = [
        Symbol::Bend,
        Symbol::Release,
        Symbol::HammerOn,
        Symbol::PullOff,
        Symbol::Vibrato,
        Symbol::Tremolo,
        Symbol::SlideUp,
        Symbol::SlideDown,
    ];

    /// Wrap `inner` in this symbol's template
    pub fn apply(self, inner: &str) -> String {
        match self {
            Symbol::Bend => format!("{inner}b"),
            Symbol::Release => format!("{inner}r"),
            Symbol::HammerOn => format!("h{inner}"),
            Symbol::PullOff => format!("p{inner}"),
            Symbol::Vibrato => format!("{inner}~"),
            Symbol::Tremolo => format!("{inner}\""),
            Symbol::SlideUp => format!("{inner}/"),
            Symbol::SlideDown => format!("{inner}\\"),
        }
    }

    /// The insert-mode key that toggles this symbol
    pub fn toggle_key(self) -> char {
        match self {
            Symbol::Bend => 'b',
            Symbol::Release => 'r',
            Symbol::HammerOn => 'H',
            Symbol::PullOff => 'p',
            Symbol::Vibrato => 'v',
            Symbol::Tremolo => 't',
            Symbol::SlideUp => 's',
            Symbol::SlideDown => 'd',
        }
    }

    pub fn from_toggle_key(c: char) -> Option<Symbol> {
        Symbol::ALL.into_iter().find(|s| s.toggle_key() == c)
    }

    pub fn name(self) -> &'static str {
        match self {
            Symbol::Bend => "bend",
            Symbol::Release => "release",
            Symbol::HammerOn => "hammer on",
            Symbol::PullOff => "pull off",
            Symbol::Vibrato => "vibrato",
            Symbol::Tremolo => "tremolo",
            Symbol::SlideUp => "slide up",
            Symbol::SlideDown => "slide down",
        }
    }
}

/// One string's note within a chord
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fret {
    pub fret: u8,
    /// Insertion-ordered, no duplicates
    #[serde(default)]
    pub symbols: Vec<Symbol>,
}

impl Fret {
    pub fn new(fret: u8) -> Self {
        Fret {
            fret,
            symbols: Vec::new(),
        }
    }

    /// Append a typed digit. A fret below 10 grows to two digits; otherwise
    /// the digit starts a new fret number.
    pub fn push_digit(&mut self, digit: u8) {
        if self.fret < 10 {
            self.fret = self.fret * 10 + digit;
        } else {
            self.fret = digit;
        }
    }

    /// Flip membership of `symbol`, keeping insertion order for the rest
    pub fn toggle(&mut self, symbol: Symbol) {
        if let Some(idx) = self.symbols.iter().position(|s| *s == symbol) {
            self.symbols.remove(idx);
        } else {
            self.symbols.push(symbol);
        }
    }

    pub fn has(&self, symbol: Symbol) -> bool {
        self.symbols.contains(&symbol)
    }
}

impl fmt::Display for Fret {
    /// The fret as displayed in the tab: symbol templates nested around
    /// the number in insertion order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .symbols
            .iter()
            .fold(self.fret.to_string(), |acc, s| s.apply(&acc));
        f.write_str(&text)
    }
}
