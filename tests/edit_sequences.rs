//! Long mixed editing sessions: the cursor must stay inside the document,
//! no bar may be left empty and the cached cursor cell must match a fresh
//! layout after every key.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use vitabs::model::{Config, Tablature};
use vitabs::tui::app::{App, Mode};
use vitabs::tui::input::handle_key;
use vitabs::tui::layout::CursorLine;

/// Key groups; `\x1b` is Escape
const EDITS: &[&str] = &[
    "x", "3x", "dl", "d2h", "d$", "d0", "dj", "dk", "dd", "2dd", "cc\x1b", "c2l\x1b", "J", "yy",
    "p", "P", "i\x1b", "a\x1b", "o\x1b", "O\x1b", "I\x1b", "A\x1b", "s3\x1b", "a5 7 \x1b",
    "i 1\x1b", "R\x1bh", "q", "2q", "Q", "h", "l", "3l", "j", "k", "$", "0", "G", "g", "2G",
];

/// xorshift: deterministic and dependency free
struct Keys(u64);

impl Keys {
    fn next(&mut self) -> usize {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 % EDITS.len() as u64) as usize
    }
}

fn key(c: char) -> KeyEvent {
    match c {
        '\x1b' => KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
        c => KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE),
    }
}

fn check(app: &mut App, after: &str) {
    let tab = &app.tab;
    assert!(!tab.bars.is_empty(), "no bars after {after:?}");
    assert!(
        tab.bars.iter().all(|b| !b.chords.is_empty()),
        "empty bar after {after:?}"
    );
    assert!(
        tab.contains(tab.cursor),
        "cursor {:?} outside document after {after:?}",
        tab.cursor
    );

    let line = match app.mode {
        Mode::Insert | Mode::Replace => CursorLine::String(app.string),
        _ => CursorLine::Meta,
    };
    let mut fresh = app.layout.clone();
    fresh.invalidate();
    let cached = app.layout.cursor_cell(&app.tab, line);
    assert_eq!(cached, fresh.cursor_cell(&app.tab, line), "stale cursor cell after {after:?}");
}

fn session(seed: u64, steps: usize) {
    let mut tab = Tablature::default();
    let first = tab.bars[0].chords[0].clone();
    tab.bars[0].chords.push(first);
    let mut app = App::new(tab, None, &Config::default(), std::env::temp_dir());
    app.layout.resize(40, 30);

    let mut keys = Keys(seed);
    for _ in 0..steps {
        let group = EDITS[keys.next()];
        for c in group.chars() {
            handle_key(&mut app, key(c));
            check(&mut app, group);
        }
        assert_eq!(app.mode, Mode::Normal, "{group:?} left normal mode");
    }
}

#[test]
fn mixed_edits_keep_the_cursor_in_the_document() {
    session(0x9E37_79B9_7F4A_7C15, 600);
}

#[test]
fn mixed_edits_from_other_seeds() {
    for seed in [1, 42, 0xDEAD_BEEF] {
        session(seed, 300);
    }
}
