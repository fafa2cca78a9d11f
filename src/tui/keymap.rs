//! Normal-mode key table. Every binding is a [`CommandDescriptor`]
//! registered once at startup by the `register_*` functions below.

use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::motions::{self, MotionFn};

use super::actions;
use super::app::App;

/// An action: may mutate the editor, receives the typed count
pub type ActionFn = fn(&mut App, Option<usize>);

/// A key as the tables see it: a code plus whether Ctrl was held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub ctrl: bool,
}

impl Key {
    pub const fn char(c: char) -> Self {
        Key {
            code: KeyCode::Char(c),
            ctrl: false,
        }
    }

    pub const fn ctrl(c: char) -> Self {
        Key {
            code: KeyCode::Char(c),
            ctrl: true,
        }
    }

    pub const fn code(code: KeyCode) -> Self {
        Key { code, ctrl: false }
    }

    pub fn from_event(key: &KeyEvent) -> Self {
        Key {
            code: key.code,
            ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "C-")?;
        }
        match self.code {
            KeyCode::Char(' ') => write!(f, "Space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Left => write!(f, "\u{2190}"),
            KeyCode::Right => write!(f, "\u{2192}"),
            KeyCode::Up => write!(f, "\u{2191}"),
            KeyCode::Down => write!(f, "\u{2193}"),
            KeyCode::PageUp => write!(f, "PgUp"),
            KeyCode::PageDown => write!(f, "PgDn"),
            KeyCode::Home => write!(f, "Home"),
            KeyCode::End => write!(f, "End"),
            KeyCode::Delete => write!(f, "Del"),
            KeyCode::Esc => write!(f, "Esc"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// The operators. Each reads a motion (or its own key again) to get a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Delete,
    Change,
    Yank,
}

impl Operator {
    /// Pressing this key right after the operator selects the whole bar
    pub fn whole_bar_key(self) -> Key {
        match self {
            Operator::Delete => Key::char('d'),
            Operator::Change => Key::char('c'),
            Operator::Yank => Key::char('y'),
        }
    }
}

#[derive(Clone, Copy)]
pub enum CommandKind {
    Motion(MotionFn),
    Operator(Operator),
    Action(ActionFn),
}

impl fmt::Debug for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Motion(_) => write!(f, "Motion"),
            CommandKind::Operator(op) => write!(f, "Operator({op:?})"),
            CommandKind::Action(_) => write!(f, "Action"),
        }
    }
}

/// One normal-mode command
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub keys: Vec<Key>,
    pub kind: CommandKind,
    /// The command never changes the document (no dirty flag, no redraw
    /// of the tablature)
    pub no_side_effects: bool,
}

impl CommandDescriptor {
    pub fn motion(name: &'static str, help: &'static str, keys: &[Key], f: MotionFn) -> Self {
        CommandDescriptor {
            name,
            help,
            keys: keys.to_vec(),
            kind: CommandKind::Motion(f),
            no_side_effects: true,
        }
    }

    pub fn operator(name: &'static str, help: &'static str, key: Key, op: Operator) -> Self {
        CommandDescriptor {
            name,
            help,
            keys: vec![key],
            kind: CommandKind::Operator(op),
            no_side_effects: op == Operator::Yank,
        }
    }

    pub fn action(name: &'static str, help: &'static str, keys: &[Key], f: ActionFn) -> Self {
        CommandDescriptor {
            name,
            help,
            keys: keys.to_vec(),
            kind: CommandKind::Action(f),
            no_side_effects: false,
        }
    }

    /// Mark an action as leaving the document untouched
    pub fn pure(mut self) -> Self {
        self.no_side_effects = true;
        self
    }

    /// `h/←`-style label of all the keys
    pub fn key_label(&self) -> String {
        self.keys
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Key → descriptor table
#[derive(Debug, Default)]
pub struct Keymap {
    descriptors: Vec<CommandDescriptor>,
    by_key: HashMap<Key, usize>,
}

impl Keymap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in normal-mode command
    pub fn builtin() -> Self {
        let mut keymap = Keymap::new();
        register_motions(&mut keymap);
        register_operators(&mut keymap);
        register_actions(&mut keymap);
        keymap
    }

    /// Add a descriptor. A key already bound is rebound to the new one.
    pub fn register(&mut self, descriptor: CommandDescriptor) {
        let index = self.descriptors.len();
        for key in &descriptor.keys {
            if self.by_key.insert(*key, index).is_some() {
                log::debug!("key {key} rebound to {}", descriptor.name);
            }
        }
        self.descriptors.push(descriptor);
    }

    pub fn lookup(&self, key: Key) -> Option<&CommandDescriptor> {
        self.by_key.get(&key).map(|&i| &self.descriptors[i])
    }

    /// The motion bound to `key`, if it is one
    pub fn motion(&self, key: Key) -> Option<MotionFn> {
        match self.lookup(key)?.kind {
            CommandKind::Motion(f) => Some(f),
            _ => None,
        }
    }

    pub fn descriptors(&self) -> &[CommandDescriptor] {
        &self.descriptors
    }
}

pub fn register_motions(keymap: &mut Keymap) {
    use CommandDescriptor as D;
    keymap.register(D::motion(
        "left",
        "Move left, into the previous bar",
        &[Key::char('h'), Key::code(KeyCode::Left)],
        motions::left,
    ));
    keymap.register(D::motion(
        "right",
        "Move right, into the next bar",
        &[Key::char('l'), Key::code(KeyCode::Right)],
        motions::right,
    ));
    keymap.register(D::motion(
        "next bar",
        "Go to the next bar",
        &[Key::char('j'), Key::code(KeyCode::Down)],
        motions::next_bar,
    ));
    keymap.register(D::motion(
        "previous bar",
        "Go to the previous bar",
        &[Key::char('k'), Key::code(KeyCode::Up)],
        motions::prev_bar,
    ));
    keymap.register(D::motion(
        "bar start",
        "Go to the beginning of the bar",
        &[Key::char('0'), Key::code(KeyCode::Home)],
        motions::bar_start,
    ));
    keymap.register(D::motion(
        "bar end",
        "Go to the end of the bar",
        &[Key::char('$'), Key::code(KeyCode::End)],
        motions::bar_end,
    ));
    keymap.register(D::motion(
        "last bar",
        "Go to the last bar, or to bar N",
        &[Key::char('G')],
        motions::last_bar,
    ));
    keymap.register(D::motion(
        "first bar",
        "Go to the first bar",
        &[Key::char('g')],
        motions::first_bar,
    ));
}

pub fn register_operators(keymap: &mut Keymap) {
    use CommandDescriptor as D;
    keymap.register(D::operator(
        "delete",
        "Delete to a motion (dd: the bar)",
        Key::char('d'),
        Operator::Delete,
    ));
    keymap.register(D::operator(
        "change",
        "Replace up to a motion with a new chord (cc: the bar)",
        Key::char('c'),
        Operator::Change,
    ));
    keymap.register(D::operator(
        "yank",
        "Copy the bar (yy)",
        Key::char('y'),
        Operator::Yank,
    ));
}

pub fn register_actions(keymap: &mut Keymap) {
    use CommandDescriptor as D;
    keymap.register(D::action(
        "insert",
        "Create a chord before the cursor and enter insert mode",
        &[Key::char('i')],
        actions::insert,
    ));
    keymap.register(D::action(
        "append",
        "Create a chord after the cursor and enter insert mode",
        &[Key::char('a')],
        actions::append,
    ));
    keymap.register(D::action(
        "set chord",
        "Enter insert mode at the cursor",
        &[Key::char('s')],
        actions::set_chord,
    ));
    keymap.register(D::action(
        "replace",
        "Enter replace mode (free motion)",
        &[Key::char('R')],
        actions::replace,
    ));
    keymap.register(D::action(
        "insert at start",
        "Insert at the beginning of the bar",
        &[Key::char('I')],
        actions::insert_at_start,
    ));
    keymap.register(D::action(
        "append at end",
        "Append at the end of the bar",
        &[Key::char('A')],
        actions::append_at_end,
    ));
    keymap.register(D::action(
        "append bar",
        "Create a bar after this one and enter insert mode",
        &[Key::char('o')],
        actions::append_bar,
    ));
    keymap.register(D::action(
        "insert bar",
        "Create a bar before this one and enter insert mode",
        &[Key::char('O')],
        actions::insert_bar,
    ));
    keymap.register(D::action(
        "delete chord",
        "Delete N chords at the cursor",
        &[Key::char('x'), Key::code(KeyCode::Delete)],
        actions::delete_chord,
    ));
    keymap.register(D::action(
        "shorten",
        "Halve the chord length, or set it to 1/N",
        &[Key::char('q')],
        actions::shorten,
    ));
    keymap.register(D::action(
        "lengthen",
        "Double the chord length",
        &[Key::char('Q')],
        actions::lengthen,
    ));
    keymap.register(D::action(
        "join",
        "Join this bar with the next",
        &[Key::char('J')],
        actions::join,
    ));
    keymap.register(D::action(
        "paste after",
        "Paste the yanked bar after this one",
        &[Key::char('p')],
        actions::paste_after,
    ));
    keymap.register(D::action(
        "paste before",
        "Paste the yanked bar before this one",
        &[Key::char('P')],
        actions::paste_before,
    ));
    keymap.register(
        D::action(
            "scroll down",
            "Scroll the view N bars forward",
            &[Key::code(KeyCode::PageDown)],
            actions::scroll_down,
        )
        .pure(),
    );
    keymap.register(
        D::action(
            "scroll up",
            "Scroll the view N bars back",
            &[Key::code(KeyCode::PageUp)],
            actions::scroll_up,
        )
        .pure(),
    );
    keymap.register(
        D::action(
            "play",
            "Play from the cursor to the end",
            &[Key::char('e')],
            actions::play_from_cursor,
        )
        .pure(),
    );
    keymap.register(
        D::action(
            "play all",
            "Play the whole tablature",
            &[Key::char('E')],
            actions::play_all,
        )
        .pure(),
    );
    keymap.register(
        D::action("help", "List key bindings", &[Key::char('?')], actions::help).pure(),
    );
    keymap.register(
        D::action(
            "command",
            "Enter a command",
            &[Key::char(':')],
            actions::command_line,
        )
        .pure(),
    );
    keymap.register(
        D::action(
            "redraw",
            "Recompute the layout and redraw",
            &[Key::ctrl('l')],
            actions::redraw,
        )
        .pure(),
    );
    keymap.register(
        D::action(
            "quit hint",
            "Show how to quit",
            &[Key::ctrl('c')],
            actions::quit_hint,
        )
        .pure(),
    );
}
