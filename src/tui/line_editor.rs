//! Single-line editor behind `:`. Owns the buffer, history and command-name
//! completion; the caller decides what to do with a submitted line.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::util::unicode::{next_grapheme_boundary, prev_grapheme_boundary, word_boundary_left};

/// What the caller should do after a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// Keep reading
    Pending,
    /// Enter: run this line
    Submit(String),
    /// Esc or Ctrl-C
    Cancel,
    /// Ctrl-D: show these candidates
    List(Vec<String>),
}

#[derive(Debug, Clone)]
struct Completion {
    /// Buffer text the candidates were computed from
    prefix: String,
    candidates: Vec<String>,
    next: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    buffer: String,
    /// Byte offset into `buffer`, always on a grapheme boundary
    cursor: usize,
    history: Vec<String>,
    /// Index into `history` while browsing it
    history_pos: Option<usize>,
    /// Buffer saved when history browsing started
    draft: String,
    completion: Option<Completion>,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Start a fresh line
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.history_pos = None;
        self.draft.clear();
        self.completion = None;
    }

    /// Feed one key. `names` are the command names offered for completion.
    pub fn handle_key(&mut self, key: KeyEvent, names: &[&str]) -> LineEvent {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if !matches!(key.code, KeyCode::Tab) {
            self.completion = None;
        }
        match key.code {
            KeyCode::Esc => return LineEvent::Cancel,
            KeyCode::Char('c') if ctrl => return LineEvent::Cancel,
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                self.history_pos = None;
                if !line.trim().is_empty() && self.history.last() != Some(&line) {
                    self.history.push(line.clone());
                }
                return LineEvent::Submit(line);
            }
            KeyCode::Char('d') if ctrl => {
                return LineEvent::List(self.candidates(names));
            }
            KeyCode::Char('u') if ctrl => {
                self.buffer.drain(..self.cursor);
                self.cursor = 0;
            }
            KeyCode::Char('w') if ctrl => {
                let start = word_boundary_left(&self.buffer, self.cursor);
                self.buffer.drain(start..self.cursor);
                self.cursor = start;
            }
            KeyCode::Char(_) if ctrl => {}
            KeyCode::Char(c) => {
                self.buffer.insert(self.cursor, c);
                self.cursor += c.len_utf8();
            }
            KeyCode::Backspace => {
                if let Some(prev) = prev_grapheme_boundary(&self.buffer, self.cursor) {
                    self.buffer.drain(prev..self.cursor);
                    self.cursor = prev;
                }
            }
            KeyCode::Delete => {
                if let Some(next) = next_grapheme_boundary(&self.buffer, self.cursor) {
                    self.buffer.drain(self.cursor..next);
                }
            }
            KeyCode::Left => {
                if let Some(prev) = prev_grapheme_boundary(&self.buffer, self.cursor) {
                    self.cursor = prev;
                }
            }
            KeyCode::Right => {
                if let Some(next) = next_grapheme_boundary(&self.buffer, self.cursor) {
                    self.cursor = next;
                }
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.buffer.len(),
            KeyCode::Up => self.history_back(),
            KeyCode::Down => self.history_forward(),
            KeyCode::Tab => self.complete(names),
            _ => {}
        }
        LineEvent::Pending
    }

    /// Command names starting with the buffer's first word, sorted
    fn candidates(&self, names: &[&str]) -> Vec<String> {
        let prefix = self.buffer.trim_start();
        if prefix.contains(char::is_whitespace) {
            return Vec::new();
        }
        let mut out: Vec<String> = names
            .iter()
            .filter(|n| n.starts_with(prefix))
            .map(|n| n.to_string())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Tab: replace the buffer with the next candidate, cycling
    fn complete(&mut self, names: &[&str]) {
        let completion = match self.completion.take() {
            Some(c) => c,
            None => Completion {
                prefix: self.buffer.clone(),
                candidates: self.candidates(names),
                next: 0,
            },
        };
        if completion.candidates.is_empty() {
            return;
        }
        let choice = &completion.candidates[completion.next % completion.candidates.len()];
        self.buffer = choice.clone();
        self.cursor = self.buffer.len();
        log::debug!("completed {:?} to {choice}", completion.prefix);
        self.completion = Some(Completion {
            next: completion.next + 1,
            ..completion
        });
    }

    fn history_back(&mut self) {
        let pos = match self.history_pos {
            Some(0) => return,
            Some(p) => p - 1,
            None if self.history.is_empty() => return,
            None => {
                self.draft = self.buffer.clone();
                self.history.len() - 1
            }
        };
        self.history_pos = Some(pos);
        self.buffer = self.history[pos].clone();
        self.cursor = self.buffer.len();
    }

    fn history_forward(&mut self) {
        let Some(pos) = self.history_pos else {
            return;
        };
        if pos + 1 < self.history.len() {
            self.history_pos = Some(pos + 1);
            self.buffer = self.history[pos + 1].clone();
        } else {
            self.history_pos = None;
            self.buffer = std::mem::take(&mut self.draft);
        }
        self.cursor = self.buffer.len();
    }
}
