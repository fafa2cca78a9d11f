use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::paths;
use crate::io::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};
use crate::io::tab_io::{self, TabError};
use crate::model::music::tuning_str;
use crate::model::{Bar, ChordRange, Config, Duration, Position, Tablature, VisibleMeta};
use crate::ops::{bar_ops, motions};
use crate::playback::{
    Interrupted, MidiSink, PlaybackEnd, PlaybackHooks, Player, Score, open_sink,
};

use super::commands::{CommandError, CommandTable};
use super::input;
use super::keymap::{Keymap, Operator};
use super::layout::Layout;
use super::line_editor::LineEditor;
use super::render;
use super::theme::Theme;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Insert,
    /// Insert without creating chords; the cursor moves freely
    Replace,
    /// Reading a `:` line
    Command,
}

/// An operator key was pressed and is waiting for its motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOperator {
    pub op: Operator,
    /// Count typed before the operator
    pub count: Option<usize>,
    /// Count typed between the operator and the motion
    pub motion_count: Option<usize>,
}

/// Main application state
pub struct App {
    pub tab: Tablature,
    pub file_name: Option<PathBuf>,
    pub layout: Layout,
    pub keymap: Keymap,
    pub commands: CommandTable,
    pub mode: Mode,
    /// Count being typed in normal mode
    pub count: Option<usize>,
    pub pending: Option<PendingOperator>,
    /// Where the current insert session started
    pub insert_beg: Position,
    /// Furthest chord the current insert session has reached
    pub insert_end: Position,
    /// Selected string in insert mode (0 = top line)
    pub string: u8,
    pub insert_duration: Duration,
    pub visible_meta: VisibleMeta,
    pub continuous: bool,
    /// Yank register: one bar
    pub register: Option<Bar>,
    pub status: String,
    pub line: LineEditor,
    pub show_help: bool,
    pub should_quit: bool,
    /// Set by play commands, consumed by the event loop
    pub pending_playback: Option<Score>,
    /// Ctrl-L: repaint the whole terminal on the next frame
    pub clear_requested: bool,
    pub theme: Theme,
    pub config: Config,
    pub state_dir: PathBuf,
}

/// A new document with the configured playback defaults
pub fn new_document(config: &Config) -> Tablature {
    Tablature {
        bpm: config.playback.bpm,
        instrument: config.playback.instrument,
        ..Tablature::default()
    }
}

impl App {
    pub fn new(
        tab: Tablature,
        file_name: Option<PathBuf>,
        config: &Config,
        state_dir: PathBuf,
    ) -> Self {
        let cursor = tab.cursor;
        App {
            tab,
            file_name,
            layout: Layout::new(80, 23),
            keymap: Keymap::builtin(),
            commands: CommandTable::builtin(),
            mode: Mode::Normal,
            count: None,
            pending: None,
            insert_beg: cursor,
            insert_end: cursor,
            string: 0,
            insert_duration: config.editor.insert_duration,
            visible_meta: config.editor.visible_meta,
            continuous: config.editor.continuous_playback,
            register: None,
            status: String::new(),
            line: LineEditor::new(),
            show_help: false,
            should_quit: false,
            pending_playback: None,
            clear_requested: false,
            theme: Theme::from_config(&config.ui),
            config: config.clone(),
            state_dir,
        }
    }

    /// Start the editor on `file`, or on an unnamed document
    pub fn open(file: Option<&Path>, config: &Config, state_dir: PathBuf) -> Result<Self, TabError> {
        let mut app = App::new(new_document(config), None, config, state_dir);
        if let Some(path) = file {
            app.open_file(path)?;
        }
        Ok(app)
    }

    /// Replace the document with the contents of `path` (a new document if
    /// the file does not exist)
    pub fn open_file(&mut self, path: &Path) -> Result<(), TabError> {
        let exists = path.exists();
        let tab = if exists {
            tab_io::load(path)?
        } else {
            new_document(&self.config)
        };
        self.tab = tab;
        self.file_name = Some(path.to_path_buf());
        self.layout = Layout::new(self.layout.width(), self.layout.height());
        self.mode = Mode::Normal;
        self.status = if exists {
            format!(
                "{} ({} bars, tuning: {})",
                path.display(),
                self.tab.bars.len(),
                tuning_str(&self.tab.tuning)
            )
        } else {
            format!("{} [New File]", path.display())
        };
        Ok(())
    }

    /// Write the document to `path`; on failure the document goes to the
    /// recovery log
    pub fn save(&mut self, path: &Path) -> Result<(), CommandError> {
        match tab_io::save(&mut self.tab, path) {
            Ok(()) => {
                self.file_name = Some(path.to_path_buf());
                self.status = format!("\"{}\" {} bars written", path.display(), self.tab.bars.len());
                Ok(())
            }
            Err(e) => {
                log::warn!("save failed: {e}");
                let body = tab_io::to_json(&self.tab).unwrap_or_default();
                let entry = RecoveryEntry::new(
                    RecoveryCategory::Write,
                    Some(path),
                    format!("save failed: {e}"),
                    body,
                );
                log_recovery(&self.state_dir, &entry);
                Err(CommandError::Io(e.to_string()))
            }
        }
    }

    /// Record the unsaved document before it is thrown away
    pub fn log_discard(&self, description: &str) {
        let body = tab_io::to_json(&self.tab).unwrap_or_default();
        let entry = RecoveryEntry::new(
            RecoveryCategory::Discard,
            self.file_name.as_deref(),
            description,
            body,
        );
        log_recovery(&self.state_dir, &entry);
    }

    pub fn quit(&mut self, force: bool) -> Result<(), CommandError> {
        if self.tab.changed {
            if !force {
                return Err(CommandError::Unsaved);
            }
            self.log_discard("discarded by :q!");
        }
        self.should_quit = true;
        Ok(())
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// The single way the editor moves the cursor
    pub fn move_cursor(&mut self, target: Position) {
        self.layout.move_cursor(&mut self.tab, target);
    }

    /// Record a structural edit starting at `first_bar`
    pub fn edited(&mut self, first_bar: usize) {
        self.layout.invalidate_from(first_bar);
        self.layout.clamp_anchor(&self.tab);
        self.mark_changed();
    }

    pub fn mark_changed(&mut self) {
        self.tab.changed = true;
    }

    pub fn enter_insert(&mut self, mode: Mode) {
        let cursor = self.tab.cursor;
        self.move_cursor(cursor);
        self.insert_beg = cursor;
        self.insert_end = cursor;
        self.mode = mode;
    }

    /// Apply an operator to the range its motion selected
    pub fn apply_operator(&mut self, op: Operator, range: ChordRange) {
        log::debug!("{op:?} {}..{}", range.beginning, range.end);
        match op {
            Operator::Delete => {
                let first = bar_ops::delete_range(&mut self.tab, range);
                self.edited(first);
                let cursor = self.tab.cursor;
                self.move_cursor(cursor);
            }
            Operator::Change => {
                let first = bar_ops::change_range(&mut self.tab, range, self.insert_duration);
                self.edited(first);
                self.enter_insert(Mode::Insert);
            }
            Operator::Yank => {
                self.register = Some(bar_ops::yank_bar(&self.tab));
                self.set_status("Bar yanked");
            }
        }
    }

    /// Queue `range` for playback by the event loop
    pub fn play(&mut self, range: ChordRange) {
        self.pending_playback = Some(Score::from_range(&self.tab, range));
        self.set_status("Playing... <CTRL-C> to abort");
    }

    pub fn display_name(&self) -> String {
        self.file_name
            .as_ref()
            .map_or_else(|| "[unnamed]".to_string(), |p| p.display().to_string())
    }

    /// Terminal title, with `+` while there are unsaved changes
    pub fn title(&self) -> String {
        let dirty = if self.tab.changed { " +" } else { "" };
        format!("{}{} - VITABS", self.display_name(), dirty)
    }
}

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Run the TUI application
pub fn run(file: Option<&Path>, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::open(file, config, paths::state_dir())?;
    let mut player = Player::new(open_sink(config.playback.port.as_deref()));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, &mut player);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Term,
    app: &mut App,
    player: &mut Player<Box<dyn MidiSink>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut title = String::new();
    loop {
        if app.clear_requested {
            terminal.clear()?;
            app.clear_requested = false;
        }
        let new_title = app.title();
        if new_title != title {
            execute!(terminal.backend_mut(), SetTitle(&new_title))?;
            title = new_title;
        }
        terminal.draw(|frame| render::render(frame, app))?;

        if let Some(score) = app.pending_playback.take() {
            play_score(terminal, app, player, &score);
            continue;
        }

        if event::poll(StdDuration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                    input::handle_click(app, mouse.column, mouse.row)
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn play_score(terminal: &mut Term, app: &mut App, player: &mut Player<Box<dyn MidiSink>>, score: &Score) {
    let continuous = app.continuous;
    let outcome = player.set_instrument(app.tab.instrument).and_then(|()| {
        let mut hooks = TuiHooks {
            terminal,
            app: &mut *app,
            beginning: score.beginning,
        };
        player.play(score, continuous, &mut hooks)
    });
    match outcome {
        Ok(PlaybackEnd::Finished) => app.status.clear(),
        Ok(PlaybackEnd::Interrupted) => app.set_status("Playback interrupted"),
        Err(e) => {
            log::warn!("playback failed: {e}");
            app.set_status(e.to_string());
        }
    }
}

/// Keeps the screen in step with playback and watches for Esc / Ctrl-C
struct TuiHooks<'a> {
    terminal: &'a mut Term,
    app: &'a mut App,
    beginning: Position,
}

impl TuiHooks<'_> {
    fn redraw(&mut self) {
        let TuiHooks { terminal, app, .. } = self;
        if let Err(e) = terminal.draw(|frame| render::render(frame, app)) {
            log::warn!("redraw during playback failed: {e}");
        }
    }

    fn poll_interrupt(&mut self) -> Result<(), Interrupted> {
        while let Ok(true) = event::poll(StdDuration::ZERO) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press && is_interrupt(&key) => {
                    return Err(Interrupted);
                }
                Ok(Event::Resize(..)) => self.redraw(),
                Ok(_) => {}
                Err(e) => {
                    log::warn!("reading input during playback: {e}");
                    break;
                }
            }
        }
        Ok(())
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

impl PlaybackHooks for TuiHooks<'_> {
    fn before_repeat(&mut self) -> Result<(), Interrupted> {
        self.app.move_cursor(self.beginning);
        self.redraw();
        self.poll_interrupt()
    }

    fn after_chord(&mut self) -> Result<(), Interrupted> {
        if let Some(next) = motions::right(&self.app.tab, None) {
            self.app.move_cursor(next);
        }
        self.redraw();
        self.poll_interrupt()
    }

    fn tick(&mut self) -> Result<(), Interrupted> {
        self.poll_interrupt()
    }
}
