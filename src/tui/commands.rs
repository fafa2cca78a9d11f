//! Colon commands: a name → handler table filled by [`register_builtin`],
//! and [`execute`] to run one typed line against the editor.

use std::collections::HashMap;
use std::path::PathBuf;

use regex::Regex;

use crate::model::music::{len_str, parse_tuning, tuning_str};
use crate::model::{ChordRange, Duration, Position, VisibleMeta, parse_position};
use crate::ops::{bar_ops, chord_ops};

use super::app::App;

/// A failed colon command. The message is shown in the status row.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Invalid argument")]
    InvalidArgument,
    #[error("Invalid command")]
    InvalidCommand,
    #[error("Command does not accept range")]
    RangeNotAccepted,
    #[error("File name not specified")]
    NoFileName,
    #[error("No write since last change (add ! to override)")]
    Unsaved,
    #[error("Label not found")]
    LabelNotFound,
    #[error("{0}")]
    Io(String),
}

/// Handler signature: the editor, the arguments after the name, and the
/// explicit range given through `for`
pub type CommandFn = fn(&mut App, &[&str], Option<ChordRange>) -> Result<(), CommandError>;

#[derive(Debug, Clone, Copy)]
pub struct ColonCommand {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    /// May be the target of `for`
    pub accepts_range: bool,
    pub handler: CommandFn,
}

#[derive(Debug, Default)]
pub struct CommandTable {
    commands: Vec<ColonCommand>,
    by_name: HashMap<&'static str, usize>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut table = CommandTable::new();
        register_builtin(&mut table);
        table
    }

    pub fn register(&mut self, command: ColonCommand) {
        self.by_name.insert(command.name, self.commands.len());
        self.commands.push(command);
    }

    pub fn get(&self, name: &str) -> Option<&ColonCommand> {
        self.by_name.get(name).map(|&i| &self.commands[i])
    }

    pub fn commands(&self) -> &[ColonCommand] {
        &self.commands
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|c| c.name).collect()
    }
}

/// Run one command line. Blank lines do nothing.
pub fn execute(app: &mut App, line: &str) -> Result<(), CommandError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((name, args)) = tokens.split_first() else {
        return Ok(());
    };
    dispatch(app, name, args, None)
}

fn dispatch(
    app: &mut App,
    name: &str,
    args: &[&str],
    range: Option<ChordRange>,
) -> Result<(), CommandError> {
    let command = *app.commands.get(name).ok_or(CommandError::InvalidCommand)?;
    if range.is_some() && !command.accepts_range {
        return Err(CommandError::RangeNotAccepted);
    }
    log::debug!("command {name} {args:?} range {range:?}");
    (command.handler)(app, args, range)
}

pub fn register_builtin(table: &mut CommandTable) {
    let commands = [
        ColonCommand {
            name: "meter",
            usage: "meter N D",
            help: "Set the time signature",
            accepts_range: true,
            handler: cmd_meter,
        },
        ColonCommand {
            name: "ilen",
            usage: "ilen N D",
            help: "Set the length of chords created in insert mode",
            accepts_range: false,
            handler: cmd_ilen,
        },
        ColonCommand {
            name: "len",
            usage: "len N D",
            help: "Set the length of the chord",
            accepts_range: true,
            handler: cmd_len,
        },
        ColonCommand {
            name: "label",
            usage: "label [NAME]",
            help: "Label the bar, or clear its label",
            accepts_range: true,
            handler: cmd_label,
        },
        ColonCommand {
            name: "goto",
            usage: "goto PATTERN",
            help: "Go to the next bar whose label matches",
            accepts_range: false,
            handler: cmd_goto,
        },
        ColonCommand {
            name: "delete",
            usage: "delete",
            help: "Delete the bar",
            accepts_range: true,
            handler: cmd_delete,
        },
        ColonCommand {
            name: "play",
            usage: "play",
            help: "Play the bar",
            accepts_range: true,
            handler: cmd_play,
        },
        ColonCommand {
            name: "for",
            usage: "for P1 P2 CMD ...",
            help: "Run CMD over the chords from P1 to P2",
            accepts_range: false,
            handler: cmd_for,
        },
        ColonCommand {
            name: "tuning",
            usage: "tuning NOTE x6 | standard",
            help: "Set the tuning, lowest string first",
            accepts_range: false,
            handler: cmd_tuning,
        },
        ColonCommand {
            name: "bpm",
            usage: "bpm N",
            help: "Set the tempo",
            accepts_range: false,
            handler: cmd_bpm,
        },
        ColonCommand {
            name: "instrument",
            usage: "instrument N",
            help: "Set the MIDI program",
            accepts_range: false,
            handler: cmd_instrument,
        },
        ColonCommand {
            name: "meta",
            usage: "meta meter|number|label|length",
            help: "Choose what the line above each bar shows",
            accepts_range: false,
            handler: cmd_meta,
        },
        ColonCommand {
            name: "continuous",
            usage: "continuous [on|off]",
            help: "Loop playback until interrupted",
            accepts_range: false,
            handler: cmd_continuous,
        },
        ColonCommand {
            name: "e",
            usage: "e FILE",
            help: "Edit a file",
            accepts_range: false,
            handler: cmd_edit,
        },
        ColonCommand {
            name: "w",
            usage: "w [FILE]",
            help: "Write the file",
            accepts_range: false,
            handler: cmd_write,
        },
        ColonCommand {
            name: "q",
            usage: "q",
            help: "Quit",
            accepts_range: false,
            handler: cmd_quit,
        },
        ColonCommand {
            name: "q!",
            usage: "q!",
            help: "Quit without writing",
            accepts_range: false,
            handler: cmd_force_quit,
        },
        ColonCommand {
            name: "wq",
            usage: "wq [FILE]",
            help: "Write the file and quit",
            accepts_range: false,
            handler: cmd_write_quit,
        },
    ];
    for command in commands {
        table.register(command);
    }
}

fn parse_num<T: std::str::FromStr>(s: &str) -> Result<T, CommandError> {
    s.parse().map_err(|_| CommandError::InvalidArgument)
}

/// `N D` or `N/D`
fn parse_fraction(args: &[&str]) -> Result<(u64, u64), CommandError> {
    let (n, d) = match args {
        [n, d] => (*n, *d),
        [nd] => nd.split_once('/').ok_or(CommandError::InvalidArgument)?,
        _ => return Err(CommandError::InvalidArgument),
    };
    let (n, d): (u64, u64) = (parse_num(n.trim())?, parse_num(d.trim())?);
    if n == 0 || d == 0 {
        return Err(CommandError::InvalidArgument);
    }
    Ok((n, d))
}

fn parse_duration(args: &[&str]) -> Result<Duration, CommandError> {
    let (n, d) = parse_fraction(args)?;
    Duration::checked(n, d).ok_or(CommandError::InvalidArgument)
}

fn cursor_bar(app: &App) -> Result<ChordRange, CommandError> {
    ChordRange::whole_bar(&app.tab, app.tab.cursor.bar).map_err(|_| CommandError::InvalidArgument)
}

fn cursor_chord(app: &App) -> Result<ChordRange, CommandError> {
    ChordRange::new(&app.tab, app.tab.cursor, app.tab.cursor)
        .map_err(|_| CommandError::InvalidArgument)
}

fn cmd_meter(app: &mut App, args: &[&str], range: Option<ChordRange>) -> Result<(), CommandError> {
    let (n, d) = parse_fraction(args)?;
    let (n, d) = (
        u32::try_from(n).map_err(|_| CommandError::InvalidArgument)?,
        u32::try_from(d).map_err(|_| CommandError::InvalidArgument)?,
    );
    let range = range.map_or_else(|| cursor_bar(app), Ok)?;
    let first = bar_ops::set_meter(&mut app.tab, range, n, d);
    app.edited(first);
    Ok(())
}

fn cmd_ilen(app: &mut App, args: &[&str], _range: Option<ChordRange>) -> Result<(), CommandError> {
    app.insert_duration = parse_duration(args)?;
    app.set_status(format!("Insert length: {}", len_str(app.insert_duration)));
    Ok(())
}

fn cmd_len(app: &mut App, args: &[&str], range: Option<ChordRange>) -> Result<(), CommandError> {
    let duration = parse_duration(args)?;
    let range = range.map_or_else(|| cursor_chord(app), Ok)?;
    let first = chord_ops::set_duration(&mut app.tab, range, duration);
    app.edited(first);
    Ok(())
}

fn cmd_label(app: &mut App, args: &[&str], range: Option<ChordRange>) -> Result<(), CommandError> {
    let range = range.map_or_else(|| cursor_bar(app), Ok)?;
    let name = args.join(" ");
    let label = (!name.is_empty()).then_some(name.as_str());
    let first = bar_ops::set_label(&mut app.tab, range, label);
    app.edited(first);
    Ok(())
}

fn cmd_goto(app: &mut App, args: &[&str], _range: Option<ChordRange>) -> Result<(), CommandError> {
    if args.is_empty() {
        return Err(CommandError::InvalidArgument);
    }
    let re = Regex::new(&args.join(" ")).map_err(|_| CommandError::InvalidArgument)?;
    let bar = app
        .tab
        .find_label(|label| re.is_match(label))
        .ok_or(CommandError::LabelNotFound)?;
    app.move_cursor(Position::new(bar, 1));
    Ok(())
}

fn cmd_delete(app: &mut App, _args: &[&str], range: Option<ChordRange>) -> Result<(), CommandError> {
    let range = range.map_or_else(|| cursor_bar(app), Ok)?;
    let first = bar_ops::delete_range(&mut app.tab, range);
    app.edited(first);
    let cursor = app.tab.cursor;
    app.move_cursor(cursor);
    Ok(())
}

fn cmd_play(app: &mut App, _args: &[&str], range: Option<ChordRange>) -> Result<(), CommandError> {
    let range = range.map_or_else(|| cursor_bar(app), Ok)?;
    app.play(range);
    Ok(())
}

fn cmd_for(app: &mut App, args: &[&str], _range: Option<ChordRange>) -> Result<(), CommandError> {
    let [from, to, name, rest @ ..] = args else {
        return Err(CommandError::InvalidArgument);
    };
    let from = parse_position(&app.tab, from).ok_or(CommandError::InvalidArgument)?;
    let to = parse_position(&app.tab, to).ok_or(CommandError::InvalidArgument)?;
    let range = ChordRange::new(&app.tab, from, to).map_err(|e| {
        log::debug!("for: {e}");
        CommandError::InvalidArgument
    })?;
    dispatch(app, name, rest, Some(range))
}

fn cmd_tuning(app: &mut App, args: &[&str], _range: Option<ChordRange>) -> Result<(), CommandError> {
    app.tab.tuning = parse_tuning(args).ok_or(CommandError::InvalidArgument)?;
    app.mark_changed();
    app.set_status(format!("Tuning: {}", tuning_str(&app.tab.tuning)));
    Ok(())
}

fn cmd_bpm(app: &mut App, args: &[&str], _range: Option<ChordRange>) -> Result<(), CommandError> {
    let [bpm] = args else {
        return Err(CommandError::InvalidArgument);
    };
    let bpm: u32 = parse_num(bpm)?;
    if bpm == 0 {
        return Err(CommandError::InvalidArgument);
    }
    app.tab.bpm = bpm;
    app.mark_changed();
    Ok(())
}

fn cmd_instrument(
    app: &mut App,
    args: &[&str],
    _range: Option<ChordRange>,
) -> Result<(), CommandError> {
    let [program] = args else {
        return Err(CommandError::InvalidArgument);
    };
    let program: u8 = parse_num(program)?;
    if program > 127 {
        return Err(CommandError::InvalidArgument);
    }
    app.tab.instrument = program;
    app.mark_changed();
    Ok(())
}

fn cmd_meta(app: &mut App, args: &[&str], _range: Option<ChordRange>) -> Result<(), CommandError> {
    let [kind] = args else {
        return Err(CommandError::InvalidArgument);
    };
    app.visible_meta = VisibleMeta::parse(kind).ok_or(CommandError::InvalidArgument)?;
    Ok(())
}

fn cmd_continuous(
    app: &mut App,
    args: &[&str],
    _range: Option<ChordRange>,
) -> Result<(), CommandError> {
    app.continuous = match args {
        [] => !app.continuous,
        ["on"] => true,
        ["off"] => false,
        _ => return Err(CommandError::InvalidArgument),
    };
    let state = if app.continuous { "on" } else { "off" };
    app.set_status(format!("Continuous playback {state}"));
    Ok(())
}

fn cmd_edit(app: &mut App, args: &[&str], _range: Option<ChordRange>) -> Result<(), CommandError> {
    let path = match args {
        [] => return Err(CommandError::NoFileName),
        [path] => PathBuf::from(path),
        _ => return Err(CommandError::InvalidArgument),
    };
    if app.tab.changed {
        app.log_discard("replaced by :e");
    }
    app.open_file(&path)
        .map_err(|e| CommandError::Io(e.to_string()))
}

fn cmd_write(app: &mut App, args: &[&str], _range: Option<ChordRange>) -> Result<(), CommandError> {
    let path = match args {
        [] => app.file_name.clone().ok_or(CommandError::NoFileName)?,
        [path] => PathBuf::from(path),
        _ => return Err(CommandError::InvalidArgument),
    };
    app.save(&path)
}

fn cmd_quit(app: &mut App, _args: &[&str], _range: Option<ChordRange>) -> Result<(), CommandError> {
    app.quit(false)
}

fn cmd_force_quit(
    app: &mut App,
    _args: &[&str],
    _range: Option<ChordRange>,
) -> Result<(), CommandError> {
    app.quit(true)
}

fn cmd_write_quit(
    app: &mut App,
    args: &[&str],
    range: Option<ChordRange>,
) -> Result<(), CommandError> {
    cmd_write(app, args, range)?;
    app.quit(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bar, Chord, Config, Tablature};
    use crate::tui::app::Mode;
    use pretty_assertions::assert_eq;

    fn app_with(counts: &[usize]) -> App {
        let mut tab = Tablature::default();
        tab.bars = counts
            .iter()
            .map(|&n| {
                let mut bar = Bar::default();
                bar.chords = vec![Chord::new(Duration::QUARTER); n];
                bar
            })
            .collect();
        let state_dir = std::env::temp_dir().join("vitabs-command-tests");
        App::new(tab, None, &Config::default(), state_dir)
    }

    #[test]
    fn unknown_and_empty_lines() {
        let mut app = app_with(&[1]);
        assert_eq!(execute(&mut app, "   "), Ok(()));
        assert_eq!(execute(&mut app, "frobnicate"), Err(CommandError::InvalidCommand));
        assert!(!app.tab.changed);
    }

    #[test]
    fn error_messages_are_status_text() {
        assert_eq!(CommandError::InvalidArgument.to_string(), "Invalid argument");
        assert_eq!(CommandError::InvalidCommand.to_string(), "Invalid command");
        assert_eq!(
            CommandError::RangeNotAccepted.to_string(),
            "Command does not accept range"
        );
        assert_eq!(CommandError::NoFileName.to_string(), "File name not specified");
    }

    #[test]
    fn meter_sets_cursor_bar() {
        let mut app = app_with(&[2, 2]);
        app.tab.cursor = Position::new(2, 1);
        execute(&mut app, "meter 3 4").unwrap();
        assert_eq!((app.tab.bars[1].sig_num, app.tab.bars[1].sig_den), (3, 4));
        assert_eq!((app.tab.bars[0].sig_num, app.tab.bars[0].sig_den), (4, 4));
        assert!(app.tab.changed);
        execute(&mut app, "meter 6/8").unwrap();
        assert_eq!((app.tab.bars[1].sig_num, app.tab.bars[1].sig_den), (6, 8));
    }

    #[test]
    fn malformed_arguments_leave_document_alone() {
        let mut app = app_with(&[2]);
        let before = app.tab.clone();
        for line in ["meter x 4", "meter 3 0", "meter", "len 1", "bpm fast", "bpm 0", "instrument 200", "tuning E2 A2", "meta colour"] {
            assert_eq!(execute(&mut app, line), Err(CommandError::InvalidArgument), "{line}");
        }
        assert_eq!(app.tab, before);
    }

    #[test]
    fn len_and_ilen() {
        let mut app = app_with(&[3]);
        app.tab.cursor = Position::new(1, 2);
        execute(&mut app, "len 1 8").unwrap();
        let lens: Vec<Duration> = app.tab.bars[0].chords.iter().map(|c| c.duration).collect();
        assert_eq!(lens, vec![Duration::QUARTER, Duration::new(1, 8), Duration::QUARTER]);

        execute(&mut app, "ilen 1/16").unwrap();
        assert_eq!(app.insert_duration, Duration::new(1, 16));
        assert_eq!(app.status, "Insert length: S");
    }

    #[test]
    fn for_applies_range_commands() {
        let mut app = app_with(&[3, 2, 2]);
        execute(&mut app, "for 1,2 2,1 len 1 8").unwrap();
        let lens: Vec<Vec<Duration>> = app
            .tab
            .bars
            .iter()
            .map(|b| b.chords.iter().map(|c| c.duration).collect())
            .collect();
        let (q, e) = (Duration::QUARTER, Duration::new(1, 8));
        assert_eq!(lens, vec![vec![q, e, e], vec![e, q], vec![q, q]]);

        execute(&mut app, "for 2 3 meter 3 4").unwrap();
        let sigs: Vec<u32> = app.tab.bars.iter().map(|b| b.sig_num).collect();
        assert_eq!(sigs, vec![4, 3, 3]);
    }

    #[test]
    fn for_with_cursor_and_end_positions() {
        let mut app = app_with(&[2, 2, 2]);
        app.tab.cursor = Position::new(2, 2);
        execute(&mut app, "for . $ delete").unwrap();
        assert_eq!(app.tab.bars.len(), 2);
        assert_eq!(app.tab.bars[1].chords.len(), 1);
        assert_eq!(app.tab.cursor, Position::new(2, 1));
    }

    fn chord_counts(app: &App) -> Vec<usize> {
        app.tab.bars.iter().map(|b| b.chords.len()).collect()
    }

    #[test]
    fn for_with_open_and_explicit_endpoints() {
        let mut app = app_with(&[3, 3]);
        app.tab.bars[1].chords[0].duration = Duration::new(1, 8);
        execute(&mut app, "for 2,2 2 delete").unwrap();
        assert_eq!(chord_counts(&app), vec![3, 1]);
        assert_eq!(app.tab.bars[1].chords[0].duration, Duration::new(1, 8));

        let mut app = app_with(&[3, 3]);
        app.tab.bars[1].chords[2].duration = Duration::new(1, 8);
        execute(&mut app, "for 2 2,2 delete").unwrap();
        assert_eq!(chord_counts(&app), vec![3, 1]);
        assert_eq!(app.tab.bars[1].chords[0].duration, Duration::new(1, 8));

        let mut app = app_with(&[3, 3, 3]);
        execute(&mut app, "for 3 1,2 len 1 8").unwrap();
        let eighths: Vec<usize> = app
            .tab
            .bars
            .iter()
            .map(|b| b.chords.iter().filter(|c| c.duration == Duration::new(1, 8)).count())
            .collect();
        assert_eq!(eighths, vec![2, 3, 3]);
    }

    #[test]
    fn len_refuses_lengths_off_the_grid() {
        let mut app = app_with(&[2]);
        assert_eq!(
            execute(&mut app, "len 1 18446744073709551557"),
            Err(CommandError::InvalidArgument)
        );
        assert_eq!(execute(&mut app, "len 1 11"), Err(CommandError::InvalidArgument));
        assert_eq!(execute(&mut app, "ilen 1/1024"), Err(CommandError::InvalidArgument));
        assert_eq!(app.tab.bars[0].width(), 8);

        execute(&mut app, "len 1 12").unwrap();
        // 1/12 next to 1/4: four units of 1/12
        assert_eq!(app.tab.bars[0].width(), 2 * 4 + 2 + 2);
    }

    #[test]
    fn for_rejects_bad_ranges_and_commands() {
        let mut app = app_with(&[2]);
        assert_eq!(
            execute(&mut app, "for 1 1 bpm 100"),
            Err(CommandError::RangeNotAccepted)
        );
        assert_eq!(
            execute(&mut app, "for 1 5 delete"),
            Err(CommandError::InvalidArgument)
        );
        assert_eq!(
            execute(&mut app, "for 1 x delete"),
            Err(CommandError::InvalidArgument)
        );
        assert_eq!(execute(&mut app, "for 1 1"), Err(CommandError::InvalidArgument));
        assert_eq!(
            execute(&mut app, "for 1 1 nothing"),
            Err(CommandError::InvalidCommand)
        );
        assert_eq!(app.tab.bars[0].chords.len(), 2);
    }

    #[test]
    fn label_and_goto() {
        let mut app = app_with(&[1, 1, 1]);
        app.tab.cursor = Position::new(3, 1);
        execute(&mut app, "label second chorus").unwrap();
        assert_eq!(app.tab.bars[2].label.as_deref(), Some("second chorus"));
        app.tab.cursor = Position::new(1, 1);
        execute(&mut app, "goto ^sec").unwrap();
        assert_eq!(app.tab.cursor, Position::new(3, 1));
        assert_eq!(execute(&mut app, "goto bridge"), Err(CommandError::LabelNotFound));
        assert_eq!(execute(&mut app, "goto ("), Err(CommandError::InvalidArgument));

        execute(&mut app, "label").unwrap();
        assert_eq!(app.tab.bars[2].label, None);
    }

    #[test]
    fn delete_command_repairs() {
        let mut app = app_with(&[2]);
        execute(&mut app, "delete").unwrap();
        assert_eq!(app.tab.bars.len(), 1);
        assert_eq!(app.tab.bars[0].chords.len(), 1);
        assert_eq!(app.tab.cursor, Position::new(1, 1));
    }

    #[test]
    fn play_queues_a_score() {
        let mut app = app_with(&[2, 3]);
        app.tab.cursor = Position::new(2, 1);
        execute(&mut app, "play").unwrap();
        let score = app.pending_playback.as_ref().unwrap();
        assert_eq!(score.chords.len(), 3);
        assert_eq!(score.beginning, Position::new(2, 1));
        assert_eq!(app.status, "Playing... <CTRL-C> to abort");
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn document_settings() {
        let mut app = app_with(&[1]);
        execute(&mut app, "bpm 90").unwrap();
        execute(&mut app, "instrument 30").unwrap();
        execute(&mut app, "tuning D2 A2 D3 G3 B3 E4").unwrap();
        assert_eq!(app.tab.bpm, 90);
        assert_eq!(app.tab.instrument, 30);
        assert_eq!(app.tab.tuning, [76, 71, 67, 62, 57, 50]);
        assert_eq!(app.status, "Tuning: D2 A2 D3 G3 B3 E4");

        execute(&mut app, "meta number").unwrap();
        assert_eq!(app.visible_meta, VisibleMeta::Number);
        execute(&mut app, "continuous").unwrap();
        assert!(app.continuous);
        execute(&mut app, "continuous off").unwrap();
        assert!(!app.continuous);
    }

    #[test]
    fn quit_refuses_dirty_document() {
        let mut app = app_with(&[1]);
        app.tab.changed = true;
        assert_eq!(execute(&mut app, "q"), Err(CommandError::Unsaved));
        assert!(!app.should_quit);
    }

    #[test]
    fn write_needs_a_name() {
        let mut app = app_with(&[1]);
        assert_eq!(execute(&mut app, "w"), Err(CommandError::NoFileName));
        assert_eq!(execute(&mut app, "e"), Err(CommandError::NoFileName));
    }

    #[test]
    fn table_lists_every_command() {
        let table = CommandTable::builtin();
        let names = table.names();
        for name in ["meter", "ilen", "len", "label", "goto", "delete", "play", "for", "q!", "wq"] {
            assert!(names.contains(&name), "{name}");
        }
        assert!(table.get("meter").unwrap().accepts_range);
        assert!(!table.get("bpm").unwrap().accepts_range);
    }
}
