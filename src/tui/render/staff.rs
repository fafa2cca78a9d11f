//! Text of a single bar's staff block, shared by the TUI and `vitabs print`.

use crate::model::music::len_str;
use crate::model::{STRING_COUNT, Tablature, VisibleMeta};
use crate::tui::layout::{Layout, ROW_HEIGHT};

/// A fret number drawn on the staff, in block columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FretCell {
    pub chord: usize,
    pub string: u8,
    pub col: usize,
    pub text: String,
}

/// One bar rendered as `width + 2` columns: borders, dashes and frets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffBlock {
    /// Text of the meta line with its block column
    pub meta: Vec<(usize, String)>,
    /// The six staff lines, frets included
    pub lines: Vec<String>,
    pub frets: Vec<FretCell>,
}

/// Render 1-based bar `index`. A `leading` bar starts the visible run and
/// always shows its meter.
pub fn staff_block(tab: &Tablature, index: usize, meta: VisibleMeta, leading: bool) -> StaffBlock {
    let bar = &tab.bars[index - 1];
    let width = bar.width();
    let mut grid = vec![vec!['-'; width + 2]; STRING_COUNT];
    for line in &mut grid {
        line[0] = '|';
        line[width + 1] = '|';
    }

    let mut frets = Vec::new();
    for (i, chord) in bar.chords.iter().enumerate() {
        let col = 1 + bar.chord_offset(i);
        for (&string, fret) in &chord.strings {
            let text = fret.to_string();
            let line = &mut grid[usize::from(string)];
            for (c, ch) in text.chars().enumerate() {
                if col + c > width {
                    break;
                }
                line[col + c] = ch;
            }
            frets.push(FretCell {
                chord: i,
                string,
                col,
                text,
            });
        }
    }

    let meta = match meta {
        VisibleMeta::Meter => {
            let changed = index == 1 || !bar.same_signature(&tab.bars[index - 2]);
            if changed || leading {
                vec![(1, format!("{}/{}", bar.sig_num, bar.sig_den))]
            } else {
                Vec::new()
            }
        }
        VisibleMeta::Number => vec![(1, index.to_string())],
        VisibleMeta::Label => bar.label.iter().map(|l| (1, l.clone())).collect(),
        VisibleMeta::Length => bar
            .chords
            .iter()
            .enumerate()
            .map(|(i, c)| (1 + bar.chord_offset(i), len_str(c.duration)))
            .collect(),
    };

    StaffBlock {
        meta,
        lines: grid.into_iter().map(String::from_iter).collect(),
        frets,
    }
}

/// Lay the whole document out at `width` columns and return it as plain
/// text, one row of bars after another
pub fn render_text(tab: &Tablature, width: usize, meta: VisibleMeta) -> String {
    let layout = Layout::new(width, usize::MAX / 2);
    let placements = layout.placements(tab);
    let height = placements.last().map_or(0, |p| p.y + ROW_HEIGHT - 1);
    let mut canvas: Vec<Vec<char>> = vec![Vec::new(); height];

    let mut put = |row: usize, col: usize, text: &str| {
        let line = &mut canvas[row];
        for (i, ch) in text.chars().enumerate() {
            if col + i >= width {
                break;
            }
            if line.len() <= col + i {
                line.resize(col + i + 1, ' ');
            }
            line[col + i] = ch;
        }
    };

    for (n, p) in placements.iter().enumerate() {
        let block = staff_block(tab, p.bar, meta, n == 0);
        for (col, text) in &block.meta {
            put(p.y, p.x + col, text);
        }
        for (s, line) in block.lines.iter().enumerate() {
            put(p.staff_top() + s, p.x, line);
        }
    }

    let mut out: String = canvas
        .iter()
        .map(|line| String::from_iter(line).trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    out
}
