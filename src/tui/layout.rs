//! Maps document positions to cells of the tablature area and back.
//!
//! Bars are laid out left to right in rows of [`ROW_HEIGHT`] lines: a meta
//! line, six staff lines and a blank gap. A bar placed at column `x` draws
//! its left border at `x` and its right border at `x + total_width + 1`;
//! the next bar starts on that right border, so neighbours share it.
//!
//! The engine caches the origin of the cursor's bar. Every way the cache
//! can go stale goes through one of [`Layout::move_cursor`],
//! [`Layout::invalidate_from`] or [`Layout::resize`].

use crate::model::{Position, Tablature};

/// Column of the first bar's left border in every row
pub const MARGIN: usize = 1;
/// Lines per row of bars
pub const ROW_HEIGHT: usize = 8;
/// Blank lines above the first row
pub const TOP: usize = 1;

/// Where one bar lands on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// 1-based bar index
    pub bar: usize,
    /// Column of the left border
    pub x: usize,
    /// Line of the meta row; the staff occupies the six lines below it
    pub y: usize,
    /// `total_width` of the bar
    pub width: usize,
    /// The bar is wider than the viewport and is drawn clipped
    pub overflow: bool,
}

impl Placement {
    /// Column of the right border
    pub fn right(&self) -> usize {
        self.x + self.width + 1
    }

    pub fn staff_top(&self) -> usize {
        self.y + 1
    }
}

/// Which line of the bar the terminal cursor sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorLine {
    /// The meta line above the staff (normal mode)
    Meta,
    /// A string of the staff (insert modes)
    String(u8),
}

/// Viewport state and the cached origin of the cursor's bar
#[derive(Debug, Clone)]
pub struct Layout {
    width: usize,
    height: usize,
    first_visible: usize,
    last_visible: Option<usize>,
    cursor_origin: Option<(usize, usize, usize)>,
}

impl Layout {
    pub fn new(width: usize, height: usize) -> Self {
        Layout {
            width,
            height,
            first_visible: 1,
            last_visible: None,
            cursor_origin: None,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn first_visible(&self) -> usize {
        self.first_visible
    }

    /// Last bar that fits on screen from the current scroll anchor
    pub fn last_visible(&mut self, tab: &Tablature) -> usize {
        if let Some(last) = self.last_visible {
            return last;
        }
        let last = self
            .placements(tab)
            .last()
            .map_or(self.first_visible, |p| p.bar);
        self.last_visible = Some(last);
        last
    }

    /// Whether the cursor bar's origin is currently cached
    pub fn is_cached(&self) -> bool {
        self.cursor_origin.is_some()
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.width, self.height) {
            log::debug!("layout resized to {width}x{height}");
            self.width = width;
            self.height = height;
            self.invalidate();
        }
    }

    /// Forget all cached geometry
    pub fn invalidate(&mut self) {
        self.cursor_origin = None;
        self.last_visible = None;
    }

    /// Bar `bar` changed width, was inserted or was removed. Anything laid
    /// out at or after it may have moved.
    pub fn invalidate_from(&mut self, bar: usize) {
        if let Some((cached, _, _)) = self.cursor_origin
            && bar <= cached
        {
            log::debug!("layout cache dropped: bar {bar} changed before cursor bar {cached}");
            self.cursor_origin = None;
        }
        self.last_visible = None;
    }

    /// Lay out the bars visible from the scroll anchor. The first row is
    /// always placed, even if the viewport is too short for it.
    pub fn placements(&self, tab: &Tablature) -> Vec<Placement> {
        let mut out = Vec::new();
        let mut walker = RowWalker::new(self.width);
        for (i, bar) in tab.bars.iter().enumerate().skip(self.first_visible - 1) {
            let (x, row) = walker.place(bar.width());
            let y = TOP + row * ROW_HEIGHT;
            if row > 0 && y + ROW_HEIGHT > self.height {
                break;
            }
            out.push(Placement {
                bar: i + 1,
                x,
                y,
                width: bar.width(),
                overflow: x + bar.width() + 2 > self.width,
            });
        }
        out
    }

    /// Move the cursor to `target` (clamped into the document), scrolling
    /// so that its bar is visible. This is the only place the editor moves
    /// the cursor.
    pub fn move_cursor(&mut self, tab: &mut Tablature, target: Position) {
        let target = tab.clamp(target);
        let last = self.last_visible(tab);
        if target.bar < self.first_visible || target.bar > last {
            log::debug!("scrolling to bar {}", target.bar);
            self.first_visible = target.bar;
            self.invalidate();
        }
        if self.cursor_origin.is_some_and(|(bar, _, _)| bar != target.bar) {
            self.cursor_origin = None;
        }
        tab.cursor = target;
    }

    /// Scroll the anchor by `delta` bars, then pull the cursor into view
    pub fn scroll(&mut self, tab: &mut Tablature, delta: isize) {
        let bars = tab.bars.len() as isize;
        let first = (self.first_visible as isize + delta).clamp(1, bars.max(1));
        self.first_visible = first as usize;
        self.invalidate();
        let last = self.last_visible(tab);
        let cursor = tab.cursor;
        if cursor.bar < self.first_visible {
            self.move_cursor(tab, Position::new(self.first_visible, 1));
        } else if cursor.bar > last {
            self.move_cursor(tab, Position::new(last, 1));
        }
    }

    /// Keep the anchor valid after bars were removed
    pub fn clamp_anchor(&mut self, tab: &Tablature) {
        if self.first_visible > tab.bars.len() {
            self.first_visible = tab.bars.len().max(1);
            self.invalidate();
        }
    }

    /// Screen cell of the cursor. The bar origin comes from the cache when
    /// possible; the chord offset is always recomputed.
    pub fn cursor_cell(&mut self, tab: &Tablature, line: CursorLine) -> (usize, usize) {
        let cursor = tab.cursor;
        let (x, y) = match self.cursor_origin {
            Some((bar, x, y)) if bar == cursor.bar => (x, y),
            _ => {
                let (x, y) = self.origin_of(tab, cursor.bar);
                self.cursor_origin = Some((cursor.bar, x, y));
                (x, y)
            }
        };
        let bar = tab.get_cursor_bar();
        let col = x + 1 + bar.chord_offset(cursor.chord - 1);
        let row = match line {
            CursorLine::Meta => y,
            CursorLine::String(s) => y + 1 + usize::from(s),
        };
        (col, row)
    }

    /// Origin of `bar` by walking from the anchor. Bars before the anchor
    /// are placed at the top-left.
    fn origin_of(&self, tab: &Tablature, bar: usize) -> (usize, usize) {
        let mut walker = RowWalker::new(self.width);
        let mut origin = (MARGIN, TOP);
        for b in &tab.bars[(self.first_visible - 1).min(bar.saturating_sub(1))..bar] {
            let (x, row) = walker.place(b.width());
            origin = (x, TOP + row * ROW_HEIGHT);
        }
        origin
    }

    /// The chord drawn at screen cell `(col, row)`, if any. Any line of a
    /// bar's row block and any column between its borders count; border
    /// and padding columns resolve to the nearest chord on their left.
    pub fn position_at(&self, tab: &Tablature, col: usize, row: usize) -> Option<Position> {
        let placement = self
            .placements(tab)
            .into_iter()
            .find(|p| row >= p.y && row < p.y + ROW_HEIGHT - 1 && col >= p.x && col <= p.right())?;
        let bar = &tab.bars[placement.bar - 1];
        let rel = col.saturating_sub(placement.x + 1);
        let chord = (0..bar.chords.len())
            .rev()
            .find(|&i| bar.chord_offset(i) <= rel)
            .unwrap_or(0);
        Some(Position::new(placement.bar, chord + 1))
    }
}

/// Assigns successive bar widths to rows with the shared wrap rule: a bar
/// wraps when its right border would leave the viewport, unless it already
/// starts a row.
struct RowWalker {
    width: usize,
    x: usize,
    row: usize,
}

impl RowWalker {
    fn new(width: usize) -> Self {
        RowWalker {
            width,
            x: MARGIN,
            row: 0,
        }
    }

    /// Returns the bar's `(x, row)` and advances past it
    fn place(&mut self, bar_width: usize) -> (usize, usize) {
        if self.x + bar_width + 2 > self.width && self.x != MARGIN {
            self.x = MARGIN;
            self.row += 1;
        }
        let placed = (self.x, self.row);
        self.x += bar_width + 1;
        placed
    }
}
