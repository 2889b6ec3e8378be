//! Monospace grid layout used by the unit tests.
//!
//! Cells are 10px wide and rows 20px tall, starting 4px from the left.
//! Lines can wrap at a column count, carry explicit bidi runs (RTL runs are
//! mirrored row by row), be region-tagged, or be joined onto the previous
//! line's visual line behind a three-cell fold marker.

use crate::geometry::{Edges, Rect};
use crate::layout::{
    BidiOrderProvider, BidiRun, CaretHeight, CaretRect, CoordinateMapper, Direction, LineSource,
    RowExtent, Side, WrapExtentResolver,
};
use crate::position::Position;

pub(crate) const CELL: f32 = 10.0;
pub(crate) const ROW: f32 = 20.0;
pub(crate) const ORIGIN: f32 = 4.0;
pub(crate) const FOLD_MARKER_CELLS: usize = 3;
pub(crate) const EDGES: Edges = Edges {
    left: 4.0,
    right: 404.0,
};

#[derive(Clone, Debug)]
struct GridLine {
    text: Vec<char>,
    region: bool,
    runs: Option<Vec<BidiRun>>,
    joined: bool,
}

#[derive(Clone, Copy, Debug)]
struct Placement {
    group: usize,
    offset: usize,
    top_row: usize,
}

#[derive(Clone, Debug)]
pub(crate) struct GridLayout {
    lines: Vec<GridLine>,
    cols: usize,
}

impl GridLayout {
    pub(crate) fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines
                .iter()
                .map(|text| GridLine {
                    text: text.chars().collect(),
                    region: false,
                    runs: None,
                    joined: false,
                })
                .collect(),
            cols: 40,
        }
    }

    pub(crate) fn wrap(mut self, cols: usize) -> Self {
        self.cols = cols.max(1);
        self
    }

    pub(crate) fn region(mut self, line: usize) -> Self {
        self.lines[line].region = true;
        self
    }

    pub(crate) fn runs(mut self, line: usize, runs: Vec<BidiRun>) -> Self {
        self.lines[line].runs = Some(runs);
        self
    }

    /// Renders `line` on the previous line's visual line.
    pub(crate) fn join(mut self, line: usize) -> Self {
        self.lines[line].joined = true;
        self
    }

    fn placements(&self) -> Vec<Placement> {
        let mut out = Vec::with_capacity(self.lines.len());
        let mut row = 0;
        let mut i = 0;
        while i < self.lines.len() {
            let group = i;
            let mut offset = 0;
            loop {
                out.push(Placement {
                    group,
                    offset,
                    top_row: row,
                });
                offset += self.lines[i].text.len();
                i += 1;
                if i < self.lines.len() && self.lines[i].joined {
                    offset += FOLD_MARKER_CELLS;
                } else {
                    break;
                }
            }
            row += offset.max(1).div_ceil(self.cols);
        }
        out
    }

    fn placement(&self, line: usize) -> Placement {
        self.placements()[line]
    }

    fn cell(&self, place: &Placement, idx: usize) -> Rect {
        let row = place.top_row + idx / self.cols;
        let left = ORIGIN + (idx % self.cols) as f32 * CELL;
        let top = row as f32 * ROW;
        Rect::new(left, top, left + CELL, top + ROW)
    }

    /// Stream index of `ch` after visual reordering. An RTL run is mirrored
    /// within each wrapped row it occupies.
    fn stream_index(&self, line: usize, ch: usize) -> usize {
        let place = self.placement(line);
        let logical = place.offset + ch;
        let Some(run) = self.run_at(line, ch).filter(|r| r.dir == Direction::Rtl) else {
            return logical;
        };
        let row_start = logical / self.cols * self.cols;
        let lo = (place.offset + run.from).max(row_start);
        let hi = (place.offset + run.to).min(row_start + self.cols);
        lo + hi - 1 - logical
    }

    fn run_at(&self, line: usize, ch: usize) -> Option<BidiRun> {
        self.lines[line]
            .runs
            .as_ref()?
            .iter()
            .copied()
            .find(|r| ch >= r.from && ch < r.to)
    }

    fn end_rect(&self, line: usize) -> Rect {
        let place = self.placement(line);
        let len = self.lines[line].text.len();
        if len == 0 {
            let cell = self.cell(&place, place.offset);
            return cell.collapsed_at(cell.left);
        }
        let cell = self.cell(&place, place.offset + len - 1);
        cell.collapsed_at(cell.right)
    }

    fn line_span(&self, line: usize) -> (f32, f32) {
        let place = self.placement(line);
        let len = self.lines[line].text.len().max(1);
        let first = self.cell(&place, place.offset);
        let last = self.cell(&place, place.offset + len - 1);
        (first.top, last.bottom)
    }
}

impl LineSource for GridLayout {
    fn line_len(&self, line: usize) -> usize {
        self.lines[line].text.len()
    }

    fn char_at(&self, line: usize, ch: usize) -> Option<char> {
        self.lines[line].text.get(ch).copied()
    }

    fn is_region(&self, line: usize) -> bool {
        self.lines[line].region
    }

    fn visual_line(&self, line: usize) -> usize {
        self.placement(line).group
    }
}

impl CoordinateMapper for GridLayout {
    fn char_rect(&self, pos: Position, _side: Side) -> Rect {
        if pos.ch >= self.line_len(pos.line) {
            return self.end_rect(pos.line);
        }
        let place = self.placement(pos.line);
        self.cell(&place, self.stream_index(pos.line, pos.ch))
    }

    fn caret_rect(&self, pos: Position, height: CaretHeight) -> CaretRect {
        let len = self.line_len(pos.line);
        let runs = self.lines[pos.line].runs.clone().unwrap_or_default();
        let jump = runs.windows(2).find(|pair| {
            pair[0].to == pos.ch && pair[1].from == pos.ch && pair[0].dir != pair[1].dir
        });

        let (mut primary, mut secondary) = match jump {
            Some(pair) => {
                let before = self.char_rect(Position::new(pos.line, pos.ch - 1), Side::Right);
                let after = self.char_rect(pos, Side::Left);
                let x1 = if pair[0].dir.is_ltr() {
                    before.right
                } else {
                    before.left
                };
                let x2 = if pair[1].dir.is_ltr() {
                    after.left
                } else {
                    after.right
                };
                (before.collapsed_at(x1), Some(after.collapsed_at(x2)))
            }
            None if pos.ch < len => {
                let cell = self.char_rect(pos, Side::Left);
                let ltr = self.run_at(pos.line, pos.ch).is_none_or(|r| r.dir.is_ltr());
                let x = if ltr { cell.left } else { cell.right };
                (cell.collapsed_at(x), None)
            }
            None => (self.end_rect(pos.line), None),
        };

        if height == CaretHeight::Line {
            let (top, bottom) = self.line_span(pos.line);
            primary.top = top;
            primary.bottom = bottom;
            if let Some(other) = secondary.as_mut() {
                other.top = top;
                other.bottom = bottom;
            }
        }
        CaretRect { primary, secondary }
    }
}

impl BidiOrderProvider for GridLayout {
    fn bidi_order(&self, line: usize, _base: Direction) -> Option<Vec<BidiRun>> {
        self.lines[line].runs.clone()
    }
}

impl WrapExtentResolver for GridLayout {
    fn wrap_row_extent(&self, line: usize, ch: usize) -> RowExtent {
        let place = self.placement(line);
        let len = self.line_len(line);
        let row_start = (place.offset + ch) / self.cols * self.cols;
        RowExtent {
            begin: row_start.saturating_sub(place.offset).min(len),
            end: (row_start + self.cols).saturating_sub(place.offset).min(len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_cells_flow_onto_following_rows() {
        let layout = GridLayout::new(&["0123456789ab", "x"]).wrap(10);
        assert_eq!(
            layout.char_rect(Position::new(0, 11), Side::Left),
            Rect::new(14.0, 20.0, 24.0, 40.0)
        );
        assert_eq!(
            layout.char_rect(Position::new(1, 0), Side::Left),
            Rect::new(4.0, 40.0, 14.0, 60.0)
        );
        assert_eq!(
            layout.wrap_row_extent(0, 11),
            RowExtent { begin: 10, end: 12 }
        );
    }

    #[test]
    fn rtl_runs_are_mirrored() {
        let layout = GridLayout::new(&["abDEF"]).runs(
            0,
            vec![
                BidiRun::new(0, 2, Direction::Ltr),
                BidiRun::new(2, 5, Direction::Rtl),
            ],
        );
        assert_eq!(layout.char_rect(Position::new(0, 2), Side::Right).left, 44.0);
        assert_eq!(layout.char_rect(Position::new(0, 4), Side::Left).left, 24.0);
    }

    #[test]
    fn wrapped_rtl_run_mirrors_within_each_row() {
        let layout = GridLayout::new(&["abcdefghijklmnopqrstuvwxy"])
            .wrap(10)
            .runs(0, vec![BidiRun::new(0, 25, Direction::Rtl)]);
        let at = |ch| layout.char_rect(Position::new(0, ch), Side::Left);
        assert_eq!(at(0), Rect::new(94.0, 0.0, 104.0, 20.0));
        assert_eq!(at(9), Rect::new(4.0, 0.0, 14.0, 20.0));
        assert_eq!(at(10), Rect::new(94.0, 20.0, 104.0, 40.0));
        assert_eq!(at(20), Rect::new(44.0, 40.0, 54.0, 60.0));
        assert_eq!(at(24), Rect::new(4.0, 40.0, 14.0, 60.0));
    }

    #[test]
    fn joined_lines_share_a_visual_line() {
        let layout = GridLayout::new(&["abc", "de", "f"]).join(1);
        assert_eq!(layout.visual_line(1), 0);
        assert_eq!(layout.visual_line(2), 2);
        assert_eq!(
            layout.char_rect(Position::new(1, 0), Side::Left).left,
            64.0
        );
        assert_eq!(layout.char_rect(Position::new(2, 0), Side::Left).top, 20.0);
    }
}
