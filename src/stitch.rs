//! Joins per-line highlights into one gap-free selection.

use crate::geometry::Rect;
use crate::layout::{Side, TextLayout};
use crate::line::SelectionPainter;
use crate::position::{Position, Range};

/// A run of consecutive lines sharing one region tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegionBlock {
    pub first: usize,
    pub last: usize,
    pub tagged: bool,
}

/// Splits `lines` into maximal blocks of equal region tag.
pub fn region_blocks(
    lines: std::ops::Range<usize>,
    is_region: impl Fn(usize) -> bool,
) -> Vec<RegionBlock> {
    let mut blocks: Vec<RegionBlock> = Vec::new();
    for line in lines {
        let tagged = is_region(line);
        match blocks.last_mut() {
            Some(block) if block.tagged == tagged => block.last = line,
            _ => blocks.push(RegionBlock {
                first: line,
                last: line,
                tagged,
            }),
        }
    }
    blocks
}

impl<L: TextLayout + ?Sized> SelectionPainter<'_, '_, L> {
    /// Highlights a whole range, however many lines it spans.
    pub fn draw_range(&mut self, range: &Range) {
        let (s_from, s_to) = (range.from(), range.to());
        if s_from.line == s_to.line {
            self.draw_for_line(s_from.line, Some(s_from.ch), Some(s_to.ch));
            return;
        }

        let single_vline =
            self.layout.visual_line(s_from.line) == self.layout.visual_line(s_to.line);
        let first_end = if single_vline {
            Some(self.layout.line_len(s_from.line) + 1)
        } else {
            None
        };
        let left_end = self.draw_for_line(s_from.line, Some(s_from.ch), first_end).end;
        let right_start = self.draw_for_line(s_to.line, Some(0), Some(s_to.ch)).start;
        let (Some(left_end), Some(right_start)) = (left_end, right_start) else {
            return;
        };

        if single_vline {
            self.join_folded(&left_end, &right_start);
        }
        if left_end.bottom < right_start.top {
            self.fill_middle(s_from.line + 1..s_to.line, left_end.bottom);
        }
    }

    /// Bridges the end of the first line and the start of the last when
    /// folding put them on one visual line.
    fn join_folded(&mut self, left_end: &Rect, right_start: &Rect) {
        let edges = self.sink.edges();
        if left_end.top < right_start.top - self.config.join_tolerance {
            self.sink
                .add(left_end.right, left_end.top, None, left_end.bottom);
            self.sink.add(
                edges.left,
                right_start.top,
                Some(right_start.left - edges.left),
                right_start.bottom,
            );
        } else {
            self.sink.add(
                left_end.right,
                left_end.top,
                Some(right_start.left - left_end.right),
                left_end.bottom,
            );
        }
    }

    /// Paints fully selected lines edge to edge, one box per region block.
    fn fill_middle(&mut self, lines: std::ops::Range<usize>, top: f32) {
        let edges = self.sink.edges();
        let inset = self.config.region_inset;
        let mut cur_top = top;
        for block in region_blocks(lines, |line| self.layout.is_region(line)) {
            let end = Position::new(block.last, self.layout.line_len(block.last));
            let bottom = self.layout.char_rect(end, Side::Left).bottom;
            let pad = if block.tagged { inset } else { 0.0 };
            let left = edges.left + pad;
            self.sink
                .add(left, cur_top, Some(edges.right - left - pad), bottom);
            cur_top = bottom;
        }
    }
}
