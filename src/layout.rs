//! Interfaces to the collaborators that own text, layout and bidi data,
//! plus the pure mapping from a logical sub-range to bidi sections.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::position::Position;

/// Paragraph or run direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub fn is_ltr(self) -> bool {
        self == Direction::Ltr
    }
}

/// Which side of a character box a measurement should favour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Picks the matching horizontal edge of `rect`.
    pub fn edge_of(self, rect: &Rect) -> f32 {
        match self {
            Side::Left => rect.left,
            Side::Right => rect.right,
        }
    }
}

/// Vertical extent requested for a caret.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaretHeight {
    /// Span the whole logical line, across wrapped rows.
    Line,
    /// Span only the wrapped row holding the position.
    Row,
}

/// Caret coordinates. `secondary` is set only at a bidi jump, where two
/// visual columns are both valid insertion points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaretRect {
    pub primary: Rect,
    pub secondary: Option<Rect>,
}

/// A maximal logical sub-range of one line rendered in one direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BidiRun {
    pub from: usize,
    pub to: usize,
    pub dir: Direction,
}

impl BidiRun {
    pub fn new(from: usize, to: usize, dir: Direction) -> Self {
        Self { from, to, dir }
    }
}

/// The characters of one logical line that share a wrapped visual row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowExtent {
    pub begin: usize,
    pub end: usize,
}

/// Read-only view of the document's lines.
pub trait LineSource {
    fn line_len(&self, line: usize) -> usize;

    /// Character at `ch`, if any.
    fn char_at(&self, line: usize, ch: usize) -> Option<char>;

    /// True when the line carries the distinguished-region tag.
    fn is_region(&self, line: usize) -> bool;

    /// Identity of the visual line `line` is rendered on. Lines joined by
    /// layout folding share one identity.
    fn visual_line(&self, line: usize) -> usize;
}

/// Maps logical positions to container-relative pixels.
pub trait CoordinateMapper {
    /// Box of the character at `pos`. At the end of the line this is the
    /// zero-width box after the last character.
    fn char_rect(&self, pos: Position, side: Side) -> Rect;

    fn caret_rect(&self, pos: Position, height: CaretHeight) -> CaretRect;
}

pub trait BidiOrderProvider {
    /// Runs of `line`, or `None` when the line is uniformly in `base`.
    fn bidi_order(&self, line: usize, base: Direction) -> Option<Vec<BidiRun>>;
}

pub trait WrapExtentResolver {
    /// The wrapped row of `line` that holds offset `ch`.
    fn wrap_row_extent(&self, line: usize, ch: usize) -> RowExtent;
}

/// Everything the selection renderer reads during a pass.
pub trait TextLayout: LineSource + CoordinateMapper + BidiOrderProvider + WrapExtentResolver {}

impl<T> TextLayout for T where
    T: LineSource + CoordinateMapper + BidiOrderProvider + WrapExtentResolver
{
}

/// A run clipped to the sub-range being drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BidiSection {
    pub from: usize,
    pub to: usize,
    pub dir: Direction,
    /// First run in paragraph order.
    pub first: bool,
    /// Last run in paragraph order.
    pub last: bool,
}

impl BidiSection {
    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// Clips `order` to `[from, to)`.
///
/// A run is kept when it overlaps the sub-range, or, for an empty sub-range,
/// when it ends exactly at `from`. A missing order is one run in `base`. If
/// nothing matches, a single base-direction section covering `[from, to)` is
/// returned that is neither first nor last.
pub fn bidi_sections(
    order: Option<&[BidiRun]>,
    from: usize,
    to: usize,
    base: Direction,
) -> Vec<BidiSection> {
    let runs = match order {
        Some(runs) if !runs.is_empty() => runs,
        _ => {
            return vec![BidiSection {
                from,
                to,
                dir: base,
                first: true,
                last: true,
            }];
        }
    };

    let last_index = runs.len() - 1;
    let sections: Vec<BidiSection> = runs
        .iter()
        .enumerate()
        .filter(|(_, run)| (run.from < to && run.to > from) || (from == to && run.to == from))
        .map(|(i, run)| BidiSection {
            from: run.from.max(from),
            to: run.to.min(to),
            dir: run.dir,
            first: i == 0,
            last: i == last_index,
        })
        .collect();

    if sections.is_empty() {
        vec![BidiSection {
            from,
            to,
            dir: base,
            first: false,
            last: false,
        }]
    } else {
        sections
    }
}
