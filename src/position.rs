//! Logical positions, ranges and the multi-range selection model.

/// A logical location: line index plus character offset within that line.
///
/// The unit of `ch` is whatever the line source measures offsets in; the
/// renderer only compares and forwards them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub ch: usize,
}

impl Position {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// An unordered anchor/head pair.
///
/// `head` is where the caret sits; `anchor` is where the selection started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range {
    pub anchor: Position,
    pub head: Position,
}

impl Range {
    pub fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    /// A collapsed range at `pos`.
    pub fn caret(pos: Position) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn from(&self) -> Position {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> Position {
        self.anchor.max(self.head)
    }

    pub fn empty(&self) -> bool {
        self.anchor == self.head
    }

    /// True when the range shares at least one line with `[view_from, view_to)`.
    pub fn touches_lines(&self, view_from: usize, view_to: usize) -> bool {
        self.from().line < view_to && self.to().line >= view_from
    }
}

/// Ordered, disjoint ranges plus the index of the primary one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    ranges: Vec<Range>,
    primary: usize,
}

impl Selection {
    /// Builds a selection. Ranges are sorted by their start; the primary index
    /// follows its range through the sort and is clamped into bounds.
    pub fn new(ranges: Vec<Range>, primary: usize) -> Self {
        if ranges.is_empty() {
            return Self::single(Range::caret(Position::default()));
        }
        let primary_range = ranges[primary.min(ranges.len() - 1)];
        let mut ranges = ranges;
        ranges.sort_by_key(|r| r.from());
        let primary = ranges
            .iter()
            .position(|r| *r == primary_range)
            .unwrap_or(0);
        Self { ranges, primary }
    }

    pub fn single(range: Range) -> Self {
        Self {
            ranges: vec![range],
            primary: 0,
        }
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn primary_index(&self) -> usize {
        self.primary
    }

    pub fn primary(&self) -> &Range {
        &self.ranges[self.primary]
    }
}
