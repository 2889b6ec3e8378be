//! Visual-space values: rectangles, container edges and caret markers.

use std::cmp::Ordering;

/// Container-relative pixel rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Zero-width rectangle at `x`, keeping this rect's vertical extent.
    pub fn collapsed_at(&self, x: f32) -> Self {
        Self {
            left: x,
            right: x,
            ..*self
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }
}

/// Reading order of two rects: top first, then left.
pub fn cmp_coords(a: &Rect, b: &Rect) -> Ordering {
    a.top
        .total_cmp(&b.top)
        .then_with(|| a.left.total_cmp(&b.left))
}

/// The padded horizontal edges of the rendering container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edges {
    pub left: f32,
    pub right: f32,
}

/// Viewport bounds for one render pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// First rendered logical line.
    pub view_from: usize,
    /// One past the last rendered logical line.
    pub view_to: usize,
    pub padding_left: f32,
    pub padding_right: f32,
    /// Full width of the line container, padding included.
    pub content_width: f32,
}

impl Viewport {
    pub fn edges(&self) -> Edges {
        Edges {
            left: self.padding_left,
            right: self.content_width - self.padding_right,
        }
    }
}

/// First and last drawn coordinates of a line, in reading order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Extremes {
    pub start: Option<Rect>,
    pub end: Option<Rect>,
}

impl Extremes {
    /// Folds one section's edge rects into the running extremes.
    pub fn include(self, a: Rect, b: Rect) -> Self {
        let (lo, hi) = match cmp_coords(&a, &b) {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };
        let start = match self.start {
            Some(cur) if cmp_coords(&cur, &lo) != Ordering::Greater => cur,
            _ => lo,
        };
        let end = match self.end {
            Some(cur) if cmp_coords(&cur, &hi) != Ordering::Less => cur,
            _ => hi,
        };
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

/// Highlight rectangles collected during one pass, clamped the same way
/// every time one is added.
#[derive(Debug)]
pub struct RectSink<'a> {
    out: &'a mut Vec<Rect>,
    edges: Edges,
}

impl<'a> RectSink<'a> {
    pub fn new(out: &'a mut Vec<Rect>, edges: Edges) -> Self {
        Self { out, edges }
    }

    pub fn edges(&self) -> Edges {
        self.edges
    }

    /// Adds a box. A missing `width` runs to the container's right edge.
    ///
    /// Top is floored at zero and both vertical edges snap to whole pixels;
    /// boxes left with no area are dropped.
    pub fn add(&mut self, left: f32, top: f32, width: Option<f32>, bottom: f32) {
        let top = top.max(0.0).round();
        let bottom = bottom.round();
        let width = width.unwrap_or(self.edges.right - left);
        if width <= 0.0 || bottom <= top {
            return;
        }
        self.out.push(Rect::new(left, top, left + width, bottom));
    }
}

/// Which caret of a bidi pair a marker represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaretKind {
    Primary,
    Secondary,
}

/// A caret marker ready for the platform renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Caret {
    pub kind: CaretKind,
    pub left: f32,
    pub top: f32,
    pub height: f32,
}
