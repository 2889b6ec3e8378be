//! Builds the caret markers and highlight rectangles for a selection.

use crate::config::OverlayConfig;
use crate::geometry::{Caret, CaretKind, Rect, RectSink, Viewport};
use crate::layout::{CoordinateMapper, TextLayout};
use crate::line::SelectionPainter;
use crate::position::{Position, Selection};

/// Height scale of the secondary caret shown at a bidi jump.
pub const SECONDARY_CARET_SCALE: f32 = 0.85;

/// Which ranges of the selection a pass draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RangeFilter {
    #[default]
    All,
    PrimaryOnly,
    /// Every range except the primary one.
    SkipPrimary,
}

impl RangeFilter {
    fn admits(self, index: usize, primary: usize) -> bool {
        match self {
            RangeFilter::All => true,
            RangeFilter::PrimaryOnly => index == primary,
            RangeFilter::SkipPrimary => index != primary,
        }
    }
}

/// Highlight boxes for one non-empty range.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RangeHighlight {
    /// Index of the range in the selection.
    pub range: usize,
    pub rects: Vec<Rect>,
}

/// Output of one overlay pass, handed to the platform renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overlay {
    pub carets: Vec<Caret>,
    pub highlights: Vec<RangeHighlight>,
}

impl Overlay {
    pub fn highlight_rects(&self) -> impl Iterator<Item = &Rect> {
        self.highlights.iter().flat_map(|h| h.rects.iter())
    }
}

/// Recomputes the whole overlay. Ranges outside the viewport are skipped;
/// nothing is retained between calls.
pub fn build_overlay<L: TextLayout + ?Sized>(
    layout: &L,
    selection: &Selection,
    viewport: &Viewport,
    config: &OverlayConfig,
    filter: RangeFilter,
) -> Overlay {
    let mut overlay = Overlay::default();
    let primary = selection.primary_index();

    for (index, range) in selection.ranges().iter().enumerate() {
        if !filter.admits(index, primary) {
            continue;
        }
        if !range.touches_lines(viewport.view_from, viewport.view_to) {
            continue;
        }
        let collapsed = range.empty();
        if collapsed || config.show_cursor_when_selecting {
            draw_caret(layout, range.head, config, &mut overlay.carets);
        }
        if !collapsed {
            let mut rects = Vec::new();
            SelectionPainter::new(layout, config, RectSink::new(&mut rects, viewport.edges()))
                .draw_range(range);
            overlay.highlights.push(RangeHighlight {
                range: index,
                rects,
            });
        }
    }

    tracing::trace!(
        carets = overlay.carets.len(),
        highlights = overlay.highlights.len(),
        "overlay rebuilt"
    );
    overlay
}

/// Appends the caret for `head`, plus the secondary caret at a bidi jump.
pub fn draw_caret<M: CoordinateMapper + ?Sized>(
    mapper: &M,
    head: Position,
    config: &OverlayConfig,
    out: &mut Vec<Caret>,
) {
    let coords = mapper.caret_rect(head, config.caret_height());
    let pos = coords.primary;
    out.push(Caret {
        kind: CaretKind::Primary,
        left: pos.left,
        top: pos.top,
        height: pos.height().max(0.0) * config.cursor_height,
    });

    if let Some(other) = coords.secondary {
        out.push(Caret {
            kind: CaretKind::Secondary,
            left: other.left,
            top: other.top,
            height: other.height() * SECONDARY_CARET_SCALE,
        });
    }
}
