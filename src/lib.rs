//! Selection highlight and caret geometry for a text surface with line
//! wrapping and bidirectional text.
//!
//! A render pass takes a [`Selection`] and a [`TextLayout`] and returns an
//! [`Overlay`]: caret markers plus the minimal set of rectangles covering
//! each selected range. The caret's blink cycle is driven separately by
//! [`BlinkController`].

pub mod blink;
pub mod config;
pub mod geometry;
pub mod layout;
pub mod line;
pub mod overlay;
pub mod position;
pub mod stitch;

#[cfg(test)]
mod testing;

pub use blink::{BlinkController, BlinkTimer, CaretState};
pub use config::{BlinkMode, ConfigError, OverlayConfig};
pub use geometry::{Caret, CaretKind, Edges, Rect, Viewport};
pub use layout::{
    BidiOrderProvider, BidiRun, CaretHeight, CaretRect, CoordinateMapper, Direction, LineSource,
    RowExtent, Side, TextLayout, WrapExtentResolver,
};
pub use overlay::{build_overlay, draw_caret, Overlay, RangeFilter, RangeHighlight};
pub use position::{Position, Range, Selection};
