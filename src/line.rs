//! Highlight rectangles for the selected part of one logical line.

use crate::config::OverlayConfig;
use crate::geometry::{Extremes, Rect, RectSink};
use crate::layout::{bidi_sections, BidiSection, Direction, Side, TextLayout};
use crate::position::Position;

/// How a section's edge boxes sit relative to the wrapped rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowSpan {
    /// Both edges are on one visual row.
    Single,
    /// The section crosses at least one wrap boundary.
    Wrapped,
}

impl RowSpan {
    pub fn classify(from: &Rect, to: &Rect, tolerance: f32) -> Self {
        if to.top - from.top <= tolerance {
            RowSpan::Single
        } else {
            RowSpan::Wrapped
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WrapSide {
    Before,
    After,
}

/// Draws selection highlights for one pass over a layout.
pub struct SelectionPainter<'a, 'o, L: ?Sized> {
    pub(crate) layout: &'a L,
    pub(crate) config: &'a OverlayConfig,
    pub(crate) sink: RectSink<'o>,
}

impl<'a, 'o, L: TextLayout + ?Sized> SelectionPainter<'a, 'o, L> {
    pub fn new(layout: &'a L, config: &'a OverlayConfig, sink: RectSink<'o>) -> Self {
        Self {
            layout,
            config,
            sink,
        }
    }

    /// Highlights `[from, to)` of `line`. A missing bound means the
    /// selection runs past that end of the line, which lets the highlight
    /// open out to the container edge.
    ///
    /// Returns the first and last drawn coordinates in reading order.
    pub fn draw_for_line(&mut self, line: usize, from: Option<usize>, to: Option<usize>) -> Extremes {
        let line_len = self.layout.line_len(line);
        let base = self.config.direction;
        let order = self.layout.bidi_order(line, base);
        let sections = bidi_sections(
            order.as_deref(),
            from.unwrap_or(0),
            to.unwrap_or(line_len),
            base,
        );

        sections.iter().fold(Extremes::default(), |acc, section| {
            let open_start = from.is_none() && section.from == 0;
            let open_end = to.is_none() && section.to == line_len;
            let (from_pos, to_pos) = self.draw_section(line, section, open_start, open_end);
            acc.include(from_pos, to_pos)
        })
    }

    fn draw_section(
        &mut self,
        line: usize,
        section: &BidiSection,
        open_start: bool,
        open_end: bool,
    ) -> (Rect, Rect) {
        let (from_pos, to_pos) = self.section_edges(line, section);
        let edges = self.sink.edges();
        let region = self.layout.is_region(line);
        let doc_ltr = self.config.direction.is_ltr();
        let ltr = section.dir.is_ltr();

        match RowSpan::classify(&from_pos, &to_pos, self.config.row_tolerance) {
            RowSpan::Single => {
                let open_left = (if doc_ltr { open_start } else { open_end }) && section.first;
                let open_right = (if doc_ltr { open_end } else { open_start }) && section.last;
                let left = if open_left {
                    edges.left
                } else if ltr {
                    from_pos.left
                } else {
                    to_pos.left
                };
                let right = if open_right {
                    edges.right
                } else if ltr {
                    to_pos.right
                } else {
                    from_pos.right
                };
                let adjust = if open_right && region {
                    -self.config.region_inset
                } else {
                    0.0
                };
                self.sink
                    .add(left, from_pos.top, Some(right - left + adjust), from_pos.bottom);
            }
            RowSpan::Wrapped => {
                let (top_left, top_right, bot_left, bot_right) = if ltr {
                    (
                        if doc_ltr && open_start && section.first {
                            edges.left
                        } else {
                            from_pos.left
                        },
                        if doc_ltr {
                            edges.right
                        } else {
                            self.wrap_x(line, section.from, section.dir, WrapSide::Before)
                        },
                        if doc_ltr {
                            edges.left
                        } else {
                            self.wrap_x(line, section.to, section.dir, WrapSide::After)
                        },
                        if doc_ltr && open_end && section.last {
                            edges.right
                        } else {
                            to_pos.right
                        },
                    )
                } else {
                    (
                        if !doc_ltr {
                            edges.left
                        } else {
                            self.wrap_x(line, section.from, section.dir, WrapSide::Before)
                        },
                        if !doc_ltr && open_start && section.first {
                            edges.right
                        } else {
                            from_pos.right
                        },
                        if !doc_ltr && open_end && section.last {
                            edges.left
                        } else {
                            to_pos.left
                        },
                        if !doc_ltr {
                            edges.right
                        } else {
                            self.wrap_x(line, section.to, section.dir, WrapSide::After)
                        },
                    )
                };
                let adjust = if region { -self.config.region_inset } else { 0.0 };

                self.sink.add(
                    top_left,
                    from_pos.top,
                    Some(top_right - top_left + adjust),
                    from_pos.bottom,
                );
                if from_pos.bottom < to_pos.top {
                    self.sink.add(
                        edges.left,
                        from_pos.bottom,
                        Some(edges.right - edges.left + adjust),
                        to_pos.top,
                    );
                }
                self.sink.add(
                    bot_left,
                    to_pos.top,
                    Some(bot_right - bot_left + adjust),
                    to_pos.bottom,
                );
            }
        }

        (from_pos, to_pos)
    }

    /// Boxes of the section's first and last character, measured on the
    /// inside of the run. An empty section collapses both to its caret edge.
    fn section_edges(&self, line: usize, section: &BidiSection) -> (Rect, Rect) {
        let ltr = section.dir.is_ltr();
        let (lead, trail) = if ltr {
            (Side::Left, Side::Right)
        } else {
            (Side::Right, Side::Left)
        };
        let from_pos = self
            .layout
            .char_rect(Position::new(line, section.from), lead);
        if section.is_empty() {
            let caret = from_pos.collapsed_at(lead.edge_of(&from_pos));
            return (caret, caret);
        }
        let to_pos = self
            .layout
            .char_rect(Position::new(line, section.to - 1), trail);
        (from_pos, to_pos)
    }

    /// Horizontal edge of the wrapped row holding `ch`: its start when
    /// `side` is `After`, its end otherwise. A trailing space belongs to the
    /// line break, so the row end is taken from the character before it.
    fn wrap_x(&self, line: usize, ch: usize, dir: Direction, side: WrapSide) -> f32 {
        let extent = self.layout.wrap_row_extent(line, ch);
        let after = side == WrapSide::After;
        let edge = if dir.is_ltr() == after {
            Side::Left
        } else {
            Side::Right
        };
        let target = if after {
            extent.begin
        } else {
            let trailing_space = extent
                .end
                .checked_sub(1)
                .and_then(|last| self.layout.char_at(line, last))
                .is_some_and(char::is_whitespace);
            extent.end.saturating_sub(if trailing_space { 2 } else { 1 })
        };
        edge.edge_of(&self.layout.char_rect(Position::new(line, target), edge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::BidiRun;
    use crate::testing::{GridLayout, EDGES};

    fn draw(
        layout: &GridLayout,
        config: &OverlayConfig,
        line: usize,
        from: Option<usize>,
        to: Option<usize>,
    ) -> (Vec<Rect>, Extremes) {
        let mut out = Vec::new();
        let extremes = SelectionPainter::new(layout, config, RectSink::new(&mut out, EDGES))
            .draw_for_line(line, from, to);
        (out, extremes)
    }

    #[test]
    fn closed_range_hugs_the_glyphs() {
        let layout = GridLayout::new(&["x", "y", "abcdefghij"]);
        let (rects, _) = draw(&layout, &OverlayConfig::default(), 2, Some(0), Some(5));
        assert_eq!(rects, vec![Rect::new(4.0, 40.0, 54.0, 60.0)]);
    }

    #[test]
    fn open_end_runs_to_the_right_edge() {
        let layout = GridLayout::new(&["hello world"]);
        let (rects, extremes) = draw(&layout, &OverlayConfig::default(), 0, Some(6), None);
        assert_eq!(rects, vec![Rect::new(64.0, 0.0, 404.0, 20.0)]);
        assert_eq!(extremes.start, Some(Rect::new(64.0, 0.0, 74.0, 20.0)));
        assert_eq!(extremes.end, Some(Rect::new(104.0, 0.0, 114.0, 20.0)));
    }

    #[test]
    fn wrapped_run_splits_into_top_middle_and_bottom() {
        let layout = GridLayout::new(&["0123456789abcdefghijKLMNO"]).wrap(10);
        let (rects, extremes) = draw(&layout, &OverlayConfig::default(), 0, Some(3), Some(23));
        assert_eq!(
            rects,
            vec![
                Rect::new(34.0, 0.0, 404.0, 20.0),
                Rect::new(4.0, 20.0, 404.0, 40.0),
                Rect::new(4.0, 40.0, 34.0, 60.0),
            ]
        );
        assert_eq!(extremes.end.map(|r| r.bottom), Some(60.0));
    }

    #[test]
    fn two_row_run_has_no_middle_fill() {
        let layout = GridLayout::new(&["0123456789abcdef"]).wrap(10);
        let (rects, _) = draw(&layout, &OverlayConfig::default(), 0, Some(8), Some(12));
        assert_eq!(
            rects,
            vec![
                Rect::new(84.0, 0.0, 404.0, 20.0),
                Rect::new(4.0, 20.0, 24.0, 40.0),
            ]
        );
    }

    #[test]
    fn ltr_run_in_rtl_paragraph_stops_before_trailing_space() {
        let layout = GridLayout::new(&["abcd efgh ijk"])
            .wrap(5)
            .runs(0, vec![BidiRun::new(0, 13, Direction::Ltr)]);
        let config = OverlayConfig {
            direction: Direction::Rtl,
            ..OverlayConfig::default()
        };
        let (rects, _) = draw(&layout, &config, 0, Some(1), Some(12));
        assert_eq!(
            rects,
            vec![
                Rect::new(14.0, 0.0, 44.0, 20.0),
                Rect::new(4.0, 20.0, 404.0, 40.0),
                Rect::new(4.0, 40.0, 24.0, 60.0),
            ]
        );
    }

    #[test]
    fn mixed_direction_line_paints_each_run_separately() {
        let layout = GridLayout::new(&["abcDEFghi"]).runs(
            0,
            vec![
                BidiRun::new(0, 3, Direction::Ltr),
                BidiRun::new(3, 6, Direction::Rtl),
                BidiRun::new(6, 9, Direction::Ltr),
            ],
        );
        let (rects, _) = draw(&layout, &OverlayConfig::default(), 0, Some(1), Some(5));
        assert_eq!(
            rects,
            vec![
                Rect::new(14.0, 0.0, 34.0, 20.0),
                Rect::new(44.0, 0.0, 64.0, 20.0),
            ]
        );
    }

    #[test]
    fn open_end_of_rtl_paragraph_extends_left() {
        let layout =
            GridLayout::new(&["abc"]).runs(0, vec![BidiRun::new(0, 3, Direction::Rtl)]);
        let config = OverlayConfig {
            direction: Direction::Rtl,
            ..OverlayConfig::default()
        };
        let (rects, _) = draw(&layout, &config, 0, Some(1), None);
        assert_eq!(rects, vec![Rect::new(4.0, 0.0, 24.0, 20.0)]);
    }

    #[test]
    fn region_line_pulls_open_right_edge_in() {
        let layout = GridLayout::new(&["abc"]).region(0);
        let (rects, _) = draw(&layout, &OverlayConfig::default(), 0, Some(0), None);
        assert_eq!(rects, vec![Rect::new(4.0, 0.0, 400.0, 20.0)]);
    }

    #[test]
    fn empty_sub_range_reports_position_without_painting() {
        let layout = GridLayout::new(&["abcdef"]);
        let (rects, extremes) = draw(&layout, &OverlayConfig::default(), 0, Some(3), Some(3));
        assert!(rects.is_empty());
        assert_eq!(extremes.start, Some(Rect::new(34.0, 0.0, 34.0, 20.0)));
        assert_eq!(extremes.start, extremes.end);
    }

    fn rtl_wrapped_run() -> GridLayout {
        GridLayout::new(&["abcdefghijklmnopqrstuvwxy"])
            .wrap(10)
            .runs(0, vec![BidiRun::new(0, 25, Direction::Rtl)])
    }

    fn rtl_paragraph() -> OverlayConfig {
        OverlayConfig {
            direction: Direction::Rtl,
            ..OverlayConfig::default()
        }
    }

    fn assert_disjoint(rects: &[Rect]) {
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn wrapped_rtl_run_in_ltr_paragraph_meets_row_starts() {
        let layout = rtl_wrapped_run();
        let (rects, extremes) = draw(&layout, &OverlayConfig::default(), 0, Some(3), Some(23));
        assert_eq!(
            rects,
            vec![
                Rect::new(4.0, 0.0, 74.0, 20.0),
                Rect::new(4.0, 20.0, 404.0, 40.0),
                Rect::new(24.0, 40.0, 54.0, 60.0),
            ]
        );
        assert_disjoint(&rects);
        assert_eq!(extremes.start, Some(Rect::new(64.0, 0.0, 74.0, 20.0)));
        assert_eq!(extremes.end, Some(Rect::new(24.0, 40.0, 34.0, 60.0)));
    }

    #[test]
    fn wrapped_rtl_run_in_rtl_paragraph_runs_to_the_edges() {
        let layout = rtl_wrapped_run();
        let (rects, _) = draw(&layout, &rtl_paragraph(), 0, Some(3), Some(23));
        assert_eq!(
            rects,
            vec![
                Rect::new(4.0, 0.0, 74.0, 20.0),
                Rect::new(4.0, 20.0, 404.0, 40.0),
                Rect::new(24.0, 40.0, 404.0, 60.0),
            ]
        );
        assert_disjoint(&rects);

        let (rects, _) = draw(&layout, &rtl_paragraph(), 0, None, None);
        assert_eq!(
            rects,
            vec![
                Rect::new(4.0, 0.0, 404.0, 20.0),
                Rect::new(4.0, 20.0, 404.0, 40.0),
                Rect::new(4.0, 40.0, 404.0, 60.0),
            ]
        );
        assert_disjoint(&rects);
    }

    #[test]
    fn open_start_of_ltr_paragraph_extends_left() {
        let layout = GridLayout::new(&["abcdef"]);
        let (rects, _) = draw(&layout, &OverlayConfig::default(), 0, None, Some(3));
        assert_eq!(rects, vec![Rect::new(4.0, 0.0, 34.0, 20.0)]);
    }

    #[test]
    fn open_start_of_rtl_paragraph_extends_right() {
        let layout =
            GridLayout::new(&["abcdef"]).runs(0, vec![BidiRun::new(0, 6, Direction::Rtl)]);
        let (rects, _) = draw(&layout, &rtl_paragraph(), 0, None, Some(3));
        assert_eq!(rects, vec![Rect::new(34.0, 0.0, 404.0, 20.0)]);
    }

    #[test]
    fn region_line_insets_every_wrapped_row() {
        let layout = GridLayout::new(&["0123456789abcdefghijKLMN"])
            .wrap(10)
            .region(0);
        let (rects, _) = draw(&layout, &OverlayConfig::default(), 0, Some(2), None);
        assert_eq!(
            rects,
            vec![
                Rect::new(24.0, 0.0, 400.0, 20.0),
                Rect::new(4.0, 20.0, 400.0, 40.0),
                Rect::new(4.0, 40.0, 400.0, 60.0),
            ]
        );
    }

    #[test]
    fn row_classification_uses_tolerance() {
        let a = Rect::new(0.0, 10.0, 5.0, 30.0);
        let b = Rect::new(0.0, 12.5, 5.0, 32.5);
        assert_eq!(RowSpan::classify(&a, &b, 3.0), RowSpan::Single);
        assert_eq!(RowSpan::classify(&a, &b, 2.0), RowSpan::Wrapped);
    }
}
