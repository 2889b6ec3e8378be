use std::time::Duration;

use gpui::*;
use selection_overlay::{
    build_overlay, BidiOrderProvider, BidiRun, BlinkController, BlinkMode, BlinkTimer, CaretHeight,
    CaretKind, CaretRect, CoordinateMapper, Direction, LineSource, OverlayConfig, Position, Range,
    RangeFilter, Rect, RowExtent, Selection, Side, Viewport, WrapExtentResolver,
};
use unicode_segmentation::UnicodeSegmentation;

use crate::theme::Theme;

const TEXT_PADDING: f32 = 8.0;
const CARET_WIDTH: f32 = 2.0;

actions!(
    read_only_editor,
    [
        Left,
        Right,
        Up,
        Down,
        SelectLeft,
        SelectRight,
        SelectUp,
        SelectDown,
        SelectAll,
        Home,
        End,
        DocumentStart,
        DocumentEnd,
        WordLeft,
        WordRight,
        SelectWordLeft,
        SelectWordRight,
        AddCursorUp,
        AddCursorDown,
        Copy,
        CycleBlinkRate,
        ToggleCursorWhenSelecting,
    ]
);

/// Lines of the viewed file plus the fenced-block tags.
pub struct Document {
    lines: Vec<String>,
    regions: Vec<bool>,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        let mut lines: Vec<String> = text.lines().map(str::to_owned).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        let regions = fence_regions(&lines);
        Self { lines, regions }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, line: usize) -> &str {
        self.lines.get(line).map_or("", String::as_str)
    }

    fn line_len(&self, line: usize) -> usize {
        self.line(line).len()
    }

    fn last_line(&self) -> usize {
        self.lines.len() - 1
    }

    fn end(&self) -> Position {
        let last = self.last_line();
        Position::new(last, self.line_len(last))
    }

    fn text_in(&self, range: &Range) -> String {
        let (from, to) = (range.from(), range.to());
        if from.line == to.line {
            return self.line(from.line)[from.ch..to.ch].to_string();
        }
        let mut text = self.line(from.line)[from.ch..].to_string();
        for line in from.line + 1..to.line {
            text.push('\n');
            text.push_str(self.line(line));
        }
        text.push('\n');
        text.push_str(&self.line(to.line)[..to.ch]);
        text
    }
}

/// Tags every line of a ``` fenced block, fences included.
fn fence_regions(lines: &[String]) -> Vec<bool> {
    let mut inside = false;
    lines
        .iter()
        .map(|line| {
            let fence = line.trim_start().starts_with("```");
            let tagged = inside || fence;
            if fence {
                inside = !inside;
            }
            tagged
        })
        .collect()
}

fn floor_char_boundary(text: &str, ix: usize) -> usize {
    (0..=ix.min(text.len()))
        .rev()
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(0)
}

fn is_word_char(grapheme: &str) -> bool {
    grapheme
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
}

// --- Motion ---

fn prev_grapheme(line: &str, ch: usize) -> usize {
    line.grapheme_indices(true)
        .rev()
        .map(|(ix, _)| ix)
        .find(|&ix| ix < ch)
        .unwrap_or(0)
}

fn next_grapheme(line: &str, ch: usize) -> usize {
    line.grapheme_indices(true)
        .map(|(ix, _)| ix)
        .find(|&ix| ix > ch)
        .unwrap_or(line.len())
}

fn prev_word(line: &str, ch: usize) -> usize {
    let mut start = 0;
    let mut seen_word = false;
    for (ix, grapheme) in line.grapheme_indices(true).rev().filter(|(ix, _)| *ix < ch) {
        if is_word_char(grapheme) {
            seen_word = true;
            start = ix;
        } else if seen_word {
            break;
        }
    }
    start
}

fn next_word(line: &str, ch: usize) -> usize {
    let mut seen_word = false;
    for (ix, grapheme) in line.grapheme_indices(true).filter(|(ix, _)| *ix >= ch) {
        if is_word_char(grapheme) {
            seen_word = true;
        } else if seen_word {
            return ix;
        }
    }
    line.len()
}

fn step_left(doc: &Document, pos: Position, by_word: bool) -> Position {
    if pos.ch > 0 {
        let line = doc.line(pos.line);
        let ch = if by_word {
            prev_word(line, pos.ch)
        } else {
            prev_grapheme(line, pos.ch)
        };
        Position::new(pos.line, ch)
    } else if pos.line > 0 {
        Position::new(pos.line - 1, doc.line_len(pos.line - 1))
    } else {
        pos
    }
}

fn step_right(doc: &Document, pos: Position, by_word: bool) -> Position {
    let line = doc.line(pos.line);
    if pos.ch < line.len() {
        let ch = if by_word {
            next_word(line, pos.ch)
        } else {
            next_grapheme(line, pos.ch)
        };
        Position::new(pos.line, ch)
    } else if pos.line < doc.last_line() {
        Position::new(pos.line + 1, 0)
    } else {
        pos
    }
}

fn column_at(doc: &Document, shaped: &[ShapedLine], line: usize, x: Option<Pixels>, ch: usize) -> usize {
    let col = match (x, shaped.get(line)) {
        (Some(x), Some(shaped)) => shaped.closest_index_for_x(x),
        _ => ch,
    };
    floor_char_boundary(doc.line(line), col)
}

// --- Layout adapter ---

/// Exposes shaped, unwrapped lines to the overlay builder. Coordinates are
/// relative to the top-left of the text element, before scrolling.
struct ShapedDocument<'a> {
    doc: &'a Document,
    shaped: &'a [ShapedLine],
    line_height: f32,
}

impl ShapedDocument<'_> {
    fn x(&self, line: usize, ix: usize) -> f32 {
        let x = self
            .shaped
            .get(line)
            .map_or(px(0.), |shaped| shaped.x_for_index(ix));
        TEXT_PADDING + x / px(1.)
    }

    fn row(&self, line: usize) -> (f32, f32) {
        let top = line as f32 * self.line_height;
        (top, top + self.line_height)
    }
}

impl LineSource for ShapedDocument<'_> {
    fn line_len(&self, line: usize) -> usize {
        self.doc.line_len(line)
    }

    fn char_at(&self, line: usize, ch: usize) -> Option<char> {
        self.doc.line(line).get(ch..)?.chars().next()
    }

    fn is_region(&self, line: usize) -> bool {
        self.doc.regions.get(line).copied().unwrap_or(false)
    }

    fn visual_line(&self, line: usize) -> usize {
        line
    }
}

impl CoordinateMapper for ShapedDocument<'_> {
    fn char_rect(&self, pos: Position, _side: Side) -> Rect {
        let (top, bottom) = self.row(pos.line);
        let text = self.doc.line(pos.line);
        if pos.ch >= text.len() {
            let x = self.x(pos.line, text.len());
            return Rect::new(x, top, x, bottom);
        }
        let start = floor_char_boundary(text, pos.ch);
        let end = start + text[start..].chars().next().map_or(0, char::len_utf8);
        Rect::new(self.x(pos.line, start), top, self.x(pos.line, end), bottom)
    }

    fn caret_rect(&self, pos: Position, _height: CaretHeight) -> CaretRect {
        let (top, bottom) = self.row(pos.line);
        let x = self.x(pos.line, pos.ch);
        CaretRect {
            primary: Rect::new(x, top, x, bottom),
            secondary: None,
        }
    }
}

// Shaped lines are laid out left to right on a single row.
impl BidiOrderProvider for ShapedDocument<'_> {
    fn bidi_order(&self, _line: usize, _base: Direction) -> Option<Vec<BidiRun>> {
        None
    }
}

impl WrapExtentResolver for ShapedDocument<'_> {
    fn wrap_row_extent(&self, line: usize, _ch: usize) -> RowExtent {
        RowExtent {
            begin: 0,
            end: self.doc.line_len(line),
        }
    }
}

// --- Blink timer ---

/// Runs blink ticks as a task owned by the editor entity.
struct BlinkTasks<'a, 'b>(&'a mut Context<'b, ReadOnlyEditor>);

impl BlinkTimer for BlinkTasks<'_, '_> {
    type Guard = Task<()>;

    fn start(&mut self, period: Duration, epoch: u64) -> Task<()> {
        self.0.spawn(async move |this: WeakEntity<ReadOnlyEditor>, cx: &mut AsyncApp| {
            loop {
                cx.background_executor().timer(period).await;
                let ticked = this
                    .update(cx, |editor, cx| {
                        let state = editor.blink.tick(epoch);
                        if state.is_some() {
                            cx.notify();
                        }
                        state.is_some()
                    })
                    .unwrap_or(false);
                if !ticked {
                    break;
                }
            }
        })
    }
}

// --- Editor ---

pub struct ReadOnlyEditor {
    pub focus_handle: FocusHandle,
    doc: Document,
    ranges: Vec<Range>,
    primary: usize,
    config: OverlayConfig,
    blink: BlinkController<Task<()>>,
    scroll_offset: Point<Pixels>,
    preferred_x: Option<Pixels>,
    is_selecting: bool,
    autoscroll: bool,
    // Layout cache for mouse and vertical motion
    last_shaped_lines: Vec<ShapedLine>,
    last_bounds: Option<Bounds<Pixels>>,
    last_line_height: Pixels,
}

impl ReadOnlyEditor {
    pub fn new(doc: Document, config: OverlayConfig, cx: &mut Context<Self>) -> Self {
        Self {
            focus_handle: cx.focus_handle(),
            doc,
            ranges: vec![Range::caret(Position::default())],
            primary: 0,
            blink: BlinkController::new(config.blink_mode()),
            config,
            scroll_offset: point(px(0.), px(0.)),
            preferred_x: None,
            is_selecting: false,
            autoscroll: false,
            last_shaped_lines: Vec::new(),
            last_bounds: None,
            last_line_height: px(24.),
        }
    }

    pub fn selection(&self) -> Selection {
        Selection::new(self.ranges.clone(), self.primary)
    }

    pub fn has_multiple_cursors(&self) -> bool {
        self.ranges.len() > 1
    }

    pub fn status(&self) -> String {
        let blink = match self.blink.mode() {
            BlinkMode::Blink(period) => format!("blink {}ms", period.as_millis()),
            BlinkMode::Steady => "steady".to_string(),
            BlinkMode::Hidden => "hidden".to_string(),
        };
        format!("{} range(s) · {blink}", self.ranges.len())
    }

    pub fn collapse_to_primary(&mut self, cx: &mut Context<Self>) {
        let head = self.ranges[self.primary].head;
        self.set_ranges(vec![Range::caret(head)], 0, cx);
    }

    pub fn clear_selection(&mut self, cx: &mut Context<Self>) {
        for range in &mut self.ranges {
            range.anchor = range.head;
        }
        self.selection_changed(cx);
    }

    fn set_ranges(&mut self, ranges: Vec<Range>, primary: usize, cx: &mut Context<Self>) {
        self.ranges = ranges;
        self.primary = primary;
        self.selection_changed(cx);
    }

    fn selection_changed(&mut self, cx: &mut Context<Self>) {
        self.merge_ranges();
        self.autoscroll = true;
        self.blink.restart(&mut BlinkTasks(cx));
        cx.notify();
    }

    /// Sorts the ranges and merges those that overlap or share a start.
    fn merge_ranges(&mut self) {
        let primary_head = self.ranges[self.primary].head;
        self.ranges.sort_by_key(|r| r.from());
        let mut merged: Vec<Range> = Vec::with_capacity(self.ranges.len());
        for range in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if range.from() < last.to() || range.from() == last.from() => {
                    let from = last.from().min(range.from());
                    let to = last.to().max(range.to());
                    *last = if last.head < last.anchor {
                        Range::new(to, from)
                    } else {
                        Range::new(from, to)
                    };
                }
                _ => merged.push(range),
            }
        }
        self.primary = merged
            .iter()
            .position(|r| r.from() <= primary_head && primary_head <= r.to())
            .unwrap_or(0);
        self.ranges = merged;
    }

    fn move_each(&mut self, f: impl Fn(&Document, &Range) -> Position, cx: &mut Context<Self>) {
        self.preferred_x = None;
        for range in &mut self.ranges {
            *range = Range::caret(f(&self.doc, range));
        }
        self.selection_changed(cx);
    }

    fn select_each(&mut self, f: impl Fn(&Document, Position) -> Position, cx: &mut Context<Self>) {
        self.preferred_x = None;
        for range in &mut self.ranges {
            range.head = f(&self.doc, range.head);
        }
        self.selection_changed(cx);
    }

    // --- Actions ---

    fn left(&mut self, _: &Left, _: &mut Window, cx: &mut Context<Self>) {
        self.move_each(
            |doc, r| {
                if r.empty() {
                    step_left(doc, r.head, false)
                } else {
                    r.from()
                }
            },
            cx,
        );
    }

    fn right(&mut self, _: &Right, _: &mut Window, cx: &mut Context<Self>) {
        self.move_each(
            |doc, r| {
                if r.empty() {
                    step_right(doc, r.head, false)
                } else {
                    r.to()
                }
            },
            cx,
        );
    }

    fn up(&mut self, _: &Up, _: &mut Window, cx: &mut Context<Self>) {
        self.move_vertically(false, false, cx);
    }

    fn down(&mut self, _: &Down, _: &mut Window, cx: &mut Context<Self>) {
        self.move_vertically(true, false, cx);
    }

    fn select_left(&mut self, _: &SelectLeft, _: &mut Window, cx: &mut Context<Self>) {
        self.select_each(|doc, head| step_left(doc, head, false), cx);
    }

    fn select_right(&mut self, _: &SelectRight, _: &mut Window, cx: &mut Context<Self>) {
        self.select_each(|doc, head| step_right(doc, head, false), cx);
    }

    fn select_up(&mut self, _: &SelectUp, _: &mut Window, cx: &mut Context<Self>) {
        self.move_vertically(false, true, cx);
    }

    fn select_down(&mut self, _: &SelectDown, _: &mut Window, cx: &mut Context<Self>) {
        self.move_vertically(true, true, cx);
    }

    fn select_all(&mut self, _: &SelectAll, _: &mut Window, cx: &mut Context<Self>) {
        let all = Range::new(Position::default(), self.doc.end());
        self.set_ranges(vec![all], 0, cx);
    }

    fn home(&mut self, _: &Home, _: &mut Window, cx: &mut Context<Self>) {
        self.move_each(|_, r| Position::new(r.head.line, 0), cx);
    }

    fn end(&mut self, _: &End, _: &mut Window, cx: &mut Context<Self>) {
        self.move_each(|doc, r| Position::new(r.head.line, doc.line_len(r.head.line)), cx);
    }

    fn document_start(&mut self, _: &DocumentStart, _: &mut Window, cx: &mut Context<Self>) {
        self.preferred_x = None;
        self.set_ranges(vec![Range::caret(Position::default())], 0, cx);
    }

    fn document_end(&mut self, _: &DocumentEnd, _: &mut Window, cx: &mut Context<Self>) {
        self.preferred_x = None;
        let end = self.doc.end();
        self.set_ranges(vec![Range::caret(end)], 0, cx);
    }

    fn word_left(&mut self, _: &WordLeft, _: &mut Window, cx: &mut Context<Self>) {
        self.move_each(|doc, r| step_left(doc, r.head, true), cx);
    }

    fn word_right(&mut self, _: &WordRight, _: &mut Window, cx: &mut Context<Self>) {
        self.move_each(|doc, r| step_right(doc, r.head, true), cx);
    }

    fn select_word_left(&mut self, _: &SelectWordLeft, _: &mut Window, cx: &mut Context<Self>) {
        self.select_each(|doc, head| step_left(doc, head, true), cx);
    }

    fn select_word_right(&mut self, _: &SelectWordRight, _: &mut Window, cx: &mut Context<Self>) {
        self.select_each(|doc, head| step_right(doc, head, true), cx);
    }

    fn add_cursor_up(&mut self, _: &AddCursorUp, _: &mut Window, cx: &mut Context<Self>) {
        let Some(first) = self.ranges.iter().map(|r| r.head).min() else {
            return;
        };
        if first.line == 0 {
            return;
        }
        self.add_caret_on(first.line - 1, cx);
    }

    fn add_cursor_down(&mut self, _: &AddCursorDown, _: &mut Window, cx: &mut Context<Self>) {
        let Some(last) = self.ranges.iter().map(|r| r.head).max() else {
            return;
        };
        if last.line >= self.doc.last_line() {
            return;
        }
        self.add_caret_on(last.line + 1, cx);
    }

    fn add_caret_on(&mut self, line: usize, cx: &mut Context<Self>) {
        let head = self.ranges[self.primary].head;
        let x = self.preferred_x.or_else(|| {
            self.last_shaped_lines
                .get(head.line)
                .map(|shaped| shaped.x_for_index(head.ch))
        });
        self.preferred_x = x;
        let ch = column_at(&self.doc, &self.last_shaped_lines, line, x, head.ch);
        self.ranges.push(Range::caret(Position::new(line, ch)));
        tracing::debug!(line, ch, ranges = self.ranges.len(), "added caret");
        self.selection_changed(cx);
    }

    fn copy(&mut self, _: &Copy, _: &mut Window, cx: &mut Context<Self>) {
        let text = self
            .ranges
            .iter()
            .filter(|r| !r.empty())
            .map(|r| self.doc.text_in(r))
            .collect::<Vec<_>>()
            .join("\n");
        if !text.is_empty() {
            cx.write_to_clipboard(ClipboardItem::new_string(text));
        }
    }

    fn cycle_blink_rate(&mut self, _: &CycleBlinkRate, _: &mut Window, cx: &mut Context<Self>) {
        self.config.cursor_blink_rate = match self.config.cursor_blink_rate {
            r if r > 0 => 0,
            0 => -1,
            _ => OverlayConfig::default().cursor_blink_rate,
        };
        tracing::info!(rate = self.config.cursor_blink_rate, "caret blink rate changed");
        self.blink.set_mode(self.config.blink_mode(), &mut BlinkTasks(cx));
        cx.notify();
    }

    fn toggle_cursor_when_selecting(
        &mut self,
        _: &ToggleCursorWhenSelecting,
        _: &mut Window,
        cx: &mut Context<Self>,
    ) {
        self.config.show_cursor_when_selecting = !self.config.show_cursor_when_selecting;
        cx.notify();
    }

    // --- Vertical movement ---

    fn move_vertically(&mut self, down: bool, selecting: bool, cx: &mut Context<Self>) {
        if self.preferred_x.is_none() {
            let head = self.ranges[self.primary].head;
            self.preferred_x = self
                .last_shaped_lines
                .get(head.line)
                .map(|shaped| shaped.x_for_index(head.ch));
        }

        let doc = &self.doc;
        let shaped = &self.last_shaped_lines;
        let x = self.preferred_x;
        for range in &mut self.ranges {
            let head = range.head;
            let target = if !down && head.line == 0 {
                Position::default()
            } else if down && head.line >= doc.last_line() {
                Position::new(head.line, doc.line_len(head.line))
            } else {
                let line = if down { head.line + 1 } else { head.line - 1 };
                Position::new(line, column_at(doc, shaped, line, x, head.ch))
            };
            range.head = target;
            if !selecting {
                range.anchor = target;
            }
        }

        self.merge_ranges();
        self.autoscroll = true;
        self.blink.restart(&mut BlinkTasks(cx));
        cx.notify();
    }

    // --- Mouse ---

    fn on_mouse_down(&mut self, event: &MouseDownEvent, _: &mut Window, cx: &mut Context<Self>) {
        self.is_selecting = true;
        self.preferred_x = None;
        let pos = self.position_for_mouse(event.position);
        if event.modifiers.shift {
            let anchor = self.ranges[self.primary].anchor;
            self.set_ranges(vec![Range::new(anchor, pos)], 0, cx);
        } else if event.modifiers.platform {
            self.ranges.push(Range::caret(pos));
            self.primary = self.ranges.len() - 1;
            self.selection_changed(cx);
        } else {
            self.set_ranges(vec![Range::caret(pos)], 0, cx);
        }
    }

    fn on_mouse_up(&mut self, _: &MouseUpEvent, _: &mut Window, _: &mut Context<Self>) {
        self.is_selecting = false;
    }

    fn on_mouse_move(&mut self, event: &MouseMoveEvent, _: &mut Window, cx: &mut Context<Self>) {
        if self.is_selecting {
            let pos = self.position_for_mouse(event.position);
            self.ranges[self.primary].head = pos;
            self.selection_changed(cx);
        }
    }

    fn on_scroll(&mut self, event: &ScrollWheelEvent, _: &mut Window, cx: &mut Context<Self>) {
        let delta_y = match event.delta {
            ScrollDelta::Pixels(d) => -d.y,
            ScrollDelta::Lines(d) => -d.y * self.last_line_height,
        };
        self.scroll_offset.y += delta_y;
        self.clamp_scroll();
        cx.notify();
    }

    fn position_for_mouse(&self, point: Point<Pixels>) -> Position {
        let Some(bounds) = &self.last_bounds else {
            return Position::default();
        };
        let y = point.y - bounds.top() + self.scroll_offset.y;
        let line = if y < px(0.) {
            0
        } else {
            ((y / self.last_line_height) as usize).min(self.doc.last_line())
        };
        let x = point.x - bounds.left() - px(TEXT_PADDING) + self.scroll_offset.x;
        let ch = column_at(&self.doc, &self.last_shaped_lines, line, Some(x), 0);
        Position::new(line, ch.min(self.doc.line_len(line)))
    }

    fn clamp_scroll(&mut self) {
        if self.scroll_offset.y < px(0.) {
            self.scroll_offset.y = px(0.);
        }
        if let Some(bounds) = &self.last_bounds {
            let total = self.last_line_height * self.doc.line_count();
            let max = (total - bounds.size.height).max(px(0.));
            if self.scroll_offset.y > max {
                self.scroll_offset.y = max;
            }
        }
    }

    fn scroll_to_head(&mut self) {
        let Some(bounds) = &self.last_bounds else {
            return;
        };
        let head_y = self.last_line_height * self.ranges[self.primary].head.line;
        let visible_top = self.scroll_offset.y;
        let visible_bottom = visible_top + bounds.size.height - self.last_line_height;
        if head_y < visible_top {
            self.scroll_offset.y = head_y;
        } else if head_y > visible_bottom {
            self.scroll_offset.y = head_y - bounds.size.height + self.last_line_height;
        }
        self.clamp_scroll();
    }

    fn sync_focus(&mut self, window: &Window, cx: &mut Context<Self>) {
        let focused = self.focus_handle.is_focused(window);
        if focused == self.blink.is_focused() {
            return;
        }
        if focused {
            self.blink.focus(&mut BlinkTasks(cx));
        } else {
            self.blink.blur();
        }
    }
}

// --- Render ---

impl Render for ReadOnlyEditor {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        self.sync_focus(window, cx);
        let theme = cx.global::<Theme>();
        div()
            .flex()
            .key_context("ReadOnlyEditor")
            .track_focus(&self.focus_handle)
            .cursor(CursorStyle::IBeam)
            .on_action(cx.listener(Self::left))
            .on_action(cx.listener(Self::right))
            .on_action(cx.listener(Self::up))
            .on_action(cx.listener(Self::down))
            .on_action(cx.listener(Self::select_left))
            .on_action(cx.listener(Self::select_right))
            .on_action(cx.listener(Self::select_up))
            .on_action(cx.listener(Self::select_down))
            .on_action(cx.listener(Self::select_all))
            .on_action(cx.listener(Self::home))
            .on_action(cx.listener(Self::end))
            .on_action(cx.listener(Self::document_start))
            .on_action(cx.listener(Self::document_end))
            .on_action(cx.listener(Self::word_left))
            .on_action(cx.listener(Self::word_right))
            .on_action(cx.listener(Self::select_word_left))
            .on_action(cx.listener(Self::select_word_right))
            .on_action(cx.listener(Self::add_cursor_up))
            .on_action(cx.listener(Self::add_cursor_down))
            .on_action(cx.listener(Self::copy))
            .on_action(cx.listener(Self::cycle_blink_rate))
            .on_action(cx.listener(Self::toggle_cursor_when_selecting))
            .on_mouse_down(MouseButton::Left, cx.listener(Self::on_mouse_down))
            .on_mouse_up(MouseButton::Left, cx.listener(Self::on_mouse_up))
            .on_mouse_up_out(MouseButton::Left, cx.listener(Self::on_mouse_up))
            .on_mouse_move(cx.listener(Self::on_mouse_move))
            .on_scroll_wheel(cx.listener(Self::on_scroll))
            .bg(theme.surface0)
            .size_full()
            .overflow_hidden()
            .line_height(px(24.))
            .text_size(px(16.))
            .child(
                div()
                    .w_full()
                    .flex_1()
                    .overflow_hidden()
                    .py(px(TEXT_PADDING))
                    .child(OverlayTextElement {
                        editor: cx.entity().clone(),
                    }),
            )
    }
}

impl Focusable for ReadOnlyEditor {
    fn focus_handle(&self, _: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

// --- Element ---

struct OverlayTextElement {
    editor: Entity<ReadOnlyEditor>,
}

struct OverlayPrepaintState {
    shaped_lines: Vec<ShapedLine>,
    regions: Vec<PaintQuad>,
    highlights: Vec<PaintQuad>,
    carets: Vec<PaintQuad>,
    scroll_offset: Point<Pixels>,
    line_height: Pixels,
}

impl IntoElement for OverlayTextElement {
    type Element = Self;
    fn into_element(self) -> Self::Element {
        self
    }
}

fn rect_bounds(rect: &Rect, origin: Point<Pixels>) -> Bounds<Pixels> {
    Bounds::from_corners(
        point(origin.x + px(rect.left), origin.y + px(rect.top)),
        point(origin.x + px(rect.right), origin.y + px(rect.bottom)),
    )
}

impl Element for OverlayTextElement {
    type RequestLayoutState = ();
    type PrepaintState = OverlayPrepaintState;

    fn id(&self) -> Option<ElementId> {
        None
    }

    fn request_layout(
        &mut self,
        _id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        window: &mut Window,
        cx: &mut App,
    ) -> (LayoutId, Self::RequestLayoutState) {
        let editor = self.editor.read(cx);
        let line_height = window.line_height();
        let mut style = Style::default();
        style.size.width = relative(1.).into();
        style.size.height = (line_height * editor.doc.line_count()).into();
        (window.request_layout(style, [], cx), ())
    }

    fn prepaint(
        &mut self,
        _id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        bounds: Bounds<Pixels>,
        _request_layout: &mut Self::RequestLayoutState,
        window: &mut Window,
        cx: &mut App,
    ) -> Self::PrepaintState {
        let editor = self.editor.read(cx);
        let theme = cx.global::<Theme>();
        let style = window.text_style();
        let font_size = style.font_size.to_pixels(window.rem_size());
        let line_height = window.line_height();
        let scroll_offset = editor.scroll_offset;

        let shaped_lines: Vec<ShapedLine> = editor
            .doc
            .lines
            .iter()
            .map(|text| {
                let display: SharedString = if text.is_empty() {
                    " ".into()
                } else {
                    text.clone().into()
                };
                let run = TextRun {
                    len: display.len(),
                    font: style.font(),
                    color: style.color,
                    background_color: None,
                    underline: None,
                    strikethrough: None,
                };
                window
                    .text_system()
                    .shape_line(display, font_size, &[run], None)
            })
            .collect();

        let layout = ShapedDocument {
            doc: &editor.doc,
            shaped: &shaped_lines,
            line_height: line_height / px(1.),
        };
        let top_line = (scroll_offset.y / line_height).floor().max(0.) as usize;
        let visible_rows = (bounds.size.height / line_height).ceil() as usize + 1;
        let viewport = Viewport {
            view_from: top_line,
            view_to: (top_line + visible_rows).min(editor.doc.line_count()),
            padding_left: TEXT_PADDING,
            padding_right: TEXT_PADDING,
            content_width: bounds.size.width / px(1.),
        };
        let overlay = build_overlay(
            &layout,
            &editor.selection(),
            &viewport,
            &editor.config,
            RangeFilter::All,
        );

        let origin = point(bounds.left() - scroll_offset.x, bounds.top() - scroll_offset.y);
        let edges = viewport.edges();
        let inset = editor.config.region_inset;
        let regions = (viewport.view_from..viewport.view_to)
            .filter(|&line| layout.is_region(line))
            .map(|line| {
                let (top, bottom) = layout.row(line);
                let rect = Rect::new(edges.left + inset, top, edges.right - inset, bottom);
                fill(rect_bounds(&rect, origin), theme.mantle)
            })
            .collect();
        let highlights = overlay
            .highlight_rects()
            .map(|rect| fill(rect_bounds(rect, origin), theme.selection))
            .collect();

        let show_carets = editor.blink.is_visible() && editor.focus_handle.is_focused(window);
        let carets = overlay
            .carets
            .iter()
            .filter(|_| show_carets)
            .map(|caret| {
                let color = match caret.kind {
                    CaretKind::Primary => theme.accent,
                    CaretKind::Secondary => theme.accent.opacity(0.6),
                };
                fill(
                    Bounds::new(
                        point(origin.x + px(caret.left), origin.y + px(caret.top)),
                        size(px(CARET_WIDTH), px(caret.height)),
                    ),
                    color,
                )
            })
            .collect();

        OverlayPrepaintState {
            shaped_lines,
            regions,
            highlights,
            carets,
            scroll_offset,
            line_height,
        }
    }

    fn paint(
        &mut self,
        _id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        bounds: Bounds<Pixels>,
        _request_layout: &mut Self::RequestLayoutState,
        prepaint: &mut Self::PrepaintState,
        window: &mut Window,
        cx: &mut App,
    ) {
        for quad in prepaint
            .regions
            .drain(..)
            .chain(prepaint.highlights.drain(..))
        {
            window.paint_quad(quad);
        }

        let line_height = prepaint.line_height;
        let scroll_offset = prepaint.scroll_offset;
        for (i, shaped) in prepaint.shaped_lines.iter().enumerate() {
            let y = bounds.top() + line_height * i - scroll_offset.y;
            if y + line_height < bounds.top() || y > bounds.bottom() {
                continue;
            }
            let origin = point(bounds.left() + px(TEXT_PADDING) - scroll_offset.x, y);
            if let Err(err) = shaped.paint(origin, line_height, TextAlign::Left, None, window, cx) {
                tracing::warn!(line = i, %err, "failed to paint line");
            }
        }

        for quad in prepaint.carets.drain(..) {
            window.paint_quad(quad);
        }

        let shaped_lines = std::mem::take(&mut prepaint.shaped_lines);
        self.editor.update(cx, |editor, _cx| {
            editor.last_shaped_lines = shaped_lines;
            editor.last_bounds = Some(bounds);
            editor.last_line_height = line_height;
            if std::mem::take(&mut editor.autoscroll) {
                editor.scroll_to_head();
            }
        });
    }

    fn source_location(&self) -> Option<&'static core::panic::Location<'static>> {
        None
    }
}
