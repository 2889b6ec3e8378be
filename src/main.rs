mod editor;
mod theme;

use std::path::PathBuf;

use anyhow::Context as _;
use editor::*;
use gpui::*;
use selection_overlay::{config, OverlayConfig};
use theme::*;
use tracing_subscriber::EnvFilter;

actions!(overlay_demo, [Quit, Escape]);

const SAMPLE: &str = "\
Selections stretch to the container edge when they run past the end of a line.

Shift-arrows extend every range; alt-shift-up and alt-shift-down add carets.
Cmd-click adds a caret under the pointer.

```rust
fn main() {
    println!(\"fenced lines are inset on both sides\");
}
```

Cmd-b cycles the blink rate: blinking, steady, hidden.
Cmd-shift-s toggles carets inside non-empty selections.
";

pub struct DemoWindow {
    editor: Entity<ReadOnlyEditor>,
    title: SharedString,
}

impl DemoWindow {
    fn new(title: SharedString, doc: Document, config: OverlayConfig, cx: &mut Context<Self>) -> Self {
        let editor = cx.new(|cx| ReadOnlyEditor::new(doc, config, cx));
        Self { editor, title }
    }

    fn escape(&mut self, _: &Escape, _: &mut Window, cx: &mut Context<Self>) {
        let multiple = self.editor.read(cx).has_multiple_cursors();
        self.editor.update(cx, |editor, cx| {
            if multiple {
                editor.collapse_to_primary(cx);
            } else {
                editor.clear_selection(cx);
            }
        });
    }
}

impl Render for DemoWindow {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.global::<Theme>();
        let status = self.editor.read(cx).status();

        div()
            .key_context("DemoWindow")
            .track_focus(&self.editor.read(cx).focus_handle)
            .on_action(cx.listener(Self::escape))
            .flex()
            .flex_col()
            .size_full()
            .bg(theme.base)
            .text_color(theme.text)
            .overflow_hidden()
            .child(
                div()
                    .flex()
                    .flex_row()
                    .items_center()
                    .justify_between()
                    .w_full()
                    .h(px(32.))
                    .px(px(12.))
                    .border_b_1()
                    .border_color(theme.surface0)
                    .child(
                        div()
                            .text_size(px(13.))
                            .text_color(theme.subtext0)
                            .child(self.title.clone()),
                    )
                    .child(
                        div()
                            .text_size(px(11.))
                            .text_color(theme.overlay0)
                            .child(status),
                    ),
            )
            .child(
                div()
                    .flex()
                    .flex_1()
                    .w_full()
                    .overflow_hidden()
                    .child(self.editor.clone()),
            )
    }
}

impl Focusable for DemoWindow {
    fn focus_handle(&self, cx: &App) -> FocusHandle {
        self.editor.read(cx).focus_handle.clone()
    }
}

fn load_document() -> anyhow::Result<(SharedString, String)> {
    match std::env::args_os().nth(1) {
        Some(arg) => {
            let path = PathBuf::from(arg);
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            Ok((path.display().to_string().into(), text))
        }
        None => Ok(("Selection overlay".into(), SAMPLE.to_string())),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("selection_overlay=info,overlay_demo=info")),
        )
        .init();
    tracing::info!(
        commit = env!("GIT_COMMIT"),
        built = env!("BUILD_DATE"),
        "starting overlay demo"
    );

    let (title, text) = load_document()?;
    let doc = Document::parse(&text);
    let config = config::load_config();
    tracing::debug!(?config, lines = doc.line_count(), "document loaded");

    Application::new().run(move |cx: &mut App| {
        cx.bind_keys([
            KeyBinding::new("escape", Escape, Some("DemoWindow")),
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("left", Left, Some("ReadOnlyEditor")),
            KeyBinding::new("right", Right, Some("ReadOnlyEditor")),
            KeyBinding::new("up", Up, Some("ReadOnlyEditor")),
            KeyBinding::new("down", Down, Some("ReadOnlyEditor")),
            KeyBinding::new("shift-left", SelectLeft, Some("ReadOnlyEditor")),
            KeyBinding::new("shift-right", SelectRight, Some("ReadOnlyEditor")),
            KeyBinding::new("shift-up", SelectUp, Some("ReadOnlyEditor")),
            KeyBinding::new("shift-down", SelectDown, Some("ReadOnlyEditor")),
            KeyBinding::new("cmd-a", SelectAll, Some("ReadOnlyEditor")),
            KeyBinding::new("home", Home, Some("ReadOnlyEditor")),
            KeyBinding::new("end", End, Some("ReadOnlyEditor")),
            KeyBinding::new("cmd-left", Home, Some("ReadOnlyEditor")),
            KeyBinding::new("cmd-right", End, Some("ReadOnlyEditor")),
            KeyBinding::new("cmd-up", DocumentStart, Some("ReadOnlyEditor")),
            KeyBinding::new("cmd-down", DocumentEnd, Some("ReadOnlyEditor")),
            KeyBinding::new("alt-left", WordLeft, Some("ReadOnlyEditor")),
            KeyBinding::new("alt-right", WordRight, Some("ReadOnlyEditor")),
            KeyBinding::new("alt-shift-left", SelectWordLeft, Some("ReadOnlyEditor")),
            KeyBinding::new("alt-shift-right", SelectWordRight, Some("ReadOnlyEditor")),
            KeyBinding::new("alt-shift-up", AddCursorUp, Some("ReadOnlyEditor")),
            KeyBinding::new("alt-shift-down", AddCursorDown, Some("ReadOnlyEditor")),
            KeyBinding::new("cmd-c", Copy, Some("ReadOnlyEditor")),
            KeyBinding::new("cmd-b", CycleBlinkRate, Some("ReadOnlyEditor")),
            KeyBinding::new("cmd-shift-s", ToggleCursorWhenSelecting, Some("ReadOnlyEditor")),
        ]);

        cx.on_action(quit);
        Theme::init(cx);

        let options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                None,
                size(px(720.), px(480.)),
                cx,
            ))),
            titlebar: Some(TitlebarOptions {
                title: Some(title.clone()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let opened = cx.open_window(options, |window, cx| {
            cx.new(|cx| {
                let demo = DemoWindow::new(title, doc, config, cx);
                let focus = demo.editor.read(cx).focus_handle.clone();
                window.focus(&focus, cx);
                demo
            })
        });
        if let Err(err) = opened {
            tracing::error!(%err, "failed to open window");
            cx.quit();
            return;
        }
        cx.activate(true);
    });
    Ok(())
}

fn quit(_: &Quit, app: &mut App) {
    app.quit();
}
