use gpui::{rgb, rgba, App, Global, Hsla};

pub struct Theme {
    pub base: Hsla,
    pub mantle: Hsla,
    pub text: Hsla,
    pub surface0: Hsla,
    pub subtext0: Hsla,
    pub overlay0: Hsla,
    pub accent: Hsla,
    pub selection: Hsla,
}

impl Global for Theme {}

impl Theme {
    pub fn mocha() -> Self {
        Self {
            base: rgb(0x1e1e2e).into(),
            mantle: rgb(0x181825).into(),
            text: rgb(0xcdd6f4).into(),
            surface0: rgb(0x313244).into(),
            subtext0: rgb(0xa6adc8).into(),
            overlay0: rgb(0x6c7086).into(),
            accent: rgb(0xf5e0dc).into(),
            selection: rgba(0x89b4fa40).into(),
        }
    }

    pub fn init(cx: &mut App) {
        cx.set_global(Self::mocha());
    }
}
