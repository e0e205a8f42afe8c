//! Terminal styles shared by the renderer, the REPL and CLI diagnostics.
//!
//! Everything that paints goes through [`MaybePaint`], so one switch set at startup
//! (`--color`, `NO_COLOR`, or whether stdout is a terminal) turns every escape code
//! on or off. Rendered screens must stay plain text when piped into a file.

use crate::cli::ColorMode;
use lazy_static::lazy_static;
use nu_ansi_term::{AnsiGenericString, Color, Style};
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

lazy_static! {
    /// The `[Me]` prompt and recognized slash commands
    pub(crate) static ref USER_PROMPT: Style = Color::Blue.bold();
    /// Session notices such as "reply cancelled"
    pub(crate) static ref NOTICE: Style = Color::Cyan.normal();
    pub(crate) static ref ERROR_INDICATOR: Style = Color::Red.bold();
    pub(crate) static ref WARNING_INDICATOR: Style = Color::Yellow.bold();
    pub(crate) static ref ERROR_TEXT: Style = Color::Default.bold();
    pub(crate) static ref WARNING_TEXT: Style = Color::Default.bold();
    /// The contact's name in the chat header
    pub(crate) static ref CONTACT_NAME: Style = Color::Default.bold();
    /// Phone chrome: the frame, status bar, timestamps and placeholders
    pub(crate) static ref MUTED: Style = Color::DarkGray.normal();
}

static USE_COLOR: AtomicBool = AtomicBool::new(true);

/// Set once from `main` before anything is printed
pub(crate) fn configure_color(cmode: ColorMode) {
    USE_COLOR.store(matches!(cmode, ColorMode::On), Ordering::Relaxed);
}

pub(crate) fn color_mode() -> ColorMode {
    match USE_COLOR.load(Ordering::Relaxed) {
        true => ColorMode::On,
        false => ColorMode::Off,
    }
}

/// Paints with a style only when color is enabled, otherwise passes the text through
pub(crate) trait MaybePaint {
    #[must_use]
    fn maybe_paint<'a, I, S: 'a + ToOwned + ?Sized>(self, input: I) -> AnsiGenericString<'a, S>
    where
        I: Into<Cow<'a, S>>,
        <S as ToOwned>::Owned: fmt::Debug;
}

impl MaybePaint for Style {
    fn maybe_paint<'a, I, S: 'a + ToOwned + ?Sized>(self, input: I) -> AnsiGenericString<'a, S>
    where
        I: Into<Cow<'a, S>>,
        <S as ToOwned>::Owned: fmt::Debug,
    {
        match color_mode() {
            ColorMode::On => self.paint(input),
            ColorMode::Off => {
                let cow: Cow<'a, S> = input.into();

                cow.into()
            }
        }
    }
}

