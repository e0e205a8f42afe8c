//! Per-platform visual descriptors. A skin is pure data: the renderer reads it and
//! never branches on which platform it is drawing.

use nu_ansi_term::{Color, Style};

#[derive(Debug, Clone, Copy)]
pub(crate) struct BubbleColors {
    pub background: Color,
    pub foreground: Color,
}

impl BubbleColors {
    pub(crate) fn style(&self) -> Style {
        Style::new().on(self.background).fg(self.foreground)
    }
}

/// The divider shown above the first message
#[derive(Debug, Clone, Copy)]
pub(crate) enum Banner {
    None,
    Text(&'static str),
    /// "You matched with <name> on <date>"
    Match { date: &'static str },
}

#[derive(Debug)]
pub(crate) struct Skin {
    pub accent: Color,
    pub me: BubbleColors,
    pub them: BubbleColors,
    /// Shown under the contact name when idle
    pub status: Option<&'static str>,
    /// Replaces the status while the contact is typing
    pub typing_status: &'static str,
    pub banner: Banner,
    pub uppercase_name: bool,
    /// Time printed under messages which carry none; `None` hides times
    pub message_time: Option<&'static str>,
    pub read_mark: Option<&'static str>,
    /// Printed under the final bubble when it is ours
    pub seen_marker: Option<&'static str>,
    pub placeholder: &'static str,
}

const WHITE: Color = Color::Rgb(0xff, 0xff, 0xff);
const INK: Color = Color::Rgb(0x11, 0x11, 0x11);

pub(crate) static INSTAGRAM: Skin = Skin {
    accent: Color::Rgb(0x37, 0x97, 0xf0),
    me: BubbleColors {
        background: Color::Rgb(0x37, 0x97, 0xf0),
        foreground: WHITE,
    },
    them: BubbleColors {
        background: WHITE,
        foreground: INK,
    },
    status: Some("Active now"),
    typing_status: "Typing...",
    banner: Banner::None,
    uppercase_name: false,
    message_time: None,
    read_mark: None,
    seen_marker: Some("Seen"),
    placeholder: "Message...",
};

pub(crate) static WHATSAPP: Skin = Skin {
    accent: Color::Rgb(0x07, 0x5e, 0x54),
    me: BubbleColors {
        background: Color::Rgb(0xdc, 0xf8, 0xc6),
        foreground: INK,
    },
    them: BubbleColors {
        background: WHITE,
        foreground: INK,
    },
    status: Some("online"),
    typing_status: "typing...",
    banner: Banner::Text("TODAY"),
    uppercase_name: false,
    message_time: Some("9:42"),
    read_mark: Some("✓✓"),
    seen_marker: None,
    placeholder: "Message",
};

pub(crate) static TIKTOK: Skin = Skin {
    accent: Color::Rgb(0xfe, 0x2c, 0x55),
    me: BubbleColors {
        background: Color::Rgb(0x28, 0x56, 0xff),
        foreground: WHITE,
    },
    them: BubbleColors {
        background: Color::Rgb(0xf1, 0xf1, 0xf2),
        foreground: INK,
    },
    status: None,
    typing_status: "typing...",
    banner: Banner::Text("Today 4:20 PM"),
    uppercase_name: false,
    message_time: None,
    read_mark: None,
    seen_marker: None,
    placeholder: "Send a message...",
};

pub(crate) static TINDER: Skin = Skin {
    accent: Color::Rgb(0xfd, 0x26, 0x7d),
    me: BubbleColors {
        background: Color::Rgb(0x21, 0x96, 0xf3),
        foreground: WHITE,
    },
    them: BubbleColors {
        background: Color::Rgb(0xf0, 0xf2, 0xf4),
        foreground: INK,
    },
    status: None,
    typing_status: "typing...",
    banner: Banner::Match { date: "5/24/24" },
    uppercase_name: true,
    message_time: None,
    read_mark: None,
    seen_marker: None,
    placeholder: "Type a message",
};

impl Skin {
    pub(crate) fn display_name(&self, contact_name: &str) -> String {
        if self.uppercase_name {
            contact_name.to_uppercase()
        } else {
            contact_name.to_string()
        }
    }

    pub(crate) fn banner_text(&self, contact_name: &str) -> Option<String> {
        match self.banner {
            Banner::None => None,
            Banner::Text(text) => Some(text.to_string()),
            Banner::Match { date } => Some(format!(
                "YOU MATCHED WITH {} ON {}",
                contact_name.to_uppercase(),
                date
            )),
        }
    }

    pub(crate) fn status_text(&self, typing: bool) -> Option<&'static str> {
        if typing {
            Some(self.typing_status)
        } else {
            self.status
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tinder_banner_and_name() {
        assert_eq!(
            TINDER.banner_text("Alex").as_deref(),
            Some("YOU MATCHED WITH ALEX ON 5/24/24")
        );
        assert_eq!(TINDER.display_name("Alex"), "ALEX");
        assert_eq!(INSTAGRAM.display_name("Alex"), "Alex");
    }

    #[test]
    fn test_status_text() {
        assert_eq!(INSTAGRAM.status_text(false), Some("Active now"));
        assert_eq!(INSTAGRAM.status_text(true), Some("Typing..."));
        assert_eq!(WHATSAPP.status_text(false), Some("online"));
        assert_eq!(TIKTOK.status_text(false), None);
        assert_eq!(TINDER.status_text(true), Some("typing..."));
    }

    #[test]
    fn test_banners() {
        assert!(INSTAGRAM.banner_text("x").is_none());
        assert_eq!(WHATSAPP.banner_text("x").as_deref(), Some("TODAY"));
        assert_eq!(TIKTOK.banner_text("x").as_deref(), Some("Today 4:20 PM"));
    }
}
