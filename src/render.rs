//! Terminal rendering of chat transcripts as phone screenshots.
//!
//! [`ChatScreen`] is the single renderer for every platform. Everything that
//! differs between apps (colors, header status, banners, read marks, input
//! placeholder) is read from the platform's [`Skin`]. Output is a framed block of
//! fixed display width; color goes through [`MaybePaint`] so the same layout is
//! produced as plain text when color is disabled.

pub(crate) mod skin;
mod wrap;

use std::fmt;

use nu_ansi_term::Style;

use crate::chat::{Message, Sender, Transcript};
use crate::color::{MaybePaint, CONTACT_NAME, MUTED};
use crate::platform::PlatformKind;
use skin::Skin;

pub(crate) const DEFAULT_WIDTH: usize = 44;
pub(crate) const MIN_WIDTH: usize = 24;

const STATUS_TIME: &str = "9:41";
const STATUS_ICONS: &str = "▂▄▆█ ◠ ▮▮▮▯";
const BACK_ARROW: &str = "‹";
const TYPING_BUBBLE: &str = "...";

/// Columns taken by the frame: "│ " on the left and " │" on the right
const FRAME: usize = 4;

/// A single rendered line. `width` is the display width of the unpainted text.
#[derive(Default)]
struct Row {
    width: usize,
    text: String,
}

impl Row {
    fn new() -> Row {
        Row::default()
    }

    fn plain(text: &str) -> Row {
        let mut row = Row::new();
        row.push(text);
        row
    }

    fn styled(style: Style, text: &str) -> Row {
        let mut row = Row::new();
        row.push_styled(style, text);
        row
    }

    fn push(&mut self, text: &str) {
        self.width += wrap::width(text);
        self.text.push_str(text);
    }

    fn push_styled(&mut self, style: Style, text: &str) {
        self.width += wrap::width(text);
        self.text.push_str(&style.maybe_paint(text).to_string());
    }

    fn pad(&mut self, n: usize) {
        self.push(&" ".repeat(n));
    }

    fn append(&mut self, other: Row) {
        self.width += other.width;
        self.text.push_str(&other.text);
    }
}

fn split(left: Row, right: Row, inner: usize) -> Row {
    let gap = inner.saturating_sub(left.width + right.width);

    let mut row = left;
    row.pad(gap);
    row.append(right);
    row
}

fn align_right(content: Row, inner: usize) -> Row {
    split(Row::new(), content, inner)
}

fn center(content: Row, inner: usize) -> Row {
    let left = inner.saturating_sub(content.width) / 2;

    let mut row = Row::new();
    row.pad(left);
    row.append(content);
    row
}

fn write_frame(f: &mut fmt::Formatter<'_>, rows: &[Row], width: usize) -> fmt::Result {
    let inner = width - FRAME;
    let border = MUTED.maybe_paint("│").to_string();

    writeln!(
        f,
        "{}",
        MUTED.maybe_paint(format!("╭{}╮", "─".repeat(width - 2)))
    )?;

    for row in rows {
        writeln!(
            f,
            "{} {}{} {}",
            border,
            row.text,
            " ".repeat(inner.saturating_sub(row.width)),
            border
        )?;
    }

    writeln!(
        f,
        "{}",
        MUTED.maybe_paint(format!("╰{}╯", "─".repeat(width - 2)))
    )
}

fn clamp_width(width: usize) -> usize {
    width.max(MIN_WIDTH)
}

fn status_bar(inner: usize) -> Row {
    split(Row::plain(STATUS_TIME), Row::plain(STATUS_ICONS), inner)
}

fn monogram(name: &str) -> String {
    let initial = name
        .chars()
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_uppercase().collect::<String>())
        .unwrap_or_else(|| "?".to_string());

    format!("({})", initial)
}

/// A transcript painted with a platform's skin
pub(crate) struct ChatScreen<'a> {
    platform: PlatformKind,
    contact_name: &'a str,
    transcript: &'a Transcript,
    typing: bool,
    width: usize,
}

impl<'a> ChatScreen<'a> {
    pub(crate) fn new(
        platform: PlatformKind,
        contact_name: &'a str,
        transcript: &'a Transcript,
    ) -> ChatScreen<'a> {
        ChatScreen {
            platform,
            contact_name,
            transcript,
            typing: false,
            width: DEFAULT_WIDTH,
        }
    }

    /// Widths below [`MIN_WIDTH`] are raised to it
    pub(crate) fn width(mut self, width: usize) -> ChatScreen<'a> {
        self.width = clamp_width(width);
        self
    }

    /// Shows the contact as typing a reply
    pub(crate) fn typing(mut self, typing: bool) -> ChatScreen<'a> {
        self.typing = typing;
        self
    }

    fn skin(&self) -> &'static Skin {
        self.platform.skin()
    }

    fn inner(&self) -> usize {
        self.width - FRAME
    }

    fn header(&self, rows: &mut Vec<Row>) {
        let skin = self.skin();
        let inner = self.inner();

        let mut lead = Row::new();
        lead.push_styled(skin.accent.bold(), BACK_ARROW);
        lead.push(" ");
        lead.push_styled(*MUTED, &monogram(self.contact_name));
        lead.push(" ");

        let indent = lead.width;
        let name = wrap::truncate(
            &skin.display_name(self.contact_name),
            inner.saturating_sub(indent),
        );

        lead.push_styled(*CONTACT_NAME, &name);
        rows.push(lead);

        if let Some(status) = skin.status_text(self.typing) {
            let mut row = Row::new();
            row.pad(indent);
            row.push_styled(*MUTED, &wrap::truncate(status, inner.saturating_sub(indent)));
            rows.push(row);
        }

        rows.push(Row::styled(*MUTED, &"─".repeat(inner)));
    }

    fn bubble(&self, rows: &mut Vec<Row>, sender: Sender, content: &str) {
        let skin = self.skin();
        let inner = self.inner();

        let colors = match sender {
            Sender::Me => skin.me,
            Sender::Them => skin.them,
        };

        let max_text = (inner * 3 / 4).saturating_sub(2).max(1);
        let lines = wrap::wrap(content, max_text);
        let text_width = lines.iter().map(|l| wrap::width(l)).max().unwrap_or(0);

        for line in lines {
            let padded = format!(
                " {}{} ",
                line,
                " ".repeat(text_width - wrap::width(&line))
            );

            let bubble = Row::styled(colors.style(), &padded);

            rows.push(match sender {
                Sender::Me => align_right(bubble, inner),
                Sender::Them => bubble,
            });
        }
    }

    fn footer(&self, rows: &mut Vec<Row>, msg: &Message) {
        let skin = self.skin();

        let default_time = match skin.message_time {
            Some(time) => time,
            None => return,
        };

        let mut label = msg.time.as_deref().unwrap_or(default_time).to_string();

        if let (Sender::Me, Some(mark)) = (msg.sender, skin.read_mark) {
            label.push(' ');
            label.push_str(mark);
        }

        let row = Row::styled(*MUTED, &label);

        rows.push(match msg.sender {
            Sender::Me => align_right(row, self.inner()),
            Sender::Them => row,
        });
    }

    fn messages(&self, rows: &mut Vec<Row>) {
        let skin = self.skin();
        let inner = self.inner();

        let mut previous = None;

        for msg in self.transcript.iter() {
            if previous.is_some_and(|s| s != msg.sender) {
                rows.push(Row::new());
            }

            self.bubble(rows, msg.sender, &msg.content);
            self.footer(rows, msg);

            previous = Some(msg.sender);
        }

        let last_is_mine = self.transcript.last().map(|m| m.sender) == Some(Sender::Me);

        if let (Some(seen), true, false) = (skin.seen_marker, last_is_mine, self.typing) {
            rows.push(align_right(Row::styled(*MUTED, seen), inner));
        }

        if self.typing {
            if previous.is_some() {
                rows.push(Row::new());
            }

            self.bubble(rows, Sender::Them, TYPING_BUBBLE);
        }
    }

    fn input_bar(&self, rows: &mut Vec<Row>) {
        let inner = self.inner();
        let placeholder = wrap::truncate(self.skin().placeholder, inner.saturating_sub(4));

        let mut left = Row::plain("( ");
        left.push_styled(*MUTED, &placeholder);

        rows.push(Row::styled(*MUTED, &"─".repeat(inner)));
        rows.push(split(left, Row::plain(" )"), inner));
    }

    fn rows(&self) -> Vec<Row> {
        let inner = self.inner();
        let mut rows = vec![status_bar(inner), Row::new()];

        self.header(&mut rows);

        if let Some(banner) = self.skin().banner_text(self.contact_name) {
            let banner = wrap::truncate(&banner, inner);

            rows.push(center(Row::styled(*MUTED, &banner), inner));
        }

        rows.push(Row::new());
        self.messages(&mut rows);
        rows.push(Row::new());

        self.input_bar(&mut rows);

        rows
    }
}

impl fmt::Display for ChatScreen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_frame(f, &self.rows(), self.width)
    }
}

/// Shown while the opening conversation is being generated
pub(crate) struct LoadingScreen {
    platform: PlatformKind,
    width: usize,
}

impl LoadingScreen {
    pub(crate) fn new(platform: PlatformKind, width: usize) -> LoadingScreen {
        LoadingScreen {
            platform,
            width: clamp_width(width),
        }
    }
}

impl fmt::Display for LoadingScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.width - FRAME;
        let text = format!("Generating {} chat...", self.platform);

        let mut rows = vec![status_bar(inner), Row::new(), Row::new()];

        for line in wrap::wrap(&text, inner) {
            rows.push(center(Row::styled(*MUTED, &line), inner));
        }

        rows.push(Row::new());

        write_frame(f, &rows, self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ColorMode;
    use crate::color::configure_color;
    use crate::generate::fallback;

    fn plain(screen: impl fmt::Display) -> Vec<String> {
        configure_color(ColorMode::Off);

        screen.to_string().lines().map(|l| l.to_string()).collect()
    }

    fn ending_with_me() -> Transcript {
        let mut transcript = Transcript::new();

        transcript.push(Message::theirs("hey stranger".to_string(), Some("9:30".to_string())));
        transcript.push(Message::mine("hiii".to_string()));

        transcript
    }

    #[test]
    fn test_every_line_has_the_frame_width() {
        let transcript = fallback::conversation();

        for platform in PlatformKind::all() {
            for width in [10, MIN_WIDTH, DEFAULT_WIDTH, 60] {
                let screen = ChatScreen::new(platform.kind, "Crush ❤️", &transcript).width(width);

                for line in plain(screen) {
                    assert_eq!(wrap::width(&line), clamp_width(width), "{:?}", line);
                }
            }
        }
    }

    #[test]
    fn test_instagram_chrome() {
        let transcript = fallback::conversation();
        let text = plain(ChatScreen::new(PlatformKind::Instagram, "Sam", &transcript)).join("\n");

        assert!(text.contains("9:41"));
        assert!(text.contains("‹ (S) Sam"));
        assert!(text.contains("Active now"));
        assert!(text.contains("Message..."));
        assert!(text.contains("No worries!"));
        assert!(!text.contains("Seen"));
    }

    #[test]
    fn test_seen_only_after_my_message() {
        let transcript = ending_with_me();

        let instagram = plain(ChatScreen::new(PlatformKind::Instagram, "Sam", &transcript));
        let tiktok = plain(ChatScreen::new(PlatformKind::TikTok, "Sam", &transcript));

        assert!(instagram.iter().any(|l| l.trim_end_matches([' ', '│']).ends_with("Seen")));
        assert!(!tiktok.join("\n").contains("Seen"));
    }

    #[test]
    fn test_alignment_by_sender() {
        let transcript = ending_with_me();
        let lines = plain(ChatScreen::new(PlatformKind::TikTok, "Sam", &transcript));

        let mine = lines.iter().find(|l| l.contains("hiii")).unwrap();
        let theirs = lines.iter().find(|l| l.contains("hey stranger")).unwrap();

        assert!(mine.ends_with(" hiii  │"));
        assert!(theirs.starts_with("│  hey stranger "));
    }

    #[test]
    fn test_long_messages_wrap() {
        let mut transcript = Transcript::new();
        transcript.push(Message::theirs("word ".repeat(40), None));

        let lines = plain(ChatScreen::new(PlatformKind::Instagram, "Sam", &transcript));
        let bubble_lines = lines.iter().filter(|l| l.contains("word")).count();

        assert!(bubble_lines > 1);
    }

    #[test]
    fn test_whatsapp_times_and_marks() {
        let transcript = ending_with_me();
        let text = plain(ChatScreen::new(PlatformKind::WhatsApp, "Mum", &transcript)).join("\n");

        assert!(text.contains("TODAY"));
        assert!(text.contains("online"));
        assert!(text.contains("9:30"));
        assert!(text.contains("Now ✓✓"));

        let mut untimed = Transcript::new();
        untimed.push(Message::theirs("hello".to_string(), None));

        let text = plain(ChatScreen::new(PlatformKind::WhatsApp, "Mum", &untimed)).join("\n");

        assert!(text.contains("9:42"));
    }

    #[test]
    fn test_tinder_header_and_banner() {
        let transcript = fallback::conversation();
        let text = plain(ChatScreen::new(PlatformKind::Tinder, "Alex", &transcript)).join("\n");

        assert!(text.contains("(A) ALEX"));
        assert!(text.contains("YOU MATCHED WITH ALEX ON 5/24/24"));
        assert!(text.contains("Type a message"));
        assert!(!text.contains("online"));
    }

    #[test]
    fn test_typing_indicator() {
        let transcript = ending_with_me();
        let lines = plain(
            ChatScreen::new(PlatformKind::Instagram, "Sam", &transcript).typing(true),
        );
        let text = lines.join("\n");

        assert!(text.contains("Typing..."));
        assert!(!text.contains("Active now"));
        assert!(!text.contains("Seen"));
        assert!(lines.iter().any(|l| l.starts_with("│  ... ")));
    }

    #[test]
    fn test_empty_transcript_renders_chrome() {
        let transcript = Transcript::new();
        let text = plain(ChatScreen::new(PlatformKind::TikTok, "Sam", &transcript)).join("\n");

        assert!(text.contains("Today 4:20 PM"));
        assert!(text.contains("Send a message..."));
    }

    #[test]
    fn test_loading_screen() {
        let text = plain(LoadingScreen::new(PlatformKind::WhatsApp, DEFAULT_WIDTH)).join("\n");

        assert!(text.contains("Generating WhatsApp chat..."));
    }
}
