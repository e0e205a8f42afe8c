//! Printing a finished transcript in one of the supported output formats

use std::fmt::Write;
use std::io::{self, IsTerminal};

use clap::ValueEnum;

use crate::chat::{Sender, Transcript};
use crate::die;
use crate::platform::PlatformKind;
use crate::render::ChatScreen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum OutputFormat {
    /// Render the chat as a phone screen
    Screen,
    /// The transcript as a JSON array of messages
    Json,
    /// One "name: text" line per message
    Plain,
}

impl OutputFormat {
    /// Screens are for people; pipes get JSON
    pub(crate) fn resolve(requested: Option<OutputFormat>) -> OutputFormat {
        match requested {
            Some(format) => format,
            None if io::stdout().is_terminal() => OutputFormat::Screen,
            None => OutputFormat::Json,
        }
    }
}

/// Everything needed to present a transcript
pub(crate) struct Presentation<'a> {
    pub platform: PlatformKind,
    pub contact_name: &'a str,
    pub me_name: &'a str,
    pub width: usize,
}

impl Presentation<'_> {
    pub(crate) fn screen<'t>(&'t self, transcript: &'t Transcript) -> ChatScreen<'t> {
        ChatScreen::new(self.platform, self.contact_name, transcript).width(self.width)
    }

    pub(crate) fn plain(&self, transcript: &Transcript) -> String {
        let mut out = String::new();

        for msg in transcript.iter() {
            let name = match msg.sender {
                Sender::Me => self.me_name,
                Sender::Them => self.contact_name,
            };

            let _ = match &msg.time {
                Some(time) => writeln!(out, "{} [{}]: {}", name, time, msg.content),
                None => writeln!(out, "{}: {}", name, msg.content),
            };
        }

        out
    }

    pub(crate) fn format(&self, transcript: &Transcript, format: OutputFormat) -> String {
        match format {
            OutputFormat::Screen => self.screen(transcript).to_string(),
            OutputFormat::Plain => self.plain(transcript),
            OutputFormat::Json => match serde_json::to_string_pretty(transcript) {
                Ok(json) => json + "\n",
                Err(err) => die!("failed to serialize the transcript: {}", err),
            },
        }
    }

    pub(crate) fn print(&self, transcript: &Transcript, format: OutputFormat) {
        print!("{}", self.format(transcript, format));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Message;

    fn presentation() -> Presentation<'static> {
        Presentation {
            platform: PlatformKind::WhatsApp,
            contact_name: "Mum",
            me_name: "Me",
            width: 40,
        }
    }

    fn transcript() -> Transcript {
        let mut transcript = Transcript::new();

        transcript.push(Message::theirs("call me".to_string(), Some("9:12".to_string())));
        transcript.push(Message::mine("in a meeting".to_string()));
        transcript.push(Message::theirs("ok".to_string(), None));

        transcript
    }

    #[test]
    fn test_plain_lines() {
        assert_eq!(
            presentation().plain(&transcript()),
            "Mum [9:12]: call me\nMe [Now]: in a meeting\nMum: ok\n"
        );
    }

    #[test]
    fn test_json_reads_back() {
        let transcript = transcript();
        let json = presentation().format(&transcript, OutputFormat::Json);

        let messages: Vec<Message> = serde_json::from_str(&json).unwrap();
        let read_back = Transcript::from_messages(messages).unwrap();

        assert_eq!(read_back, transcript);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(OutputFormat::Screen.to_string(), "screen");
        assert_eq!(
            OutputFormat::from_str("plain", false).unwrap(),
            OutputFormat::Plain
        );
    }
}
