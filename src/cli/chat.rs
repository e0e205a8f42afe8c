//! The interactive chat session: render, read a line, reply, re-render.
//!
//! Generations run under `select!` against Ctrl-C. A cancelled generation leaves
//! the transcript as it was; a cancelled reply keeps the user's message.

mod highlighter;
mod prompt;
mod repl;

use std::future::Future;
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::time::Duration;

use tokio::{select, signal};

use self::repl::{Command, Input, Repl};
use crate::chat::{Message, Transcript};
use crate::cli::output::Presentation;
use crate::color::{MaybePaint, NOTICE};
use crate::config::Keybindings;
use crate::generate::{ConversationGenerator, ReplyGenerator};
use crate::platform::PlatformKind;
use crate::providers::ChatProvider;
use crate::render::LoadingScreen;
use crate::theme::ThemeKind;
use crate::{version, warn};

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

/// Runs `fut` to completion unless the user presses Ctrl-C first
async fn cancellable<F: Future>(fut: F) -> Option<F::Output> {
    select! {
        out = fut => Some(out),
        _ = signal::ctrl_c() => None,
    }
}

fn notice(text: &str) {
    eprintln!("{}", NOTICE.maybe_paint(text));
}

fn save_transcript(transcript: &Transcript, path: &Path) -> io::Result<()> {
    let json = serde_json::to_string_pretty(transcript)?;

    std::fs::write(path, json + "\n")
}

fn draw_screen(
    presentation: &Presentation<'_>,
    transcript: &Transcript,
    typing: bool,
    clear_screen: bool,
) {
    if clear_screen {
        print!("{}", CLEAR_SCREEN);
    }

    print!("{}", presentation.screen(transcript).typing(typing));

    if let Err(err) = io::stdout().flush() {
        tracing::debug!(error = %err, "failed to flush stdout");
    }
}

pub(crate) struct SessionSettings<'a> {
    pub platform: PlatformKind,
    pub theme: ThemeKind,
    pub presentation: Presentation<'a>,
    pub keybindings: Keybindings,
    pub reply_delay: Duration,
}

pub(crate) struct Session<'a> {
    settings: SessionSettings<'a>,
    conversation: ConversationGenerator<'a>,
    replies: ReplyGenerator<'a>,
    transcript: Transcript,
    clear_screen: bool,
}

impl<'a> Session<'a> {
    pub(crate) fn new(
        settings: SessionSettings<'a>,
        provider: &'a dyn ChatProvider,
        model: &str,
    ) -> Session<'a> {
        Session {
            settings,
            conversation: ConversationGenerator::new(provider, model),
            replies: ReplyGenerator::new(provider, model),
            transcript: Transcript::new(),
            clear_screen: io::stdout().is_terminal(),
        }
    }

    fn draw(&self, typing: bool) {
        draw_screen(
            &self.settings.presentation,
            &self.transcript,
            typing,
            self.clear_screen,
        );
    }

    async fn regenerate(&mut self) {
        let presentation = &self.settings.presentation;

        if self.clear_screen {
            print!("{}", CLEAR_SCREEN);
        }

        print!(
            "{}",
            LoadingScreen::new(self.settings.platform, presentation.width)
        );

        let _ = io::stdout().flush();

        let generation = self.conversation.generate(
            self.settings.platform,
            self.settings.theme,
            presentation.contact_name,
        );

        match cancellable(generation).await {
            Some(transcript) => self.transcript = transcript,
            None => {
                self.draw(false);
                notice("generation cancelled");

                return;
            }
        }

        self.draw(false);
    }

    async fn send(&mut self, text: String) {
        let settings = &self.settings;
        let clear_screen = self.clear_screen;

        let exchange = self.replies.exchange(
            settings.platform,
            settings.theme,
            &mut self.transcript,
            text,
            settings.reply_delay,
            |transcript| draw_screen(&settings.presentation, transcript, true, clear_screen),
        );

        let replied = cancellable(exchange).await.is_some();

        self.draw(false);

        if !replied {
            notice("reply cancelled");
        }
    }

    /// Returns false when the session should end
    async fn run_command(&mut self, command: Command) -> bool {
        match command {
            Command::Exit => return false,
            Command::Regenerate => self.regenerate().await,
            Command::Clear => {
                self.transcript.clear();
                self.draw(false);
            }
            Command::Save(path) => match save_transcript(&self.transcript, &path) {
                Ok(()) => notice(&format!("saved transcript to {}", path.display())),
                Err(err) => warn!("failed to save transcript to {}: {}", path.display(), err),
            },
        }

        true
    }

    pub(crate) async fn run(mut self) {
        notice(&format!(
            "{} version {}, type /exit to quit",
            version::NAME,
            version::VERSION
        ));

        self.regenerate().await;

        let mut repl = Repl::new(
            self.settings.keybindings,
            self.settings.presentation.me_name,
        );

        loop {
            match repl.read() {
                Input::Message(text) => self.send(text).await,
                Input::Command(command) => {
                    if !self.run_command(command).await {
                        break;
                    }
                }
                Input::Invalid(err) => warn!("{}", err),
                Input::Eof => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Sender;
    use crate::generate::testing::ScriptedProvider;

    fn settings() -> SessionSettings<'static> {
        SessionSettings {
            platform: PlatformKind::WhatsApp,
            theme: ThemeKind::Friendly,
            presentation: Presentation {
                platform: PlatformKind::WhatsApp,
                contact_name: "Sam",
                me_name: "Me",
                width: 40,
            },
            keybindings: Keybindings::Emacs,
            reply_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_send_quotes_message_once() {
        let provider = ScriptedProvider::text(r#"{"content": "sounds good"}"#);
        let mut session = Session::new(settings(), &provider, "scripted");

        session.transcript.push(Message::theirs("lunch?".to_string(), None));
        session.send("SAY_IT_ONCE".to_string()).await;

        let contents: Vec<(Sender, &str)> = session
            .transcript
            .iter()
            .map(|m| (m.sender, m.content.as_str()))
            .collect();

        assert_eq!(
            contents,
            [
                (Sender::Them, "lunch?"),
                (Sender::Me, "SAY_IT_ONCE"),
                (Sender::Them, "sounds good"),
            ]
        );

        let requests = provider.requests();

        assert_eq!(requests[0].system.matches("SAY_IT_ONCE").count(), 1);
    }

    #[tokio::test]
    async fn test_cancellable_completes() {
        assert_eq!(cancellable(async { 7 }).await, Some(7));
    }

    #[test]
    fn test_save_transcript() {
        let mut transcript = Transcript::new();
        transcript.push(Message::mine("saved?".to_string()));

        let path = std::env::temp_dir().join(format!("mockchat-save-{}.json", std::process::id()));

        save_transcript(&transcript, &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        let messages: Vec<Message> = serde_json::from_str(&raw).unwrap();

        assert_eq!(Transcript::from_messages(messages).unwrap(), transcript);
    }
}
