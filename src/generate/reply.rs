use std::time::Duration;

use crate::chat::{Message, Transcript, NOW};
use crate::generate::schema::{GeneratedReply, REPLY_SCHEMA};
use crate::generate::{complete, fallback, log_fallback, prompt, GenerationError};
use crate::platform::PlatformKind;
use crate::providers::{ChatProvider, StructuredRequest};
use crate::theme::ThemeKind;

pub(crate) struct ReplyGenerator<'p> {
    provider: &'p dyn ChatProvider,
    model: String,
}

impl<'p> ReplyGenerator<'p> {
    pub(crate) fn new(provider: &'p dyn ChatProvider, model: &str) -> ReplyGenerator<'p> {
        ReplyGenerator {
            provider,
            model: model.to_string(),
        }
    }

    /// Produces the contact's answer to `utterance`. The history is only read;
    /// appending the user's message and the reply is left to the caller.
    pub(crate) async fn reply(
        &self,
        platform: PlatformKind,
        theme: ThemeKind,
        history: &Transcript,
        utterance: &str,
    ) -> Message {
        match self.try_reply(platform, theme, history, utterance).await {
            Ok(msg) => msg,
            Err(err) => {
                log_fallback("reply", &err);

                fallback::reply()
            }
        }
    }

    /// Sends `text` as the user and appends the contact's reply. The reply is
    /// generated from the history as it stood before `text` was sent.
    ///
    /// `on_sent` sees the transcript once the user's message is in place. The reply
    /// is appended no sooner than `min_delay` after the request starts. If the
    /// returned future is dropped early, the user's message stays and no reply is
    /// appended.
    pub(crate) async fn exchange<F: FnOnce(&Transcript)>(
        &self,
        platform: PlatformKind,
        theme: ThemeKind,
        transcript: &mut Transcript,
        text: String,
        min_delay: Duration,
        on_sent: F,
    ) {
        let history = transcript.clone();

        transcript.push(Message::mine(text.clone()));
        on_sent(transcript);

        let (reply, ()) = tokio::join!(
            self.reply(platform, theme, &history, &text),
            tokio::time::sleep(min_delay),
        );

        transcript.push(reply);
    }

    pub(crate) async fn try_reply(
        &self,
        platform: PlatformKind,
        theme: ThemeKind,
        history: &Transcript,
        utterance: &str,
    ) -> Result<Message, GenerationError> {
        let system = prompt::reply_instruction(platform, theme, history, utterance);
        let user = prompt::reply_prompt(utterance);

        let request = StructuredRequest {
            system: &system,
            prompt: &user,
            schema: &REPLY_SCHEMA,
        };

        let text = complete(self.provider, &self.model, &request).await?;

        let generated: GeneratedReply = serde_json::from_str(&text)?;

        let content = generated.content.trim();

        if content.is_empty() {
            return Err(GenerationError::SchemaViolation(
                "the reply has no content".to_string(),
            ));
        }

        let time = generated
            .time
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NOW.to_string());

        Ok(Message::theirs(content.to_string(), Some(time)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::chat::Sender;
    use crate::generate::fallback::FALLBACK_REPLY;
    use crate::generate::testing::{Outcome, ScriptedProvider};
    use crate::providers::ErrorKind;

    fn history() -> Transcript {
        let mut history = Transcript::new();

        history.push(Message::theirs("wyd".to_string(), Some("9:40".to_string())));
        history.push(Message::mine("nothing much".to_string()));
        history.push(Message::theirs("cool cool".to_string(), None));

        history
    }

    #[tokio::test]
    async fn test_reply_success() {
        let provider = ScriptedProvider::text(r#"{"content": "  omg stop 😂 ", "time": "9:43"}"#);
        let generator = ReplyGenerator::new(&provider, "scripted");

        let msg = generator
            .reply(PlatformKind::WhatsApp, ThemeKind::Bestie, &history(), "guess what")
            .await;

        assert_eq!(msg.sender, Sender::Them);
        assert_eq!(msg.content, "omg stop 😂");
        assert_eq!(msg.time.as_deref(), Some("9:43"));
        assert!(!msg.id.is_empty());

        let requests = provider.requests();

        assert_eq!(requests[0].schema, "reply");
        assert_eq!(requests[0].prompt, "Generate a reply to \"guess what\"");
        assert!(requests[0].system.contains("me: \"nothing much\""));
    }

    #[tokio::test]
    async fn test_missing_time_is_now() {
        let provider = ScriptedProvider::text(r#"{"content": "ok!"}"#);
        let generator = ReplyGenerator::new(&provider, "scripted");

        let msg = generator
            .reply(PlatformKind::Instagram, ThemeKind::Flirty, &Transcript::new(), "hi")
            .await;

        assert_eq!(msg.time.as_deref(), Some(NOW));
    }

    #[tokio::test]
    async fn test_history_is_not_mutated() {
        let provider = ScriptedProvider::text(r#"{"content": "sure"}"#);
        let generator = ReplyGenerator::new(&provider, "scripted");

        let history = history();
        let before = history.clone();

        generator
            .reply(PlatformKind::Tinder, ThemeKind::Dating, &history, "dinner?")
            .await;

        assert_eq!(history, before);
    }

    #[tokio::test]
    async fn test_failure_returns_fallback() {
        let provider = ScriptedProvider::failing(ErrorKind::Connection);
        let generator = ReplyGenerator::new(&provider, "scripted");

        let msg = generator
            .reply(PlatformKind::Instagram, ThemeKind::Flirty, &Transcript::new(), "hello")
            .await;

        assert_eq!(msg.sender, Sender::Them);
        assert_eq!(msg.content, FALLBACK_REPLY);
        assert_eq!(msg.content, "Haha, nice one! ❤️");
        assert_eq!(msg.time.as_deref(), Some(NOW));
    }

    async fn run_exchange(provider: &ScriptedProvider, text: &str) -> (Transcript, Transcript) {
        let generator = ReplyGenerator::new(provider, "scripted");

        let before = history();
        let mut transcript = before.clone();
        let mut seen_on_send = None;

        generator
            .exchange(
                PlatformKind::Instagram,
                ThemeKind::Crush,
                &mut transcript,
                text.to_string(),
                Duration::ZERO,
                |t| seen_on_send = Some(t.clone()),
            )
            .await;

        let seen_on_send = seen_on_send.unwrap();

        assert_eq!(seen_on_send.len(), before.len() + 1);
        assert_eq!(seen_on_send.last().unwrap().content, text);

        assert_eq!(transcript.len(), before.len() + 2);
        assert_eq!(&transcript.messages()[..before.len()], before.messages());

        let ids: HashSet<&str> = transcript.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids.len(), transcript.len());

        (before, transcript)
    }

    #[tokio::test]
    async fn test_exchange_appends_mine_then_theirs() {
        let text = "  lol are u serious?? 😳 ";
        let provider = ScriptedProvider::text(r#"{"content": "dead serious", "time": "9:44"}"#);

        let (before, transcript) = run_exchange(&provider, text).await;

        let sent = &transcript.messages()[before.len()];
        let reply = transcript.last().unwrap();

        assert_eq!(sent.sender, Sender::Me);
        assert_eq!(sent.content, text);
        assert_eq!(reply.sender, Sender::Them);
        assert_eq!(reply.content, "dead serious");
    }

    #[tokio::test]
    async fn test_exchange_history_excludes_new_message() {
        let text = "ONLY_ONCE_PLEASE";
        let provider = ScriptedProvider::text(r#"{"content": "ok"}"#);

        run_exchange(&provider, text).await;

        let requests = provider.requests();

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system.matches(text).count(), 1);
        assert!(requests[0].system.contains("me: \"nothing much\""));
    }

    #[tokio::test]
    async fn test_exchange_fallback_keeps_message() {
        let provider = ScriptedProvider::failing(ErrorKind::TimedOut);

        let (_, transcript) = run_exchange(&provider, "hello").await;

        let messages = transcript.messages();
        let sent = &messages[messages.len() - 2];

        assert_eq!(sent.sender, Sender::Me);
        assert_eq!(sent.content, "hello");
        assert_eq!(transcript.last().unwrap().sender, Sender::Them);
        assert_eq!(transcript.last().unwrap().content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_bad_payloads_return_fallback() {
        let provider = ScriptedProvider::new(vec![
            Outcome::Text(r#"{"content": "   "}"#.to_string()),
            Outcome::Text(r#"{"text": "wrong field"}"#.to_string()),
            Outcome::Empty,
            Outcome::Truncated,
        ]);
        let generator = ReplyGenerator::new(&provider, "scripted");

        for _ in 0..4 {
            let msg = generator
                .reply(PlatformKind::TikTok, ThemeKind::Argument, &history(), "whatever")
                .await;

            assert_eq!(msg.content, FALLBACK_REPLY);
        }
    }
}
