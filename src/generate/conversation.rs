use crate::chat::{Message, Sender, Transcript};
use crate::generate::schema::{
    GeneratedConversation, CONVERSATION_SCHEMA, MAX_MESSAGES, MIN_MESSAGES,
};
use crate::generate::{complete, fallback, log_fallback, prompt, GenerationError};
use crate::platform::PlatformKind;
use crate::providers::{ChatProvider, StructuredRequest};
use crate::theme::ThemeKind;

/// Produces the opening transcript of a chat
pub(crate) struct ConversationGenerator<'p> {
    provider: &'p dyn ChatProvider,
    model: String,
}

impl<'p> ConversationGenerator<'p> {
    pub(crate) fn new(provider: &'p dyn ChatProvider, model: &str) -> ConversationGenerator<'p> {
        ConversationGenerator {
            provider,
            model: model.to_string(),
        }
    }

    /// Generates 5-8 messages ending on the contact's turn. On any failure the
    /// fixed three-message fallback is returned instead.
    pub(crate) async fn generate(
        &self,
        platform: PlatformKind,
        theme: ThemeKind,
        contact_name: &str,
    ) -> Transcript {
        match self.try_generate(platform, theme, contact_name).await {
            Ok(transcript) => transcript,
            Err(err) => {
                log_fallback("conversation", &err);

                fallback::conversation()
            }
        }
    }

    pub(crate) async fn try_generate(
        &self,
        platform: PlatformKind,
        theme: ThemeKind,
        contact_name: &str,
    ) -> Result<Transcript, GenerationError> {
        let system = prompt::conversation_instruction(platform, theme, contact_name);
        let user = prompt::conversation_prompt(platform, theme);

        let request = StructuredRequest {
            system: &system,
            prompt: &user,
            schema: &CONVERSATION_SCHEMA,
        };

        let text = complete(self.provider, &self.model, &request).await?;

        let generated: GeneratedConversation = serde_json::from_str(&text)?;

        into_transcript(generated)
    }
}

fn into_transcript(generated: GeneratedConversation) -> Result<Transcript, GenerationError> {
    let count = generated.messages.len();

    if !(MIN_MESSAGES..=MAX_MESSAGES).contains(&count) {
        return Err(GenerationError::SchemaViolation(format!(
            "expected between {} and {} messages, got {}",
            MIN_MESSAGES, MAX_MESSAGES, count
        )));
    }

    match generated.messages.last() {
        Some(last) if last.sender == Sender::Them => {}
        _ => {
            return Err(GenerationError::SchemaViolation(
                "the conversation must end with a message from them".to_string(),
            ))
        }
    }

    let mut transcript = Transcript::new();

    for (i, msg) in generated.messages.into_iter().enumerate() {
        let content = msg.content.trim();

        if content.is_empty() {
            return Err(GenerationError::SchemaViolation(format!(
                "message {} has no content",
                i
            )));
        }

        let time = msg
            .time
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        transcript.push(Message::new(msg.sender, content.to_string(), time));
    }

    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::generate::fallback::FALLBACK_CONVERSATION;
    use crate::generate::testing::{Outcome, ScriptedProvider};
    use crate::providers::ErrorKind;

    const SIX_MESSAGES: &str = r#"{"messages": [
        {"sender": "them", "content": "u up?", "time": "11:58 PM"},
        {"sender": "me", "content": "maybe"},
        {"sender": "them", "content": "be so fr rn"},
        {"sender": "me", "content": "ok yes im up"},
        {"sender": "me", "content": "why"},
        {"sender": "them", "content": "no reason 😇", "time": " "}
    ]}"#;

    fn assert_fallback(transcript: &Transcript) {
        assert_eq!(transcript.len(), FALLBACK_CONVERSATION.len());

        for (msg, (sender, content)) in transcript.iter().zip(FALLBACK_CONVERSATION) {
            assert_eq!(msg.sender, sender);
            assert_eq!(msg.content, content);
            assert_eq!(msg.time.as_deref(), Some("Now"));
        }
    }

    fn assert_unique_ids(transcript: &Transcript) {
        let ids: HashSet<&str> = transcript.iter().map(|m| m.id.as_str()).collect();

        assert_eq!(ids.len(), transcript.len());
        assert!(ids.iter().all(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn test_success_shape() {
        let provider = ScriptedProvider::text(SIX_MESSAGES);
        let generator = ConversationGenerator::new(&provider, "scripted");

        let transcript = generator
            .generate(PlatformKind::Instagram, ThemeKind::Flirty, "Sam")
            .await;

        assert!((MIN_MESSAGES..=MAX_MESSAGES).contains(&transcript.len()));
        assert_eq!(transcript.last().unwrap().sender, Sender::Them);
        assert_unique_ids(&transcript);

        // Model times are kept, blank ones dropped
        assert_eq!(transcript.messages()[0].time.as_deref(), Some("11:58 PM"));
        assert!(transcript.last().unwrap().time.is_none());
    }

    #[tokio::test]
    async fn test_request_uses_conversation_schema() {
        let provider = ScriptedProvider::text(SIX_MESSAGES);
        let generator = ConversationGenerator::new(&provider, "some-model");

        generator
            .generate(PlatformKind::WhatsApp, ThemeKind::Gossip, "Aunt May")
            .await;

        let requests = provider.requests();

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "some-model");
        assert_eq!(requests[0].schema, "conversation");
        assert_eq!(requests[0].prompt, "Generate a Gossip conversation for WhatsApp.");
        assert!(requests[0].system.contains("\"Aunt May\""));
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back() {
        for kind in [
            ErrorKind::Connection,
            ErrorKind::TimedOut,
            ErrorKind::Authentication,
            ErrorKind::InternalError,
        ] {
            let provider = ScriptedProvider::failing(kind);
            let generator = ConversationGenerator::new(&provider, "scripted");

            let transcript = generator
                .generate(PlatformKind::TikTok, ThemeKind::Toxic, "Riley")
                .await;

            assert_fallback(&transcript);
            assert_unique_ids(&transcript);
        }
    }

    #[tokio::test]
    async fn test_bad_payloads_fall_back() {
        let too_short = r#"{"messages": [
            {"sender": "me", "content": "hi"},
            {"sender": "them", "content": "hey"}
        ]}"#;

        let ends_on_me = r#"{"messages": [
            {"sender": "them", "content": "1"},
            {"sender": "me", "content": "2"},
            {"sender": "them", "content": "3"},
            {"sender": "me", "content": "4"},
            {"sender": "me", "content": "5"}
        ]}"#;

        let blank_content = r#"{"messages": [
            {"sender": "them", "content": "1"},
            {"sender": "me", "content": "   "},
            {"sender": "them", "content": "3"},
            {"sender": "me", "content": "4"},
            {"sender": "them", "content": "5"}
        ]}"#;

        let outcomes = vec![
            Outcome::Text("not json at all".to_string()),
            Outcome::Text(r#"{"conversation": []}"#.to_string()),
            Outcome::Text(too_short.to_string()),
            Outcome::Text(ends_on_me.to_string()),
            Outcome::Text(blank_content.to_string()),
            Outcome::Empty,
            Outcome::Truncated,
        ];
        let attempts = outcomes.len();

        let provider = ScriptedProvider::new(outcomes);
        let generator = ConversationGenerator::new(&provider, "scripted");

        for _ in 0..attempts {
            let transcript = generator
                .generate(PlatformKind::Tinder, ThemeKind::Dating, "Alex")
                .await;

            assert_fallback(&transcript);
        }
    }

    #[tokio::test]
    async fn test_violations_are_reported() {
        let provider = ScriptedProvider::new(vec![
            Outcome::Text("[]".to_string()),
            Outcome::Empty,
            Outcome::Truncated,
        ]);
        let generator = ConversationGenerator::new(&provider, "scripted");

        let malformed = generator
            .try_generate(PlatformKind::Instagram, ThemeKind::Ex, "Pat")
            .await;
        let empty = generator
            .try_generate(PlatformKind::Instagram, ThemeKind::Ex, "Pat")
            .await;
        let truncated = generator
            .try_generate(PlatformKind::Instagram, ThemeKind::Ex, "Pat")
            .await;

        assert!(matches!(malformed, Err(GenerationError::Malformed(_))));
        assert!(matches!(empty, Err(GenerationError::EmptyResponse)));
        assert!(matches!(truncated, Err(GenerationError::Incomplete(_))));
    }
}
