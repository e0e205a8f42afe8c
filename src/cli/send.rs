use std::io::{self, IsTerminal, Read};
use std::path::Path;
use std::time::Duration;

use crate::chat::{Message, Transcript};
use crate::cli::output::{OutputFormat, Presentation};
use crate::cli::resolve_model_or_die;
use crate::config::Config;
use crate::die;
use crate::generate::ReplyGenerator;
use crate::registry::registry::Registry;
use crate::SendArgs;

#[derive(thiserror::Error, Debug)]
pub(crate) enum TranscriptReadError {
    #[error("failed to read the transcript: {0}")]
    Io(#[from] io::Error),
    #[error("the transcript is not a JSON array of messages: {0}")]
    Json(#[from] serde_json::Error),
    #[error("the transcript is invalid: {0}")]
    Invalid(#[from] crate::chat::TranscriptError),
}

pub(crate) fn parse_transcript(raw: &str) -> Result<Transcript, TranscriptReadError> {
    if raw.trim().is_empty() {
        return Ok(Transcript::new());
    }

    let messages: Vec<Message> = serde_json::from_str(raw)?;

    Ok(Transcript::from_messages(messages)?)
}

/// Reads from the file if one is named, otherwise from stdin unless it is a terminal
fn read_transcript(path: Option<&Path>) -> Result<Transcript, TranscriptReadError> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None if io::stdin().is_terminal() => String::new(),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    parse_transcript(&raw)
}

pub(crate) async fn send_cmd(config: &Config, registry: &Registry, args: &SendArgs) {
    if args.text.trim().is_empty() {
        die!("refusing to send an empty message");
    }

    let mut transcript = match read_transcript(args.transcript.as_deref()) {
        Ok(transcript) => transcript,
        Err(err) => die!("{}", err),
    };

    let platform = args.platform.unwrap_or(config.defaults.platform);
    let theme = args.theme.unwrap_or(config.defaults.theme);

    let spec = args.model.as_deref().or(config.default_model.as_deref());
    let (provider, model) = resolve_model_or_die(registry, spec).await;

    ReplyGenerator::new(provider, &model)
        .exchange(
            platform,
            theme,
            &mut transcript,
            args.text.clone(),
            Duration::ZERO,
            |_| {},
        )
        .await;

    let presentation = Presentation {
        platform,
        contact_name: args
            .contact
            .as_deref()
            .unwrap_or(&config.defaults.contact_name),
        me_name: args.me.as_deref().unwrap_or(&config.defaults.me_name),
        width: args.width,
    };

    presentation.print(&transcript, OutputFormat::resolve(args.format));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_is_an_empty_transcript() {
        assert!(parse_transcript(" \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_transcript() {
        let raw = r#"[
            {"id": "a", "sender": "them", "content": "hi", "time": "9:00"},
            {"id": "b", "sender": "me", "content": "hey"}
        ]"#;

        let transcript = parse_transcript(raw).unwrap();

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last().unwrap().content, "hey");
    }

    #[test]
    fn test_rejects_bad_transcripts() {
        assert!(matches!(
            parse_transcript(r#"{"messages": []}"#),
            Err(TranscriptReadError::Json(_))
        ));

        let duplicate = r#"[
            {"id": "a", "sender": "them", "content": "hi"},
            {"id": "a", "sender": "me", "content": "hey"}
        ]"#;

        assert!(matches!(
            parse_transcript(duplicate),
            Err(TranscriptReadError::Invalid(_))
        ));
    }
}
