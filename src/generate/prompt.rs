//! Prompt construction. The platform and theme tables supply every piece of style
//! text; nothing here branches on a particular platform or theme.

use std::fmt::Write;

use crate::chat::Transcript;
use crate::generate::schema::{MAX_MESSAGES, MIN_MESSAGES};
use crate::platform::PlatformKind;
use crate::theme::ThemeKind;

/// The number of trailing messages quoted back to the model when replying
pub(crate) const REPLY_HISTORY_LIMIT: usize = 20;

/// Quotes user-controlled text so that it cannot break out of the instruction
fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

pub(crate) fn conversation_instruction(
    platform: PlatformKind,
    theme: ThemeKind,
    contact_name: &str,
) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "You are a creative writer designed to generate realistic text message conversations for social media screenshots."
    );
    let _ = writeln!(
        out,
        "Generate a short conversation ({}-{} messages) between two people using the specific slang and style typical for the platform '{}'.",
        MIN_MESSAGES, MAX_MESSAGES, platform
    );
    let _ = writeln!(
        out,
        "The conversation should strictly follow the theme: '{}'.",
        theme
    );
    let _ = writeln!(
        out,
        "The participants are 'me' (the user taking the screenshot) and 'them' (the person named {}).",
        quoted(contact_name)
    );

    let _ = writeln!(out, "\nPlatform Styles:");
    for profile in PlatformKind::all() {
        let _ = writeln!(out, "- If '{}': {}", profile.name, profile.style_rule);
    }

    let _ = writeln!(out, "\nTheme Guidelines:");
    for profile in ThemeKind::all() {
        let _ = writeln!(out, "- '{}': {}", profile.label, profile.guideline);
    }

    let _ = writeln!(
        out,
        "\nEnsure the conversation flows naturally and feels authentic to the selected theme and platform."
    );
    let _ = writeln!(
        out,
        "The speakers do not need to strictly alternate, but the conversation MUST end with a message from 'them'."
    );

    out
}

pub(crate) fn conversation_prompt(platform: PlatformKind, theme: ThemeKind) -> String {
    format!("Generate a {} conversation for {}.", theme, platform)
}

pub(crate) fn reply_instruction(
    platform: PlatformKind,
    theme: ThemeKind,
    history: &Transcript,
    utterance: &str,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "You are roleplaying as 'them' in a chat on {}.", platform);
    let _ = writeln!(out, "The theme of the chat is '{}'.", theme);

    let skip = history.len().saturating_sub(REPLY_HISTORY_LIMIT);

    if !history.is_empty() {
        let _ = writeln!(out, "\nThe conversation so far:");

        for msg in history.iter().skip(skip) {
            let _ = writeln!(out, "{}: {}", msg.sender, quoted(&msg.content));
        }
    }

    let _ = writeln!(
        out,
        "\nThe user ('me') just sent a message: {}.",
        quoted(utterance)
    );
    let _ = writeln!(
        out,
        "\nYour goal is to reply with a POSITIVE attitude, regardless of the previous mood."
    );
    let _ = writeln!(
        out,
        "You should act like you LIKED the last message from 'me'."
    );
    let _ = writeln!(
        out,
        "Keep the reply short and consistent with the platform style ({}): {}",
        platform,
        platform.style_rule()
    );

    out
}

pub(crate) fn reply_prompt(utterance: &str) -> String {
    format!("Generate a reply to {}", quoted(utterance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Message;

    #[test]
    fn test_conversation_instruction_contents() {
        let text =
            conversation_instruction(PlatformKind::TikTok, ThemeKind::RedFlag, "Jordan \"J\"");

        assert!(text.contains("platform 'TikTok'"));
        assert!(text.contains("theme: 'Red Flag'"));
        assert!(text.contains("(5-8 messages)"));
        assert!(text.contains(r#"the person named "Jordan \"J\"""#));
        assert!(text.contains("MUST end with a message from 'them'"));

        for profile in PlatformKind::all() {
            assert!(text.contains(profile.style_rule));
        }

        for profile in ThemeKind::all() {
            assert!(text.contains(profile.guideline));
        }
    }

    #[test]
    fn test_conversation_prompt() {
        assert_eq!(
            conversation_prompt(PlatformKind::WhatsApp, ThemeKind::Breakup),
            "Generate a Breakup conversation for WhatsApp."
        );
    }

    #[test]
    fn test_reply_instruction_is_positive_for_every_theme() {
        let history = Transcript::new();

        for profile in ThemeKind::all() {
            let text = reply_instruction(PlatformKind::Instagram, profile.kind, &history, "hi");

            assert!(text.contains("POSITIVE attitude"));
            assert!(text.contains("LIKED the last message"));
        }
    }

    #[test]
    fn test_reply_instruction_quotes_recent_history() {
        let mut history = Transcript::new();

        for i in 0..(REPLY_HISTORY_LIMIT + 5) {
            history.push(Message::mine(format!("line {}", i)));
        }

        history.push(Message::theirs("ok\nsure".to_string(), None));

        let text = reply_instruction(PlatformKind::Tinder, ThemeKind::Ex, &history, "so?");

        assert!(!text.contains("\"line 0\""));
        assert!(text.contains("me: \"line 24\""));
        assert!(text.contains("them: \"ok\\nsure\""));
        assert!(text.contains("just sent a message: \"so?\"."));
        assert!(text.contains(PlatformKind::Tinder.style_rule()));
    }

    #[test]
    fn test_reply_prompt_escapes_quotes() {
        assert_eq!(
            reply_prompt("say \"hi\""),
            r#"Generate a reply to "say \"hi\"""#
        );
    }
}
