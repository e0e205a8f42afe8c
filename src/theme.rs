//! Conversation themes ("vibes") which control the emotional register of a
//! generated transcript.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum ThemeKind {
    #[default]
    Flirty,
    Crush,
    Dating,
    Friendly,
    Bestie,
    Professional,
    Stranger,
    Ignore,
    RedFlag,
    Toxic,
    Argument,
    Breakup,
    Ex,
    Gossip,
}

pub(crate) struct ThemeProfile {
    pub kind: ThemeKind,
    pub label: &'static str,
    pub guideline: &'static str,
}

/// Indexed by `ThemeKind as usize`
static THEMES: [ThemeProfile; 14] = [
    ThemeProfile {
        kind: ThemeKind::Flirty,
        label: "Flirty",
        guideline: "Playful, romantic interest, emojis, teasing.",
    },
    ThemeProfile {
        kind: ThemeKind::Crush,
        label: "Crush",
        guideline: "Nervous, excited, subtle hints, trying to impress.",
    },
    ThemeProfile {
        kind: ThemeKind::Dating,
        label: "Dating",
        guideline: "Planning a date, discussing logistics, \"getting to know you\" phase.",
    },
    ThemeProfile {
        kind: ThemeKind::Friendly,
        label: "Friendly",
        guideline: "Casual, checking in, making plans, low stakes.",
    },
    ThemeProfile {
        kind: ThemeKind::Bestie,
        label: "Bestie",
        guideline: "High energy, inside jokes, slang, gossip, \"tea\", CAPS LOCK for emphasis.",
    },
    ThemeProfile {
        kind: ThemeKind::Professional,
        label: "Professional",
        guideline: "Polite, work-related, formal grammar, no slang, \"Per my last email\" energy.",
    },
    ThemeProfile {
        kind: ThemeKind::Stranger,
        label: "Stranger",
        guideline: "Awkward, \"who is this?\", marketplace inquiry, or wrong number.",
    },
    ThemeProfile {
        kind: ThemeKind::Ignore,
        label: "Ignore",
        guideline: "'them' is dry/short replies (one word), 'me' is trying too hard or double texting.",
    },
    ThemeProfile {
        kind: ThemeKind::RedFlag,
        label: "Red Flag",
        guideline: "'them' is love bombing, controlling, weirdly aggressive, or narcissistic.",
    },
    ThemeProfile {
        kind: ThemeKind::Toxic,
        label: "Toxic",
        guideline: "Manipulative, gaslighting, mean, playing victim.",
    },
    ThemeProfile {
        kind: ThemeKind::Argument,
        label: "Argument",
        guideline: "Conflict, angry, defensive, short snappy sentences.",
    },
    ThemeProfile {
        kind: ThemeKind::Breakup,
        label: "Breakup",
        guideline: "Sad, serious, \"we need to talk\", closure or lack thereof.",
    },
    ThemeProfile {
        kind: ThemeKind::Ex,
        label: "Ex",
        guideline: "Nostalgic, bitter, \"miss you\" texts at 2am, or awkward reconnecting.",
    },
    ThemeProfile {
        kind: ThemeKind::Gossip,
        label: "Gossip",
        guideline: "Sharing secrets, \"did you hear about...\", shocked reactions.",
    },
];

impl ThemeKind {
    pub(crate) fn profile(self) -> &'static ThemeProfile {
        &THEMES[self as usize]
    }

    pub(crate) fn label(self) -> &'static str {
        self.profile().label
    }

    pub(crate) fn guideline(self) -> &'static str {
        self.profile().guideline
    }

    pub(crate) fn all() -> &'static [ThemeProfile] {
        &THEMES
    }
}

impl fmt::Display for ThemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_table_is_indexed_by_variant() {
        for kind in ThemeKind::iter() {
            assert_eq!(kind.profile().kind, kind);
        }

        assert_eq!(ThemeKind::iter().count(), 14);
    }

    #[test]
    fn test_red_flag_names() {
        assert_eq!(ThemeKind::RedFlag.to_string(), "Red Flag");
        assert_eq!(
            ThemeKind::from_str("red-flag", false).unwrap(),
            ThemeKind::RedFlag
        );

        let kind: ThemeKind = serde_json::from_str("\"red-flag\"").unwrap();
        assert_eq!(kind, ThemeKind::RedFlag);
    }
}
