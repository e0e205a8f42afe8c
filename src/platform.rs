//! The messaging apps a transcript can be styled after.
//!
//! Everything that differs between platforms lives in the [`PLATFORMS`] table: the
//! slang the model is asked to use and the skin the renderer paints with. Adding a
//! platform means adding a variant and a table row.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::render::skin::{self, Skin};

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
#[serde(rename_all = "lowercase")]
pub(crate) enum PlatformKind {
    #[default]
    #[value(name = "instagram")]
    Instagram,
    #[value(name = "whatsapp")]
    WhatsApp,
    #[value(name = "tiktok")]
    TikTok,
    #[value(name = "tinder")]
    Tinder,
}

pub(crate) struct PlatformProfile {
    pub kind: PlatformKind,
    /// The proper name of the app, as used in prompts and headers
    pub name: &'static str,
    /// How people write on this platform
    pub style_rule: &'static str,
    pub skin: &'static Skin,
}

/// Indexed by `PlatformKind as usize`
static PLATFORMS: [PlatformProfile; 4] = [
    PlatformProfile {
        kind: PlatformKind::Instagram,
        name: "Instagram",
        style_rule: "Use GenZ casual slang, lowercase usually, 'u' instead of 'you'.",
        skin: &skin::INSTAGRAM,
    },
    PlatformProfile {
        kind: PlatformKind::WhatsApp,
        name: "WhatsApp",
        style_rule: "Slightly more formal or casual depending on relationship, uses emojis often.",
        skin: &skin::WHATSAPP,
    },
    PlatformProfile {
        kind: PlatformKind::TikTok,
        name: "TikTok",
        style_rule: "Very short, brainrot slang (cooked, ate, real), trends.",
        skin: &skin::TIKTOK,
    },
    PlatformProfile {
        kind: PlatformKind::Tinder,
        name: "Tinder",
        style_rule: "Flirty, direct, or awkward depending on theme.",
        skin: &skin::TINDER,
    },
];

impl PlatformKind {
    pub(crate) fn profile(self) -> &'static PlatformProfile {
        &PLATFORMS[self as usize]
    }

    pub(crate) fn name(self) -> &'static str {
        self.profile().name
    }

    pub(crate) fn style_rule(self) -> &'static str {
        self.profile().style_rule
    }

    pub(crate) fn skin(self) -> &'static Skin {
        self.profile().skin
    }

    pub(crate) fn all() -> &'static [PlatformProfile] {
        &PLATFORMS
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
