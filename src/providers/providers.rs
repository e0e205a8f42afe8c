//! Concrete types for providers, along with their provider alias variants

use serde::Serialize;
use strum_macros;

/// The `ProviderIdentifier` is a unique per-provider identifier. It is used to
/// differentiate providers at runtime in code which is generic over different
/// providers.
///
/// The `to_string` and `FromStr` are part of the CLI and should remain stable.
#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum ProviderIdentifier {
    Gemini,
    Ollama,
    OpenAI,
}

pub(crate) use super::gemini::GeminiProvider;
pub(crate) use super::ollama::OllamaProvider;
pub(crate) use super::openai::OpenAIProvider;
