//! An umbrella module for the Gemini provider

mod api;
mod models;
mod provider;

pub(crate) use self::provider::GeminiProvider;
