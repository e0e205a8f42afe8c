//! The registry handles provider and model resolution. It is populated with the
//! providers which are active for this run: a provider whose credentials are missing,
//! or whose server does not answer, is never inserted. When the user chooses a model
//! it is named with a "model spec", and the registry resolves the provider and model
//! from that identifier.
//!
//! A spec has two parts, the provider identifier and the model identifier. In BNF:
//! ```text
//! <model spec> := <model identifier> | <provider identifier> "/" <model identifier>
//! ```
//!
//! For example, `gemini/gemini-2.5-flash` pins the Gemini provider. A bare
//! `llama3.1` is served by whichever active provider lists it. When no spec is given,
//! the default model of the highest-priority provider is used.
//!
//! Each provider is assigned an eight bit priority, where 0 is the lowest (a provider
//! of last resort) and 255 the highest. When several providers serve the same model,
//! the highest priority one is chosen. Ties are broken by the order of
//! [`ProviderIdentifier`](crate::providers::providers::ProviderIdentifier).

mod default_priority;
pub(crate) mod populate;
pub(crate) mod registry;
