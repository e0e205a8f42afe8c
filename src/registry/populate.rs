use std::env::VarError;
use std::time::Duration;

use crate::die;

use super::registry::Registry;
use crate::config::{self, Config, ProviderActivationPolicy};
use crate::providers::providers::{
    GeminiProvider, OllamaProvider, OpenAIProvider, ProviderIdentifier,
};
use crate::providers::{ChatProvider, Error, ErrorKind, HttpClient};

/// Ollama runs locally; if it has not answered by then it is not running
const OLLAMA_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

const GEMINI_ENV_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];
const OPENAI_ENV_KEY_VARS: [&str; 1] = ["OPENAI_API_KEY"];

fn env_api_key(vars: &[&str]) -> Option<String> {
    for var in vars {
        match std::env::var(var) {
            Ok(api_key) if !api_key.trim().is_empty() => return Some(api_key.trim().to_string()),
            Ok(_) | Err(VarError::NotPresent) => continue,
            Err(VarError::NotUnicode(_)) => die!("failed to parse {}", var),
        }
    }

    None
}

/// Picks the API key for a keyed provider according to its activation policy
fn activated_key(
    id: ProviderIdentifier,
    settings: &config::Provider,
    env_vars: &[&str],
) -> Option<String> {
    let api_key = settings.api_key.clone().or_else(|| env_api_key(env_vars));

    match settings.activate {
        ProviderActivationPolicy::Auto => api_key,
        ProviderActivationPolicy::Enabled => {
            if api_key.is_none() {
                die!(
                    "the \"{}\" provider is activated but the API key is not defined, either add it to the config or define {}",
                    id,
                    env_vars.join(" or ")
                );
            }

            api_key
        }
        ProviderActivationPolicy::Disabled => None,
    }
}

fn register(
    registry: &mut Registry,
    provider: Result<impl ChatProvider + 'static, Error>,
    settings: &config::Provider,
    id: ProviderIdentifier,
) {
    match provider {
        Ok(provider) => {
            tracing::debug!(provider = %id, "provider activated");

            registry.add_provider(
                Box::new(provider),
                settings.priority,
                settings.default_model.clone(),
            );
        }
        Err(err) => die!("failed to configure the \"{}\" provider: {}", id, err),
    }
}

fn ollama_provider(settings: &config::Provider, client: HttpClient) -> Result<OllamaProvider, Error> {
    match &settings.api_base {
        Some(api_base) => OllamaProvider::with_api_base(api_base.as_str(), client),
        None => OllamaProvider::new(client),
    }
}

async fn ollama_is_awake(settings: &config::Provider) -> bool {
    let probe = match ollama_provider(settings, HttpClient::with_timeout(OLLAMA_PROBE_TIMEOUT)) {
        Ok(probe) => probe,
        Err(err) => die!("ollama API base failed to parse: {}", err),
    };

    match probe.models().await {
        Ok(_) => true,
        Err(err) if matches!(err.kind(), ErrorKind::Connection | ErrorKind::TimedOut) => {
            tracing::debug!(error = %err, "ollama is not running");

            false
        }
        Err(err) => {
            crate::warn!("unexpected response while probing ollama, skipping it: {}", err);

            false
        }
    }
}

/// Populate a registry with the available providers. Every provider shares the
/// same client and therefore the same request timeout.
pub(crate) async fn populated_registry(config: &Config, client: &HttpClient) -> Registry {
    let mut registry = Registry::new();

    {
        let gemini = &config.providers.gemini;

        if let Some(api_key) = activated_key(ProviderIdentifier::Gemini, gemini, &GEMINI_ENV_KEY_VARS)
        {
            let provider = match &gemini.api_base {
                Some(api_base) => GeminiProvider::new(&api_key, api_base.as_str(), client.clone()),
                None => GeminiProvider::with_api_key(&api_key, client.clone()),
            };

            register(&mut registry, provider, gemini, ProviderIdentifier::Gemini);
        }
    }

    {
        let ollama = &config.providers.ollama;

        let active = match ollama.activate {
            ProviderActivationPolicy::Auto => ollama_is_awake(ollama).await,
            ProviderActivationPolicy::Enabled => true,
            ProviderActivationPolicy::Disabled => false,
        };

        if active {
            let provider = ollama_provider(ollama, client.clone());

            register(&mut registry, provider, ollama, ProviderIdentifier::Ollama);
        }
    }

    {
        let openai = &config.providers.openai;

        if let Some(api_key) = activated_key(ProviderIdentifier::OpenAI, openai, &OPENAI_ENV_KEY_VARS)
        {
            let provider = match &openai.api_base {
                Some(api_base) => OpenAIProvider::new(&api_key, api_base.as_str(), client.clone()),
                None => OpenAIProvider::with_api_key(&api_key, client.clone()),
            };

            register(&mut registry, provider, openai, ProviderIdentifier::OpenAI);
        }
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_providers_are_skipped() {
        let raw = r#"
            [providers.gemini]
            activate = "disabled"
            api_key = "unused"

            [providers.openai]
            activate = "disabled"

            [providers.ollama]
            activate = "disabled"
        "#;

        let (config, _) = config::parse_config_str(raw).unwrap();
        let registry = populated_registry(&config, &HttpClient::default()).await;

        assert!(registry.empty());
    }

    #[tokio::test]
    async fn test_configured_key_activates_provider() {
        let raw = r#"
            [providers.gemini]
            api_key = "test-key"
            priority = 99
            default_model = "gemini-2.5-pro"

            [providers.openai]
            activate = "disabled"

            [providers.ollama]
            activate = "disabled"
        "#;

        let (config, _) = config::parse_config_str(raw).unwrap();
        let registry = populated_registry(&config, &HttpClient::default()).await;

        assert!(registry.provider(ProviderIdentifier::Gemini).is_some());
        assert!(registry.provider(ProviderIdentifier::OpenAI).is_none());
        assert_eq!(registry.priority(ProviderIdentifier::Gemini), 99);

        let defaults = registry.default_models().await.unwrap();

        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].default_model_id.as_deref(), Some("gemini-2.5-pro"));
    }
}
