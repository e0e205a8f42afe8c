use super::default_priority::default_priority;

use crate::providers::{self, providers::ProviderIdentifier, ChatProvider, Model};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum Error {
    /// No providers serve the model identifier
    #[error("model \"{0}\" is not served by any of the available providers")]
    ModelNotFound(String),
    /// The model spec contains an unknown provider.
    #[error("provider \"{0}\" does not exist")]
    ProviderNotFound(String),
    /// The provider is not in the registry
    #[error("provider \"{0}\" is not active")]
    ProviderNotActivated(String),
    /// None of the providers in the registry provide a default model
    #[error("none of the available providers provide a default model")]
    DefaultModelUnset,
    /// Failed to list the models from one of the providers in the registry
    #[error("failed to obtain models from provider \"{0}\": {1}")]
    ModelListingFailed(ProviderIdentifier, #[source] providers::Error),
    #[error("failed to obtain the default model for provider \"{0}\": {1}")]
    DefaultModelFailed(ProviderIdentifier, #[source] providers::Error),
}

#[derive(Default, Debug, PartialEq)]
pub(crate) struct ModelSpec {
    pub provider: Option<ProviderIdentifier>,
    pub model: Option<String>,
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let model = match &self.model {
            Some(model) => model,
            None => return write!(f, "default_model"),
        };

        if let Some(provider) = self.provider {
            write!(f, "{}/", provider)?;
        }

        write!(f, "{}", model)
    }
}

pub(crate) trait AsModelId {
    fn model_id(&self) -> Option<&str>;
}

impl AsModelId for ModelSpec {
    fn model_id(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

impl AsModelId for &str {
    fn model_id(&self) -> Option<&str> {
        Some(self)
    }
}

impl ModelSpec {
    pub(crate) fn resolved(provider: ProviderIdentifier, model: String) -> ModelSpec {
        ModelSpec {
            provider: Some(provider),
            model: Some(model),
        }
    }

    pub(crate) fn parse(spec: Option<&str>) -> Result<ModelSpec, Error> {
        let spec = match spec.map(str::trim).filter(|s| !s.is_empty()) {
            Some(spec) => spec,
            None => return Ok(ModelSpec::default()),
        };

        if let Some((provider, model)) = spec.split_once('/') {
            let id = ProviderIdentifier::from_str(provider)
                .map_err(|_| Error::ProviderNotFound(provider.to_string()))?;

            Ok(ModelSpec::resolved(id, model.to_string()))
        } else {
            Ok(ModelSpec {
                provider: None,
                model: Some(spec.to_string()),
            })
        }
    }

    pub(crate) fn is_ambiguous(&self) -> bool {
        self.provider.is_none() || self.model.is_none()
    }

    /// The provider and model of a fully qualified spec
    pub(crate) fn into_parts(self) -> Option<(ProviderIdentifier, String)> {
        match (self.provider, self.model) {
            (Some(provider), Some(model)) => Some((provider, model)),
            _ => None,
        }
    }
}

struct ProviderEntry {
    provider: Option<Box<dyn ChatProvider>>,
    priority: u8,
    default_model: Option<String>,
}

pub(crate) struct Registry {
    providers: HashMap<ProviderIdentifier, ProviderEntry>,
}

pub(crate) struct ProvidedModel {
    pub provider: ProviderIdentifier,
    pub model: Model,
}

pub(crate) struct ProvidedDefaultModel {
    pub provider: ProviderIdentifier,
    pub default_model_id: Option<String>,
}

impl Registry {
    pub(crate) fn new() -> Registry {
        let providers = ProviderIdentifier::iter().map(|id| {
            (
                id,
                ProviderEntry {
                    provider: None,
                    priority: default_priority(id),
                    default_model: None,
                },
            )
        });

        Registry {
            providers: HashMap::from_iter(providers),
        }
    }

    /// Activates a provider. A priority or default model given here overrides the
    /// provider's own.
    pub(crate) fn add_provider(
        &mut self,
        provider: Box<dyn ChatProvider>,
        priority: Option<u8>,
        default_model: Option<String>,
    ) {
        let id = provider.id();

        let entry = self.providers.entry(id).or_insert_with(|| ProviderEntry {
            provider: None,
            priority: default_priority(id),
            default_model: None,
        });

        debug_assert!(
            entry.provider.is_none(),
            "the same provider was added to the registry twice"
        );

        entry.provider = Some(provider);

        if let Some(priority) = priority {
            entry.priority = priority;
        }

        entry.default_model = default_model;
    }

    pub(crate) fn empty(&self) -> bool {
        self.providers.values().all(|ent| ent.provider.is_none())
    }

    pub(crate) fn provider(&self, id: ProviderIdentifier) -> Option<&dyn ChatProvider> {
        self.providers
            .get(&id)
            .and_then(|ent| ent.provider.as_deref())
    }

    pub(crate) fn active_provider(&self, id: ProviderIdentifier) -> Result<&dyn ChatProvider, Error> {
        self.provider(id)
            .ok_or_else(|| Error::ProviderNotActivated(id.to_string()))
    }

    pub(crate) fn priority(&self, id: ProviderIdentifier) -> u8 {
        self.providers
            .get(&id)
            .map(|ent| ent.priority)
            .unwrap_or_else(|| default_priority(id))
    }

    pub(crate) async fn registered_models(&self) -> Result<Vec<ProvidedModel>, Error> {
        let mut models = Vec::new();

        for id in ProviderIdentifier::iter() {
            let provider = match self.provider(id) {
                Some(provider) => provider,
                None => continue,
            };

            let provider_models = provider
                .models()
                .await
                .map_err(|e| Error::ModelListingFailed(id, e))?;

            for model in provider_models {
                models.push(ProvidedModel {
                    provider: id,
                    model,
                });
            }
        }

        Ok(models)
    }

    pub(crate) async fn default_models(&self) -> Result<Vec<ProvidedDefaultModel>, Error> {
        let mut models = Vec::new();

        for id in ProviderIdentifier::iter() {
            let (provider, configured) = match self.providers.get(&id) {
                Some(ProviderEntry {
                    provider: Some(provider),
                    default_model,
                    ..
                }) => (provider, default_model),
                _ => continue,
            };

            let default_model = match configured {
                Some(model) => Some(model.clone()),
                None => provider
                    .default_model()
                    .await
                    .map_err(|e| Error::DefaultModelFailed(id, e))?
                    .map(|model| model.id),
            };

            models.push(ProvidedDefaultModel {
                provider: id,
                default_model_id: default_model,
            });
        }

        Ok(models)
    }
}

pub(crate) struct ModelResolver {
    models: HashMap<String, ProviderIdentifier>,
    default_model: Option<(String, ProviderIdentifier)>,
}

impl ModelResolver {
    pub(crate) async fn build(registry: &Registry) -> Result<ModelResolver, Error> {
        let mut resolver = ModelResolver {
            models: HashMap::new(),
            default_model: None,
        };

        for ProvidedModel {
            provider: id,
            model,
        } in registry.registered_models().await?
        {
            if let Some(alt_id) = resolver.models.get_mut(&model.id) {
                if registry.priority(*alt_id) >= registry.priority(id) {
                    continue;
                }

                *alt_id = id;
            } else {
                resolver.models.insert(model.id, id);
            }
        }

        for ProvidedDefaultModel {
            provider: id,
            default_model_id,
        } in registry.default_models().await?
        {
            let default = match default_model_id {
                Some(default) => default,
                None => continue,
            };

            if let Some((_, alt_id)) = resolver.default_model.as_ref() {
                if registry.priority(*alt_id) >= registry.priority(id) {
                    continue;
                }
            }

            resolver.default_model = Some((default, id));
        }

        Ok(resolver)
    }

    pub(crate) fn resolve<S: AsModelId>(&self, spec: S) -> Result<ModelSpec, Error> {
        match spec.model_id() {
            Some(model_id) => match self.models.get(model_id) {
                Some(id) => Ok(ModelSpec::resolved(*id, model_id.to_string())),
                None => Err(Error::ModelNotFound(model_id.to_string())),
            },
            None => match &self.default_model {
                Some((model_id, id)) => Ok(ModelSpec::resolved(*id, model_id.clone())),
                None => Err(Error::DefaultModelUnset),
            },
        }
    }
}

/// Resolves a single spec into an active provider and a model identifier
pub(crate) async fn resolve_once<'r>(
    registry: &'r Registry,
    raw_spec: Option<&str>,
) -> Result<(&'r dyn ChatProvider, String), Error> {
    let spec = ModelSpec::parse(raw_spec)?;

    let spec = if spec.is_ambiguous() {
        let resolver = ModelResolver::build(registry).await?;

        resolver.resolve(spec)?
    } else {
        spec
    };

    let (id, model) = spec.into_parts().ok_or(Error::DefaultModelUnset)?;

    let provider = registry.active_provider(id)?;

    tracing::debug!(provider = %id, model = %model, "resolved model");

    Ok((provider, model))
}
