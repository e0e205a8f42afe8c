use async_trait::async_trait;
use reqwest::IntoUrl;

use super::api;
use crate::providers::apireq::HttpClient;
use crate::providers::{
    providers::ProviderIdentifier, ChatProvider, Completion, Error, ErrorKind, FinishReason,
    Model, StructuredRequest,
};

impl From<api::DoneReason> for Option<FinishReason> {
    fn from(value: api::DoneReason) -> Self {
        match value {
            api::DoneReason::Length => Some(FinishReason::Length),
            api::DoneReason::Stop => Some(FinishReason::Stop),
            api::DoneReason::Load | api::DoneReason::None => None,
        }
    }
}

impl From<api::Tag> for Model {
    fn from(value: api::Tag) -> Self {
        Model {
            id: value.name,
            context_length: None,
        }
    }
}

impl From<api::ChatResponse> for Completion {
    fn from(value: api::ChatResponse) -> Self {
        let text = Some(value.message.content).filter(|text| !text.is_empty());

        Completion {
            text,
            finish_reason: value.done_reason.into(),
        }
    }
}

impl From<api::Error> for Error {
    fn from(value: api::Error) -> Self {
        let kind = match &value {
            api::Error::InternalError(_) => ErrorKind::InternalError,
            api::Error::InvalidApiBase(_) | api::Error::InvalidEndpoint(_) => {
                ErrorKind::Connection
            }
            api::Error::NotFound(_) => ErrorKind::NotFound,
            api::Error::BadRequest(_) => ErrorKind::BadRequest,
            api::Error::UnspecifiedError(_) | api::Error::RequestFailed(_) => {
                ErrorKind::UnspecifiedError
            }
        };

        match value {
            api::Error::RequestFailed(err) => err.into(),
            value => Error::from_source(kind, Box::new(value)),
        }
    }
}

pub(crate) struct OllamaProvider {
    api: api::OllamaApi,
}

impl OllamaProvider {
    pub(crate) fn new(client: HttpClient) -> Result<OllamaProvider, Error> {
        Ok(OllamaProvider {
            api: api::OllamaApi::new(client)?,
        })
    }

    pub(crate) fn with_api_base<U: IntoUrl>(
        api_base: U,
        client: HttpClient,
    ) -> Result<OllamaProvider, Error> {
        Ok(OllamaProvider {
            api: api::OllamaApi::with_api_base(api_base, client)?,
        })
    }
}

#[async_trait]
impl ChatProvider for OllamaProvider {
    fn id(&self) -> ProviderIdentifier {
        ProviderIdentifier::Ollama
    }

    async fn models(&self) -> Result<Vec<Model>, Error> {
        let tags = self.api.tags().await?;

        Ok(tags.into_iter().map(|tag| tag.into()).collect())
    }

    /// Ollama serves whatever the user has pulled, so there is nothing sensible to
    /// default to. A default can be configured instead.
    async fn default_model(&self) -> Result<Option<Model>, Error> {
        Ok(None)
    }

    async fn structured_completion(
        &self,
        model: &str,
        request: &StructuredRequest<'_>,
    ) -> Result<Completion, Error> {
        let messages = [
            api::ChatMessage {
                role: api::Role::System,
                content: request.system.to_string(),
            },
            api::ChatMessage {
                role: api::Role::User,
                content: request.prompt.to_string(),
            },
        ];

        let res = self
            .api
            .chat(model, &messages, &request.schema.schema)
            .await?;

        Ok(res.into())
    }
}
