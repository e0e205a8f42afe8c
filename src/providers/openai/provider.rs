use async_trait::async_trait;
use reqwest::IntoUrl;

use crate::providers::apireq::HttpClient;
use crate::providers::openai::models::{DEFAULT_MODEL, OPENAI_MODELS};
use crate::providers::{
    openai::api, providers::ProviderIdentifier, ChatProvider, Completion, Error, ErrorKind,
    FinishReason, Model, StructuredRequest,
};

impl From<api::Error> for Error {
    fn from(value: api::Error) -> Self {
        let kind = match &value {
            api::Error::Authentication(_) | api::Error::PermissionDenied(_) => {
                ErrorKind::Authentication
            }
            api::Error::BadRequest(_)
            | api::Error::InvalidApiBase(_)
            | api::Error::InvalidEndpoint(_)
            | api::Error::UnprocessableEntity(_) => ErrorKind::BadRequest,
            api::Error::InternalError(_) => ErrorKind::InternalError,
            api::Error::NotFound(_) => ErrorKind::NotFound,
            api::Error::RateLimit(_) => ErrorKind::ExcessUsage,
            api::Error::UnknownStatus(_) => ErrorKind::UnspecifiedError,
            api::Error::ApiOverloaded(_) => ErrorKind::ApiOverloaded,
            api::Error::RequestFailed(_) => ErrorKind::UnspecifiedError,
        };

        match value {
            api::Error::RequestFailed(err) => err.into(),
            value => Error::from_source(kind, Box::new(value)),
        }
    }
}

impl From<api::FinishReason> for FinishReason {
    fn from(value: api::FinishReason) -> Self {
        match value {
            api::FinishReason::Stop => FinishReason::Stop,
            api::FinishReason::ContentFilter => FinishReason::ContentFilter,
            // Tool calls are never requested, so the output was cut short
            api::FinishReason::Length
            | api::FinishReason::ToolCalls
            | api::FinishReason::FunctionCall => FinishReason::Length,
        }
    }
}

impl From<api::ChatCompletion> for Completion {
    fn from(mut value: api::ChatCompletion) -> Self {
        if value.choices.is_empty() {
            return Completion::default();
        }

        let choice = value.choices.swap_remove(0);

        // A refusal carries no structured output
        let finish_reason = match choice.message.refusal {
            Some(_) => Some(FinishReason::ContentFilter),
            None => choice.finish_reason.map(|r| r.into()),
        };

        Completion {
            text: choice.message.content,
            finish_reason,
        }
    }
}

pub(crate) struct OpenAIProvider {
    api: api::OpenAIApi,
}

impl OpenAIProvider {
    pub(crate) fn new<U: IntoUrl>(
        api_key: &str,
        api_base: U,
        client: HttpClient,
    ) -> Result<OpenAIProvider, Error> {
        Ok(OpenAIProvider {
            api: api::OpenAIApi::new(api_key, api_base, client)?,
        })
    }

    pub(crate) fn with_api_key(api_key: &str, client: HttpClient) -> Result<OpenAIProvider, Error> {
        Ok(OpenAIProvider {
            api: api::OpenAIApi::with_api_key(api_key, client)?,
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAIProvider {
    fn id(&self) -> ProviderIdentifier {
        ProviderIdentifier::OpenAI
    }

    async fn default_model(&self) -> Result<Option<Model>, Error> {
        Ok(Some(DEFAULT_MODEL.clone()))
    }

    async fn models(&self) -> Result<Vec<Model>, Error> {
        Ok(OPENAI_MODELS.to_vec())
    }

    async fn structured_completion(
        &self,
        model: &str,
        request: &StructuredRequest<'_>,
    ) -> Result<Completion, Error> {
        let messages = [
            api::ChatMessage::new(api::Role::System, request.system),
            api::ChatMessage::new(api::Role::User, request.prompt),
        ];

        // Strict mode would require every property, but `time` is optional
        let format = api::ResponseFormat::JsonSchema {
            json_schema: api::JsonSchemaFormat {
                name: request.schema.name,
                schema: &request.schema.schema,
                strict: false,
            },
        };

        let completion = self.api.chat_completion(model, &messages, &format).await?;

        Ok(completion.into())
    }
}
