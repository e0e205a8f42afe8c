use async_trait::async_trait;
use reqwest::IntoUrl;

use crate::providers::apireq::HttpClient;
use crate::providers::gemini::models::{DEFAULT_MODEL, GEMINI_MODELS};
use crate::providers::{
    gemini::api, kind_from_status, providers::ProviderIdentifier, ChatProvider, Completion, Error,
    ErrorKind, FinishReason, Model, StructuredRequest,
};

impl From<api::Error> for Error {
    fn from(value: api::Error) -> Self {
        let kind = match &value {
            api::Error::InvalidApiBase(_) | api::Error::InvalidEndpoint(_) => {
                ErrorKind::BadRequest
            }
            // An invalid key is reported as INVALID_ARGUMENT rather than 401
            api::Error::Status(400, payload) if payload.message.contains("API key") => {
                ErrorKind::Authentication
            }
            api::Error::Status(status, _) => kind_from_status(*status),
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
            api::FinishReason::MaxTokens => FinishReason::Length,
            api::FinishReason::Safety
            | api::FinishReason::Recitation
            | api::FinishReason::Blocklist
            | api::FinishReason::ProhibitedContent
            | api::FinishReason::Spii
            | api::FinishReason::Other => FinishReason::ContentFilter,
        }
    }
}

impl From<api::GenerateContentResponse> for Completion {
    fn from(value: api::GenerateContentResponse) -> Self {
        let blocked = value
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_ref())
            .is_some();

        let finish_reason = if blocked {
            Some(FinishReason::ContentFilter)
        } else {
            value
                .candidates
                .first()
                .and_then(|c| c.finish_reason)
                .map(|r| r.into())
        };

        Completion {
            text: value.text(),
            finish_reason,
        }
    }
}

pub(crate) struct GeminiProvider {
    api: api::GeminiApi,
}

impl GeminiProvider {
    pub(crate) fn new<U: IntoUrl>(
        api_key: &str,
        api_base: U,
        client: HttpClient,
    ) -> Result<GeminiProvider, Error> {
        Ok(GeminiProvider {
            api: api::GeminiApi::new(api_key, api_base, client)?,
        })
    }

    pub(crate) fn with_api_key(api_key: &str, client: HttpClient) -> Result<GeminiProvider, Error> {
        Ok(GeminiProvider {
            api: api::GeminiApi::with_api_key(api_key, client)?,
        })
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn id(&self) -> ProviderIdentifier {
        ProviderIdentifier::Gemini
    }

    async fn default_model(&self) -> Result<Option<Model>, Error> {
        Ok(Some(DEFAULT_MODEL.clone()))
    }

    async fn models(&self) -> Result<Vec<Model>, Error> {
        Ok(GEMINI_MODELS.to_vec())
    }

    async fn structured_completion(
        &self,
        model: &str,
        request: &StructuredRequest<'_>,
    ) -> Result<Completion, Error> {
        let contents = [api::Content::text(Some("user"), request.prompt)];

        let body = api::GenerateContentRequest {
            system_instruction: api::Content::text(None, request.system),
            contents: &contents,
            generation_config: api::GenerationConfig {
                response_mime_type: "application/json",
                response_schema: api::openapi_schema(&request.schema.schema),
            },
        };

        let res = self.api.generate_content(model, &body).await?;

        if let Some(version) = &res.model_version {
            tracing::debug!(model_version = %version, "gemini responded");
        }

        Ok(res.into())
    }
}
