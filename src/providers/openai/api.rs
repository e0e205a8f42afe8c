use reqwest::IntoUrl;
use serde::{Deserialize, Serialize};

use crate::providers::apireq::{self, error_body, HttpClient, Url};

#[derive(thiserror::Error, Debug)]
pub(super) enum Error {
    /// The API Base is not a URL that can be used in a network request
    #[error("invalid api base")]
    InvalidApiBase(#[source] reqwest::Error),

    /// Endpoint URL is invalid
    #[error("invalid endpoint")]
    InvalidEndpoint(
        #[from]
        #[source]
        url::ParseError,
    ),

    /// Some issue with the request
    #[error("{}", .0)]
    RequestFailed(
        #[from]
        #[source]
        apireq::ReqwestError,
    ),

    /// Your request was malformed or missing some required parameters,
    /// such as a token or an input.
    #[error("{}", .0.message)]
    BadRequest(ApiErrorPayload),

    /// An "Authentication" Error is an umbrella error with three possiblities:
    /// (1) Invalid Authentication
    /// (2) The requesting API key is not correct.
    /// (3) Your account is not part of an organization.
    #[error("{}", .0.message)]
    Authentication(ApiErrorPayload),

    /// You don't have access to the requested resource.
    #[error("{}", .0.message)]
    PermissionDenied(ApiErrorPayload),

    /// Requested resource does not exist.
    #[error("{}", .0.message)]
    NotFound(ApiErrorPayload),

    /// Unable to process the request despite the format being correct.
    #[error("{}", .0.message)]
    UnprocessableEntity(ApiErrorPayload),

    /// You have hit your assigned rate limit.
    #[error("{}", .0.message)]
    RateLimit(ApiErrorPayload),

    /// OpenAI has an internal issue
    #[error("{}", .0.message)]
    InternalError(ApiErrorPayload),

    /// The engine is currently overloaded, please try again later
    #[error("{}", .0.message)]
    ApiOverloaded(ApiErrorPayload),

    /// Some unknown error was returned by the API
    #[error("{}", .0.message)]
    UnknownStatus(ApiErrorPayload),
}

impl Error {
    fn from_status(status: u16, payload: ApiErrorPayload) -> Error {
        match status {
            400 => Error::BadRequest(payload),
            401 => Error::Authentication(payload),
            403 => Error::PermissionDenied(payload),
            404 => Error::NotFound(payload),
            422 => Error::UnprocessableEntity(payload),
            429 => Error::RateLimit(payload),
            500 => Error::InternalError(payload),
            503 => Error::ApiOverloaded(payload),
            _ => Error::UnknownStatus(payload),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(super) enum Role {
    System,
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Debug)]
pub(super) struct ChatMessage {
    #[serde(default)]
    pub content: Option<String>,
    pub role: Role,
    /// Set when the model declines to produce the structured output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
}

impl ChatMessage {
    pub(super) fn new(role: Role, content: &str) -> ChatMessage {
        ChatMessage {
            content: Some(content.to_string()),
            role,
            refusal: None,
        }
    }
}

/* Structures to serialize /chat/completions */

#[derive(Serialize, Debug)]
pub(super) struct JsonSchemaFormat<'s> {
    pub name: &'s str,
    pub schema: &'s serde_json::Value,
    pub strict: bool,
}

#[derive(Serialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum ResponseFormat<'s> {
    JsonSchema { json_schema: JsonSchemaFormat<'s> },
}

#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'o> {
    model: &'o str,
    messages: &'o [ChatMessage],
    response_format: &'o ResponseFormat<'o>,
    stream: bool,
}

/* Structures to deseralize /chat/completions */

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(super) enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    FunctionCall,
}

#[derive(Deserialize, Debug)]
pub(super) struct Choice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: Option<FinishReason>,
}

#[derive(Serialize, Deserialize, Debug)]
pub(super) struct Usage {
    pub completion_tokens: usize,
    pub prompt_tokens: usize,
    pub total_tokens: usize,
}

#[derive(Deserialize, Debug)]
pub(super) struct ChatCompletion {
    pub id: String,
    pub object: String,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

/* API Errors */

#[derive(Deserialize, Debug)]
pub(super) struct ApiErrorPayload {
    message: String,
    #[serde(rename = "type", default)]
    typ: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    error: ApiErrorPayload,
}

impl ApiErrorPayload {
    /// Error bodies which don't follow the documented shape are kept verbatim
    fn parse(body: String) -> ApiErrorPayload {
        match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(res) => res.error,
            Err(_) => ApiErrorPayload {
                message: body,
                typ: None,
            },
        }
    }
}

const DEFAULT_API_BASE: &'static str = "https://api.openai.com";

pub(super) struct OpenAIApi {
    api_base: Url,
    api_key: String,
    client: HttpClient,
}

impl OpenAIApi {
    pub(super) fn new<U: IntoUrl>(
        api_key: &str,
        api_base: U,
        client: HttpClient,
    ) -> Result<OpenAIApi, Error> {
        let api_base = api_base.into_url().map_err(Error::InvalidApiBase)?;

        Ok(OpenAIApi {
            api_base,
            api_key: api_key.to_string(),
            client,
        })
    }

    pub(super) fn with_api_key(api_key: &str, client: HttpClient) -> Result<OpenAIApi, Error> {
        Self::new(api_key, DEFAULT_API_BASE, client)
    }

    pub(super) async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        response_format: &ResponseFormat<'_>,
    ) -> Result<ChatCompletion, Error> {
        let url = self.api_base.join("/v1/chat/completions")?;

        tracing::debug!(%url, model, "requesting openai chat completion");

        let res = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&ChatCompletionRequest {
                model,
                messages,
                response_format,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| Error::RequestFailed(e.into()))?;

        let status = res.status();

        if status.is_success() {
            res.json()
                .await
                .map_err(|e| Error::RequestFailed(e.into()))
        } else {
            let payload = ApiErrorPayload::parse(error_body(res).await);

            Err(Error::from_status(status.as_u16(), payload))
        }
    }
}
