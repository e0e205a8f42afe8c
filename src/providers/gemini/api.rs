use reqwest::IntoUrl;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::providers::apireq::{self, error_body, HttpClient, Url};

const DEFAULT_API_BASE: &'static str = "https://generativelanguage.googleapis.com";

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

    #[error("{}", .0)]
    RequestFailed(
        #[from]
        #[source]
        apireq::ReqwestError,
    ),

    /// The API rejected the request with an error status
    #[error("{}", .1)]
    Status(u16, ApiErrorPayload),
}

/* Structures to serialize :generateContent */

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(super) struct Part {
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(super) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub(super) fn text(role: Option<&str>, text: &str) -> Content {
        Content {
            role: role.map(|r| r.to_string()),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerationConfig {
    pub response_mime_type: &'static str,
    pub response_schema: Value,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateContentRequest<'r> {
    pub system_instruction: Content,
    pub contents: &'r [Content],
    pub generation_config: GenerationConfig,
}

/* Structures to deseralize :generateContent */

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
    Blocklist,
    ProhibitedContent,
    Spii,
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<FinishReason>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(super) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// The concatenated text of the first candidate
    pub(super) fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;

        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/* API Errors */

#[derive(Deserialize, Debug)]
pub(super) struct ApiErrorPayload {
    pub message: String,
    pub status: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    error: ApiErrorPayload,
}

impl std::fmt::Display for ApiErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.status {
            Some(status) => write!(f, "{} ({})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

impl ApiErrorPayload {
    fn parse(body: String) -> ApiErrorPayload {
        match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(res) => res.error,
            Err(_) => ApiErrorPayload {
                message: body,
                status: None,
            },
        }
    }
}

/// Converts a JSON Schema into the OpenAPI subset accepted by `responseSchema`:
/// type names are uppercase and `additionalProperties` is not understood.
pub(super) fn openapi_schema(schema: &Value) -> Value {
    let map = match schema {
        Value::Object(map) => map,
        other => return other.clone(),
    };

    let mut out = Map::new();

    for (key, value) in map {
        let converted = match key.as_str() {
            "additionalProperties" | "$schema" => continue,
            "type" => match value {
                Value::String(typ) => Value::String(typ.to_uppercase()),
                other => other.clone(),
            },
            "properties" => match value {
                Value::Object(props) => Value::Object(
                    props
                        .iter()
                        .map(|(name, prop)| (name.clone(), openapi_schema(prop)))
                        .collect(),
                ),
                other => other.clone(),
            },
            "items" => openapi_schema(value),
            _ => value.clone(),
        };

        out.insert(key.clone(), converted);
    }

    Value::Object(out)
}

pub(super) struct GeminiApi {
    api_base: Url,
    api_key: String,
    client: HttpClient,
}

impl GeminiApi {
    pub(super) fn new<U: IntoUrl>(
        api_key: &str,
        api_base: U,
        client: HttpClient,
    ) -> Result<GeminiApi, Error> {
        let api_base = api_base.into_url().map_err(Error::InvalidApiBase)?;

        Ok(GeminiApi {
            api_base,
            api_key: api_key.to_string(),
            client,
        })
    }

    pub(super) fn with_api_key(api_key: &str, client: HttpClient) -> Result<GeminiApi, Error> {
        Self::new(api_key, DEFAULT_API_BASE, client)
    }

    pub(super) async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse, Error> {
        let url = self
            .api_base
            .join(&format!("/v1beta/models/{}:generateContent", model))?;

        tracing::debug!(%url, model, "requesting gemini content generation");

        let res = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
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

            Err(Error::Status(status.as_u16(), payload))
        }
    }
}
