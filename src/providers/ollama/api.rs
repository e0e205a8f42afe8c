use reqwest::{IntoUrl, Response, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::apireq::{self, error_body, HttpClient, Url};

const OLLAMA_DEFAULT_ENDPOINT: &'static str = "http://localhost:11434";

#[derive(Debug, Error)]
pub(super) enum Error {
    #[error("invalid ollama api base: {0}")]
    InvalidApiBase(reqwest::Error),

    #[error("invalid ollama endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("a request to ollama failed: {0}")]
    RequestFailed(#[from] apireq::ReqwestError),

    #[error("failed to query ollama resource: {0}")]
    NotFound(String),

    #[error("request to the ollama api failed: {0}")]
    BadRequest(String),

    #[error("ollama encountered an internal error: {0}")]
    InternalError(String),

    #[error("the ollama API returned an unspecified error: {0}")]
    UnspecifiedError(String),
}

/* === IO === */

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(super) enum Role {
    Assistant,
    User,
    System,
}

#[derive(Serialize, Deserialize, Debug)]
pub(super) struct ChatMessage {
    pub role: Role,
    pub content: String,
}

// Structures to serialize /api/chat
#[derive(Serialize, Debug)]
struct ChatRequest<'m> {
    model: &'m str,
    messages: &'m [ChatMessage],
    /// A JSON schema which constrains the output
    format: &'m serde_json::Value,
    stream: bool,
}

// Structures to deseralize /api/chat
#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) enum DoneReason {
    #[default]
    None,
    #[serde(rename = "stop")]
    Stop,
    #[serde(rename = "length")]
    Length,
    #[serde(rename = "load")]
    Load,
}

#[derive(Deserialize, Debug)]
pub(super) struct ChatResponse {
    pub model: String,
    pub message: ChatMessage,
    pub done: bool,
    #[serde(default)]
    pub done_reason: DoneReason,
    pub eval_count: Option<u64>,
}

// Structures to deseralize /api/tags

#[derive(Debug, Deserialize, Serialize)]
pub(super) struct Tag {
    pub name: String,
    pub model: String,
    pub size: u64,
    pub digest: String,
}

#[derive(Debug, Deserialize, Serialize)]
struct TagsList {
    models: Vec<Tag>,
}

// Errors
#[derive(Debug, Deserialize)]
struct ApiError {
    error: String,
}

pub(super) struct OllamaApi {
    api_base: Url,
    client: HttpClient,
}

impl OllamaApi {
    pub(super) fn with_api_base<U: IntoUrl>(
        api_base: U,
        client: HttpClient,
    ) -> Result<OllamaApi, Error> {
        Ok(OllamaApi {
            api_base: api_base.into_url().map_err(Error::InvalidApiBase)?,
            client,
        })
    }

    pub(super) fn new(client: HttpClient) -> Result<OllamaApi, Error> {
        Self::with_api_base(OLLAMA_DEFAULT_ENDPOINT, client)
    }

    pub(super) async fn maybe_parse_api_error(res: Response) -> Result<Response, Error> {
        let status = res.status();

        if status.is_success() {
            return Ok(res);
        }

        let body = error_body(res).await;

        let message = match serde_json::from_str::<ApiError>(&body) {
            Ok(err) => err.error,
            Err(_) => body,
        };

        match status {
            StatusCode::NOT_FOUND => Err(Error::NotFound(message)),
            code => match code.as_u16() {
                400..=499 => Err(Error::BadRequest(message)),
                500..=599 => Err(Error::InternalError(message)),
                _ => Err(Error::UnspecifiedError(message)),
            },
        }
    }

    pub(super) async fn tags(&self) -> Result<Vec<Tag>, Error> {
        let url = self.api_base.join("/api/tags")?;

        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::RequestFailed(e.into()))?;

        let res = Self::maybe_parse_api_error(res).await?;

        let tags: TagsList = res
            .json()
            .await
            .map_err(|e| Error::RequestFailed(e.into()))?;

        Ok(tags.models)
    }

    pub(super) async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
        format: &serde_json::Value,
    ) -> Result<ChatResponse, Error> {
        let url = self.api_base.join("/api/chat")?;

        tracing::debug!(%url, model, "requesting ollama chat");

        let res = self
            .client
            .post(url)
            .json(&ChatRequest {
                messages,
                model,
                format,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| Error::RequestFailed(e.into()))?;

        let res = Self::maybe_parse_api_error(res).await?;

        res.json()
            .await
            .map_err(|e| Error::RequestFailed(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_carries_schema() {
        let schema = serde_json::json!({"type": "object", "required": ["content"]});
        let messages = [ChatMessage {
            role: Role::User,
            content: "Hello!".to_string(),
        }];

        let body = serde_json::to_value(ChatRequest {
            model: "llama3.2",
            messages: &messages,
            format: &schema,
            stream: false,
        })
        .unwrap();

        assert_eq!(body["format"], schema);
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_chat_response_deserialization() {
        let raw = r#"{
            "model": "llama3.2",
            "created_at": "2024-07-22T20:33:28.123648Z",
            "message": {"role": "assistant", "content": "{\"content\": \"omg yes\"}"},
            "done_reason": "stop",
            "done": true,
            "total_duration": 4883583458,
            "eval_count": 282
        }"#;

        let res: ChatResponse = serde_json::from_str(raw).unwrap();

        assert!(res.done);
        assert_eq!(res.done_reason, DoneReason::Stop);
        assert_eq!(res.message.role, Role::Assistant);
    }

    #[test]
    fn test_tags_deserialization() {
        let raw = r#"{"models": [{
            "name": "gemma:2b",
            "model": "gemma:2b",
            "modified_at": "2024-05-01T12:00:00Z",
            "size": 1678456656,
            "digest": "b50d6c999e592ae4f79acae23b4feaefbdfceaa7cd366df2610e3072c052a160",
            "details": {"format": "gguf", "family": "gemma"}
        }]}"#;

        let tags: TagsList = serde_json::from_str(raw).unwrap();

        assert_eq!(tags.models.len(), 1);
        assert_eq!(tags.models[0].name, "gemma:2b");
    }

    #[tokio::test]
    #[ignore = "requires a local ollama server"]
    async fn test_api_error_deserialization() {
        let api = OllamaApi::new(HttpClient::default()).unwrap();

        let messages = [ChatMessage {
            role: Role::User,
            content: "Hello!".to_string(),
        }];

        let res = api
            .chat("_nonexistent_", &messages, &serde_json::json!({"type": "object"}))
            .await;

        assert!(matches!(res, Err(Error::NotFound(_))));
    }
}
