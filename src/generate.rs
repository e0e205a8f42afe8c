//! Conversation and reply generation.
//!
//! Both generators share one contract with their callers: they always produce
//! something. Transport failures, provider errors, empty or truncated completions,
//! malformed JSON and schema violations are all collapsed into a single path which
//! logs the cause and substitutes fixed fallback content. The distinction between
//! these failures is kept for the logs only (see [`GenerationError::category`]).

mod conversation;
pub(crate) mod fallback;
mod prompt;
mod reply;
mod schema;

pub(crate) use conversation::ConversationGenerator;
pub(crate) use reply::ReplyGenerator;

use std::error::Error as StdError;

use thiserror::Error;

use crate::providers::{self, ChatProvider, ErrorKind, FinishReason, StructuredRequest};

#[derive(Error, Debug)]
pub(crate) enum GenerationError {
    #[error("the provider request failed")]
    Provider(#[from] providers::Error),
    #[error("the provider returned no text")]
    EmptyResponse,
    #[error("the completion stopped early ({0})")]
    Incomplete(FinishReason),
    #[error("the response is not a valid document")]
    Malformed(#[from] serde_json::Error),
    #[error("the response violates the schema: {0}")]
    SchemaViolation(String),
}

impl GenerationError {
    /// A stable label for the class of failure, used in logs
    pub(crate) fn category(&self) -> &'static str {
        match self {
            GenerationError::Provider(err) => match err.kind() {
                ErrorKind::Connection | ErrorKind::TimedOut => "transport",
                _ => "provider",
            },
            GenerationError::EmptyResponse | GenerationError::Incomplete(_) => "empty",
            GenerationError::Malformed(_) | GenerationError::SchemaViolation(_) => "malformed",
        }
    }

    fn provider_kind(&self) -> Option<ErrorKind> {
        match self {
            GenerationError::Provider(err) => Some(err.kind()),
            _ => None,
        }
    }
}

/// Renders an error and its sources as `outer: inner: innermost`
pub(crate) fn error_chain(err: &dyn StdError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();

    while let Some(err) = source {
        chain.push_str(": ");
        chain.push_str(&err.to_string());
        source = err.source();
    }

    chain
}

fn log_fallback(operation: &'static str, err: &GenerationError) {
    tracing::warn!(
        operation,
        category = err.category(),
        kind = ?err.provider_kind(),
        error = %error_chain(err),
        "generation failed, substituting fallback content"
    );
}

/// Issues a structured request and returns the document text
async fn complete(
    provider: &dyn ChatProvider,
    model: &str,
    request: &StructuredRequest<'_>,
) -> Result<String, GenerationError> {
    tracing::debug!(
        provider = %provider.id(),
        model,
        schema = request.schema.name,
        system_len = request.system.len(),
        "sending structured request"
    );

    let completion = provider.structured_completion(model, request).await?;

    if let Some(reason @ (FinishReason::Length | FinishReason::ContentFilter)) =
        completion.finish_reason
    {
        return Err(GenerationError::Incomplete(reason));
    }

    let text = completion
        .text
        .filter(|text| !text.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)?;

    tracing::debug!(response_len = text.len(), "received structured response");

    Ok(text)
}

#[cfg(test)]
pub(crate) mod testing {
    //! A scripted provider which replays canned outcomes without touching the network

    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::providers::providers::ProviderIdentifier;
    use crate::providers::{
        ChatProvider, Completion, Error, ErrorKind, FinishReason, Model, StructuredRequest,
    };

    pub(crate) enum Outcome {
        Text(String),
        Truncated,
        Empty,
        Fail(ErrorKind),
    }

    #[derive(Debug, Clone)]
    pub(crate) struct RecordedRequest {
        pub model: String,
        pub system: String,
        pub prompt: String,
        pub schema: &'static str,
    }

    pub(crate) struct ScriptedProvider {
        outcomes: Mutex<Vec<Outcome>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl ScriptedProvider {
        /// Outcomes are replayed in order, one per request
        pub(crate) fn new(outcomes: Vec<Outcome>) -> ScriptedProvider {
            let mut outcomes = outcomes;
            outcomes.reverse();

            ScriptedProvider {
                outcomes: Mutex::new(outcomes),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn text(json: &str) -> ScriptedProvider {
            Self::new(vec![Outcome::Text(json.to_string())])
        }

        pub(crate) fn failing(kind: ErrorKind) -> ScriptedProvider {
            Self::new(vec![Outcome::Fail(kind)])
        }

        pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        fn id(&self) -> ProviderIdentifier {
            ProviderIdentifier::Gemini
        }

        async fn models(&self) -> Result<Vec<Model>, Error> {
            Ok(vec![Model {
                id: "scripted".to_string(),
                context_length: None,
            }])
        }

        async fn default_model(&self) -> Result<Option<Model>, Error> {
            Ok(None)
        }

        async fn structured_completion(
            &self,
            model: &str,
            request: &StructuredRequest<'_>,
        ) -> Result<Completion, Error> {
            self.requests.lock().unwrap().push(RecordedRequest {
                model: model.to_string(),
                system: request.system.to_string(),
                prompt: request.prompt.to_string(),
                schema: request.schema.name,
            });

            let outcome = self
                .outcomes
                .lock()
                .unwrap()
                .pop()
                .expect("the scripted provider ran out of outcomes");

            match outcome {
                Outcome::Text(text) => Ok(Completion {
                    text: Some(text),
                    finish_reason: Some(FinishReason::Stop),
                }),
                Outcome::Truncated => Ok(Completion {
                    text: Some("{\"messages\": [".to_string()),
                    finish_reason: Some(FinishReason::Length),
                }),
                Outcome::Empty => Ok(Completion {
                    text: None,
                    finish_reason: Some(FinishReason::Stop),
                }),
                Outcome::Fail(kind) => Err(Error::from_kind(kind)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let transport = GenerationError::Provider(providers::Error::from_kind(ErrorKind::TimedOut));
        let provider =
            GenerationError::Provider(providers::Error::from_kind(ErrorKind::Authentication));

        assert_eq!(transport.category(), "transport");
        assert_eq!(provider.category(), "provider");
        assert_eq!(GenerationError::EmptyResponse.category(), "empty");
        assert_eq!(
            GenerationError::SchemaViolation("x".to_string()).category(),
            "malformed"
        );
    }

    #[test]
    fn test_error_chain() {
        let source = std::io::Error::new(std::io::ErrorKind::Other, "dns lookup failed");
        let err = GenerationError::Provider(providers::Error::from_source(
            ErrorKind::Connection,
            Box::new(source),
        ));

        assert_eq!(
            error_chain(&err),
            "the provider request failed: failed to connect to the API service: dns lookup failed"
        );
    }
}
