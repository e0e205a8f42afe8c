//! Traits and type definitions for structured completions and provider interactions.
//!
//! The interface to every hosted model is the [`ChatProvider`] trait. A provider lists
//! the models it serves and answers a [`StructuredRequest`]: a system instruction, a
//! single user prompt, and a [`ResponseSchema`] the reply must conform to. Providers
//! are expected to use the API's native schema-constrained decoding so that no free
//! text ever needs to be parsed.
//!
//! ## Error Handling
//!
//! Each API has its own bespoke error system. Providers keep their own error types
//! and convert them into [`Error`], whose [`ErrorKind`] gives the general category of
//! what went wrong.

mod apireq;
mod gemini;
mod ollama;
mod openai;

pub(crate) mod providers;

pub(crate) use apireq::HttpClient;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::fmt;

use self::providers::ProviderIdentifier;

/// This is a list specifying general categories of errors that
/// can be returned by a [`ChatProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum ErrorKind {
    /// Failed to connect to the underlying API service.
    Connection,
    /// A request timed out.
    TimedOut,
    /// An API key was not provided or service-specific
    /// permissions are needed.
    Authentication,
    /// A rate limit was reached or a quota was exceeded.
    ExcessUsage,
    /// The servers are overloaded.
    ApiOverloaded,
    /// The requested resource was not found. This likely means that
    /// the model requested by the user was not found.
    NotFound,
    /// The request was malformed or is otherwise improper.
    BadRequest,
    /// The server encountered an error.
    InternalError,
    /// An API response was unable to be deserialized, malformed,
    /// or otherwise violated the assumptions of the client.
    UnexpectedResponse,
    /// An error that does not fit into any of the other categories.
    UnspecifiedError,
}

#[derive(Debug)]
pub(crate) struct Error {
    kind: ErrorKind,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub(crate) fn from_kind(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }

    pub(crate) fn from_source(kind: ErrorKind, source: Box<dyn StdError + Send + Sync>) -> Error {
        Error {
            kind,
            source: Some(source),
        }
    }

    pub(crate) fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn message(&self) -> &'static str {
        match self.kind {
            ErrorKind::Connection => "failed to connect to the API service",
            ErrorKind::TimedOut => "request timed out",
            ErrorKind::Authentication => "authentication failed or not provided",
            ErrorKind::ExcessUsage => "rate limit exceeded or quota crossed",
            ErrorKind::ApiOverloaded => "API server(s) are currently overloaded",
            ErrorKind::NotFound => "the requested resource was not found",
            ErrorKind::BadRequest => "the request was bad or malformed",
            ErrorKind::InternalError => "the server encountered an internal error",
            ErrorKind::UnexpectedResponse => "API response was unexpected or malformed",
            ErrorKind::UnspecifiedError => "an unspecified error occurred",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| &**e as _)
    }
}

/// The reason why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum FinishReason {
    /// The model generated a stop token, terminating
    /// its response.
    Stop,
    /// An API content filter was triggered.
    ContentFilter,
    /// The requested message length was reached.
    Length,
}

#[derive(Debug, Clone)]
pub(crate) struct Model {
    /// The ID of the model. This must be an acceptable parameter to
    /// [`ChatProvider::structured_completion`].
    pub id: String,
    /// The context length of the model, if known.
    pub context_length: Option<u64>,
}

/// A JSON Schema describing the object a completion must produce
#[derive(Debug, Clone)]
pub(crate) struct ResponseSchema {
    /// A short identifier, required by some APIs
    pub name: &'static str,
    pub schema: serde_json::Value,
}

/// A single-turn request for schema-constrained output
#[derive(Debug)]
pub(crate) struct StructuredRequest<'r> {
    /// Instructions for the model, sent with system authority
    pub system: &'r str,
    /// The user turn
    pub prompt: &'r str,
    pub schema: &'r ResponseSchema,
}

/// The raw result of a structured completion. `text` holds the JSON document
/// produced by the model, if there was one.
#[derive(Debug, Clone, Default)]
pub(crate) struct Completion {
    pub text: Option<String>,
    pub finish_reason: Option<FinishReason>,
}

/// A trait implemented by all chat providers.
#[async_trait]
pub(crate) trait ChatProvider: Send + Sync {
    /// Returns the provider identifier.
    fn id(&self) -> ProviderIdentifier;

    /// Returns a list of models the chat provider supports.
    async fn models(&self) -> Result<Vec<Model>, Error>;

    /// Returns the default model, or None if no default is designated.
    async fn default_model(&self) -> Result<Option<Model>, Error>;

    /// Requests a completion whose text is a JSON document conforming to
    /// `request.schema`.
    ///
    /// `model`: The id of the model.
    async fn structured_completion(
        &self,
        model: &str,
        request: &StructuredRequest<'_>,
    ) -> Result<Completion, Error>;
}

/// Maps an HTTP error status onto a general error category. Shared by the
/// providers whose APIs follow the usual REST conventions.
pub(crate) fn kind_from_status(status: u16) -> ErrorKind {
    match status {
        400 | 422 => ErrorKind::BadRequest,
        401 | 403 => ErrorKind::Authentication,
        404 => ErrorKind::NotFound,
        429 => ErrorKind::ExcessUsage,
        500 => ErrorKind::InternalError,
        503 => ErrorKind::ApiOverloaded,
        _ => ErrorKind::UnspecifiedError,
    }
}
