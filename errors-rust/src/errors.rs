use crate::EventLoopError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Message rendered by [`ContextWindowOverflowError`] when none was supplied.
pub const DEFAULT_CONTEXT_WINDOW_OVERFLOW_MESSAGE: &str = "input exceeds the model's context window";
/// Message rendered by [`ExtensionInitError`] when none was supplied.
pub const DEFAULT_EXTENSION_INIT_MESSAGE: &str = "extension client failed to initialize";
/// Message rendered by [`SessionError`] when none was supplied.
pub const DEFAULT_SESSION_MESSAGE: &str = "session operation failed";

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Every failure an agent run can observe.
///
/// The set is closed: adding a kind is a change to this crate, and callers are
/// expected to match on it exhaustively. Each variant holds a leaf type that a
/// collaborator can return on its own, so `?` lifts it into `AgentError`
/// without losing its kind.
///
/// The rendered message of every variant is the message of the wrapped value
/// verbatim.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A turn was aborted. Wraps the original failure together with the
    /// request state captured at the moment of abort.
    #[error(transparent)]
    EventLoop(#[from] EventLoopError),
    /// The model response was cut off by the output token budget.
    #[error(transparent)]
    MaxTokensReached(#[from] MaxTokensReachedError),
    /// The input does not fit in the model's context window.
    #[error(transparent)]
    ContextWindowOverflow(#[from] ContextWindowOverflowError),
    /// The model provider rate limited the request.
    #[error(transparent)]
    ModelThrottled(#[from] ModelThrottledError),
    /// A tool/capability provider failed before any tool call was attempted.
    #[error(transparent)]
    ExtensionInit(#[from] ExtensionInitError),
    /// Loading, saving or deleting persisted run state failed.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Document citations were requested for a model that has no support for
    /// them.
    #[error(transparent)]
    UnsupportedCitations(#[from] UnsupportedCitationsError),
}

pub type AgentResult<T> = Result<T, AgentError>;

impl AgentError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EventLoop(_) => ErrorKind::EventLoop,
            Self::MaxTokensReached(_) => ErrorKind::MaxTokensReached,
            Self::ContextWindowOverflow(_) => ErrorKind::ContextWindowOverflow,
            Self::ModelThrottled(_) => ErrorKind::ModelThrottled,
            Self::ExtensionInit(_) => ErrorKind::ExtensionInit,
            Self::Session(_) => ErrorKind::Session,
            Self::UnsupportedCitations(_) => ErrorKind::UnsupportedCitations,
        }
    }

    /// The human readable message of the failure. For an event loop failure
    /// this is the message of the original failure.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether the same request may succeed if it is sent again unchanged.
    /// Only throttling qualifies; an event loop failure answers for the leaf
    /// it wraps.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self.root(), Self::ModelThrottled(_))
    }
}

/// Closed tag identifying the kind of an [`AgentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EventLoop,
    MaxTokensReached,
    ContextWindowOverflow,
    ModelThrottled,
    ExtensionInit,
    Session,
    UnsupportedCitations,
}

impl ErrorKind {
    /// Stable code for the kind, suitable for logs and span attributes.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EventLoop => "event_loop",
            Self::MaxTokensReached => "max_tokens_reached",
            Self::ContextWindowOverflow => "context_window_overflow",
            Self::ModelThrottled => "model_throttled",
            Self::ExtensionInit => "extension_init",
            Self::Session => "session",
            Self::UnsupportedCitations => "unsupported_citations",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The model stopped generating because it reached the maximum number of
/// output tokens. The output produced so far is usable but incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MaxTokensReachedError {
    message: String,
}

impl MaxTokensReachedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The combined system prompt, history and new input exceed what the model
/// accepts. Usually recoverable by truncating or summarizing the history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", .message.as_deref().unwrap_or(DEFAULT_CONTEXT_WINDOW_OVERFLOW_MESSAGE))]
pub struct ContextWindowOverflowError {
    message: Option<String>,
}

impl ContextWindowOverflowError {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or(DEFAULT_CONTEXT_WINDOW_OVERFLOW_MESSAGE)
    }

    /// The diagnostic message supplied at construction, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// The model provider rejected or delayed the request because of rate
/// limiting. The provider message is kept verbatim so a retry policy can read
/// any hint it contains.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ModelThrottledError {
    message: String,
}

impl ModelThrottledError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An extension client (e.g. an MCP server connection) failed during
/// handshake, capability negotiation or transport setup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", .message.as_deref().unwrap_or(DEFAULT_EXTENSION_INIT_MESSAGE))]
pub struct ExtensionInitError {
    message: Option<String>,
}

impl ExtensionInitError {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(DEFAULT_EXTENSION_INIT_MESSAGE)
    }

    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// A load, save or delete against persisted conversation state failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", .message.as_deref().unwrap_or(DEFAULT_SESSION_MESSAGE))]
pub struct SessionError {
    message: Option<String>,
}

impl SessionError {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or(DEFAULT_SESSION_MESSAGE)
    }

    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Document citations were requested for a model that does not support them.
///
/// The message is rendered from `model_id` and `supported_models` alone, so
/// the same inputs always produce the same text. An empty `supported_models`
/// is accepted and renders an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Model '{model_id}' does not support document citations. Supported models for citations are: {}",
    .supported_models.join(", ")
)]
pub struct UnsupportedCitationsError {
    model_id: String,
    supported_models: Vec<String>,
}

impl UnsupportedCitationsError {
    pub fn new<I, S>(model_id: impl Into<String>, supported_models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model_id: model_id.into(),
            supported_models: supported_models.into_iter().map(Into::into).collect(),
        }
    }

    /// The model that was asked to produce citations.
    #[must_use]
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// The models that do support citations, in the order given.
    #[must_use]
    pub fn supported_models(&self) -> &[String] {
        &self.supported_models
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_messages_fall_back_to_defaults() {
        assert_eq!(
            ContextWindowOverflowError::new().to_string(),
            DEFAULT_CONTEXT_WINDOW_OVERFLOW_MESSAGE
        );
        assert_eq!(
            ExtensionInitError::new().to_string(),
            DEFAULT_EXTENSION_INIT_MESSAGE
        );
        assert_eq!(SessionError::new().to_string(), DEFAULT_SESSION_MESSAGE);
        assert_eq!(SessionError::new().detail(), None);
    }

    #[test]
    fn supplied_message_overrides_default() {
        let err = ContextWindowOverflowError::with_message("prompt is 210k tokens");
        assert_eq!(err.to_string(), "prompt is 210k tokens");
        assert_eq!(err.message(), "prompt is 210k tokens");
        assert_eq!(err.detail(), Some("prompt is 210k tokens"));
    }

    #[test]
    fn kind_codes_are_snake_case() {
        assert_eq!(ErrorKind::ModelThrottled.as_str(), "model_throttled");
        assert_eq!(
            serde_json::to_value(ErrorKind::UnsupportedCitations).unwrap(),
            serde_json::json!("unsupported_citations")
        );
        assert_eq!(ErrorKind::EventLoop.to_string(), "event_loop");
    }
}
