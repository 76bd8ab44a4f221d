use crate::{
    errors::BoxedError, AgentError, ContextWindowOverflowError, ErrorKind, ExtensionInitError,
    MaxTokensReachedError, ModelThrottledError, SessionError, UnsupportedCitationsError,
};
use serde_json::{Map, Value};
use std::{error::Error as StdError, fmt};
use thiserror::Error;

/// Snapshot of the event loop's working context at the moment a turn was
/// aborted (turn counters, partial tool outputs, token counts, a session id
/// to resume against, ...). The schema belongs to the event loop.
pub type RequestState = Map<String, Value>;

/// The failure an [`EventLoopError`] wraps.
///
/// Display and `source()` are forwarded to the wrapped value.
#[derive(Debug, Error)]
pub enum OriginalError {
    /// One of the leaf kinds of [`AgentError`]. Never an event loop failure.
    #[error(transparent)]
    Agent(Box<AgentError>),
    /// Any failure from outside the taxonomy, e.g. a tool that returned an
    /// error instead of an error result.
    #[error(transparent)]
    Other(BoxedError),
}

impl OriginalError {
    pub fn other(error: impl Into<BoxedError>) -> Self {
        Self::Other(error.into())
    }

    /// The kind of the wrapped failure, or `None` for a foreign failure.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        self.as_agent_error().map(AgentError::kind)
    }

    #[must_use]
    pub fn as_agent_error(&self) -> Option<&AgentError> {
        match self {
            Self::Agent(error) => Some(error),
            Self::Other(_) => None,
        }
    }

    pub fn into_agent_error(self) -> Result<AgentError, BoxedError> {
        match self {
            Self::Agent(error) => Ok(*error),
            Self::Other(error) => Err(error),
        }
    }
}

impl From<AgentError> for OriginalError {
    fn from(error: AgentError) -> Self {
        Self::Agent(Box::new(error))
    }
}

impl From<BoxedError> for OriginalError {
    fn from(error: BoxedError) -> Self {
        Self::Other(error)
    }
}

macro_rules! original_from_leaf {
    ($($leaf:ty),* $(,)?) => {
        $(
            impl From<$leaf> for OriginalError {
                fn from(error: $leaf) -> Self {
                    Self::Agent(Box::new(error.into()))
                }
            }
        )*
    };
}

original_from_leaf!(
    EventLoopError,
    MaxTokensReachedError,
    ContextWindowOverflowError,
    ModelThrottledError,
    ExtensionInitError,
    SessionError,
    UnsupportedCitationsError,
);

/// The event loop aborted a turn.
///
/// Carries the original failure, with its kind and fields intact, and a
/// snapshot of the request state. The request state is always present: it is
/// an empty map when the loop supplied none.
///
/// Wrapping is one level deep. Wrapping an `EventLoopError` again keeps the
/// inner original failure; the newly supplied state replaces the inner state,
/// and the inner state is kept when none is supplied.
///
/// The rendered message is the original failure's message.
#[derive(Debug)]
pub struct EventLoopError {
    original: OriginalError,
    request_state: RequestState,
}

impl EventLoopError {
    pub fn new(original: impl Into<OriginalError>, request_state: Option<RequestState>) -> Self {
        match original.into() {
            OriginalError::Agent(error) => match *error {
                AgentError::EventLoop(inner) => Self {
                    original: inner.original,
                    request_state: request_state.unwrap_or(inner.request_state),
                },
                leaf => Self {
                    original: OriginalError::Agent(Box::new(leaf)),
                    request_state: request_state.unwrap_or_default(),
                },
            },
            other @ OriginalError::Other(_) => Self {
                original: other,
                request_state: request_state.unwrap_or_default(),
            },
        }
    }

    #[must_use]
    pub fn original(&self) -> &OriginalError {
        &self.original
    }

    /// The wrapped failure as an [`AgentError`] leaf, if it is one.
    #[must_use]
    pub fn original_error(&self) -> Option<&AgentError> {
        self.original.as_agent_error()
    }

    #[must_use]
    pub fn original_kind(&self) -> Option<ErrorKind> {
        self.original.kind()
    }

    #[must_use]
    pub fn request_state(&self) -> &RequestState {
        &self.request_state
    }

    #[must_use]
    pub fn into_original(self) -> OriginalError {
        self.original
    }

    #[must_use]
    pub fn into_parts(self) -> (OriginalError, RequestState) {
        (self.original, self.request_state)
    }
}

impl fmt::Display for EventLoopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.original, f)
    }
}

impl StdError for EventLoopError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.original.source()
    }
}

impl AgentError {
    /// Wrap `original` in an event loop failure.
    pub fn event_loop(
        original: impl Into<OriginalError>,
        request_state: Option<RequestState>,
    ) -> Self {
        Self::EventLoop(EventLoopError::new(original, request_state))
    }

    /// Convert this failure into the terminal event loop failure, attaching
    /// `request_state`.
    #[must_use]
    pub fn into_event_loop(self, request_state: Option<RequestState>) -> EventLoopError {
        EventLoopError::new(self, request_state)
    }

    /// The leaf failure behind an event loop wrapper, or `self` when this is
    /// already a leaf (or wraps a foreign failure).
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::EventLoop(error) => error.original_error().unwrap_or(self),
            _ => self,
        }
    }
}

/// Attach request state to the error arm of a `Result`, turning it into an
/// [`EventLoopError`]. The state is only computed on the error path.
pub trait CaptureStateExt<T> {
    fn capture_state<F>(self, request_state: F) -> Result<T, EventLoopError>
    where
        F: FnOnce() -> RequestState;
}

impl<T, E> CaptureStateExt<T> for Result<T, E>
where
    E: Into<OriginalError>,
{
    fn capture_state<F>(self, request_state: F) -> Result<T, EventLoopError>
    where
        F: FnOnce() -> RequestState,
    {
        self.map_err(|error| EventLoopError::new(error, Some(request_state())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn state(value: Value) -> RequestState {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn rewrapping_keeps_a_single_level() {
        let inner = EventLoopError::new(SessionError::new(), Some(state(json!({ "turn": 1 }))));
        let outer = EventLoopError::new(inner, Some(state(json!({ "turn": 2 }))));

        assert_eq!(outer.original_kind(), Some(ErrorKind::Session));
        assert_eq!(outer.request_state(), &state(json!({ "turn": 2 })));
    }

    #[test]
    fn rewrapping_without_state_keeps_inner_state() {
        let inner = EventLoopError::new(SessionError::new(), Some(state(json!({ "turn": 1 }))));
        let outer = AgentError::from(inner).into_event_loop(None);

        assert_eq!(outer.original_kind(), Some(ErrorKind::Session));
        assert_eq!(outer.request_state(), &state(json!({ "turn": 1 })));
    }

    #[test]
    fn foreign_failure_has_no_kind() {
        let error = EventLoopError::new(OriginalError::other("tool crashed"), None);
        assert_eq!(error.original_kind(), None);
        assert!(error.original_error().is_none());
        assert_eq!(error.to_string(), "tool crashed");
    }
}
