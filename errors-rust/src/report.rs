use crate::{AgentError, ErrorKind, EventLoopError, RequestState, UnsupportedCitationsError};
use serde::{Deserialize, Serialize};

/// Serializable view of a failure for callers on the other side of a process
/// or network boundary.
///
/// Carries the same information as the failure value: the kind tag, the
/// rendered message, and the kind-specific fields. For an event loop failure
/// this includes the kind of the wrapped failure and the captured request
/// state, which is what a caller needs to resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub kind: ErrorKind,
    pub message: String,
    /// Kind of the failure wrapped by an event loop failure. Absent when the
    /// wrapped failure is foreign to the taxonomy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_state: Option<RequestState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_models: Option<Vec<String>>,
}

impl AgentError {
    #[must_use]
    pub fn report(&self) -> FailureReport {
        let (model_id, supported_models) = match self {
            Self::EventLoop(error) => return error.report(),
            Self::UnsupportedCitations(error) => citation_fields(error),
            _ => (None, None),
        };

        FailureReport {
            kind: self.kind(),
            message: self.message(),
            original_kind: None,
            request_state: None,
            model_id,
            supported_models,
        }
    }
}

impl EventLoopError {
    #[must_use]
    pub fn report(&self) -> FailureReport {
        let (model_id, supported_models) = match self.original_error() {
            Some(AgentError::UnsupportedCitations(error)) => citation_fields(error),
            _ => (None, None),
        };

        FailureReport {
            kind: ErrorKind::EventLoop,
            message: self.to_string(),
            original_kind: self.original_kind(),
            request_state: Some(self.request_state().clone()),
            model_id,
            supported_models,
        }
    }
}

impl From<&AgentError> for FailureReport {
    fn from(error: &AgentError) -> Self {
        error.report()
    }
}

fn citation_fields(error: &UnsupportedCitationsError) -> (Option<String>, Option<Vec<String>>) {
    (
        Some(error.model_id().to_string()),
        Some(error.supported_models().to_vec()),
    )
}
