use crate::AgentError;

/// The successful result of a run.
///
/// A run that hit a degrading failure (e.g. the output token budget ran out)
/// still succeeds, but its value is marked `Partial` and keeps the failure
/// that caused it.
#[derive(Debug)]
pub enum RunOutcome<T> {
    Complete(T),
    Partial { value: T, reason: AgentError },
}

impl<T> RunOutcome<T> {
    #[must_use]
    pub fn value(&self) -> &T {
        match self {
            Self::Complete(value) | Self::Partial { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Complete(value) | Self::Partial { value, .. } => value,
        }
    }

    #[must_use]
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Partial { .. })
    }

    /// Why the value is incomplete, if it is.
    #[must_use]
    pub fn partial_reason(&self) -> Option<&AgentError> {
        match self {
            Self::Complete(_) => None,
            Self::Partial { reason, .. } => Some(reason),
        }
    }

    pub fn map<U, F>(self, f: F) -> RunOutcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Complete(value) => RunOutcome::Complete(f(value)),
            Self::Partial { value, reason } => RunOutcome::Partial {
                value: f(value),
                reason,
            },
        }
    }
}

impl<T> From<T> for RunOutcome<T> {
    fn from(value: T) -> Self {
        Self::Complete(value)
    }
}
