use crate::{AgentError, ErrorKind, EventLoopError, RequestState, RunOutcome};
use serde::{Deserialize, Serialize};

/// How far a terminal failure reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalScope {
    /// The whole run ends and the failure reaches the caller.
    Run,
    /// The triggering request fails. The session itself is still sound.
    Request,
    /// Only the failing extension is dropped; the run goes on without it.
    Extension,
}

/// What the event loop should do with a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Handle locally (retry, reduce the context) and continue the run.
    RecoverableInPlace,
    /// Continue, but mark the result as partial.
    RecoverableWithDegradation,
    Terminal(TerminalScope),
}

impl Disposition {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}

/// Configuration of how failures propagate out of the event loop.
/// # Default Values
/// - `context_reduction`: `false`
/// - `mandatory_extensions`: `false`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PropagationPolicy {
    /// A truncation or summarization strategy is configured, so a context
    /// window overflow can be recovered in place instead of ending the run.
    pub context_reduction: bool,
    /// Extensions are required by the run. When set, an extension that fails
    /// to initialize ends the run instead of being dropped.
    pub mandatory_extensions: bool,
}

impl PropagationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether a context reduction strategy is available
    #[must_use]
    pub fn context_reduction(mut self, context_reduction: bool) -> Self {
        self.context_reduction = context_reduction;
        self
    }

    /// Set whether extension initialization failures are fatal to the run
    #[must_use]
    pub fn mandatory_extensions(mut self, mandatory_extensions: bool) -> Self {
        self.mandatory_extensions = mandatory_extensions;
        self
    }

    #[must_use]
    pub fn disposition(&self, error: &AgentError) -> Disposition {
        match error {
            AgentError::EventLoop(_) | AgentError::Session(_) => {
                Disposition::Terminal(TerminalScope::Run)
            }
            AgentError::MaxTokensReached(_) => Disposition::RecoverableWithDegradation,
            AgentError::ContextWindowOverflow(_) => {
                if self.context_reduction {
                    Disposition::RecoverableInPlace
                } else {
                    Disposition::Terminal(TerminalScope::Run)
                }
            }
            AgentError::ModelThrottled(_) => Disposition::RecoverableInPlace,
            AgentError::ExtensionInit(_) => {
                if self.mandatory_extensions {
                    Disposition::Terminal(TerminalScope::Run)
                } else {
                    Disposition::Terminal(TerminalScope::Extension)
                }
            }
            AgentError::UnsupportedCitations(_) => Disposition::Terminal(TerminalScope::Request),
        }
    }

    /// Turn a failure into a control flow decision for the event loop.
    ///
    /// Terminal failures come back as [`Decision::Abort`], wrapped together
    /// with the request state, which is only computed in that case. A failure
    /// that is already an event loop failure keeps the state it captured.
    pub fn decide<F>(&self, error: AgentError, request_state: F) -> Decision
    where
        F: FnOnce() -> RequestState,
    {
        let disposition = self.disposition(&error);
        tracing::debug!(
            kind = error.kind().as_str(),
            ?disposition,
            "resolved failure disposition"
        );

        match disposition {
            Disposition::RecoverableInPlace => Decision::Recover(error),
            Disposition::RecoverableWithDegradation => Decision::Degrade(error),
            Disposition::Terminal(TerminalScope::Extension) => Decision::DropExtension(error),
            Disposition::Terminal(scope) => {
                let error = match error {
                    AgentError::EventLoop(error) => error,
                    leaf => leaf.into_event_loop(Some(request_state())),
                };
                tracing::warn!(
                    original_kind = error.original_kind().map(ErrorKind::as_str),
                    ?scope,
                    %error,
                    "aborting turn"
                );
                Decision::Abort { error, scope }
            }
        }
    }
}

/// The outcome of [`PropagationPolicy::decide`].
#[derive(Debug)]
pub enum Decision {
    /// Handle the failure locally and continue the run.
    Recover(AgentError),
    /// Continue and mark the result as partial.
    Degrade(AgentError),
    /// Drop the failing extension and continue without it.
    DropExtension(AgentError),
    /// End the turn and propagate to the caller. `scope` tells whether the
    /// run as a whole is compromised or only the triggering request.
    Abort {
        error: EventLoopError,
        scope: TerminalScope,
    },
}

impl Decision {
    /// Attach `value` to a degraded decision, yielding a partial outcome. Any
    /// other decision is handed back unchanged.
    pub fn into_outcome<T>(self, value: T) -> Result<RunOutcome<T>, Self> {
        match self {
            Self::Degrade(reason) => Ok(RunOutcome::Partial { value, reason }),
            other => Err(other),
        }
    }

    /// The failure behind this decision, for when the caller gives up on it.
    #[must_use]
    pub fn into_error(self) -> AgentError {
        match self {
            Self::Recover(error) | Self::Degrade(error) | Self::DropExtension(error) => error,
            Self::Abort { error, .. } => AgentError::EventLoop(error),
        }
    }
}
