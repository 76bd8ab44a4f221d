use crate::{AgentError, ErrorKind, EventLoopError};
use opentelemetry::trace::Status;
use std::future::Future;
use tracing::{info_span, Span};
use tracing_futures::Instrument;
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Record a failure on `span` and mark the span as errored.
pub fn record_failure(span: &Span, error: &AgentError) {
    match error {
        AgentError::EventLoop(error) => record_event_loop_failure(span, error),
        _ => set_error(span, error.kind(), error.to_string()),
    }
}

/// Like [`record_failure`], also recording the kind of the wrapped failure.
pub fn record_event_loop_failure(span: &Span, error: &EventLoopError) {
    set_error(span, ErrorKind::EventLoop, error.to_string());
    if let Some(kind) = error.original_kind() {
        span.set_attribute("llm_agent.original_error.type", kind.as_str());
    }
}

fn set_error(span: &Span, kind: ErrorKind, message: String) {
    span.set_attribute("error.type", kind.as_str());
    span.set_attribute("exception.message", message.clone());
    span.set_status(Status::error(message));
}

/// Run one turn of the event loop inside an `llm_agent.turn` span, recording
/// the failure on the span if the turn fails.
pub async fn trace_turn<T, Fut>(turn: usize, future: Fut) -> Result<T, AgentError>
where
    Fut: Future<Output = Result<T, AgentError>> + Send,
{
    let span = info_span!("llm_agent.turn");
    span.set_attribute("llm_agent.turn", i64::try_from(turn).unwrap_or(i64::MAX));

    let result = future.instrument(span.clone()).await;

    if let Err(error) = &result {
        record_failure(&span, error);
    }

    result
}
