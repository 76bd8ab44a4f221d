use llm_agent_errors::{
    AgentError, ContextWindowOverflowError, ErrorKind, EventLoopError, FailureReport,
    ModelThrottledError, OriginalError, SessionError, UnsupportedCitationsError,
};
use serde_json::json;

#[test]
fn leaf_report_has_kind_and_message_only() {
    let error: AgentError = ModelThrottledError::new("rate limited, retry in 2s").into();

    assert_eq!(
        serde_json::to_value(error.report()).unwrap(),
        json!({
            "kind": "model_throttled",
            "message": "rate limited, retry in 2s",
        })
    );
}

#[test]
fn citation_report_carries_model_fields() {
    let error: AgentError =
        UnsupportedCitationsError::new("gpt-4", ["claude-3-opus", "claude-3-sonnet"]).into();

    assert_eq!(
        serde_json::to_value(FailureReport::from(&error)).unwrap(),
        json!({
            "kind": "unsupported_citations",
            "message": "Model 'gpt-4' does not support document citations. Supported models for citations are: claude-3-opus, claude-3-sonnet",
            "modelId": "gpt-4",
            "supportedModels": ["claude-3-opus", "claude-3-sonnet"],
        })
    );
}

#[test]
fn event_loop_report_carries_original_kind_and_state() {
    let state = json!({ "session_id": "sess_7", "turn": 2 });
    let serde_json::Value::Object(state) = state else {
        unreachable!()
    };
    let error = AgentError::event_loop(
        SessionError::with_message("failed to save session sess_7"),
        Some(state),
    );

    assert_eq!(
        serde_json::to_value(error.report()).unwrap(),
        json!({
            "kind": "event_loop",
            "message": "failed to save session sess_7",
            "originalKind": "session",
            "requestState": { "session_id": "sess_7", "turn": 2 },
        })
    );
}

#[test]
fn wrapped_citation_report_keeps_model_fields() {
    let error = EventLoopError::new(
        UnsupportedCitationsError::new("gpt-4", ["claude-3-opus"]),
        None,
    );

    let report = error.report();
    assert_eq!(report.kind, ErrorKind::EventLoop);
    assert_eq!(report.original_kind, Some(ErrorKind::UnsupportedCitations));
    assert_eq!(report.model_id.as_deref(), Some("gpt-4"));
    assert_eq!(report.supported_models, Some(vec!["claude-3-opus".to_string()]));
    assert_eq!(report.request_state, Some(serde_json::Map::new()));
}

#[test]
fn foreign_original_has_no_original_kind() {
    let error = EventLoopError::new(OriginalError::other("tool panicked"), None);

    assert_eq!(
        serde_json::to_value(error.report()).unwrap(),
        json!({
            "kind": "event_loop",
            "message": "tool panicked",
            "requestState": {},
        })
    );
}

#[test]
fn report_parses_back() {
    let error: AgentError = ContextWindowOverflowError::new().into();
    let encoded = serde_json::to_string(&error.report()).unwrap();

    let decoded: FailureReport = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, error.report());
    assert_eq!(decoded.kind, ErrorKind::ContextWindowOverflow);
}
