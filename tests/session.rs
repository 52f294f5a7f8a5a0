//! Tests for the session stage transitions.
mod common;
use common::*;
use shinsa::error::ENTITY_NOT_FOUND_MARKER;
use shinsa::prelude::*;
use shinsa::session::{CREDENTIAL_REJECTED_MESSAGE, GENERIC_FAILURE_MESSAGE};

const WORKFLOW: &str = r#"{"nodes": [{"id": "1"}], "connections": {}}"#;

#[test]
fn test_starts_in_input() {
    let session = create_ready_session();
    assert_eq!(session.stage(), Stage::Input);
    assert!(session.result().is_none());
    assert!(session.corrected_document().is_none());
}

#[test]
fn test_invalid_json_stays_in_input() {
    let mut session = create_ready_session();
    let err = session.submit("not json").unwrap_err();

    assert!(matches!(err, SessionError::InvalidJson(_)));
    assert_eq!(session.stage(), Stage::Input);
    assert_eq!(session.raw_input(), "not json");
    assert!(session.error().unwrap().contains("Invalid JSON"));
}

#[test]
fn test_submit_requires_credential() {
    let mut session = Session::new(false);
    assert_eq!(session.submit(WORKFLOW), Err(SessionError::CredentialRequired));
    assert_eq!(session.stage(), Stage::Input);
}

#[test]
fn test_with_credentials_mirrors_source() {
    let missing = StaticCredential::new(Some("  ".to_string()));
    assert!(!Session::with_credentials(&missing).credential_present());

    let present = StaticCredential::new(Some("key".to_string()));
    assert!(Session::with_credentials(&present).credential_present());
}

#[test]
fn test_only_one_request_in_flight() {
    let mut session = create_ready_session();
    session.submit(WORKFLOW).unwrap();
    assert_eq!(session.stage(), Stage::Analyzing);
    assert_eq!(session.submit(WORKFLOW), Err(SessionError::AnalysisInFlight));
}

#[test]
fn test_submit_clears_previous_state() {
    let mut session = create_ready_session();
    let ticket = session.submit(WORKFLOW).unwrap();
    session.complete(ticket, Ok(create_sample_analysis()));
    session.approve_all_fixes();
    session.toggle_section("1");
    assert!(!session.approved().is_empty());

    let _ticket = session.submit(WORKFLOW).unwrap();
    assert_eq!(session.stage(), Stage::Analyzing);
    assert!(session.result().is_none());
    assert!(session.error().is_none());
    assert!(session.approved().is_empty());
    assert!(!session.is_section_expanded("1"));
}

#[test]
fn test_success_moves_to_results() {
    let mut session = create_ready_session();
    let ticket = session.submit(WORKFLOW).unwrap();
    assert_eq!(ticket.workflow_json(), r#"{"nodes":[{"id":"1"}],"connections":{}}"#);

    let completion = session.complete(ticket, Ok(create_sample_analysis()));
    assert_eq!(completion, Completion::Committed(Stage::Results));
    assert_eq!(session.stage(), Stage::Results);
    assert!(session.error().is_none());
    assert!(session.approved().is_empty());
    assert!(session.corrected_document().is_some());
}

#[test]
fn test_failure_returns_to_input_with_message() {
    let mut session = create_ready_session();
    let ticket = session.submit(WORKFLOW).unwrap();
    let error = AnalyzerError::Api {
        status: 500,
        message: "backend exploded".to_string(),
    };

    session.complete(ticket, Err(error));
    assert_eq!(session.stage(), Stage::Input);
    assert!(session.error().unwrap().contains("backend exploded"));
    assert!(session.credential_present());
    assert!(session.document().is_none());
}

#[test]
fn test_entity_not_found_clears_credential() {
    let mut session = create_ready_session();
    let ticket = session.submit(WORKFLOW).unwrap();
    let error = AnalyzerError::Api {
        status: 404,
        message: format!("{}.", ENTITY_NOT_FOUND_MARKER),
    };

    session.complete(ticket, Err(error));
    assert_eq!(session.stage(), Stage::Input);
    assert!(!session.credential_present());
    assert_eq!(session.error(), Some(CREDENTIAL_REJECTED_MESSAGE));
}

#[test]
fn test_rejected_key_clears_credential() {
    let mut session = create_ready_session();
    let ticket = session.submit(WORKFLOW).unwrap();
    session.complete(
        ticket,
        Err(AnalyzerError::CredentialRejected("API key not valid".to_string())),
    );
    assert!(!session.credential_present());
    assert_eq!(session.submit(WORKFLOW), Err(SessionError::CredentialRequired));
}

#[test]
fn test_failure_without_message_uses_generic_text() {
    let mut session = create_ready_session();
    let ticket = session.submit(WORKFLOW).unwrap();
    let error = AnalyzerError::Api {
        status: 500,
        message: String::new(),
    };
    session.complete(ticket, Err(error));
    assert_eq!(session.stage(), Stage::Input);
    assert_eq!(session.error(), Some(GENERIC_FAILURE_MESSAGE));

    let ticket = session.submit(WORKFLOW).unwrap();
    session.complete(ticket, Err(AnalyzerError::Network("  ".to_string())));
    assert_eq!(session.error(), Some(GENERIC_FAILURE_MESSAGE));
    assert!(session.credential_present());
}

#[test]
fn test_failure_without_detail_keeps_its_description() {
    let mut session = create_ready_session();
    let ticket = session.submit(WORKFLOW).unwrap();
    session.complete(ticket, Err(AnalyzerError::Timeout));
    assert_eq!(session.error(), Some("Analysis request timed out"));
}

#[test]
fn test_invalid_json_from_results_returns_to_input() {
    let mut session = create_ready_session();
    let ticket = session.submit(WORKFLOW).unwrap();
    session.complete(ticket, Ok(create_sample_analysis()));
    session.approve_all_fixes();
    assert_eq!(session.stage(), Stage::Results);

    let err = session.submit("{ not json").unwrap_err();
    assert!(matches!(err, SessionError::InvalidJson(_)));
    assert_eq!(session.stage(), Stage::Input);
    assert!(session.result().is_none());
    assert!(session.document().is_none());
    assert!(session.approved().is_empty());
    assert_eq!(session.raw_input(), "{ not json");
    assert!(session.error().unwrap().contains("Invalid JSON"));
}

#[test]
fn test_dismiss_error_clears_shown_message() {
    let mut session = create_ready_session();
    let ticket = session.submit(WORKFLOW).unwrap();
    session.complete(ticket, Err(AnalyzerError::Timeout));
    assert!(session.error().is_some());

    session.dismiss_error();
    assert!(session.error().is_none());
    assert_eq!(session.stage(), Stage::Input);
}

#[test]
fn test_new_analysis_clears_results_but_not_credential_flag() {
    let mut session = Session::new(true);
    let ticket = session.submit(WORKFLOW).unwrap();
    session.complete(ticket, Err(AnalyzerError::CredentialRejected(String::new())));
    assert!(!session.credential_present());

    session.new_analysis();
    assert!(!session.credential_present());

    session.set_credential_present(true);
    let ticket = session.submit(WORKFLOW).unwrap();
    session.complete(ticket, Ok(create_sample_analysis()));
    session.approve_all_fixes();
    session.toggle_section("2");

    session.new_analysis();
    assert_eq!(session.stage(), Stage::Input);
    assert!(session.document().is_none());
    assert!(session.result().is_none());
    assert!(session.approved().is_empty());
    assert!(!session.is_section_expanded("2"));
    assert!(session.credential_present());
}

#[test]
fn test_stale_completion_is_discarded() {
    let mut session = create_ready_session();
    let old_ticket = session.submit(WORKFLOW).unwrap();
    session.new_analysis();

    let completion = session.complete(old_ticket, Ok(create_sample_analysis()));
    assert_eq!(completion, Completion::Stale);
    assert_eq!(session.stage(), Stage::Input);
    assert!(session.result().is_none());
}

#[test]
fn test_late_response_cannot_overwrite_newer_request() {
    let mut session = create_ready_session();
    let old_ticket = session.submit(WORKFLOW).unwrap();
    session.new_analysis();
    let new_ticket = session.submit(r#"{"nodes": []}"#).unwrap();
    assert!(new_ticket.generation() > old_ticket.generation());

    assert_eq!(
        session.complete(old_ticket, Ok(create_sample_analysis())),
        Completion::Stale
    );
    assert_eq!(session.stage(), Stage::Analyzing);

    let mut fresh = create_sample_analysis();
    fresh.errors.clear();
    assert_eq!(
        session.complete(new_ticket, Ok(fresh)),
        Completion::Committed(Stage::Results)
    );
    assert!(session.result().unwrap().errors.is_empty());
}

#[test]
fn test_corrected_document_reflects_selection() {
    let mut session = create_ready_session();
    let workflow = create_sample_workflow().to_string();
    let ticket = session.submit(&workflow).unwrap();
    session.complete(ticket, Ok(create_sample_analysis()));

    assert_eq!(session.corrected_document().as_ref(), session.document());

    session.toggle_fix("missing-url");
    let corrected = session.corrected_document().unwrap();
    assert_eq!(
        corrected["nodes"][1]["parameters"]["url"],
        "https://api.example.com/stats"
    );

    session.toggle_fix("missing-url");
    assert_eq!(session.corrected_document().as_ref(), session.document());
}

#[test]
fn test_analyze_runs_full_cycle() {
    let analyzer = MockAnalyzer::succeeding(create_sample_analysis());
    let mut session = create_ready_session();

    let completion = tokio_test::block_on(session.analyze(WORKFLOW, &analyzer)).unwrap();
    assert_eq!(completion, Completion::Committed(Stage::Results));
    assert_eq!(analyzer.calls(), 1);
}

#[test]
fn test_analyze_rejects_invalid_json_without_calling_analyzer() {
    let analyzer = MockAnalyzer::succeeding(create_sample_analysis());
    let mut session = create_ready_session();

    let result = tokio_test::block_on(session.analyze("{ broken", &analyzer));
    assert!(matches!(result, Err(SessionError::InvalidJson(_))));
    assert_eq!(analyzer.calls(), 0);
}
