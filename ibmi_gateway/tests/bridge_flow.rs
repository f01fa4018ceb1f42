//! End-to-end bridge flows over a scripted transport — no network, no
//! real environment.

use ibmi_gateway::bridge::ExecutionBridge;
use ibmi_gateway::env::MockEnvironment;
use ibmi_gateway::error::Error;
use ibmi_gateway::session::{wrap_for_remote, MockTransport};
use ibmi_gateway_core::{policy_message, validate, CompileRequest, Language, Verdict};

fn full_env() -> MockEnvironment {
    MockEnvironment::default()
        .with_var("IBMI_HOST", "as400.example.com")
        .with_var("IBMI_USER", "QPGMR")
        .with_var("IBMI_PASS", "secret")
}

// ---------------------------------------------------------------------------
// Scenario 1: a clean operator command runs and returns stdout verbatim
// ---------------------------------------------------------------------------

#[test]
fn test_clean_command_returns_stdout_verbatim() {
    let env = full_env();
    let transport = MockTransport::returning("JOB LIST...", "");
    let bridge = ExecutionBridge::new(&env, &transport);

    assert_eq!(bridge.handle_to_text("WRKACTJOB"), "JOB LIST...");
    assert_eq!(transport.open_count(), 1);
}

// ---------------------------------------------------------------------------
// Scenario 2: a chained command is rejected before any session exists
// ---------------------------------------------------------------------------

#[test]
fn test_chained_command_is_rejected_without_a_session() {
    let env = full_env();
    let transport = MockTransport::returning("", "");
    let bridge = ExecutionBridge::new(&env, &transport);

    let text = bridge.handle_to_text("DSPSYSSTS; DLTLIB TESTLIB");
    assert_eq!(text, policy_message());
    assert_eq!(transport.open_count(), 0);
    assert!(transport.executed().is_empty());
}

// ---------------------------------------------------------------------------
// Scenario 3: compile builder defaults, validated before execution
// ---------------------------------------------------------------------------

#[test]
fn test_compile_cl_defaults_reach_the_session_validated() {
    let env = full_env();
    let transport = MockTransport::returning("Program TESTPGM created.", "");
    let bridge = ExecutionBridge::new(&env, &transport);

    let request = CompileRequest {
        language: Language::Cl,
        source_library: "DEVLIB".to_string(),
        source_file: "QCLSRC".to_string(),
        member: "TESTPGM".to_string(),
        target_library: None,
        program_name: None,
    };
    let text = bridge.compile_program(&request);
    assert!(text.starts_with("Compiled TESTPGM in DEVLIB successfully"), "{text}");

    let executed = transport.executed();
    assert_eq!(executed.len(), 1);
    assert!(executed[0].contains("PGM(DEVLIB/TESTPGM)"));
    assert!(executed[0].contains("SRCFILE(DEVLIB/QCLSRC)"));
    assert_eq!(validate(&executed[0]), Verdict::Allowed);
}

// ---------------------------------------------------------------------------
// Scenario 4: missing configuration fails before any connect attempt
// ---------------------------------------------------------------------------

#[test]
fn test_missing_password_is_config_error_without_connect() {
    let mut env = full_env();
    env.env_vars.remove("IBMI_PASS");
    let transport = MockTransport::returning("", "");
    let bridge = ExecutionBridge::new(&env, &transport);

    let err = bridge.handle("WRKACTJOB").unwrap_err();
    assert!(matches!(err, Error::Config(_)), "{err:?}");
    assert_eq!(transport.open_count(), 0);

    let text = bridge.handle_to_text("DSPSYSSTS");
    assert!(text.starts_with("Configuration Error:"), "{text}");
    assert!(text.contains("IBMI_PASS"));
}

// ---------------------------------------------------------------------------
// Supporting flows
// ---------------------------------------------------------------------------

#[test]
fn test_remote_stderr_is_data_reported_as_the_dominant_result() {
    let env = full_env();
    let transport = MockTransport::returning("half a report", "CPF1234: something failed");
    let bridge = ExecutionBridge::new(&env, &transport);

    assert_eq!(
        bridge.handle_to_text("DSPSYSSTS"),
        "Error: CPF1234: something failed"
    );
}

#[test]
fn test_catalog_browsing_queries_go_through_the_gate() {
    let env = full_env();
    let transport = MockTransport::returning("MEMBER  SOURCE_TYPE\nPGM1  RPGLE", "");
    let bridge = ExecutionBridge::new(&env, &transport);

    let text = bridge.list_source_members("DEVLIB", "QRPGLESRC");
    assert!(text.starts_with("Members in DEVLIB/QRPGLESRC"), "{text}");

    let executed = transport.executed();
    assert_eq!(executed.len(), 1);
    assert_eq!(validate(&executed[0]), Verdict::Allowed);
    // Queries address the SQL path and must not be wrapped for the CL
    // interpreter.
    assert_eq!(wrap_for_remote(&executed[0]), executed[0]);
}

#[test]
fn test_connection_failure_surfaces_once_with_phase_context() {
    let env = full_env();
    let transport = MockTransport::failing_open("connection timed out");
    let bridge = ExecutionBridge::new(&env, &transport);

    match bridge.handle("WRKACTJOB") {
        Err(Error::Connection { phase, message }) => {
            assert_eq!(phase, "connect");
            assert_eq!(message, "connection timed out");
        }
        other => panic!("expected connection error, got {other:?}"),
    }
    // One attempt, no retry.
    assert_eq!(transport.open_count(), 1);
}
