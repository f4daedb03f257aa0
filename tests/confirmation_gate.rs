use runwatch::engine::{ConfirmationGate, ConfirmationRequest, GateState};
use runwatch::errors::RunnerError;
use runwatch::protocol::ConfirmAnswer;

#[test]
fn starts_armed() {
    let gate = ConfirmationGate::new();
    assert_eq!(gate.state(), GateState::Armed);
    assert!(gate.pending().is_none());
}

#[test]
fn pause_then_resolve_rearms() {
    let mut gate = ConfirmationGate::new();
    gate.pause(ConfirmationRequest::new("Continue?")).unwrap();
    assert_eq!(gate.state(), GateState::Paused);
    assert_eq!(gate.pending().unwrap().description, "Continue?");

    let (request, answer) = gate.resolve(false).unwrap();
    assert_eq!(request.description, "Continue?");
    assert_eq!(answer, ConfirmAnswer { ok: false });
    assert_eq!(gate.state(), GateState::Armed);
    assert!(gate.pending().is_none());
}

#[test]
fn second_request_while_paused_is_a_protocol_violation() {
    let mut gate = ConfirmationGate::new();
    gate.pause(ConfirmationRequest::new("first")).unwrap();

    match gate.pause(ConfirmationRequest::new("second")) {
        Err(RunnerError::ProtocolViolation(msg)) => {
            assert!(msg.contains("second"));
            assert!(msg.contains("first"));
        }
        other => panic!("expected ProtocolViolation, got {other:?}"),
    }
    // The original request is still the pending one.
    assert_eq!(gate.pending().unwrap().description, "first");
}

#[test]
fn resolve_without_pending_request_fails() {
    let mut gate = ConfirmationGate::new();
    assert!(matches!(
        gate.resolve(true),
        Err(RunnerError::NoPendingConfirmation)
    ));
    assert!(matches!(
        gate.answer_for(true),
        Err(RunnerError::NoPendingConfirmation)
    ));
}

#[test]
fn close_is_terminal_and_discards_pending() {
    let mut gate = ConfirmationGate::new();
    gate.pause(ConfirmationRequest::new("abandon me")).unwrap();

    let discarded = gate.close().unwrap();
    assert_eq!(discarded.description, "abandon me");
    assert_eq!(gate.state(), GateState::Closed);

    assert!(matches!(
        gate.resolve(true),
        Err(RunnerError::NoPendingConfirmation)
    ));
    assert!(matches!(
        gate.pause(ConfirmationRequest::new("late")),
        Err(RunnerError::ProtocolViolation(_))
    ));
    assert!(gate.close().is_none());
    assert_eq!(gate.state(), GateState::Closed);
}
