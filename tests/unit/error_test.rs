//! Tests for error types

use rate_gate::core::SchedulerError;

#[test]
fn test_invalid_configuration_error() {
    let err = SchedulerError::InvalidConfiguration("capacity must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: capacity must be greater than 0"
    );
    assert!(err.is_configuration());
}

#[test]
fn test_cancelled_error() {
    let err = SchedulerError::Cancelled;
    assert_eq!(format!("{}", err), "task cancelled before admission");
    assert!(err.is_cancelled());
}

#[test]
fn test_action_failed_error() {
    let err = SchedulerError::ActionFailed(anyhow::anyhow!("upstream returned 503"));
    assert_eq!(format!("{}", err), "action failed: upstream returned 503");
    assert!(!err.is_cancelled());
}

#[test]
fn test_action_panicked_error() {
    let err = SchedulerError::ActionPanicked("index out of bounds".to_string());
    assert_eq!(format!("{}", err), "action panicked: index out of bounds");
}

#[test]
fn test_abandoned_error() {
    let err = SchedulerError::Abandoned;
    assert_eq!(format!("{}", err), "task abandoned by the runtime");
}
