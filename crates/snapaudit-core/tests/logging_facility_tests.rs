#![allow(clippy::unwrap_used, clippy::expect_used)]

use snapaudit_core::errors::{AuditError, ExError, ExErrorKind};
use snapaudit_core::logging_facility::test_capture::init_test_capture;
use snapaudit_core::{log_op_end, log_op_error, log_op_start};
use snapaudit_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};

#[test]
fn test_log_op_start_carries_subject() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, subject_id = "emby-1");

    let events = capture.events_where(op_name, "subject_id", "emby-1");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
}

#[test]
fn test_log_op_end_records_duration() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END))
        .collect();

    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].field("duration_ms"), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = AuditError::VersionConflict {
        subject_id: "emby-1".to_string(),
        expected: 2,
        actual: Some(3),
    };
    log_op_error!(op_name, &err, duration_ms = 10);

    let error_events: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| {
            e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_END_ERROR)
        })
        .collect();

    assert_eq!(error_events.len(), 1, "Should have exactly one error event");
    assert_eq!(error_events[0].field("err_code"), Some("ERR_CONCURRENCY"));
    assert_eq!(error_events[0].field("err_kind"), Some("Concurrency"));
}

#[test]
fn test_log_op_error_accepts_ex_error() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_4";

    let err = ExError::new(ExErrorKind::Persistence).with_message("disk full");
    log_op_error!(op_name, &err, duration_ms = 1, subject_id = "emby-9");

    let events = capture.events_where(op_name, "subject_id", "emby-9");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].field("err_code"), Some("ERR_PERSISTENCE"));
    assert_eq!(events[0].field("message"), Some("disk full"));
}

#[test]
fn test_boundary_single_start_and_end() {
    let capture = init_test_capture();
    let op_name = "test_boundary_unique_5";

    log_op_start!(op_name);
    log_op_end!(op_name, duration_ms = 5);

    capture.assert_event_exists(op_name, EVENT_START);
    capture.assert_event_exists(op_name, EVENT_END);
    let count = capture.count_events(|e| e.op.as_deref() == Some(op_name));
    assert_eq!(count, 2);
}
