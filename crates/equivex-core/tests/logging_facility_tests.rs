#![allow(clippy::unwrap_used, clippy::expect_used)]

use equivex_core::equivalency::{assert_equivalency, Comparands, EquivalencyOptions};
use equivex_core::equivex_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, OP_ASSERT_EQUIVALENCY, OP_SATISFY,
    OP_SATISFY_RESPECTIVELY,
};
use equivex_core::errors::{EquivexError, ExError, ExErrorKind};
use equivex_core::logging_facility::test_capture::init_test_capture;
use equivex_core::{log_op_end, log_op_error, log_op_start};
use equivex_core::{satisfy, satisfy_respectively, AssertionScope, Predicate, Record};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    let start_events = capture.count_events(|e| {
        e.op.as_deref() == Some(op_name) && e.event.as_deref() == Some(EVENT_START)
    });
    assert_eq!(start_events, 1, "Should have captured exactly one start event");
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42, failure_count = 3);

    let end_events = capture.events_for_op(op_name);
    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].event.as_deref(), Some(EVENT_END));
    assert_eq!(end_events[0].field("duration_ms"), Some("42"));
    assert_eq!(end_events[0].field("failure_count"), Some("3"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    log_op_error!(op_name, EquivexError::EmptyPredicates, duration_ms = 10);

    capture.assert_event_exists(op_name, EVENT_END_ERROR);
    let event = capture
        .events_for_op(op_name)
        .into_iter()
        .next()
        .expect("Should have error event");
    assert_eq!(event.field("err.code"), Some("ERR_EMPTY_COLLECTION"));
    assert_eq!(event.field("duration_ms"), Some("10"));
}

#[test]
#[should_panic(expected = "Expected event")]
fn test_test_capture_assert_event_exists_fails() {
    let capture = init_test_capture();
    capture.assert_event_exists("nonexistent_op_truly_unique_999", EVENT_START);
}

#[test]
fn test_assert_equivalency_logs_one_start_and_one_end() {
    let capture = init_test_capture();
    let mut scope = AssertionScope::new();
    let comparands = Comparands::for_values(
        Record::new("Point").with("X", 2),
        Record::new("Point").with("X", 1),
    );
    assert_equivalency(&comparands, &EquivalencyOptions::default(), &mut scope).unwrap();
    assert_eq!(scope.failure_count(), 1);

    capture.assert_event_exists(OP_ASSERT_EQUIVALENCY, EVENT_START);
    let end = capture
        .events_for_op(OP_ASSERT_EQUIVALENCY)
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END) && e.field("failure_count") == Some("1"))
        .expect("Should have an end event reporting one failure");
    let invocation_id = end.field("invocation_id").expect("end event carries invocation id");
    let starts = capture.count_events(|e| {
        e.op.as_deref() == Some(OP_ASSERT_EQUIVALENCY)
            && e.event.as_deref() == Some(EVENT_START)
            && e.field("invocation_id") == Some(invocation_id)
    });
    assert_eq!(starts, 1, "Start and end share the invocation id");
}

#[test]
fn test_usage_error_logs_end_error() {
    let capture = init_test_capture();
    let mut scope = AssertionScope::new();
    let predicates: Vec<Predicate<'_, i32>> = Vec::new();

    let err = satisfy(&mut scope, &[1, 2], &predicates).unwrap_err();
    assert_eq!(err, EquivexError::EmptyPredicates);

    let error_event = capture
        .events_for_op(OP_SATISFY)
        .into_iter()
        .find(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .expect("Should have error event for satisfy");
    assert_eq!(error_event.field("err.code"), Some("ERR_EMPTY_COLLECTION"));
}

#[test]
fn test_empty_elements_logs_end_error() {
    let capture = init_test_capture();
    let mut scope = AssertionScope::new();
    let predicates = vec![Predicate::new("x > 0", |x: &i32| *x > 0)];

    let err = satisfy(&mut scope, &Vec::<i32>::new(), &predicates).unwrap_err();
    assert_eq!(err, EquivexError::EmptyElements);

    let errors = capture.count_events(|e| {
        e.op.as_deref() == Some(OP_SATISFY)
            && e.event.as_deref() == Some(EVENT_END_ERROR)
            && e.field("err.code") == Some("ERR_EMPTY_COLLECTION")
    });
    assert!(errors >= 1);
}

#[test]
fn test_satisfy_respectively_logs_outcome() {
    let capture = init_test_capture();
    let mut scope = AssertionScope::new();
    let inspectors: Vec<equivex_core::Inspector<'_, i32>> =
        vec![Box::new(|x: &i32, scope: &mut AssertionScope| {
            scope
                .for_condition(*x == 1)
                .fail_with("Expected {context:value} to be 1.", &[]);
        })];

    satisfy_respectively(&mut scope, &[1], &inspectors).unwrap();

    let satisfied = capture.count_events(|e| {
        e.op.as_deref() == Some(OP_SATISFY_RESPECTIVELY)
            && e.event.as_deref() == Some(EVENT_END)
            && e.field("satisfied") == Some("true")
    });
    assert!(satisfied >= 1);
}

#[test]
fn test_error_conversion_preserves_context() {
    let err = EquivexError::NoMembersFound {
        type_name: "Customer".to_string(),
        path: "root.Customer".to_string(),
    };
    let ex_err: ExError = err.into();
    assert_eq!(ex_err.kind(), ExErrorKind::NoMembers);
    assert_eq!(ex_err.code(), "ERR_NO_MEMBERS");
    assert_eq!(ex_err.path(), Some("root.Customer"));
}
