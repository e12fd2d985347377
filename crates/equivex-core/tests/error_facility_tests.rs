#![allow(clippy::unwrap_used, clippy::expect_used)]

use equivex_core::equivalency::{check_equivalent, EquivalencyOptions};
use equivex_core::errors::{EquivexError, ExError, ExErrorKind};
use equivex_core::Record;

#[test]
fn test_error_kind_code_mapping() {
    // Test that each kind has a stable, unique code
    let kinds = vec![
        (ExErrorKind::InvalidInput, "ERR_INVALID_INPUT"),
        (ExErrorKind::EmptyCollection, "ERR_EMPTY_COLLECTION"),
        (ExErrorKind::InvalidConfiguration, "ERR_INVALID_CONFIGURATION"),
        (ExErrorKind::InvalidMapping, "ERR_INVALID_MAPPING"),
        (ExErrorKind::NoMembers, "ERR_NO_MEMBERS"),
        (ExErrorKind::UnsupportedComparison, "ERR_UNSUPPORTED_COMPARISON"),
        (ExErrorKind::Serialization, "ERR_SERIALIZATION"),
        (ExErrorKind::AssertionFailed, "ERR_ASSERTION_FAILED"),
        (ExErrorKind::Internal, "ERR_INTERNAL"),
    ];

    let mut seen = std::collections::HashSet::new();
    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
        assert!(seen.insert(expected_code), "duplicate code {}", expected_code);
    }
}

#[test]
fn test_invalid_mapping_keeps_expectation_path() {
    let err = EquivalencyOptions::default()
        .with_mapping("root.Name", "Name")
        .unwrap_err();

    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidMapping);
    assert_eq!(ex_err.code(), "ERR_INVALID_MAPPING");
    assert_eq!(ex_err.op(), Some("with_mapping"));
    assert_eq!(ex_err.path(), Some("root.Name"));
    assert!(ex_err.message().contains("bare member name"));
}

#[test]
fn test_zero_depth_is_invalid_configuration() {
    let err = EquivalencyOptions::default()
        .with_max_recursion_depth(0)
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::InvalidConfiguration);
    let ex_err: ExError = err.into();
    assert!(ex_err.message().starts_with("Invalid configuration"));
    assert_eq!(ex_err.path(), None);
}

#[test]
fn test_mismatch_summarises_failure_count() {
    let subject = Record::new("Point").with("X", 1).with("Y", 2);
    let expectation = Record::new("Point").with("X", 3).with("Y", 4);
    let err = check_equivalent(&subject.into(), &expectation.into(), &EquivalencyOptions::default())
        .unwrap_err();

    assert!(err.is_mismatch());
    assert_eq!(err.kind(), ExErrorKind::AssertionFailed);

    let ex_err: ExError = err.into();
    assert_eq!(ex_err.code(), "ERR_ASSERTION_FAILED");
    assert_eq!(ex_err.message(), "2 failure(s) recorded");
}

#[test]
fn test_mismatch_display_is_the_report() {
    let subject = Record::new("Point").with("X", 1);
    let expectation = Record::new("Point").with("X", 3);
    let err = check_equivalent(&subject.into(), &expectation.into(), &EquivalencyOptions::default())
        .unwrap_err();

    assert!(err
        .to_string()
        .starts_with("Expected root.X to be 3, but found 1."));
}

#[test]
fn test_usage_errors_are_not_mismatches() {
    let err = EquivexError::InvalidArgument {
        name: "elements".to_string(),
        reason: "must not be empty".to_string(),
    };
    assert!(!err.is_mismatch());
    assert!(err.failure().is_none());

    let ex_err: ExError = err.into();
    assert_eq!(ex_err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(
        ex_err.to_string(),
        "[ERR_INVALID_INPUT]: Invalid argument `elements`: must not be empty"
    );
}
