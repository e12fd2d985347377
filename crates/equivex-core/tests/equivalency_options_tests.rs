#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{assert_passes, failures_of};
use equivex_core::equivalency::{
    configure_global_defaults, reset_global_defaults, Comparands, EquivalencyContext,
    EquivalencyOptions, EquivalencyResult, EquivalencyStep, EquivalencyValidator,
};
use equivex_core::{AssertionScope, EquivexError, Record, Sequence, Value, ValueType};
use std::sync::Arc;

struct CaseInsensitiveStrings;

impl EquivalencyStep for CaseInsensitiveStrings {
    fn name(&self) -> &str {
        "CaseInsensitiveStrings"
    }

    fn can_handle(&self, comparands: &Comparands, _context: &EquivalencyContext<'_>) -> bool {
        comparands.subject().as_str().is_some() && comparands.expectation().as_str().is_some()
    }

    fn handle(
        &self,
        comparands: &Comparands,
        _context: &EquivalencyContext<'_>,
        _validator: &EquivalencyValidator,
        scope: &mut AssertionScope,
    ) -> equivex_core::Result<EquivalencyResult> {
        let subject = comparands.subject().as_str().unwrap_or_default();
        let expectation = comparands.expectation().as_str().unwrap_or_default();
        scope
            .for_condition(subject.eq_ignore_ascii_case(expectation))
            .fail_with(
                "Expected {context:string} to match {0} ignoring case{reason}, but found {1}.",
                &[comparands.expectation().clone(), comparands.subject().clone()],
            );
        Ok(EquivalencyResult::AssertionCompleted)
    }
}

#[test]
fn test_user_step_runs_before_built_in_steps() {
    let subject = Record::new("Person").with("Name", "ADA");
    let expectation = Record::new("Person").with("Name", "ada");
    let options = EquivalencyOptions::default().using_step(Arc::new(CaseInsensitiveStrings));
    assert_passes(subject.clone(), expectation.clone(), &options);

    let failures = failures_of(subject, expectation, &EquivalencyOptions::default());
    assert_eq!(
        failures,
        vec!["Expected root.Name to be \"ada\", but found \"ADA\".".to_string()]
    );
}

#[test]
fn test_user_step_failure_and_configuration_listing() {
    let options = EquivalencyOptions::default().using_step(Arc::new(CaseInsensitiveStrings));
    let err = equivex_core::check_equivalent(
        &Record::new("Person").with("Name", "Grace").into(),
        &Record::new("Person").with("Name", "ada").into(),
        &options,
    )
    .unwrap_err();
    let failure = err.failure().unwrap();
    assert_eq!(
        failure.failures(),
        &["Expected root.Name to match \"ada\" ignoring case, but found \"Grace\".".to_string()]
    );
    assert!(failure.message().contains("- Use step CaseInsensitiveStrings"));
}

#[test]
fn test_custom_comparer_for_a_type() {
    let subject = Record::new("Reading").with("Celsius", 20.004);
    let expectation = Record::new("Reading").with("Celsius", 20.0);
    let options = EquivalencyOptions::default().using_comparer_fn(
        ValueType::Float,
        "TolerantFloats",
        |a, b| match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => (a - b).abs() < 0.01,
            _ => false,
        },
    );
    assert_passes(subject, expectation.clone(), &options);

    let failures = failures_of(Record::new("Reading").with("Celsius", 21.5), expectation, &options);
    assert_eq!(
        failures,
        vec!["Expected root.Celsius to be equal to 20.0 according to TolerantFloats, but 21.5 was not.".to_string()]
    );
}

#[test]
fn test_auto_conversion_changes_subject_type() {
    let subject = Record::new("Row").with("Count", "5").with("Ratio", 2.0);
    let expectation = Record::new("Row").with("Count", 5).with("Ratio", 2);

    let failures = failures_of(
        subject.clone(),
        expectation.clone(),
        &EquivalencyOptions::default(),
    );
    assert_eq!(
        failures,
        vec![
            "Expected root.Count to be 5, but found \"5\".".to_string(),
            "Expected root.Ratio to be 2, but found 2.0.".to_string(),
        ]
    );

    assert_passes(subject, expectation, &EquivalencyOptions::default().with_auto_conversion());
}

#[test]
fn test_auto_conversion_can_be_limited_to_a_path() {
    let subject = Record::new("Row").with("Count", "5").with("Ratio", 2.0);
    let expectation = Record::new("Row").with("Count", 5).with("Ratio", 2);
    let options = EquivalencyOptions::default()
        .with_auto_conversion_for("Count only", |info| info.path() == "Count");
    let failures = failures_of(subject, expectation, &options);
    assert_eq!(
        failures,
        vec!["Expected root.Ratio to be 2, but found 2.0.".to_string()]
    );
}

#[test]
fn test_inexact_conversion_leaves_subject_unchanged() {
    let options = EquivalencyOptions::default().with_auto_conversion();
    let failures = failures_of(
        Record::new("Row").with("Ratio", 2.5),
        Record::new("Row").with("Ratio", 2),
        &options,
    );
    assert_eq!(
        failures,
        vec!["Expected root.Ratio to be 2, but found 2.5.".to_string()]
    );
}

#[test]
fn test_integer_beyond_float_precision_is_not_converted() {
    let options = EquivalencyOptions::default().with_auto_conversion();
    let failures = failures_of(
        Record::new("Row").with("Big", 9_007_199_254_740_993i64),
        Record::new("Row").with("Big", 9_007_199_254_740_992.0),
        &options,
    );
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("Expected root.Big to be "));
    assert!(failures[0].ends_with(", but found 9007199254740993."));
}

#[test]
fn test_excluding_nested_objects_compares_them_plainly() {
    let subject = Record::new("Post").with("Tags", vec![1, 3]);
    let expectation = Record::new("Post").with("Tags", vec![1, 2]);
    let options = EquivalencyOptions::default().excluding_nested_objects();
    let failures = failures_of(subject, expectation, &options);
    assert_eq!(
        failures,
        vec!["Expected root.Tags to be equal to {1, 2}, but {1, 3} differs at index 1.".to_string()]
    );
}

#[test]
fn test_excluding_nested_objects_still_compares_root_members() {
    let address = |city: &str| Record::new("Address").with("City", city);
    let subject = Record::new("Person").with("Home", address("Oslo"));
    let expectation = Record::new("Person").with("Home", address("Oslo"));
    // Records are plain-equal when their members are equal.
    assert_passes(
        subject,
        expectation,
        &EquivalencyOptions::default().excluding_nested_objects(),
    );

    let failures = failures_of(
        Record::new("Person").with("Home", address("Bergen")),
        Record::new("Person").with("Home", address("Oslo")),
        &EquivalencyOptions::default().excluding_nested_objects(),
    );
    assert_eq!(
        failures,
        vec![
            "Expected root.Home to be Address {City = \"Oslo\"}, but found Address {City = \"Bergen\"}."
                .to_string()
        ]
    );
}

#[test]
fn test_zero_recursion_depth_is_rejected() {
    let err = EquivalencyOptions::default()
        .with_max_recursion_depth(0)
        .unwrap_err();
    assert!(matches!(err, EquivexError::InvalidConfiguration { .. }));
}

#[test]
fn test_malformed_mappings_are_rejected() {
    let err = EquivalencyOptions::default()
        .with_mapping("Buyer.Name", "FullName")
        .unwrap_err();
    assert!(matches!(err, EquivexError::InvalidMapping { .. }));

    let err = EquivalencyOptions::default()
        .with_mapping("Buyer.Name", "Seller.Name")
        .unwrap_err();
    assert!(matches!(err, EquivexError::InvalidMapping { .. }));

    let err = EquivalencyOptions::default().with_mapping("", "Name").unwrap_err();
    assert!(matches!(err, EquivexError::InvalidMapping { .. }));
}

#[test]
fn test_tracing_attaches_trace_to_failures() {
    let options = EquivalencyOptions::default().with_tracing();
    let err = equivex_core::check_equivalent(
        &Record::new("Point").with("X", 2).into(),
        &Record::new("Point").with("X", 1).into(),
        &options,
    )
    .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("\n\nWith trace:\n"));
    assert!(message.contains("root: StructuralEqualityStep -> AssertionCompleted"));
    assert!(message.contains("  root.X: SimpleEqualityStep -> AssertionCompleted"));
}

#[test]
fn test_sequence_against_empty_record_is_reported() {
    // A record without members accepts any record, but a sequence is not a record.
    let failures = failures_of(
        Sequence::list([1]),
        Record::new("Empty"),
        &EquivalencyOptions::default(),
    );
    assert_eq!(failures, vec!["Expected object to be Empty {}, but found {1}.".to_string()]);
}

#[test]
fn test_global_defaults_feed_assert_equivalent() {
    configure_global_defaults(|options| options.excluding_members_named("Version"));
    let subject: Value = Record::new("Doc").with("Body", "x").with("Version", 2).into();
    let expectation: Value = Record::new("Doc").with("Body", "x").with("Version", 1).into();
    equivex_core::assert_equivalent(&subject, &expectation);
    reset_global_defaults();

    let err = equivex_core::check_equivalent(
        &subject,
        &expectation,
        &EquivalencyOptions::from_global_defaults(),
    )
    .unwrap_err();
    assert_eq!(
        err.failure().unwrap().failures(),
        &["Expected root.Version to be 1, but found 2.".to_string()]
    );
}
