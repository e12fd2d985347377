#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{assert_passes, failures_of};
use equivex_core::equivalency::EquivalencyOptions;
use equivex_core::{EnumValue, Record, Value};

fn red() -> EnumValue {
    EnumValue::new("Color", "Red", 0)
}

fn green() -> EnumValue {
    EnumValue::new("Color", "Green", 1)
}

#[test]
fn test_same_enum_member_is_equivalent() {
    assert_passes(red(), red(), &EquivalencyOptions::default());
    assert_passes(red(), red(), &EquivalencyOptions::default().comparing_enums_by_name());
}

#[test]
fn test_by_value_reports_both_members() {
    let failures = failures_of(red(), green(), &EquivalencyOptions::default());
    assert_eq!(
        failures,
        vec!["Expected enum to equal Color.Green {value: 1} by value, but found Color.Red {value: 0}.".to_string()]
    );
}

#[test]
fn test_different_enum_types_with_equal_values() {
    let dark = EnumValue::new("Shade", "Dark", 0);
    assert_passes(red(), dark.clone(), &EquivalencyOptions::default());

    let failures = failures_of(
        red(),
        dark,
        &EquivalencyOptions::default().comparing_enums_by_name(),
    );
    assert_eq!(
        failures,
        vec!["Expected enum to equal Shade.Dark {value: 0} by name, but found Color.Red {value: 0}.".to_string()]
    );
}

#[test]
fn test_same_name_in_different_types_matches_by_name() {
    let other = EnumValue::new("Paint", "Red", 7);
    assert_passes(red(), other.clone(), &EquivalencyOptions::default().comparing_enums_by_name());
    let failures = failures_of(red(), other, &EquivalencyOptions::default());
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("by value"));
}

#[test]
fn test_unnamed_value_compares_by_its_number() {
    let unnamed = EnumValue::unnamed("Color", 0);
    assert_passes(unnamed.clone(), red(), &EquivalencyOptions::default());
    let failures = failures_of(
        unnamed,
        red(),
        &EquivalencyOptions::default().comparing_enums_by_name(),
    );
    assert_eq!(
        failures,
        vec!["Expected enum to equal Color.Red {value: 0} by name, but found Color.0 {value: 0}.".to_string()]
    );
}

#[test]
fn test_non_enum_subject_is_reported() {
    let failures = failures_of(0, red(), &EquivalencyOptions::default());
    assert_eq!(
        failures,
        vec!["Expected enum to be equivalent to Color.Red {value: 0}, but found 0.".to_string()]
    );
}

#[test]
fn test_null_subject_against_enum() {
    let failures = failures_of(Value::Null, red(), &EquivalencyOptions::default());
    assert_eq!(
        failures,
        vec!["Expected enum to equal Color.Red {value: 0} by value, but found <null>.".to_string()]
    );
}

#[test]
fn test_enum_member_mismatch_uses_member_path() {
    let subject = Record::new("Car").with("Color", red());
    let expectation = Record::new("Car").with("Color", green());
    let failures = failures_of(subject, expectation, &EquivalencyOptions::default());
    assert_eq!(
        failures,
        vec!["Expected root.Color to equal Color.Green {value: 1} by value, but found Color.Red {value: 0}.".to_string()]
    );
}

#[test]
fn test_flag_names_render_joined_by_pipes() {
    let read_write = EnumValue::new("Access", "Read, Write", 3);
    let read = EnumValue::new("Access", "Read", 1);
    let failures = failures_of(read, read_write, &EquivalencyOptions::default());
    assert_eq!(
        failures,
        vec!["Expected enum to equal Access.Read|Write {value: 3} by value, but found Access.Read {value: 1}.".to_string()]
    );
}
