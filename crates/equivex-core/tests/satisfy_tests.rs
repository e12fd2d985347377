#![allow(clippy::unwrap_used, clippy::expect_used)]

use equivex_core::collections::Predicate;
use equivex_core::{
    predicate, satisfy, satisfy_respectively, AssertionScope, EquivexError, Inspector,
};
use serde::Serialize;

#[test]
fn test_each_predicate_finds_a_distinct_element() {
    let mut scope = AssertionScope::new();
    let predicates = vec![
        Predicate::new("x > 10", |x: &i32| *x > 10),
        Predicate::new("x < 0", |x: &i32| *x < 0),
    ];
    satisfy(&mut scope, &[20, -3], &predicates).unwrap();
    assert!(!scope.has_failures());
}

#[test]
fn test_assignment_is_not_greedy() {
    // The first predicate accepts both elements; only one assignment works.
    let mut scope = AssertionScope::new();
    let predicates = vec![
        Predicate::new("x > 0", |x: &i32| *x > 0),
        Predicate::new("x > 5", |x: &i32| *x > 5),
    ];
    satisfy(&mut scope, &[10, 1], &predicates).unwrap();
    assert!(!scope.has_failures());
}

#[test]
fn test_unmatched_predicates_and_elements_are_listed() {
    let mut scope = AssertionScope::new();
    let predicates = vec![Predicate::new("x > 100", |x: &i32| *x > 100)];
    satisfy(&mut scope, &[1, 2], &predicates).unwrap();
    assert_eq!(
        scope.failures(),
        &["Expected collection to satisfy all predicates, but:\n\n\
           The following predicates did not have matching elements:\n\n\
           x > 100\n\n\
           The following elements did not match any predicate:\n\n\
           Index: 0, Element: 1\n\
           Index: 1, Element: 2"
            .to_string()]
    );
}

#[derive(Serialize)]
struct Order {
    id: u32,
    total: u32,
}

#[test]
fn test_elements_are_rendered_with_the_value_formatter() {
    let mut scope = AssertionScope::new()
        .with_context("orders")
        .because("every order needs a rule");
    let orders = [Order { id: 1, total: 50 }, Order { id: 2, total: 5 }];
    let predicates = vec![predicate!(|o: &Order| o.total > 10)];
    satisfy(&mut scope, &orders, &predicates).unwrap();

    let failure = &scope.failures()[0];
    assert!(failure.starts_with(
        "Expected orders to satisfy all predicates because every order needs a rule, but:"
    ));
    assert!(failure.ends_with("Index: 1, Element: Order {id = 2, total = 5}"));
    assert!(!failure.contains("did not have matching elements"));
}

#[test]
fn test_empty_collection_is_a_usage_error() {
    let mut scope = AssertionScope::new();
    let predicates = vec![Predicate::new("x > 0", |x: &i32| *x > 0)];
    let err = satisfy(&mut scope, &Vec::<i32>::new(), &predicates).unwrap_err();
    assert_eq!(err, EquivexError::EmptyElements);
    assert!(!scope.has_failures());
}

#[test]
fn test_no_predicates_is_a_usage_error() {
    let mut scope = AssertionScope::new();
    let predicates: Vec<Predicate<'_, i32>> = Vec::new();
    let err = satisfy(&mut scope, &[1], &predicates).unwrap_err();
    assert_eq!(err, EquivexError::EmptyPredicates);
}

fn is_positive() -> Inspector<'static, i32> {
    Box::new(|x: &i32, scope: &mut AssertionScope| {
        scope
            .for_condition(*x > 0)
            .fail_with("Expected {context:value} to be positive, but found {0}.", &[(*x).into()]);
    })
}

#[test]
fn test_inspectors_run_in_order() {
    let mut scope = AssertionScope::new();
    satisfy_respectively(&mut scope, &[1, 2], &[is_positive(), is_positive()]).unwrap();
    assert!(!scope.has_failures());
}

#[test]
fn test_failed_inspectors_are_grouped_by_index() {
    let mut scope = AssertionScope::new();
    let inspectors: Vec<Inspector<'_, i32>> = vec![
        is_positive(),
        Box::new(|x: &i32, scope: &mut AssertionScope| {
            scope
                .for_condition(*x % 2 == 0)
                .fail_with("Expected {context:value} to be even, but found {0}.", &[(*x).into()]);
            scope
                .for_condition(*x > 10)
                .fail_with("Expected {context:value} to exceed 10, but found {0}.", &[(*x).into()]);
        }),
    ];
    satisfy_respectively(&mut scope, &[1, 3], &inspectors).unwrap();
    assert_eq!(
        scope.failures(),
        &["Expected collection to satisfy all inspectors, but some inspectors are not satisfied:\n\
           At index 1:\n    \
           Expected value to be even, but found 3.\n    \
           Expected value to exceed 10, but found 3."
            .to_string()]
    );
}

#[test]
fn test_inspector_count_must_match() {
    let mut scope = AssertionScope::new();
    satisfy_respectively(&mut scope, &[1, 2, 3], &[is_positive()]).unwrap();
    assert_eq!(
        scope.failures(),
        &["Expected collection to contain exactly 1 items, but it contains 3 items.".to_string()]
    );
}

#[test]
fn test_inspectors_against_empty_collection() {
    let mut scope = AssertionScope::new();
    satisfy_respectively(&mut scope, &[], &[is_positive()]).unwrap();
    assert_eq!(
        scope.failures(),
        &["Expected collection to satisfy all inspectors, but collection is empty.".to_string()]
    );
}

#[test]
fn test_no_inspectors_is_a_usage_error() {
    let mut scope = AssertionScope::new();
    let err = satisfy_respectively::<i32>(&mut scope, &[1], &[]).unwrap_err();
    assert_eq!(err, EquivexError::EmptyInspectors);
}
