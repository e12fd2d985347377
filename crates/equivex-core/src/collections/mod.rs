//! Collection assertions that sit beside the equivalency engine
//!
//! - [`satisfy`]: every predicate is met by a distinct element, in any order
//! - [`satisfy_respectively`]: inspector `i` accepts element `i`
//! - [`equal_items`]: same length and pairwise plain equality

pub mod matching;

use crate::assertions::values_equal;
use crate::errors::{EquivexError, Result};
use crate::scope::{escape_placeholders, AssertionScope};
use crate::value::{to_value, Sequence, Value};
use crate::{log_op_end, log_op_error, log_op_start};
use equivex_core_types::schema::{OP_SATISFY, OP_SATISFY_RESPECTIVELY};
use matching::MaximumMatchingProblem;
use serde::Serialize;
use std::fmt;

/// A described test over an element.
pub struct Predicate<'a, T> {
    description: String,
    test: Box<dyn Fn(&T) -> bool + 'a>,
}

impl<'a, T> Predicate<'a, T> {
    pub fn new(description: impl Into<String>, test: impl Fn(&T) -> bool + 'a) -> Self {
        Self {
            description: description.into(),
            test: Box::new(test),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn matches(&self, element: &T) -> bool {
        (self.test)(element)
    }
}

impl<T> fmt::Debug for Predicate<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Build a [`Predicate`] described by its own source text.
///
/// ```
/// # use equivex_core::predicate;
/// let positive = predicate!(|x: &i32| *x > 0);
/// assert_eq!(positive.description(), "|x: &i32| *x > 0");
/// assert!(positive.matches(&3));
/// ```
#[macro_export]
macro_rules! predicate {
    ($($body:tt)+) => {
        $crate::collections::Predicate::new(stringify!($($body)+), $($body)+)
    };
}

/// Runs assertions against one element on the scope it is given.
pub type Inspector<'a, T> = Box<dyn Fn(&T, &mut AssertionScope) + 'a>;

/// Assert that each predicate is satisfied by a distinct element.
///
/// The assignment is a maximum matching, so a failure lists exactly the
/// predicates and elements that no assignment can pair up.
///
/// # Errors
///
/// [`EquivexError::EmptyPredicates`] when `predicates` is empty,
/// [`EquivexError::EmptyElements`] when `elements` is empty, and
/// [`EquivexError::Serialization`] when an unmatched element cannot be
/// rendered.
pub fn satisfy<T: Serialize>(
    scope: &mut AssertionScope,
    elements: &[T],
    predicates: &[Predicate<'_, T>],
) -> Result<()> {
    log_op_start!(
        OP_SATISFY,
        predicate_count = predicates.len(),
        element_count = elements.len()
    );
    let start = std::time::Instant::now();

    let satisfied = satisfy_impl(scope, elements, predicates).map_err(|e| {
        log_op_error!(
            OP_SATISFY,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        OP_SATISFY,
        duration_ms = start.elapsed().as_millis() as u64,
        satisfied = satisfied
    );
    Ok(())
}

fn satisfy_impl<T: Serialize>(
    scope: &mut AssertionScope,
    elements: &[T],
    predicates: &[Predicate<'_, T>],
) -> Result<bool> {
    if predicates.is_empty() {
        return Err(EquivexError::EmptyPredicates);
    }
    if elements.is_empty() {
        return Err(EquivexError::EmptyElements);
    }

    let solution = MaximumMatchingProblem::new(predicates, elements)?.solve();
    let unmatched_predicates = solution.unmatched_predicates();
    let unmatched_elements = solution.unmatched_elements();
    if unmatched_predicates.is_empty() && unmatched_elements.is_empty() {
        return Ok(true);
    }

    let mut details = String::new();
    if !unmatched_predicates.is_empty() {
        details.push_str("\n\nThe following predicates did not have matching elements:\n");
        for index in &unmatched_predicates {
            details.push('\n');
            details.push_str(predicates[*index].description());
        }
    }
    if !unmatched_elements.is_empty() {
        details.push_str("\n\nThe following elements did not match any predicate:\n");
        for index in &unmatched_elements {
            let element = to_value(&elements[*index])?;
            details.push_str(&format!(
                "\nIndex: {}, Element: {}",
                index,
                scope.format_value(&element)
            ));
        }
    }
    let template = format!(
        "Expected {{context:collection}} to satisfy all predicates{{reason}}, but:{}",
        escape_placeholders(&details)
    );
    scope.fail_with(&template, &[]);
    Ok(false)
}

/// Assert that inspector `i` accepts element `i`, for every `i`.
///
/// Every inspector runs in its own scope; its failures are reported under
/// `At index i:`.
///
/// # Errors
///
/// [`EquivexError::EmptyInspectors`] when `inspectors` is empty.
pub fn satisfy_respectively<T>(
    scope: &mut AssertionScope,
    elements: &[T],
    inspectors: &[Inspector<'_, T>],
) -> Result<()> {
    log_op_start!(
        OP_SATISFY_RESPECTIVELY,
        inspector_count = inspectors.len(),
        element_count = elements.len()
    );
    let start = std::time::Instant::now();

    let satisfied = satisfy_respectively_impl(scope, elements, inspectors).map_err(|e| {
        log_op_error!(
            OP_SATISFY_RESPECTIVELY,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        OP_SATISFY_RESPECTIVELY,
        duration_ms = start.elapsed().as_millis() as u64,
        satisfied = satisfied
    );
    Ok(())
}

fn satisfy_respectively_impl<T>(
    scope: &mut AssertionScope,
    elements: &[T],
    inspectors: &[Inspector<'_, T>],
) -> Result<bool> {
    if inspectors.is_empty() {
        return Err(EquivexError::EmptyInspectors);
    }
    if elements.is_empty() {
        scope.fail_with(
            "Expected {context:collection} to satisfy all inspectors{reason}, but collection is empty.",
            &[],
        );
        return Ok(false);
    }
    if elements.len() != inspectors.len() {
        scope.fail_with(
            "Expected {context:collection} to contain exactly {0} items{reason}, but it contains {1} items.",
            &[Value::from(inspectors.len()), Value::from(elements.len())],
        );
        return Ok(false);
    }

    let mut failed_items = Vec::new();
    for (index, (element, inspector)) in elements.iter().zip(inspectors).enumerate() {
        let failures = {
            let mut nested = scope.nested();
            inspector(element, &mut *nested);
            nested.discard()
        };
        if !failures.is_empty() {
            let indented = failures.join("\n").replace('\n', "\n    ");
            failed_items.push(format!("At index {}:\n    {}", index, indented));
        }
    }
    if failed_items.is_empty() {
        return Ok(true);
    }
    let template = format!(
        "Expected {{context:collection}} to satisfy all inspectors{{reason}}, but some inspectors are not satisfied:\n{}",
        escape_placeholders(&failed_items.join("\n"))
    );
    scope.fail_with(&template, &[]);
    Ok(false)
}

/// Plain item-by-item equality, in order. Returns whether the collections
/// were equal.
pub fn equal_items(scope: &mut AssertionScope, subject: &[Value], expectation: &[Value]) -> bool {
    let as_value = |items: &[Value]| Value::Sequence(Sequence::list(items.iter().cloned()));
    let template = if subject.len() < expectation.len() {
        Some("Expected {context:collection} to be equal to {0}{reason}, but {1} contains {2} item(s) less.")
    } else if subject.len() > expectation.len() {
        Some("Expected {context:collection} to be equal to {0}{reason}, but {1} contains {2} item(s) more.")
    } else {
        None
    };
    if let Some(template) = template {
        scope.fail_with(
            template,
            &[
                as_value(expectation),
                as_value(subject),
                Value::from(subject.len().abs_diff(expectation.len())),
            ],
        );
        return false;
    }

    match subject
        .iter()
        .zip(expectation)
        .position(|(a, e)| !values_equal(a, e))
    {
        Some(index) => {
            scope.fail_with(
                "Expected {context:collection} to be equal to {0}{reason}, but {1} differs at index {2}.",
                &[as_value(expectation), as_value(subject), Value::from(index)],
            );
            false
        }
        None => true,
    }
}
