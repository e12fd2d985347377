//! The plain "Be" contract used wherever a node is compared without
//! structural recursion.

use crate::scope::AssertionScope;
use crate::value::Value;

/// Plain equality. Floats treat NaN as equal to NaN; shared references
/// compare by identity.
pub fn values_equal(subject: &Value, expectation: &Value) -> bool {
    match (subject, expectation) {
        (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
        _ => subject == expectation,
    }
}

/// Record a failure unless `subject` equals `expectation`. Returns whether
/// the values were equal.
pub fn be(scope: &mut AssertionScope, subject: &Value, expectation: &Value) -> bool {
    scope
        .for_condition(values_equal(subject, expectation))
        .fail_with(
            "Expected {context:subject} to be {0}{reason}, but found {1}.",
            &[expectation.clone(), subject.clone()],
        )
        .succeeded()
}
