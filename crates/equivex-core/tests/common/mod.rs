use equivex_core::equivalency::{check_equivalent, EquivalencyOptions};
use equivex_core::{EquivexError, ObjectRef, Record, Sequence, Value};

/// Compare under `options` and return the individual failure messages.
///
/// # Panics
///
/// Panics when the comparison succeeds or fails with a usage error.
#[allow(dead_code)]
pub fn failures_of(
    subject: impl Into<Value>,
    expectation: impl Into<Value>,
    options: &EquivalencyOptions,
) -> Vec<String> {
    match check_equivalent(&subject.into(), &expectation.into(), options) {
        Err(EquivexError::Mismatch(failure)) => failure.failures().to_vec(),
        Err(other) => panic!("expected a mismatch, got usage error: {}", other),
        Ok(()) => panic!("expected a mismatch, but the values are equivalent"),
    }
}

/// # Panics
///
/// Panics with the full report when the values are not equivalent.
#[allow(dead_code)]
pub fn assert_passes(
    subject: impl Into<Value>,
    expectation: impl Into<Value>,
    options: &EquivalencyOptions,
) {
    if let Err(err) = check_equivalent(&subject.into(), &expectation.into(), options) {
        panic!("expected equivalence, got:\n{}", err);
    }
}

#[allow(dead_code)]
pub fn item(id: i64, name: &str) -> Value {
    Record::new("Item").with("Id", id).with("Name", name).into()
}

#[allow(dead_code)]
pub fn items(entries: &[(i64, &str)]) -> Sequence {
    Sequence::list(entries.iter().map(|(id, name)| item(*id, name)))
}

/// A `Node` whose `Next` points back at itself
#[allow(dead_code)]
pub fn self_loop(id: i64) -> ObjectRef {
    let node = ObjectRef::new(Record::new("Node").with("Id", id));
    node.set_member("Next", node.clone());
    node
}
