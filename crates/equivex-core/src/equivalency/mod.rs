//! Structural equivalency of object graphs
//!
//! ## Pipeline
//!
//! A comparison starts at the root node and offers the [`Comparands`] to
//! each [`EquivalencyStep`] in turn (user steps first, then the built-in
//! plan in [`steps`]). The first step that finishes the node stops the
//! pipeline for it. Collection, dictionary and record steps recurse through
//! the [`EquivalencyValidator`] with one child node per element, key or
//! member.
//!
//! ## Failures
//!
//! Mismatches are recorded on the [`AssertionScope`] and never returned as
//! errors from [`assert_equivalency`]. `Err` is reserved for usage errors.
//! [`check_equivalent`] wraps a comparison in its own outermost scope and
//! surfaces the aggregated report as [`EquivexError::Mismatch`].
//!
//! ## Cycles
//!
//! Reference pairs are remembered per node. Entering a pair again below
//! the node where it was first entered ends the descent; by default this
//! counts as equivalent.

pub mod comparands;
pub mod context;
pub mod conversion;
pub mod enumerable;
pub mod node;
pub mod options;
pub mod ordering;
pub mod step;
pub mod steps;
pub mod validator;

pub use comparands::Comparands;
pub use context::EquivalencyContext;
pub use enumerable::FAILED_ITEMS_FAST_FAIL_THRESHOLD;
pub use node::Node;
pub use options::{
    configure_global_defaults, reset_global_defaults, CyclicReferenceHandling,
    EnumEquivalencyHandling, EqualityComparer, EquivalencyOptions,
};
pub use ordering::{ObjectInfo, OrderStrictness};
pub use step::{EquivalencyResult, EquivalencyStep};
pub use validator::EquivalencyValidator;

use crate::errors::{EquivexError, Result};
use crate::scope::AssertionScope;
use crate::value::{to_value, Value};
use crate::{log_op_end, log_op_error, log_op_start};
use context::RunState;
use equivex_core_types::schema::OP_ASSERT_EQUIVALENCY;
use serde::Serialize;

/// Compare `comparands` and record every mismatch on `scope`.
///
/// The `{context:...}` of the root resolves to the scope's caller
/// identifier when one is set. When failures are recorded, the options are
/// attached as the `configuration` reportable (and the trace as `trace`
/// when tracing is enabled).
///
/// # Errors
///
/// Returns usage errors only: [`EquivexError::NoMembersFound`] and
/// [`EquivexError::UnsupportedComparison`].
pub fn assert_equivalency(
    comparands: &Comparands,
    options: &EquivalencyOptions,
    scope: &mut AssertionScope,
) -> Result<()> {
    let state = RunState::new(options.is_tracing_enabled());
    log_op_start!(
        OP_ASSERT_EQUIVALENCY,
        invocation_id = %state.invocation_id()
    );
    let start = std::time::Instant::now();

    let failure_count = assert_equivalency_impl(comparands, options, &state, scope).map_err(|e| {
        log_op_error!(
            OP_ASSERT_EQUIVALENCY,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            invocation_id = %state.invocation_id()
        );
        e
    })?;

    log_op_end!(
        OP_ASSERT_EQUIVALENCY,
        duration_ms = start.elapsed().as_millis() as u64,
        failure_count = failure_count,
        invocation_id = %state.invocation_id()
    );
    Ok(())
}

fn assert_equivalency_impl(
    comparands: &Comparands,
    options: &EquivalencyOptions,
    state: &RunState,
    scope: &mut AssertionScope,
) -> Result<usize> {
    let validator = EquivalencyValidator::new();
    let mut nested = scope.nested();
    let context = EquivalencyContext::root(options, state, nested.context().map(str::to_string));
    validator.recursively_assert_equality(comparands, &context, &mut *nested)?;

    if nested.has_failures() {
        nested.add_reportable("configuration", options.to_string());
        if options.is_tracing_enabled() {
            nested.add_reportable("trace", state.render_trace());
        }
    }
    Ok(nested.failure_count())
}

/// Compare two values in an outermost scope of their own.
///
/// # Errors
///
/// Returns [`EquivexError::Mismatch`] with the aggregated report when the
/// values are not equivalent, or a usage error.
pub fn check_equivalent(
    subject: &Value,
    expectation: &Value,
    options: &EquivalencyOptions,
) -> Result<()> {
    let mut scope = AssertionScope::new();
    let comparands = Comparands::for_values(subject.clone(), expectation.clone());
    assert_equivalency(&comparands, options, &mut scope)?;
    scope.finish().map_err(EquivexError::from)
}

/// [`check_equivalent`] for anything serializable.
///
/// # Errors
///
/// As [`check_equivalent`], plus [`EquivexError::Serialization`] when a
/// side cannot be converted.
pub fn check_serialized_equivalent<S, E>(
    subject: &S,
    expectation: &E,
    options: &EquivalencyOptions,
) -> Result<()>
where
    S: Serialize + ?Sized,
    E: Serialize + ?Sized,
{
    check_equivalent(&to_value(subject)?, &to_value(expectation)?, options)
}

/// Panics with the full report unless the values are equivalent under the
/// global defaults.
#[track_caller]
pub fn assert_equivalent(subject: &Value, expectation: &Value) {
    assert_equivalent_with(subject, expectation, &EquivalencyOptions::from_global_defaults());
}

/// Panics with the full report unless the values are equivalent.
#[track_caller]
pub fn assert_equivalent_with(subject: &Value, expectation: &Value, options: &EquivalencyOptions) {
    if let Err(err) = check_equivalent(subject, expectation, options) {
        panic!("{}", err);
    }
}
