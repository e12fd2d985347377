//! Element-by-element comparison of two sequences.

use super::comparands::Comparands;
use super::context::EquivalencyContext;
use super::ordering::ObjectInfo;
use super::validator::EquivalencyValidator;
use crate::collections::equal_items;
use crate::errors::Result;
use crate::scope::AssertionScope;
use crate::value::{Sequence, Value, ValueType};

/// After this many failed items the remaining items are not compared.
pub const FAILED_ITEMS_FAST_FAIL_THRESHOLD: usize = 10;

/// Result of searching the unmatched subject items for one expectation item
#[derive(Debug)]
enum MatchOutcome {
    /// A candidate without failures, by position in the unmatched pool
    Matched(usize),
    /// No perfect candidate; the one with the fewest failures
    Closest { position: usize, failures: Vec<String> },
    NoCandidates,
}

pub struct EnumerableEquivalencyValidator<'v, 'c> {
    validator: &'v EquivalencyValidator,
    context: &'v EquivalencyContext<'c>,
    recursive: bool,
}

impl<'v, 'c> EnumerableEquivalencyValidator<'v, 'c> {
    pub fn new(validator: &'v EquivalencyValidator, context: &'v EquivalencyContext<'c>) -> Self {
        Self {
            validator,
            context,
            recursive: context.current_node().is_root() || context.options().is_recursive(),
        }
    }

    /// # Errors
    ///
    /// Propagates usage errors from the element comparisons.
    pub fn assert_equality(
        &self,
        comparands: &Comparands,
        subject: &Sequence,
        expectation: &Sequence,
        scope: &mut AssertionScope,
    ) -> Result<()> {
        let actual = subject.items();
        let expected = expectation.items();
        if !assert_counts_match(subject, expectation, scope) {
            return Ok(());
        }

        if !self.recursive {
            equal_items(scope, actual, expected);
            return Ok(());
        }

        let info = ObjectInfo::new(
            self.context.current_node(),
            comparands,
            expectation.kind().is_ordered(),
        );
        let element_type = expectation.element_type();
        if self
            .context
            .options()
            .ordering_rules()
            .is_ordering_strict_for(&info)
        {
            self.assert_with_strict_ordering(actual, expected, element_type, scope)
        } else {
            self.assert_with_loose_ordering(actual, expected, element_type, scope)
        }
    }

    fn compare_item(
        &self,
        subject: &Value,
        expectation: &Value,
        element_type: &ValueType,
        index: usize,
        scope: &mut AssertionScope,
    ) -> Result<()> {
        let child = self.context.as_collection_item(index);
        let comparands =
            Comparands::new(subject.clone(), expectation.clone(), element_type.clone());
        self.validator
            .recursively_assert_equality(&comparands, &child, scope)
    }

    fn assert_with_strict_ordering(
        &self,
        subject: &[Value],
        expectation: &[Value],
        element_type: &ValueType,
        scope: &mut AssertionScope,
    ) -> Result<()> {
        let mut failed_count = 0;
        for (index, (actual, expected)) in subject.iter().zip(expectation).enumerate() {
            let failed = {
                let mut nested = scope.nested();
                self.compare_item(actual, expected, element_type, index, &mut *nested)?;
                nested.has_failures()
            };
            if failed {
                failed_count += 1;
                if failed_count >= FAILED_ITEMS_FAST_FAIL_THRESHOLD {
                    self.context.trace(|| {
                        format!(
                            "Fail fast after {} failed items at index {}",
                            failed_count, index
                        )
                    });
                    break;
                }
            }
        }
        Ok(())
    }

    fn assert_with_loose_ordering(
        &self,
        subject: &[Value],
        expectation: &[Value],
        element_type: &ValueType,
        scope: &mut AssertionScope,
    ) -> Result<()> {
        let mut unmatched: Vec<usize> = (0..subject.len()).collect();
        let mut failed_count = 0;
        for (index, expected) in expectation.iter().enumerate() {
            let outcome =
                self.find_best_match(subject, &unmatched, expected, element_type, index, scope)?;
            match outcome {
                MatchOutcome::Matched(position) => {
                    unmatched.remove(position);
                    continue;
                }
                MatchOutcome::Closest { position, failures } => {
                    self.context.trace(|| {
                        format!(
                            "Closest match for item {} is subject item {} with {} failure(s)",
                            index,
                            unmatched[position],
                            failures.len()
                        )
                    });
                    unmatched.remove(position);
                    for failure in failures {
                        scope.add_preformatted_failure(failure);
                    }
                }
                MatchOutcome::NoCandidates => {
                    scope.fail_with(
                        "Expected {context:subject} to contain an item equivalent to {0}{reason}, but no unmatched items remain.",
                        &[expected.clone()],
                    );
                }
            }
            failed_count += 1;
            if failed_count >= FAILED_ITEMS_FAST_FAIL_THRESHOLD {
                self.context.trace(|| {
                    format!(
                        "Fail fast after {} failed items at index {}",
                        failed_count, index
                    )
                });
                break;
            }
        }
        Ok(())
    }

    /// Try every unmatched subject item against `expected`, each in a
    /// scope whose failures are taken rather than reported. The first
    /// candidate with the fewest failures wins.
    fn find_best_match(
        &self,
        subject: &[Value],
        unmatched: &[usize],
        expected: &Value,
        element_type: &ValueType,
        expectation_index: usize,
        scope: &mut AssertionScope,
    ) -> Result<MatchOutcome> {
        let mut best: Option<(usize, Vec<String>)> = None;
        for (position, &subject_index) in unmatched.iter().enumerate() {
            let failures = {
                let mut nested = scope.nested();
                self.compare_item(
                    &subject[subject_index],
                    expected,
                    element_type,
                    expectation_index,
                    &mut *nested,
                )?;
                nested.discard()
            };
            if failures.is_empty() {
                return Ok(MatchOutcome::Matched(position));
            }
            let better = match &best {
                Some((_, fewest)) => failures.len() < fewest.len(),
                None => true,
            };
            if better {
                best = Some((position, failures));
            }
        }
        Ok(match best {
            Some((position, failures)) => MatchOutcome::Closest { position, failures },
            None => MatchOutcome::NoCandidates,
        })
    }
}

/// Returns `false` after reporting a count mismatch.
fn assert_counts_match(
    subject: &Sequence,
    expectation: &Sequence,
    scope: &mut AssertionScope,
) -> bool {
    let actual = subject.len();
    let expected = expectation.len();
    if actual == expected {
        return true;
    }
    scope.with_expectation(
        "Expected {context:subject} to be a collection with {0} item(s){reason}",
        &[Value::from(expected)],
    );
    if actual == 0 {
        scope.fail_with(", but found an empty collection.", &[]);
    } else if actual < expected {
        scope.fail_with(
            ", but {0} contains {1} item(s) less than {2}.",
            &[
                Value::Sequence(subject.clone()),
                Value::from(expected - actual),
                Value::Sequence(expectation.clone()),
            ],
        );
    } else {
        scope.fail_with(
            ", but {0} contains {1} item(s) more than {2}.",
            &[
                Value::Sequence(subject.clone()),
                Value::from(actual - expected),
                Value::Sequence(expectation.clone()),
            ],
        );
    }
    scope.clear_expectation();
    false
}
