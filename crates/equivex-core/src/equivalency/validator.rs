//! The recursive driver of a comparison.

use super::comparands::Comparands;
use super::context::EquivalencyContext;
use super::conversion::convert_if_required;
use super::options::CyclicReferenceHandling;
use super::step::EquivalencyStep;
use super::steps::default_plan;
use crate::errors::{EquivexError, Result};
use crate::scope::AssertionScope;
use crate::value::Value;
use std::borrow::Cow;

/// Runs the step pipeline for one node and, through the steps, for every
/// node below it.
pub struct EquivalencyValidator {
    plan: Vec<Box<dyn EquivalencyStep>>,
}

impl Default for EquivalencyValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl EquivalencyValidator {
    pub fn new() -> Self {
        Self {
            plan: default_plan(),
        }
    }

    /// Built-in steps, in the order they are tried
    pub fn step_names(&self) -> Vec<&str> {
        self.plan.iter().map(|s| s.name()).collect()
    }

    /// Compare the node at `context` and everything below it.
    ///
    /// While the node is being compared, `{context:...}` placeholders on
    /// `scope` resolve to the node's path; the previous context is restored
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Propagates usage errors raised by a step, and returns
    /// [`EquivexError::UnsupportedComparison`] when no step handles the
    /// node.
    pub fn recursively_assert_equality(
        &self,
        comparands: &Comparands,
        context: &EquivalencyContext<'_>,
        scope: &mut AssertionScope,
    ) -> Result<()> {
        let previous = scope.replace_context(context.current_node().description());
        let result = self.assert_node(comparands, context, scope);
        scope.replace_context(previous);
        result
    }

    fn assert_node(
        &self,
        comparands: &Comparands,
        context: &EquivalencyContext<'_>,
        scope: &mut AssertionScope,
    ) -> Result<()> {
        let options = context.options();
        let node = context.current_node();

        if let Some(max_depth) = options.max_recursion_depth() {
            if node.depth() > max_depth {
                context.trace(|| format!("Stopped at depth {}", node.depth()));
                scope.fail_with(
                    "The maximum recursion depth of {0} was reached.",
                    &[Value::from(max_depth)],
                );
                return Ok(());
            }
        }

        if context.is_cyclic_reference(comparands) {
            context.trace(|| "Cyclic reference detected".to_string());
            if options.cyclic_reference_handling() == CyclicReferenceHandling::Report {
                scope.fail_with(
                    "Expected {context:subject} to be {0}{reason}, but it contains a cyclic reference.",
                    &[comparands.expectation().clone()],
                );
            }
            return Ok(());
        }

        let comparands = match convert_if_required(comparands, context) {
            Some(converted) => Cow::Owned(converted),
            None => Cow::Borrowed(comparands),
        };

        let user_steps = options.user_steps().iter().map(|s| &**s);
        let built_in = self.plan.iter().map(|s| &**s);
        for step in user_steps.chain(built_in) {
            if !step.can_handle(&comparands, context) {
                continue;
            }
            let outcome = step.handle(&comparands, context, self, scope)?;
            if outcome.is_done() {
                context.trace(|| format!("{} -> {:?}", step.name(), outcome));
                return Ok(());
            }
        }

        Err(EquivexError::UnsupportedComparison {
            subject: comparands.subject().kind_name().to_string(),
            expectation: comparands.expectation().kind_name().to_string(),
            path: node.subject_path(),
        })
    }
}
