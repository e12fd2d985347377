use crate::equivalency::comparands::Comparands;
use crate::equivalency::context::EquivalencyContext;
use crate::equivalency::enumerable::EnumerableEquivalencyValidator;
use crate::equivalency::step::{EquivalencyResult, EquivalencyStep};
use crate::equivalency::validator::EquivalencyValidator;
use crate::errors::Result;
use crate::scope::AssertionScope;
use crate::value::{Value, ValueType};

/// Compares sequences. Strings are scalars and never reach this step.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericEnumerableEquivalencyStep;

impl EquivalencyStep for GenericEnumerableEquivalencyStep {
    fn name(&self) -> &str {
        "GenericEnumerableEquivalencyStep"
    }

    fn can_handle(&self, comparands: &Comparands, context: &EquivalencyContext<'_>) -> bool {
        let expectation = comparands.expectation().resolved();
        !expectation.is_null()
            && (comparands.expects(context.options(), ValueType::is_sequence)
                || expectation.as_sequence().is_some())
    }

    fn handle(
        &self,
        comparands: &Comparands,
        context: &EquivalencyContext<'_>,
        validator: &EquivalencyValidator,
        scope: &mut AssertionScope,
    ) -> Result<EquivalencyResult> {
        let expectation = comparands.expectation().resolved();
        let Some(expected) = expectation.as_sequence() else {
            return Ok(EquivalencyResult::ContinueWithNext);
        };

        let subject = comparands.subject().resolved();
        if subject.is_null() {
            scope.fail_with(
                "Expected {context:subject} not to be {0}{reason}.",
                &[Value::Null],
            );
            return Ok(EquivalencyResult::AssertionCompleted);
        }
        let Some(actual) = subject.as_sequence() else {
            let template = format!(
                "Expected {{context:subject}} to be a collection{{reason}}, but found {} {{0}}.",
                subject.kind_name()
            );
            scope.fail_with(&template, &[(*subject).clone()]);
            return Ok(EquivalencyResult::AssertionCompleted);
        };

        EnumerableEquivalencyValidator::new(validator, context)
            .assert_equality(comparands, actual, expected, scope)?;
        Ok(EquivalencyResult::AssertionCompleted)
    }
}
