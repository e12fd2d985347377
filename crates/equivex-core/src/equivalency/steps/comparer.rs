use crate::equivalency::comparands::Comparands;
use crate::equivalency::context::EquivalencyContext;
use crate::equivalency::options::EqualityComparer;
use crate::equivalency::step::{EquivalencyResult, EquivalencyStep};
use crate::equivalency::validator::EquivalencyValidator;
use crate::errors::Result;
use crate::scope::{escape_placeholders, AssertionScope};
use std::sync::Arc;

/// Uses a registered [`EqualityComparer`] instead of structural comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualityComparerStep;

fn comparer_for<'o>(
    comparands: &Comparands,
    context: &EquivalencyContext<'o>,
) -> Option<&'o Arc<dyn EqualityComparer>> {
    let options = context.options();
    options
        .comparer_for(&comparands.expected_type(options))
        .or_else(|| options.comparer_for(&comparands.runtime_type()))
}

impl EquivalencyStep for EqualityComparerStep {
    fn name(&self) -> &str {
        "EqualityComparerStep"
    }

    fn can_handle(&self, comparands: &Comparands, context: &EquivalencyContext<'_>) -> bool {
        comparer_for(comparands, context).is_some()
    }

    fn handle(
        &self,
        comparands: &Comparands,
        context: &EquivalencyContext<'_>,
        _validator: &EquivalencyValidator,
        scope: &mut AssertionScope,
    ) -> Result<EquivalencyResult> {
        let Some(comparer) = comparer_for(comparands, context) else {
            return Ok(EquivalencyResult::ContinueWithNext);
        };
        let subject = comparands.subject().resolved();
        let expectation = comparands.expectation().resolved();
        let template = format!(
            "Expected {{context:object}} to be equal to {{0}} according to {}{{reason}}, but {{1}} was not.",
            escape_placeholders(comparer.name())
        );
        scope
            .for_condition(comparer.equals(&subject, &expectation))
            .fail_with(&template, &[expectation.into_owned(), subject.into_owned()]);
        Ok(EquivalencyResult::AssertionCompleted)
    }
}
