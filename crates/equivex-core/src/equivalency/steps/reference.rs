use crate::equivalency::comparands::Comparands;
use crate::equivalency::context::EquivalencyContext;
use crate::equivalency::step::{EquivalencyResult, EquivalencyStep};
use crate::equivalency::validator::EquivalencyValidator;
use crate::errors::Result;
use crate::scope::AssertionScope;

/// Proves equivalence for two handles to the same object, or two nulls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceEqualityStep;

impl EquivalencyStep for ReferenceEqualityStep {
    fn name(&self) -> &str {
        "ReferenceEqualityStep"
    }

    fn can_handle(&self, comparands: &Comparands, _context: &EquivalencyContext<'_>) -> bool {
        let subject = comparands.subject();
        let expectation = comparands.expectation();
        subject.same_reference(expectation) || (subject.is_null() && expectation.is_null())
    }

    fn handle(
        &self,
        _comparands: &Comparands,
        _context: &EquivalencyContext<'_>,
        _validator: &EquivalencyValidator,
        _scope: &mut AssertionScope,
    ) -> Result<EquivalencyResult> {
        Ok(EquivalencyResult::EquivalencyProven)
    }
}
