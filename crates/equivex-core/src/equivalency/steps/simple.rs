use crate::assertions::be;
use crate::equivalency::comparands::Comparands;
use crate::equivalency::context::EquivalencyContext;
use crate::equivalency::step::{EquivalencyResult, EquivalencyStep};
use crate::equivalency::validator::EquivalencyValidator;
use crate::errors::Result;
use crate::scope::AssertionScope;
use crate::value::Value;

/// Plain equality for everything that is not compared structurally.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleEqualityStep;

/// How the node should be compared, when this step applies
enum Plain {
    /// Compare what the handles point at
    Resolved,
    /// Compare as given, so handles compare by identity
    Raw,
}

fn classify(comparands: &Comparands, context: &EquivalencyContext<'_>) -> Option<Plain> {
    let options = context.options();
    let expectation = comparands.expectation().resolved();
    match &*expectation {
        Value::Null => return Some(Plain::Resolved),
        Value::Record(record) if options.compares_by_value(record.type_name()) => {
            return Some(Plain::Resolved)
        }
        value if value.runtime_type().is_scalar() => return Some(Plain::Resolved),
        _ => {}
    }
    if !options.is_recursive() && !context.current_node().is_root() {
        return Some(Plain::Raw);
    }
    comparands
        .expected_type(options)
        .is_scalar()
        .then_some(Plain::Resolved)
}

impl EquivalencyStep for SimpleEqualityStep {
    fn name(&self) -> &str {
        "SimpleEqualityStep"
    }

    fn can_handle(&self, comparands: &Comparands, context: &EquivalencyContext<'_>) -> bool {
        classify(comparands, context).is_some()
    }

    fn handle(
        &self,
        comparands: &Comparands,
        context: &EquivalencyContext<'_>,
        _validator: &EquivalencyValidator,
        scope: &mut AssertionScope,
    ) -> Result<EquivalencyResult> {
        match classify(comparands, context) {
            Some(Plain::Resolved) => {
                let subject = comparands.subject().resolved();
                let expectation = comparands.expectation().resolved();
                be(scope, &subject, &expectation);
            }
            Some(Plain::Raw) => {
                be(scope, comparands.subject(), comparands.expectation());
            }
            None => return Ok(EquivalencyResult::ContinueWithNext),
        }
        Ok(EquivalencyResult::AssertionCompleted)
    }
}
