use crate::equivalency::comparands::Comparands;
use crate::equivalency::context::EquivalencyContext;
use crate::equivalency::options::EnumEquivalencyHandling;
use crate::equivalency::step::{EquivalencyResult, EquivalencyStep};
use crate::equivalency::validator::EquivalencyValidator;
use crate::errors::Result;
use crate::format::format_enum;
use crate::scope::{escape_placeholders, AssertionScope};
use crate::value::{EnumValue, Value, ValueType};

/// Compares enums by numeric value or by symbolic name.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumEqualityStep;

fn display(value: Option<&EnumValue>) -> String {
    match value {
        Some(e) => escape_placeholders(&format_enum(e)),
        None => "<null>".to_string(),
    }
}

/// `None` for null, `Some(None)` for a value that is not an enum
fn as_enum_or_null(value: &Value) -> Option<Option<&EnumValue>> {
    match value {
        Value::Null => Some(None),
        Value::Enum(e) => Some(Some(e)),
        _ => None,
    }
}

impl EquivalencyStep for EnumEqualityStep {
    fn name(&self) -> &str {
        "EnumEqualityStep"
    }

    fn can_handle(&self, comparands: &Comparands, context: &EquivalencyContext<'_>) -> bool {
        comparands.expects(context.options(), ValueType::is_enum)
            || comparands.subject().resolved().as_enum().is_some()
            || comparands.expectation().resolved().as_enum().is_some()
    }

    fn handle(
        &self,
        comparands: &Comparands,
        context: &EquivalencyContext<'_>,
        _validator: &EquivalencyValidator,
        scope: &mut AssertionScope,
    ) -> Result<EquivalencyResult> {
        let subject = comparands.subject().resolved();
        let expectation = comparands.expectation().resolved();

        let (Some(actual), Some(expected)) =
            (as_enum_or_null(&subject), as_enum_or_null(&expectation))
        else {
            scope.fail_with(
                "Expected {context:enum} to be equivalent to {0}{reason}, but found {1}.",
                &[(*expectation).clone(), (*subject).clone()],
            );
            return Ok(EquivalencyResult::AssertionCompleted);
        };

        let (equal, mode) = match context.options().enum_equivalency_handling() {
            EnumEquivalencyHandling::ByValue => (
                matches!((actual, expected), (Some(a), Some(e)) if a.value() == e.value()),
                "value",
            ),
            EnumEquivalencyHandling::ByName => (
                matches!(
                    (actual, expected),
                    (Some(a), Some(e)) if a.display_name() == e.display_name()
                ),
                "name",
            ),
        };

        if !equal {
            let template = format!(
                "Expected {{context:enum}} to equal {} by {}{{reason}}, but found {}.",
                display(expected),
                mode,
                display(actual)
            );
            scope.fail_with(&template, &[]);
        }
        Ok(EquivalencyResult::AssertionCompleted)
    }
}
