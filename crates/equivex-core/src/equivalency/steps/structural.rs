use crate::equivalency::comparands::Comparands;
use crate::equivalency::context::EquivalencyContext;
use crate::equivalency::step::{EquivalencyResult, EquivalencyStep};
use crate::equivalency::validator::EquivalencyValidator;
use crate::errors::{EquivexError, Result};
use crate::scope::{escape_placeholders, AssertionScope};
use crate::value::ValueType;

/// Compares records member by member, driven by the expectation's members.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralEqualityStep;

impl EquivalencyStep for StructuralEqualityStep {
    fn name(&self) -> &str {
        "StructuralEqualityStep"
    }

    fn can_handle(&self, comparands: &Comparands, context: &EquivalencyContext<'_>) -> bool {
        comparands.expectation().resolved().as_record().is_some()
            || matches!(
                comparands.expected_type(context.options()),
                ValueType::Record(_)
            )
    }

    fn handle(
        &self,
        comparands: &Comparands,
        context: &EquivalencyContext<'_>,
        validator: &EquivalencyValidator,
        scope: &mut AssertionScope,
    ) -> Result<EquivalencyResult> {
        let expectation = comparands.expectation().resolved();
        let Some(expected) = expectation.as_record() else {
            return Ok(EquivalencyResult::ContinueWithNext);
        };
        let subject = comparands.subject().resolved();
        let Some(actual) = subject.as_record() else {
            scope.fail_with(
                "Expected {context:object} to be {0}{reason}, but found {1}.",
                &[(*expectation).clone(), (*subject).clone()],
            );
            return Ok(EquivalencyResult::AssertionCompleted);
        };

        let options = context.options();
        let node = context.current_node();
        let mut selected_any = false;
        for member in expected.members() {
            let subject_name = options.subject_member_name(node, member.name());
            let child = context.as_nested_member(member.name(), &subject_name);
            let child_node = child.current_node();
            if !options
                .member_selection()
                .is_selected(&child_node.member_path(), member.name())
            {
                continue;
            }
            selected_any = true;

            match actual.get(&subject_name) {
                Some(actual_value) => {
                    let nested = Comparands::new(
                        actual_value.clone(),
                        member.value().clone(),
                        member.declared_type().clone(),
                    );
                    validator.recursively_assert_equality(&nested, &child, scope)?;
                }
                None if options.ignores_missing_members() => {
                    child.trace(|| "Missing on the subject, ignored".to_string());
                }
                None => {
                    let template = format!(
                        "Expectation has member {} that the other object does not have.",
                        escape_placeholders(&child_node.expectation_path())
                    );
                    scope.fail_with(&template, &[]);
                }
            }
        }

        if !expected.members().is_empty() && !selected_any {
            return Err(EquivexError::NoMembersFound {
                type_name: expected.type_name().to_string(),
                path: node.subject_path(),
            });
        }
        Ok(EquivalencyResult::AssertionCompleted)
    }
}
