use crate::assertions::be;
use crate::equivalency::comparands::Comparands;
use crate::equivalency::context::EquivalencyContext;
use crate::equivalency::step::{EquivalencyResult, EquivalencyStep};
use crate::equivalency::validator::EquivalencyValidator;
use crate::errors::Result;
use crate::scope::{escape_placeholders, AssertionScope};
use crate::value::{Dictionary, DictionaryInterface, Key, Sequence, Value, ValueType};

/// Compares dictionaries key by key.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericDictionaryEquivalencyStep;

/// Keys on which two dictionaries disagree, in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDifference {
    /// In the expectation but not in the subject
    pub missing_keys: Vec<Key>,
    /// In the subject but not in the expectation
    pub additional_keys: Vec<Key>,
}

impl KeyDifference {
    pub fn between(subject: &Dictionary, expectation: &Dictionary) -> Self {
        Self {
            missing_keys: expectation
                .keys()
                .filter(|k| !subject.contains_key(k))
                .cloned()
                .collect(),
            additional_keys: subject
                .keys()
                .filter(|k| !expectation.contains_key(k))
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.missing_keys.is_empty() && self.additional_keys.is_empty()
    }
}

fn keys_value(keys: &[Key]) -> Value {
    Value::Sequence(Sequence::list(keys.iter().map(Key::to_value)))
}

fn interface_list(interfaces: &[&DictionaryInterface]) -> String {
    let names: Vec<String> = interfaces.iter().map(|i| i.to_string()).collect();
    escape_placeholders(&names.join(", "))
}

fn expected_interface(expectation: &Dictionary) -> (ValueType, ValueType) {
    match expectation.interfaces().first() {
        Some(i) => (i.key_type().clone(), i.value_type().clone()),
        None => (ValueType::Object, ValueType::Object),
    }
}

impl GenericDictionaryEquivalencyStep {
    /// Checks that must pass before any entry is compared. Returns `false`
    /// after recording the first violation.
    fn preconditions_hold(
        subject: &Value,
        expectation: &Value,
        scope: &mut AssertionScope,
    ) -> bool {
        if let Some(dictionary) = expectation.as_dictionary() {
            if dictionary.interfaces().len() > 1 {
                let all: Vec<&DictionaryInterface> = dictionary.interfaces().iter().collect();
                let template = format!(
                    "{{context:expectation}} implements multiple dictionary types. It is not known which type should be used for equivalence. The following dictionary interfaces are implemented: {}.",
                    interface_list(&all)
                );
                scope.fail_with(&template, &[]);
                return false;
            }
        }

        if subject.is_null() {
            scope.fail_with(
                "Expected {context:subject} not to be {0}{reason}.",
                &[Value::Null],
            );
            return false;
        }

        let Some(expected) = expectation.as_dictionary() else {
            scope.fail_with(
                "Expected {context:subject} to be {0}{reason}, but found {1}.",
                &[expectation.clone(), subject.clone()],
            );
            return false;
        };

        let (key_type, _) = expected_interface(expected);
        let key_name = escape_placeholders(&key_type.to_string());
        let Some(actual) = subject.as_dictionary() else {
            let template = format!(
                "Expected {{context:subject}} to be a dictionary keyed to type {}{{reason}}, but found {{0}}.",
                key_name
            );
            scope.fail_with(&template, &[subject.clone()]);
            return false;
        };

        let compatible: Vec<&DictionaryInterface> = actual
            .interfaces()
            .iter()
            .filter(|i| i.key_type().is_assignable_from(&key_type))
            .collect();
        match compatible.len() {
            1 => true,
            0 => {
                let implemented: Vec<&DictionaryInterface> = actual.interfaces().iter().collect();
                let template = format!(
                    "Expected {{context:subject}} to be a dictionary keyed to type {}{{reason}}, but it only implements {}.",
                    key_name,
                    interface_list(&implemented)
                );
                scope.fail_with(&template, &[]);
                false
            }
            _ => {
                let template = format!(
                    "Expected {{context:subject}} to implement exactly one dictionary interface keyed to a type assignable from {}{{reason}}, but it implements {}.",
                    key_name,
                    interface_list(&compatible)
                );
                scope.fail_with(&template, &[]);
                false
            }
        }
    }

    /// Reports a count mismatch with the exact key sets. Returns `false`
    /// when the counts differ.
    fn counts_match(
        subject: &Dictionary,
        expectation: &Dictionary,
        difference: &KeyDifference,
        scope: &mut AssertionScope,
    ) -> bool {
        if subject.len() == expectation.len() {
            return true;
        }
        scope.with_expectation(
            "Expected {context:subject} to be a dictionary with {0} item(s){reason}, ",
            &[Value::from(expectation.len())],
        );
        let missing = &difference.missing_keys;
        let additional = &difference.additional_keys;
        match (missing.is_empty(), additional.is_empty()) {
            (false, true) => scope.fail_with("but it misses key(s) {0}.", &[keys_value(missing)]),
            (true, false) => {
                scope.fail_with("but has additional key(s) {0}.", &[keys_value(additional)])
            }
            _ => scope.fail_with(
                "but it misses key(s) {0} and has additional key(s) {1}.",
                &[keys_value(missing), keys_value(additional)],
            ),
        }
        scope.clear_expectation();
        false
    }
}

impl EquivalencyStep for GenericDictionaryEquivalencyStep {
    fn name(&self) -> &str {
        "GenericDictionaryEquivalencyStep"
    }

    fn can_handle(&self, comparands: &Comparands, context: &EquivalencyContext<'_>) -> bool {
        comparands.expects(context.options(), ValueType::is_dictionary)
            || comparands.expectation().resolved().as_dictionary().is_some()
    }

    fn handle(
        &self,
        comparands: &Comparands,
        context: &EquivalencyContext<'_>,
        validator: &EquivalencyValidator,
        scope: &mut AssertionScope,
    ) -> Result<EquivalencyResult> {
        let subject = comparands.subject().resolved();
        let expectation = comparands.expectation().resolved();
        if !Self::preconditions_hold(&subject, &expectation, scope) {
            return Ok(EquivalencyResult::AssertionCompleted);
        }
        let (Some(actual), Some(expected)) = (subject.as_dictionary(), expectation.as_dictionary())
        else {
            return Ok(EquivalencyResult::AssertionCompleted);
        };

        let difference = KeyDifference::between(actual, expected);
        if !Self::counts_match(actual, expected, &difference, scope) {
            return Ok(EquivalencyResult::AssertionCompleted);
        }

        let (_, value_type) = expected_interface(expected);
        let recursive = context.options().is_recursive();
        for (key, expected_value) in expected.entries() {
            let Some(actual_value) = actual.get(key) else {
                scope.fail_with(
                    "Expected {context:subject} to contain key {0}{reason}.",
                    &[key.to_value()],
                );
                continue;
            };
            let child = context.as_dictionary_item(scope.format_value(&key.to_value()));
            if recursive {
                let nested = Comparands::new(
                    actual_value.clone(),
                    expected_value.clone(),
                    value_type.clone(),
                );
                validator.recursively_assert_equality(&nested, &child, scope)?;
            } else {
                let previous = scope.replace_context(child.current_node().description());
                be(scope, actual_value, expected_value);
                scope.replace_context(previous);
            }
        }

        if !difference.additional_keys.is_empty() {
            scope.fail_with(
                "Expected {context:subject} not to contain additional key(s) {0}{reason}.",
                &[keys_value(&difference.additional_keys)],
            );
        }
        Ok(EquivalencyResult::AssertionCompleted)
    }
}
