//! Automatic type conversion of the subject before comparison.

use super::comparands::Comparands;
use super::context::EquivalencyContext;
use super::ordering::{InfoPredicate, ObjectInfo};
use crate::value::{Value, ValueType};
use chrono::DateTime;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct ConversionRule {
    description: String,
    predicate: InfoPredicate,
}

impl ConversionRule {
    pub fn new(
        description: impl Into<String>,
        predicate: impl Fn(&ObjectInfo) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn matches(&self, info: &ObjectInfo) -> bool {
        (self.predicate)(info)
    }
}

impl fmt::Debug for ConversionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionRule")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Inclusion and exclusion rules for automatic conversion.
///
/// A position requires conversion when at least one inclusion rule matches
/// and no exclusion rule does.
#[derive(Debug, Clone, Default)]
pub struct ConversionSelector {
    inclusions: Vec<ConversionRule>,
    exclusions: Vec<ConversionRule>,
}

impl ConversionSelector {
    pub fn include_all(&mut self) {
        self.inclusions
            .push(ConversionRule::new("all members", |_| true));
    }

    pub fn include(&mut self, rule: ConversionRule) {
        self.inclusions.push(rule);
    }

    pub fn exclude(&mut self, rule: ConversionRule) {
        self.exclusions.push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.inclusions.is_empty()
    }

    pub fn requires_conversion(&self, info: &ObjectInfo) -> bool {
        self.inclusions.iter().any(|rule| rule.matches(info))
            && !self.exclusions.iter().any(|rule| rule.matches(info))
    }
}

impl fmt::Display for ConversionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inclusions.is_empty() {
            return writeln!(f, "- Without automatic conversion");
        }
        for rule in &self.inclusions {
            writeln!(f, "- Try conversion of {}", rule.description())?;
        }
        for rule in &self.exclusions {
            writeln!(f, "- Do not convert {}", rule.description())?;
        }
        Ok(())
    }
}

// Below i128's range, so a float to integer cast cannot saturate.
const INTEGRAL_FLOAT_LIMIT: f64 = 1e38;

/// Convert a scalar to `target`. Returns `None` when the value cannot be
/// represented exactly.
pub fn try_change_type(value: &Value, target: &ValueType) -> Option<Value> {
    match (value, target) {
        (Value::Integer(i), ValueType::Float) => {
            let f = *i as f64;
            (f.abs() < INTEGRAL_FLOAT_LIMIT && f as i128 == *i).then_some(Value::Float(f))
        }
        (Value::Float(f), ValueType::Integer) => {
            let whole = f.is_finite() && f.fract() == 0.0 && f.abs() < INTEGRAL_FLOAT_LIMIT;
            whole.then(|| Value::Integer(*f as i128))
        }
        (Value::Integer(i), ValueType::Bool) => Some(Value::Bool(*i != 0)),
        (Value::Bool(b), ValueType::Integer) => Some(Value::Integer(i128::from(*b))),
        (Value::Char(c), ValueType::Integer) => Some(Value::Integer(i128::from(u32::from(*c)))),
        (Value::Integer(i), ValueType::Char) => u32::try_from(*i)
            .ok()
            .and_then(char::from_u32)
            .map(Value::Char),
        (Value::Enum(e), ValueType::Integer) => Some(Value::Integer(e.value())),
        (Value::String(s), target) => parse_string(s.trim(), target),
        (Value::Bool(b), ValueType::String) => Some(Value::String(b.to_string())),
        (Value::Integer(i), ValueType::String) => Some(Value::String(i.to_string())),
        (Value::Float(f), ValueType::String) => Some(Value::String(f.to_string())),
        (Value::Char(c), ValueType::String) => Some(Value::String(c.to_string())),
        (Value::DateTime(d), ValueType::String) => Some(Value::String(d.to_rfc3339())),
        _ => None,
    }
}

fn parse_string(s: &str, target: &ValueType) -> Option<Value> {
    match target {
        ValueType::Integer => s.parse::<i128>().ok().map(Value::Integer),
        ValueType::Float => s.parse::<f64>().ok().map(Value::Float),
        ValueType::Bool => match s.to_ascii_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        ValueType::Char => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Value::Char(c)),
                _ => None,
            }
        }
        ValueType::DateTime => DateTime::parse_from_rfc3339(s).ok().map(Value::DateTime),
        _ => None,
    }
}

/// Convert the subject to the expectation's type when the selector asks for
/// it at this position. Returns `None` when nothing changed.
pub(crate) fn convert_if_required(
    comparands: &Comparands,
    context: &EquivalencyContext<'_>,
) -> Option<Comparands> {
    let selector = context.options().conversion_selector();
    if selector.is_empty() {
        return None;
    }
    let info = ObjectInfo::new(context.current_node(), comparands, false);
    if !selector.requires_conversion(&info) {
        return None;
    }
    let subject = comparands.subject().resolved();
    let expectation = comparands.expectation().resolved();
    if subject.is_null() || expectation.is_null() {
        return None;
    }
    let target = expectation.runtime_type();
    if target.is_assignable_from(&subject.runtime_type()) {
        return None;
    }
    match try_change_type(&subject, &target) {
        Some(converted) => {
            context.trace(|| {
                format!(
                    "Converted subject {} at {} to {}",
                    subject.kind_name(),
                    info.description(),
                    target
                )
            });
            Some(comparands.with_subject(converted))
        }
        None => {
            context.trace(|| {
                format!(
                    "Subject {} at {} could not be converted to {}",
                    subject.kind_name(),
                    info.description(),
                    target
                )
            });
            None
        }
    }
}
