use super::options::EquivalencyOptions;
use crate::value::{Value, ValueType};

/// The unit of work handed between steps: subject, expectation and the
/// declared type of the expectation at this position.
#[derive(Debug, Clone)]
pub struct Comparands {
    subject: Value,
    expectation: Value,
    compile_time_type: ValueType,
}

impl Comparands {
    pub fn new(
        subject: impl Into<Value>,
        expectation: impl Into<Value>,
        compile_time_type: ValueType,
    ) -> Self {
        Self {
            subject: subject.into(),
            expectation: expectation.into(),
            compile_time_type,
        }
    }

    /// Comparands with no declared type information
    pub fn for_values(subject: impl Into<Value>, expectation: impl Into<Value>) -> Self {
        Self::new(subject, expectation, ValueType::Object)
    }

    pub fn subject(&self) -> &Value {
        &self.subject
    }

    pub fn expectation(&self) -> &Value {
        &self.expectation
    }

    /// The declared type, or the runtime type when nothing more specific
    /// than `Object` was declared.
    pub fn compile_time_type(&self) -> ValueType {
        if self.compile_time_type.is_object() {
            self.runtime_type()
        } else {
            self.compile_time_type.clone()
        }
    }

    /// The expectation's runtime type, or the declared type when the
    /// expectation is null.
    pub fn runtime_type(&self) -> ValueType {
        if self.expectation.is_null() {
            self.compile_time_type.clone()
        } else {
            self.expectation.runtime_type()
        }
    }

    /// The type steps should dispatch on under the given options.
    pub fn expected_type(&self, options: &EquivalencyOptions) -> ValueType {
        if options.uses_runtime_types() {
            self.runtime_type()
        } else {
            self.compile_time_type()
        }
    }

    /// Whether either the dispatch type or the runtime type satisfies `test`.
    pub fn expects(&self, options: &EquivalencyOptions, test: impl Fn(&ValueType) -> bool) -> bool {
        test(&self.expected_type(options)) || test(&self.runtime_type())
    }

    pub(crate) fn with_subject(&self, subject: Value) -> Comparands {
        Comparands {
            subject,
            expectation: self.expectation.clone(),
            compile_time_type: self.compile_time_type.clone(),
        }
    }
}
