//! The failure sink.
//!
//! An [`AssertionScope`] collects failure messages instead of raising them,
//! so one comparison can report every mismatch it finds. Scopes nest
//! through [`AssertionScope::nested`]: a [`NestedScope`] flushes its failures
//! and context data into the parent when dropped, on every exit path,
//! unless its failures were taken with [`NestedScope::discard`].
//!
//! The scope is passed explicitly (`&mut AssertionScope`) down the
//! recursion. There is no ambient or thread-local current scope.

mod message;

pub use message::escape_placeholders;

use crate::format::{DefaultValueFormatter, ValueFormatter};
use crate::value::Value;
use message::MessageBuilder;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use thiserror::Error;

// ========== Context data ==========

#[derive(Debug, Clone)]
struct DataEntry {
    key: String,
    value: String,
    reportable: bool,
}

/// Key/value data attached to a scope.
///
/// Reportable entries are appended to the final failure report; every entry
/// can be referenced as a `{key}` placeholder.
#[derive(Debug, Clone, Default)]
pub struct ContextData {
    entries: Vec<DataEntry>,
}

impl ContextData {
    /// Add or replace an entry
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>, reportable: bool) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => {
                entry.value = value;
                entry.reportable = reportable;
            }
            None => self.entries.push(DataEntry {
                key,
                value,
                reportable,
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Reportable entries in insertion order
    pub fn reportables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter(|e| e.reportable)
            .map(|e| (e.key.as_str(), e.value.as_str()))
    }

    fn merge(&mut self, other: ContextData) {
        for entry in other.entries {
            self.add(entry.key, entry.value, entry.reportable);
        }
    }
}

// ========== Aggregated failure ==========

/// Every failure recorded by an outermost scope, plus its reportables.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct AssertionFailure {
    failures: Vec<String>,
    message: String,
}

impl AssertionFailure {
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

// ========== Scope ==========

/// A lazily rendered failure: template plus positional arguments.
#[derive(Debug, Clone)]
pub struct FailReason {
    template: String,
    args: Vec<Value>,
}

impl FailReason {
    pub fn new(template: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            template: template.into(),
            args,
        }
    }
}

pub struct AssertionScope {
    context: Option<String>,
    reason: Option<String>,
    expectation: Option<String>,
    failures: Vec<String>,
    data: ContextData,
    formatter: Arc<dyn ValueFormatter>,
}

impl Default for AssertionScope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AssertionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssertionScope")
            .field("context", &self.context)
            .field("reason", &self.reason)
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

impl AssertionScope {
    pub fn new() -> Self {
        Self::with_formatter(Arc::new(DefaultValueFormatter))
    }

    pub fn with_formatter(formatter: Arc<dyn ValueFormatter>) -> Self {
        Self {
            context: None,
            reason: None,
            expectation: None,
            failures: Vec::new(),
            data: ContextData::default(),
            formatter,
        }
    }

    /// Name the subject of the assertion (e.g. a variable name). Child paths
    /// are prefixed with it.
    pub fn with_context(mut self, identifier: impl Into<String>) -> Self {
        self.context = Some(identifier.into());
        self
    }

    /// Supply the `{reason}` clause
    pub fn because(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Swap the caller identifier, returning the previous one so it can be
    /// restored.
    pub fn replace_context(&mut self, context: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.context, context)
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn formatter(&self) -> &dyn ValueFormatter {
        self.formatter.as_ref()
    }

    pub fn format_value(&self, value: &Value) -> String {
        self.formatter.format(value)
    }

    pub fn add_reportable(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.add(key, value, true);
    }

    pub fn add_non_reportable(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.add(key, value, false);
    }

    pub fn data(&self) -> &ContextData {
        &self.data
    }

    fn render(&self, template: &str, args: &[Value]) -> String {
        MessageBuilder {
            identifier: self.context.as_deref(),
            reason: self.reason.as_deref(),
            data: &self.data,
            formatter: self.formatter.as_ref(),
        }
        .build(template, args)
    }

    /// Render `template` now and prefix it to every following failure
    /// until [`clear_expectation`](Self::clear_expectation).
    pub fn with_expectation(&mut self, template: &str, args: &[Value]) {
        self.expectation = Some(self.render(template, args));
    }

    pub fn clear_expectation(&mut self) {
        self.expectation = None;
    }

    /// Record a failure unconditionally
    pub fn fail_with(&mut self, template: &str, args: &[Value]) {
        let message = self.render(template, args);
        let message = match &self.expectation {
            Some(prefix) => format!("{}{}", prefix, message),
            None => message,
        };
        self.failures.push(message);
    }

    /// Record an already rendered message as is
    pub fn add_preformatted_failure(&mut self, message: impl Into<String>) {
        self.failures.push(message.into());
    }

    pub fn for_condition(&mut self, condition: bool) -> Assertion<'_> {
        Assertion {
            scope: self,
            active: true,
            condition,
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Open an isolated child scope inheriting context, reason and data.
    pub fn nested(&mut self) -> NestedScope<'_> {
        let scope = AssertionScope {
            context: self.context.clone(),
            reason: self.reason.clone(),
            expectation: None,
            failures: Vec::new(),
            data: self.data.clone(),
            formatter: Arc::clone(&self.formatter),
        };
        NestedScope {
            parent: self,
            scope,
        }
    }

    /// Take every recorded failure, leaving the scope clean.
    pub fn discard(&mut self) -> Vec<String> {
        std::mem::take(&mut self.failures)
    }

    /// Close an outermost scope.
    ///
    /// # Errors
    ///
    /// Returns the aggregated [`AssertionFailure`] when any failure was
    /// recorded: all messages joined by newlines, followed by
    /// `With <key>:\n<value>` for every reportable.
    pub fn finish(self) -> Result<(), AssertionFailure> {
        if self.failures.is_empty() {
            return Ok(());
        }
        let mut message = self.failures.join("\n");
        for (key, value) in self.data.reportables() {
            message.push_str(&format!("\n\nWith {}:\n{}", key, value));
        }
        Err(AssertionFailure {
            failures: self.failures,
            message,
        })
    }
}

/// A child scope. Dropping it flushes into the parent.
pub struct NestedScope<'p> {
    parent: &'p mut AssertionScope,
    scope: AssertionScope,
}

impl NestedScope<'_> {
    /// Close the scope without reporting its failures to the parent and
    /// hand them to the caller instead.
    pub fn discard(mut self) -> Vec<String> {
        self.scope.discard()
    }
}

impl Deref for NestedScope<'_> {
    type Target = AssertionScope;

    fn deref(&self) -> &AssertionScope {
        &self.scope
    }
}

impl DerefMut for NestedScope<'_> {
    fn deref_mut(&mut self) -> &mut AssertionScope {
        &mut self.scope
    }
}

impl Drop for NestedScope<'_> {
    fn drop(&mut self) {
        let failures = std::mem::take(&mut self.scope.failures);
        self.parent.failures.extend(failures);
        let data = std::mem::take(&mut self.scope.data);
        self.parent.data.merge(data);
    }
}

// ========== Fluent condition chain ==========

/// A pending condition; nothing is recorded until `fail_with`.
pub struct Assertion<'s> {
    scope: &'s mut AssertionScope,
    active: bool,
    condition: bool,
}

impl<'s> Assertion<'s> {
    pub fn for_condition(mut self, condition: bool) -> Self {
        self.condition = condition;
        self
    }

    pub fn fail_with(self, template: &str, args: &[Value]) -> Continuation<'s> {
        let Assertion {
            scope,
            active,
            condition,
        } = self;
        if !active {
            return Continuation {
                scope,
                succeeded: false,
            };
        }
        if !condition {
            scope.fail_with(template, args);
        }
        Continuation {
            scope,
            succeeded: condition,
        }
    }

    /// Like [`fail_with`](Self::fail_with), but the template and arguments
    /// are only built when the condition fails.
    pub fn fail_with_lazy(self, reason: impl FnOnce() -> FailReason) -> Continuation<'s> {
        let Assertion {
            scope,
            active,
            condition,
        } = self;
        if active && !condition {
            let reason = reason();
            scope.fail_with(&reason.template, &reason.args);
        }
        Continuation {
            scope,
            succeeded: active && condition,
        }
    }
}

/// Result of one link in a condition chain.
pub struct Continuation<'s> {
    scope: &'s mut AssertionScope,
    succeeded: bool,
}

impl<'s> Continuation<'s> {
    /// Chain another condition; it is skipped when this one failed.
    pub fn then(self) -> Assertion<'s> {
        Assertion {
            scope: self.scope,
            active: self.succeeded,
            condition: true,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_scope_flushes_on_drop() {
        let mut scope = AssertionScope::new();
        {
            let mut nested = scope.nested();
            nested.fail_with("inner failure", &[]);
        }
        assert_eq!(scope.failures(), &["inner failure".to_string()]);
    }

    #[test]
    fn test_discarded_scope_does_not_leak() {
        let mut scope = AssertionScope::new();
        let taken = {
            let mut nested = scope.nested();
            nested.fail_with("candidate mismatch", &[]);
            nested.discard()
        };
        assert_eq!(taken, vec!["candidate mismatch".to_string()]);
        assert!(!scope.has_failures());
    }

    #[test]
    fn test_chain_stops_after_first_failure() {
        let mut scope = AssertionScope::new();
        let succeeded = scope
            .for_condition(false)
            .fail_with("first", &[])
            .then()
            .for_condition(false)
            .fail_with("second", &[])
            .succeeded();
        assert!(!succeeded);
        assert_eq!(scope.failures(), &["first".to_string()]);
    }

    #[test]
    fn test_lazy_reason_is_not_built_on_success() {
        let mut scope = AssertionScope::new();
        let continuation = scope
            .for_condition(true)
            .fail_with_lazy(|| panic!("must not be evaluated"));
        assert!(continuation.succeeded());
    }

    #[test]
    fn test_expectation_prefix() {
        let mut scope = AssertionScope::new();
        scope.with_expectation("Expected {context:value} to be {0}, ", &[Value::from(3)]);
        scope.fail_with("but found {0}.", &[Value::from(4)]);
        scope.clear_expectation();
        scope.fail_with("plain", &[]);
        assert_eq!(
            scope.failures(),
            &["Expected value to be 3, but found 4.".to_string(), "plain".to_string()]
        );
    }

    #[test]
    fn test_finish_appends_reportables_only() {
        let mut scope = AssertionScope::new();
        scope.add_reportable("configuration", "- strict");
        scope.add_non_reportable("hidden", "secret");
        scope.fail_with("a", &[]);
        scope.fail_with("b", &[]);
        let failure = scope.finish().unwrap_err();
        assert_eq!(failure.message(), "a\nb\n\nWith configuration:\n- strict");
        assert_eq!(failure.failures().len(), 2);
    }

    #[test]
    fn test_finish_without_failures_is_ok() {
        let mut scope = AssertionScope::new();
        scope.add_reportable("configuration", "ignored");
        assert!(scope.finish().is_ok());
    }

    #[test]
    fn test_nested_inherits_context_and_reason() {
        let mut scope = AssertionScope::new().with_context("order").because("totals matter");
        {
            let mut nested = scope.nested();
            nested.fail_with("Expected {context:x} to match{reason}.", &[]);
        }
        assert_eq!(
            scope.failures(),
            &["Expected order to match because totals matter.".to_string()]
        );
    }
}
