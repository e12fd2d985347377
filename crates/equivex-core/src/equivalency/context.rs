//! Per-invocation state threaded through the recursion.

use super::comparands::Comparands;
use super::node::Node;
use super::options::EquivalencyOptions;
use equivex_core_types::InvocationId;
use std::cell::RefCell;
use std::collections::HashMap;

type IdentityPair = (Option<usize>, Option<usize>);

/// Remembers which reference pairs have been entered, and where.
///
/// A pair is cyclic when it is entered again below a node where it was
/// already entered. Entries are never removed: the comparison is a single
/// forward pass.
#[derive(Debug, Default)]
pub(crate) struct CyclicReferenceDetector {
    observed: HashMap<IdentityPair, Vec<Node>>,
}

impl CyclicReferenceDetector {
    pub(crate) fn is_cyclic_reference(&mut self, comparands: &Comparands, node: &Node) -> bool {
        let pair = (
            comparands.subject().identity(),
            comparands.expectation().identity(),
        );
        if pair == (None, None) {
            return false;
        }
        let entered_at = self.observed.entry(pair).or_default();
        if entered_at
            .iter()
            .any(|ancestor| node.is_same_or_descendant_of(ancestor))
        {
            return true;
        }
        entered_at.push(node.clone());
        false
    }
}

/// Human-readable record of what the pipeline did, kept when tracing is on.
#[derive(Debug, Default)]
pub(crate) struct Tracer {
    enabled: bool,
    lines: RefCell<Vec<String>>,
}

impl Tracer {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            lines: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn write_line(&self, node: &Node, message: impl FnOnce() -> String) {
        let to_log = tracing::enabled!(tracing::Level::TRACE);
        if !self.enabled && !to_log {
            return;
        }
        let message = message();
        if to_log {
            tracing::trace!(path = %node.subject_path(), "{}", message);
        }
        if self.enabled {
            let indent = "  ".repeat(node.depth());
            self.lines
                .borrow_mut()
                .push(format!("{}{}: {}", indent, node.subject_path(), message));
        }
    }

    pub(crate) fn render(&self) -> String {
        self.lines.borrow().join("\n")
    }
}

/// State shared by every node of one top-level comparison.
pub(crate) struct RunState {
    detector: RefCell<CyclicReferenceDetector>,
    tracer: Tracer,
    invocation_id: InvocationId,
}

impl RunState {
    pub(crate) fn new(tracing_enabled: bool) -> Self {
        Self {
            detector: RefCell::new(CyclicReferenceDetector::default()),
            tracer: Tracer::new(tracing_enabled),
            invocation_id: InvocationId::new(),
        }
    }

    pub(crate) fn invocation_id(&self) -> &InvocationId {
        &self.invocation_id
    }

    pub(crate) fn render_trace(&self) -> String {
        self.tracer.render()
    }
}

/// Where the comparison currently is, plus read access to its
/// configuration.
pub struct EquivalencyContext<'a> {
    node: Node,
    options: &'a EquivalencyOptions,
    state: &'a RunState,
}

impl<'a> EquivalencyContext<'a> {
    pub(crate) fn root(
        options: &'a EquivalencyOptions,
        state: &'a RunState,
        caller_identifier: Option<String>,
    ) -> Self {
        Self {
            node: Node::root(caller_identifier),
            options,
            state,
        }
    }

    fn with_node(&self, node: Node) -> Self {
        Self {
            node,
            options: self.options,
            state: self.state,
        }
    }

    pub fn current_node(&self) -> &Node {
        &self.node
    }

    pub fn options(&self) -> &'a EquivalencyOptions {
        self.options
    }

    pub fn invocation_id(&self) -> &InvocationId {
        self.state.invocation_id()
    }

    pub fn as_nested_member(&self, expectation_name: &str, subject_name: &str) -> Self {
        self.with_node(self.node.member(expectation_name, subject_name))
    }

    pub fn as_collection_item(&self, index: usize) -> Self {
        self.with_node(self.node.collection_item(index))
    }

    pub fn as_dictionary_item(&self, formatted_key: String) -> Self {
        self.with_node(self.node.dictionary_item(formatted_key))
    }

    /// Records the pair as entered at this node unless it is a cycle.
    pub fn is_cyclic_reference(&self, comparands: &Comparands) -> bool {
        self.state
            .detector
            .borrow_mut()
            .is_cyclic_reference(comparands, &self.node)
    }

    pub fn trace(&self, message: impl FnOnce() -> String) {
        self.state.tracer.write_line(&self.node, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ObjectRef, Record, Value};

    #[test]
    fn test_inline_values_are_never_cyclic() {
        let mut detector = CyclicReferenceDetector::default();
        let root = Node::root(None);
        let comparands = Comparands::for_values(1, 1);
        assert!(!detector.is_cyclic_reference(&comparands, &root));
        assert!(!detector.is_cyclic_reference(&comparands, &root.member("A", "A")));
    }

    #[test]
    fn test_pair_revisited_below_itself_is_cyclic() {
        let node = ObjectRef::new(Record::new("Node"));
        let comparands = Comparands::for_values(Value::Object(node.clone()), Value::Object(node));
        let mut detector = CyclicReferenceDetector::default();
        let root = Node::root(None);
        assert!(!detector.is_cyclic_reference(&comparands, &root));
        assert!(detector.is_cyclic_reference(&comparands, &root.member("Next", "Next")));
    }

    #[test]
    fn test_pair_seen_on_sibling_branch_is_not_cyclic() {
        let shared = ObjectRef::new(Record::new("Address"));
        let comparands =
            Comparands::for_values(Value::Object(shared.clone()), Value::Object(shared));
        let mut detector = CyclicReferenceDetector::default();
        let root = Node::root(None);
        assert!(!detector.is_cyclic_reference(&comparands, &root.member("Home", "Home")));
        assert!(!detector.is_cyclic_reference(&comparands, &root.member("Work", "Work")));
    }

    #[test]
    fn test_tracer_collects_indented_lines() {
        let tracer = Tracer::new(true);
        let child = Node::root(None).member("A", "A");
        tracer.write_line(&child, || "handled".to_string());
        assert_eq!(tracer.render(), "  root.A: handled");
    }
}
