//! Rules deciding whether the order of a collection is significant.

use super::comparands::Comparands;
use super::node::{normalize_member_path, Node};
use crate::value::ValueType;
use std::fmt;
use std::sync::Arc;

/// Metadata about one graph position, handed to ordering and conversion
/// rules.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    path: String,
    description: String,
    compile_time_type: ValueType,
    runtime_type: ValueType,
    ordered_by_default: bool,
}

impl ObjectInfo {
    pub fn new(node: &Node, comparands: &Comparands, ordered_by_default: bool) -> Self {
        Self {
            path: node.member_path(),
            description: node.subject_path(),
            compile_time_type: comparands.compile_time_type(),
            runtime_type: comparands.runtime_type(),
            ordered_by_default,
        }
    }

    /// Root-relative path with indices collapsed, e.g. `Orders[].Lines`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Full subject path, e.g. `root.Orders[2].Lines`
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn compile_time_type(&self) -> &ValueType {
        &self.compile_time_type
    }

    pub fn runtime_type(&self) -> &ValueType {
        &self.runtime_type
    }

    /// Whether the collection kind at this position is ordered (lists and
    /// arrays) absent any rule.
    pub fn ordered_by_default(&self) -> bool {
        self.ordered_by_default
    }
}

pub type InfoPredicate = Arc<dyn Fn(&ObjectInfo) -> bool + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStrictness {
    Strict,
    NotStrict,
}

#[derive(Clone)]
pub struct OrderingRule {
    description: String,
    strictness: OrderStrictness,
    matches: InfoPredicate,
}

impl OrderingRule {
    /// Applies to every collection
    pub fn all(strictness: OrderStrictness) -> Self {
        Self {
            description: "all collections".to_string(),
            strictness,
            matches: Arc::new(|_| true),
        }
    }

    /// Applies to the collection at `path` (indices may be written as `[]`
    /// or as concrete indices)
    pub fn for_path(path: &str, strictness: OrderStrictness) -> Self {
        let normalized = normalize_member_path(path);
        Self {
            description: format!("the collection at {}", normalized),
            strictness,
            matches: Arc::new(move |info| info.path() == normalized),
        }
    }

    pub fn when(
        description: impl Into<String>,
        strictness: OrderStrictness,
        predicate: impl Fn(&ObjectInfo) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            strictness,
            matches: Arc::new(predicate),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn strictness(&self) -> OrderStrictness {
        self.strictness
    }

    pub fn evaluate(&self, info: &ObjectInfo) -> Option<OrderStrictness> {
        (self.matches)(info).then_some(self.strictness)
    }
}

impl fmt::Debug for OrderingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderingRule")
            .field("description", &self.description)
            .field("strictness", &self.strictness)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for OrderingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.strictness {
            OrderStrictness::Strict => {
                write!(f, "Be strict about the order of items in {}", self.description)
            }
            OrderStrictness::NotStrict => {
                write!(f, "Ignore the order of items in {}", self.description)
            }
        }
    }
}

/// Rules evaluated in registration order; the first rule that matches
/// decides. The catch-all set by `with_strict_ordering` or
/// `without_strict_ordering` is consulted after every targeted rule, and
/// with no match at all the collection kind decides.
#[derive(Debug, Clone, Default)]
pub struct OrderingRules {
    rules: Vec<OrderingRule>,
    catch_all: Option<OrderingRule>,
}

impl OrderingRules {
    pub fn add(&mut self, rule: OrderingRule) {
        self.rules.push(rule);
    }

    /// Drops every rule and makes `strictness` apply to all collections
    /// not matched by a rule added later.
    pub fn reset_to(&mut self, strictness: OrderStrictness) {
        self.rules.clear();
        self.catch_all = Some(OrderingRule::all(strictness));
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.catch_all.is_none()
    }

    /// Rules in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = &OrderingRule> {
        self.rules.iter().chain(self.catch_all.iter())
    }

    pub fn is_ordering_strict_for(&self, info: &ObjectInfo) -> bool {
        match self.iter().find_map(|rule| rule.evaluate(info)) {
            Some(strictness) => strictness == OrderStrictness::Strict,
            None => info.ordered_by_default(),
        }
    }
}

impl fmt::Display for OrderingRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(
                f,
                "- Be strict about the order of lists and arrays, not of sets"
            );
        }
        for rule in self.iter() {
            writeln!(f, "- {}", rule)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Sequence;

    fn info(path_node: &Node, ordered: bool) -> ObjectInfo {
        let comparands = Comparands::for_values(Sequence::list([1]), Sequence::list([1]));
        ObjectInfo::new(path_node, &comparands, ordered)
    }

    #[test]
    fn test_default_follows_collection_kind() {
        let rules = OrderingRules::default();
        let node = Node::root(None);
        assert!(rules.is_ordering_strict_for(&info(&node, true)));
        assert!(!rules.is_ordering_strict_for(&info(&node, false)));
    }

    #[test]
    fn test_first_matching_rule_decides() {
        let mut rules = OrderingRules::default();
        rules.add(OrderingRule::for_path("Tags", OrderStrictness::Strict));
        rules.add(OrderingRule::when("everything", OrderStrictness::NotStrict, |_| true));
        let tags = Node::root(None).member("Tags", "Tags");
        let lines = Node::root(None).member("Lines", "Lines");
        assert!(rules.is_ordering_strict_for(&info(&tags, false)));
        assert!(!rules.is_ordering_strict_for(&info(&lines, true)));
    }

    #[test]
    fn test_targeted_rules_precede_the_catch_all() {
        let mut rules = OrderingRules::default();
        rules.reset_to(OrderStrictness::NotStrict);
        rules.add(OrderingRule::for_path("Tags", OrderStrictness::Strict));
        let tags = Node::root(None).member("Tags", "Tags");
        let lines = Node::root(None).member("Lines", "Lines");
        assert!(rules.is_ordering_strict_for(&info(&tags, false)));
        assert!(!rules.is_ordering_strict_for(&info(&lines, true)));

        let described: Vec<String> = rules.iter().map(|r| r.to_string()).collect();
        assert_eq!(
            described,
            vec![
                "Be strict about the order of items in the collection at Tags".to_string(),
                "Ignore the order of items in all collections".to_string(),
            ]
        );
    }

    #[test]
    fn test_path_rule_ignores_concrete_indices() {
        let rule = OrderingRule::for_path("Orders[3].Lines", OrderStrictness::NotStrict);
        let node = Node::root(None)
            .member("Orders", "Orders")
            .collection_item(0)
            .member("Lines", "Lines");
        assert_eq!(rule.evaluate(&info(&node, true)), Some(OrderStrictness::NotStrict));
    }
}
