//! Configuration of one equivalency comparison.

use super::conversion::{ConversionRule, ConversionSelector};
use super::node::{normalize_member_path, path_is_same_or_below, Node};
use super::ordering::{ObjectInfo, OrderStrictness, OrderingRule, OrderingRules};
use super::step::EquivalencyStep;
use crate::errors::{EquivexError, Result};
use crate::value::{Value, ValueType};
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumEquivalencyHandling {
    #[default]
    ByValue,
    ByName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclicReferenceHandling {
    /// A revisited reference pair is treated as equivalent
    #[default]
    Ignore,
    /// A revisited reference pair is recorded as a failure
    Report,
}

/// A user-supplied equality for values of one type.
pub trait EqualityComparer: Send + Sync {
    fn name(&self) -> &str;
    fn equals(&self, subject: &Value, expectation: &Value) -> bool;
}

/// An [`EqualityComparer`] backed by a closure.
pub struct FnComparer<F> {
    name: String,
    compare: F,
}

impl<F> FnComparer<F>
where
    F: Fn(&Value, &Value) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, compare: F) -> Self {
        Self {
            name: name.into(),
            compare,
        }
    }
}

impl<F> EqualityComparer for FnComparer<F>
where
    F: Fn(&Value, &Value) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn equals(&self, subject: &Value, expectation: &Value) -> bool {
        (self.compare)(subject, expectation)
    }
}

/// Which expectation members take part in a structural comparison.
#[derive(Debug, Clone, Default)]
pub struct MemberSelection {
    included_paths: Vec<String>,
    excluded_paths: Vec<String>,
    excluded_names: Vec<String>,
}

impl MemberSelection {
    pub fn is_selected(&self, member_path: &str, member_name: &str) -> bool {
        if self.excluded_names.iter().any(|n| n == member_name) {
            return false;
        }
        if self
            .excluded_paths
            .iter()
            .any(|p| path_is_same_or_below(member_path, p))
        {
            return false;
        }
        self.included_paths.is_empty()
            || self.included_paths.iter().any(|p| {
                path_is_same_or_below(member_path, p) || path_is_same_or_below(p, member_path)
            })
    }
}

impl fmt::Display for MemberSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.included_paths.is_empty() {
            writeln!(f, "- Include all members")?;
        }
        for path in &self.included_paths {
            writeln!(f, "- Include member {}", path)?;
        }
        for path in &self.excluded_paths {
            writeln!(f, "- Exclude member {}", path)?;
        }
        for name in &self.excluded_names {
            writeln!(f, "- Exclude members named {}", name)?;
        }
        Ok(())
    }
}

/// Maps an expectation member onto a differently named subject member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberMapping {
    /// Applies to members with this name on every type
    ByName {
        expectation: String,
        subject: String,
    },
    /// Applies to one member path; both sides share the parent path
    ByPath {
        parent: String,
        expectation: String,
        subject: String,
    },
}

fn split_member_path(path: &str) -> (String, String) {
    match path.rfind('.') {
        Some(dot) => (path[..dot].to_string(), path[dot + 1..].to_string()),
        None => (String::new(), path.to_string()),
    }
}

fn is_bare_name(path: &str) -> bool {
    !path.contains('.') && !path.contains('[')
}

impl MemberMapping {
    /// # Errors
    ///
    /// Returns [`EquivexError::InvalidMapping`] when a side is empty, when
    /// only one side is a path, or when the paths have different parents.
    pub fn parse(expectation: &str, subject: &str) -> Result<Self> {
        let invalid = |reason: &str| EquivexError::InvalidMapping {
            expectation_path: expectation.to_string(),
            subject_path: subject.to_string(),
            reason: reason.to_string(),
        };
        if expectation.trim().is_empty() || subject.trim().is_empty() {
            return Err(invalid("member paths cannot be empty"));
        }
        match (is_bare_name(expectation), is_bare_name(subject)) {
            (true, true) => Ok(MemberMapping::ByName {
                expectation: expectation.trim().to_string(),
                subject: subject.trim().to_string(),
            }),
            (false, false) => {
                let (expectation_parent, expectation_name) =
                    split_member_path(&normalize_member_path(expectation));
                let (subject_parent, subject_name) =
                    split_member_path(&normalize_member_path(subject));
                if expectation_parent != subject_parent {
                    return Err(invalid("the members must share the same parent"));
                }
                if expectation_name.ends_with("[]") || subject_name.ends_with("[]") {
                    return Err(invalid("a mapping must end in a member name"));
                }
                Ok(MemberMapping::ByPath {
                    parent: expectation_parent,
                    expectation: expectation_name,
                    subject: subject_name,
                })
            }
            _ => Err(invalid("cannot map a member path onto a bare member name")),
        }
    }

    fn subject_name_for(&self, parent_path: &str, expectation_name: &str) -> Option<&str> {
        match self {
            MemberMapping::ByName {
                expectation,
                subject,
            } if expectation == expectation_name => Some(subject.as_str()),
            MemberMapping::ByPath {
                parent,
                expectation,
                subject,
            } if parent == parent_path && expectation == expectation_name => {
                Some(subject.as_str())
            }
            _ => None,
        }
    }
}

impl fmt::Display for MemberMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberMapping::ByName {
                expectation,
                subject,
            } => write!(f, "Map members named {} to {}", expectation, subject),
            MemberMapping::ByPath {
                parent,
                expectation,
                subject,
            } if parent.is_empty() => write!(f, "Map {} to {}", expectation, subject),
            MemberMapping::ByPath {
                parent,
                expectation,
                subject,
            } => write!(f, "Map {}.{} to {}.{}", parent, expectation, parent, subject),
        }
    }
}

/// The configuration of a comparison.
///
/// Built with consuming `with_*`/`without_*` setters before a comparison
/// starts and read-only while it runs. Cloning copies the rule lists and
/// shares the rule closures.
#[derive(Clone)]
pub struct EquivalencyOptions {
    ordering_rules: OrderingRules,
    conversion_selector: ConversionSelector,
    enum_handling: EnumEquivalencyHandling,
    recursive: bool,
    runtime_types: bool,
    cyclic_reference_handling: CyclicReferenceHandling,
    max_recursion_depth: Option<usize>,
    member_selection: MemberSelection,
    ignore_missing_members: bool,
    mappings: Vec<MemberMapping>,
    comparers: Vec<(ValueType, Arc<dyn EqualityComparer>)>,
    value_semantics_types: Vec<String>,
    user_steps: Vec<Arc<dyn EquivalencyStep>>,
    tracing: bool,
}

impl Default for EquivalencyOptions {
    fn default() -> Self {
        Self {
            ordering_rules: OrderingRules::default(),
            conversion_selector: ConversionSelector::default(),
            enum_handling: EnumEquivalencyHandling::default(),
            recursive: true,
            runtime_types: false,
            cyclic_reference_handling: CyclicReferenceHandling::default(),
            max_recursion_depth: None,
            member_selection: MemberSelection::default(),
            ignore_missing_members: false,
            mappings: Vec::new(),
            comparers: Vec::new(),
            value_semantics_types: Vec::new(),
            user_steps: Vec::new(),
            tracing: false,
        }
    }
}

impl EquivalencyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- ordering -----

    /// Every collection is compared in order
    pub fn with_strict_ordering(mut self) -> Self {
        self.ordering_rules.reset_to(OrderStrictness::Strict);
        self
    }

    /// No collection is compared in order
    pub fn without_strict_ordering(mut self) -> Self {
        self.ordering_rules.reset_to(OrderStrictness::NotStrict);
        self
    }

    pub fn with_strict_ordering_for(mut self, path: &str) -> Self {
        self.ordering_rules
            .add(OrderingRule::for_path(path, OrderStrictness::Strict));
        self
    }

    pub fn without_strict_ordering_for(mut self, path: &str) -> Self {
        self.ordering_rules
            .add(OrderingRule::for_path(path, OrderStrictness::NotStrict));
        self
    }

    pub fn with_strict_ordering_when(
        mut self,
        description: impl Into<String>,
        predicate: impl Fn(&ObjectInfo) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.ordering_rules.add(OrderingRule::when(
            description,
            OrderStrictness::Strict,
            predicate,
        ));
        self
    }

    pub fn without_strict_ordering_when(
        mut self,
        description: impl Into<String>,
        predicate: impl Fn(&ObjectInfo) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.ordering_rules.add(OrderingRule::when(
            description,
            OrderStrictness::NotStrict,
            predicate,
        ));
        self
    }

    // ----- conversion -----

    pub fn with_auto_conversion(mut self) -> Self {
        self.conversion_selector.include_all();
        self
    }

    pub fn with_auto_conversion_for(
        mut self,
        description: impl Into<String>,
        predicate: impl Fn(&ObjectInfo) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.conversion_selector
            .include(ConversionRule::new(description, predicate));
        self
    }

    pub fn without_auto_conversion_for(
        mut self,
        description: impl Into<String>,
        predicate: impl Fn(&ObjectInfo) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.conversion_selector
            .exclude(ConversionRule::new(description, predicate));
        self
    }

    // ----- enums, recursion, typing, cycles -----

    pub fn comparing_enums_by_name(mut self) -> Self {
        self.enum_handling = EnumEquivalencyHandling::ByName;
        self
    }

    pub fn comparing_enums_by_value(mut self) -> Self {
        self.enum_handling = EnumEquivalencyHandling::ByValue;
        self
    }

    /// Nested records and collections below the root compare with plain
    /// equality instead of structurally
    pub fn excluding_nested_objects(mut self) -> Self {
        self.recursive = false;
        self
    }

    pub fn including_nested_objects(mut self) -> Self {
        self.recursive = true;
        self
    }

    pub fn respecting_runtime_types(mut self) -> Self {
        self.runtime_types = true;
        self
    }

    pub fn respecting_declared_types(mut self) -> Self {
        self.runtime_types = false;
        self
    }

    pub fn ignoring_cyclic_references(mut self) -> Self {
        self.cyclic_reference_handling = CyclicReferenceHandling::Ignore;
        self
    }

    pub fn reporting_cyclic_references(mut self) -> Self {
        self.cyclic_reference_handling = CyclicReferenceHandling::Report;
        self
    }

    /// # Errors
    ///
    /// Returns [`EquivexError::InvalidConfiguration`] for a depth of zero.
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Result<Self> {
        if depth == 0 {
            return Err(EquivexError::InvalidConfiguration {
                reason: "the maximum recursion depth must be at least 1".to_string(),
            });
        }
        self.max_recursion_depth = Some(depth);
        Ok(self)
    }

    pub fn allowing_infinite_recursion(mut self) -> Self {
        self.max_recursion_depth = None;
        self
    }

    // ----- members -----

    pub fn excluding(mut self, path: &str) -> Self {
        self.member_selection
            .excluded_paths
            .push(normalize_member_path(path));
        self
    }

    pub fn including(mut self, path: &str) -> Self {
        self.member_selection
            .included_paths
            .push(normalize_member_path(path));
        self
    }

    pub fn excluding_members_named(mut self, name: impl Into<String>) -> Self {
        self.member_selection.excluded_names.push(name.into());
        self
    }

    pub fn excluding_missing_members(mut self) -> Self {
        self.ignore_missing_members = true;
        self
    }

    /// # Errors
    ///
    /// Returns [`EquivexError::InvalidMapping`] when the mapping is
    /// malformed; see [`MemberMapping::parse`].
    pub fn with_mapping(mut self, expectation: &str, subject: &str) -> Result<Self> {
        self.mappings.push(MemberMapping::parse(expectation, subject)?);
        Ok(self)
    }

    // ----- equality overrides -----

    pub fn using_comparer(
        mut self,
        for_type: ValueType,
        comparer: Arc<dyn EqualityComparer>,
    ) -> Self {
        self.comparers.push((for_type, comparer));
        self
    }

    pub fn using_comparer_fn(
        self,
        for_type: ValueType,
        name: impl Into<String>,
        compare: impl Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.using_comparer(for_type, Arc::new(FnComparer::new(name, compare)))
    }

    /// Records of this type compare with plain equality
    pub fn comparing_by_value(mut self, type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        if !self.value_semantics_types.contains(&type_name) {
            self.value_semantics_types.push(type_name);
        }
        self
    }

    pub fn comparing_by_members(mut self, type_name: &str) -> Self {
        self.value_semantics_types.retain(|t| t != type_name);
        self
    }

    /// Run `step` before the built-in steps. User steps run in registration
    /// order.
    pub fn using_step(mut self, step: Arc<dyn EquivalencyStep>) -> Self {
        self.user_steps.push(step);
        self
    }

    /// Collect a per-node trace and attach it to failures
    pub fn with_tracing(mut self) -> Self {
        self.tracing = true;
        self
    }

    // ----- accessors -----

    pub fn ordering_rules(&self) -> &OrderingRules {
        &self.ordering_rules
    }

    pub fn conversion_selector(&self) -> &ConversionSelector {
        &self.conversion_selector
    }

    pub fn enum_equivalency_handling(&self) -> EnumEquivalencyHandling {
        self.enum_handling
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn uses_runtime_types(&self) -> bool {
        self.runtime_types
    }

    pub fn cyclic_reference_handling(&self) -> CyclicReferenceHandling {
        self.cyclic_reference_handling
    }

    pub fn max_recursion_depth(&self) -> Option<usize> {
        self.max_recursion_depth
    }

    pub fn member_selection(&self) -> &MemberSelection {
        &self.member_selection
    }

    pub fn ignores_missing_members(&self) -> bool {
        self.ignore_missing_members
    }

    pub fn user_steps(&self) -> &[Arc<dyn EquivalencyStep>] {
        &self.user_steps
    }

    pub fn is_tracing_enabled(&self) -> bool {
        self.tracing
    }

    pub fn compares_by_value(&self, type_name: &str) -> bool {
        self.value_semantics_types.iter().any(|t| t == type_name)
    }

    /// The most recently registered comparer for `value_type`
    pub fn comparer_for(&self, value_type: &ValueType) -> Option<&Arc<dyn EqualityComparer>> {
        self.comparers
            .iter()
            .rev()
            .find(|(t, _)| t == value_type)
            .map(|(_, c)| c)
    }

    /// Subject-side name of the member `expectation_name` under `parent`
    pub fn subject_member_name(&self, parent: &Node, expectation_name: &str) -> String {
        let parent_path = parent.member_path();
        self.mappings
            .iter()
            .rev()
            .find_map(|m| m.subject_name_for(&parent_path, expectation_name))
            .unwrap_or(expectation_name)
            .to_string()
    }
}

impl fmt::Debug for EquivalencyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EquivalencyOptions")
            .field("ordering_rules", &self.ordering_rules)
            .field("enum_handling", &self.enum_handling)
            .field("recursive", &self.recursive)
            .field("runtime_types", &self.runtime_types)
            .field("cyclic_reference_handling", &self.cyclic_reference_handling)
            .field("max_recursion_depth", &self.max_recursion_depth)
            .field("member_selection", &self.member_selection)
            .field("mappings", &self.mappings)
            .field("comparers", &self.comparers.len())
            .field("user_steps", &self.user_steps.len())
            .finish_non_exhaustive()
    }
}

/// Rendered as the `configuration` reportable of a failed comparison.
impl fmt::Display for EquivalencyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.enum_handling {
            EnumEquivalencyHandling::ByValue => writeln!(f, "- Compare enums by value")?,
            EnumEquivalencyHandling::ByName => writeln!(f, "- Compare enums by name")?,
        }
        if self.recursive {
            writeln!(f, "- Compare nested objects by their members")?;
        } else {
            writeln!(f, "- Compare nested objects by plain equality")?;
        }
        if self.runtime_types {
            writeln!(f, "- Use runtime types")?;
        } else {
            writeln!(f, "- Use declared types")?;
        }
        match self.cyclic_reference_handling {
            CyclicReferenceHandling::Ignore => writeln!(f, "- Ignore cyclic references")?,
            CyclicReferenceHandling::Report => writeln!(f, "- Report cyclic references")?,
        }
        if let Some(depth) = self.max_recursion_depth {
            writeln!(f, "- Stop at a recursion depth of {}", depth)?;
        }
        write!(f, "{}", self.member_selection)?;
        if self.ignore_missing_members {
            writeln!(f, "- Ignore members missing on the subject")?;
        }
        for mapping in &self.mappings {
            writeln!(f, "- {}", mapping)?;
        }
        for type_name in &self.value_semantics_types {
            writeln!(f, "- Compare {} by value", type_name)?;
        }
        for (value_type, comparer) in &self.comparers {
            writeln!(f, "- Use {} for {}", comparer.name(), value_type)?;
        }
        for step in &self.user_steps {
            writeln!(f, "- Use step {}", step.name())?;
        }
        write!(f, "{}", self.ordering_rules)?;
        write!(f, "{}", self.conversion_selector)
    }
}

// ========== Global defaults ==========

static GLOBAL_DEFAULTS: OnceLock<RwLock<EquivalencyOptions>> = OnceLock::new();

fn global_defaults() -> &'static RwLock<EquivalencyOptions> {
    GLOBAL_DEFAULTS.get_or_init(|| RwLock::new(EquivalencyOptions::default()))
}

/// Change the process-wide defaults that
/// [`EquivalencyOptions::from_global_defaults`] starts from.
pub fn configure_global_defaults(configure: impl FnOnce(EquivalencyOptions) -> EquivalencyOptions) {
    let mut defaults = global_defaults()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    let current = std::mem::take(&mut *defaults);
    *defaults = configure(current);
}

/// Restore the built-in defaults
pub fn reset_global_defaults() {
    configure_global_defaults(|_| EquivalencyOptions::default());
}

impl EquivalencyOptions {
    /// A copy of the current process-wide defaults
    pub fn from_global_defaults() -> Self {
        global_defaults()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EquivalencyOptions::default();
        assert!(options.is_recursive());
        assert!(!options.uses_runtime_types());
        assert_eq!(options.enum_equivalency_handling(), EnumEquivalencyHandling::ByValue);
        assert_eq!(options.cyclic_reference_handling(), CyclicReferenceHandling::Ignore);
        assert_eq!(options.max_recursion_depth(), None);
    }

    #[test]
    fn test_strict_ordering_replaces_previous_rules() {
        let options = EquivalencyOptions::default()
            .without_strict_ordering_for("Tags")
            .with_strict_ordering();
        assert_eq!(options.ordering_rules().iter().count(), 1);
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let err = EquivalencyOptions::default()
            .with_max_recursion_depth(0)
            .unwrap_err();
        assert!(matches!(err, EquivexError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_mapping_requires_shared_parent() {
        assert!(MemberMapping::parse("Customer.Name", "Customer.FullName").is_ok());
        let err = MemberMapping::parse("Customer.Name", "Client.Name").unwrap_err();
        assert!(matches!(err, EquivexError::InvalidMapping { .. }));
        assert!(MemberMapping::parse("Customer.Name", "Name").is_err());
        assert!(MemberMapping::parse("", "Name").is_err());
    }

    #[test]
    fn test_subject_member_name() {
        let options = EquivalencyOptions::default()
            .with_mapping("Id", "Key")
            .unwrap()
            .with_mapping("Customer.Name", "Customer.FullName")
            .unwrap();
        let root = Node::root(None);
        let customer = root.member("Customer", "Customer");
        assert_eq!(options.subject_member_name(&root, "Id"), "Key");
        assert_eq!(options.subject_member_name(&customer, "Id"), "Key");
        assert_eq!(options.subject_member_name(&customer, "Name"), "FullName");
        assert_eq!(options.subject_member_name(&root, "Name"), "Name");
    }

    #[test]
    fn test_member_selection() {
        let options = EquivalencyOptions::default()
            .including("Customer.Name")
            .excluding_members_named("Timestamp");
        let selection = options.member_selection();
        assert!(selection.is_selected("Customer", "Customer"));
        assert!(selection.is_selected("Customer.Name", "Name"));
        assert!(!selection.is_selected("Customer.Age", "Age"));
        assert!(!selection.is_selected("Total", "Total"));
        assert!(!selection.is_selected("Customer.Timestamp", "Timestamp"));
    }

    #[test]
    fn test_comparer_lookup_prefers_latest() {
        let options = EquivalencyOptions::default()
            .using_comparer_fn(ValueType::Float, "first", |_, _| false)
            .using_comparer_fn(ValueType::Float, "second", |_, _| true);
        let comparer = options.comparer_for(&ValueType::Float).unwrap();
        assert_eq!(comparer.name(), "second");
        assert!(options.comparer_for(&ValueType::Integer).is_none());
    }

    #[test]
    fn test_display_lists_configuration() {
        let text = EquivalencyOptions::default()
            .comparing_enums_by_name()
            .excluding("Id")
            .to_string();
        assert!(text.contains("- Compare enums by name"));
        assert!(text.contains("- Exclude member Id"));
    }
}
