//! Position of a comparison inside the object graph.

use std::fmt;
use std::rc::Rc;

/// Label used for the root when the caller did not name the subject
pub const DEFAULT_ROOT_LABEL: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Root,
    /// A record member; the subject-side name differs when a mapping applies
    Member {
        expectation: String,
        subject: String,
    },
    /// A collection index
    Index(usize),
    /// A dictionary key, already formatted (e.g. `"key"`)
    Key(String),
}

struct NodeData {
    parent: Option<Node>,
    segment: Segment,
    depth: usize,
    label: Option<String>,
}

/// An immutable breadcrumb. Children share their ancestors, so paths are
/// only ever extended going deeper.
#[derive(Clone)]
pub struct Node(Rc<NodeData>);

impl Node {
    /// The root node; `label` is the caller identifier, when known
    pub fn root(label: Option<String>) -> Self {
        Node(Rc::new(NodeData {
            parent: None,
            segment: Segment::Root,
            depth: 0,
            label,
        }))
    }

    fn child(&self, segment: Segment) -> Self {
        Node(Rc::new(NodeData {
            parent: Some(self.clone()),
            segment,
            depth: self.0.depth + 1,
            label: None,
        }))
    }

    pub fn member(&self, expectation_name: &str, subject_name: &str) -> Self {
        self.child(Segment::Member {
            expectation: expectation_name.to_string(),
            subject: subject_name.to_string(),
        })
    }

    pub fn collection_item(&self, index: usize) -> Self {
        self.child(Segment::Index(index))
    }

    pub fn dictionary_item(&self, formatted_key: String) -> Self {
        self.child(Segment::Key(formatted_key))
    }

    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    pub fn depth(&self) -> usize {
        self.0.depth
    }

    pub fn segment(&self) -> &Segment {
        &self.0.segment
    }

    pub fn parent(&self) -> Option<&Node> {
        self.0.parent.as_ref()
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Expectation-side member name of this node, if it is a member
    pub fn name(&self) -> Option<&str> {
        match &self.0.segment {
            Segment::Member { expectation, .. } => Some(expectation),
            _ => None,
        }
    }

    pub fn is_same_or_descendant_of(&self, ancestor: &Node) -> bool {
        let mut current = Some(self);
        while let Some(node) = current {
            if node.ptr_eq(ancestor) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    fn chain(&self) -> Vec<&Node> {
        let mut chain = Vec::with_capacity(self.depth() + 1);
        let mut current = Some(self);
        while let Some(node) = current {
            chain.push(node);
            current = node.parent();
        }
        chain.reverse();
        chain
    }

    fn root_label(&self) -> Option<&str> {
        let mut node = self;
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node.0.label.as_deref()
    }

    fn path(&self, subject_side: bool) -> String {
        let mut out = self.root_label().unwrap_or(DEFAULT_ROOT_LABEL).to_string();
        for node in self.chain() {
            match &node.0.segment {
                Segment::Root => {}
                Segment::Member {
                    expectation,
                    subject,
                } => {
                    out.push('.');
                    out.push_str(if subject_side { subject } else { expectation });
                }
                Segment::Index(index) => {
                    out.push_str(&format!("[{}]", index));
                }
                Segment::Key(key) => {
                    out.push('[');
                    out.push_str(key);
                    out.push(']');
                }
            }
        }
        out
    }

    /// Full subject-side path, e.g. `root.Orders[1].Lines["a"]`
    pub fn subject_path(&self) -> String {
        self.path(true)
    }

    /// Full expectation-side path
    pub fn expectation_path(&self) -> String {
        self.path(false)
    }

    /// What `{context:...}` resolves to: nothing at an unnamed root, the
    /// caller identifier at a named root, the subject path below the root.
    pub fn description(&self) -> Option<String> {
        if self.is_root() {
            self.0.label.clone()
        } else {
            Some(self.subject_path())
        }
    }

    /// Root-relative expectation path with every index and key collapsed to
    /// `[]`, e.g. `Orders[].Lines[]`. Used to match selection, ordering and
    /// mapping rules.
    pub fn member_path(&self) -> String {
        let mut out = String::new();
        for node in self.chain() {
            match &node.0.segment {
                Segment::Root => {}
                Segment::Member { expectation, .. } => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(expectation);
                }
                Segment::Index(_) | Segment::Key(_) => out.push_str("[]"),
            }
        }
        out
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.subject_path())
    }
}

/// Normalize a user-supplied member path: indices and keys become `[]` and
/// a leading `root.` is dropped.
pub fn normalize_member_path(path: &str) -> String {
    let trimmed = path.trim();
    let trimmed = trimmed
        .strip_prefix(DEFAULT_ROOT_LABEL)
        .filter(|rest| rest.is_empty() || rest.starts_with('.') || rest.starts_with('['))
        .map(|rest| rest.strip_prefix('.').unwrap_or(rest))
        .unwrap_or(trimmed);
    let mut out = String::with_capacity(trimmed.len());
    let mut in_brackets = false;
    for c in trimmed.chars() {
        match c {
            '[' => {
                in_brackets = true;
                out.push_str("[]");
            }
            ']' => in_brackets = false,
            _ if in_brackets => {}
            _ => out.push(c),
        }
    }
    out
}

/// `path` equals `ancestor` or lies below it.
pub fn path_is_same_or_below(path: &str, ancestor: &str) -> bool {
    if ancestor.is_empty() {
        return true;
    }
    match path.strip_prefix(ancestor) {
        Some("") => true,
        Some(rest) => rest.starts_with('.') || rest.starts_with('['),
        None => false,
    }
}
