//! Dynamic object-graph model
//!
//! The equivalency engine has no access to runtime reflection, so every
//! graph it compares is expressed as a [`Value`]. Inline variants carry value
//! semantics; [`ObjectRef`] is the only variant with identity and is what
//! makes shared and cyclic graphs expressible.

mod json;
pub mod ser;

pub use json::JSON_OBJECT_TYPE;
pub use ser::to_value;

use chrono::{DateTime, FixedOffset};
use std::borrow::Cow;
use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

// ========== Types ==========

/// Type descriptor used to tell declared (compile-time) types apart from
/// runtime types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Unknown or "any"; assignable from every type
    Object,
    Bool,
    Integer,
    Float,
    Char,
    String,
    DateTime,
    Enum(String),
    Sequence(Box<ValueType>),
    Dictionary(Box<ValueType>, Box<ValueType>),
    Record(String),
}

impl ValueType {
    pub fn sequence_of(element: ValueType) -> Self {
        ValueType::Sequence(Box::new(element))
    }

    pub fn dictionary_of(key: ValueType, value: ValueType) -> Self {
        ValueType::Dictionary(Box::new(key), Box::new(value))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, ValueType::Object)
    }

    pub fn is_enum(&self) -> bool {
        matches!(self, ValueType::Enum(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, ValueType::Sequence(_))
    }

    pub fn is_dictionary(&self) -> bool {
        matches!(self, ValueType::Dictionary(..))
    }

    /// Strings are scalars here and are never decomposed into characters.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            ValueType::Bool
                | ValueType::Integer
                | ValueType::Float
                | ValueType::Char
                | ValueType::String
                | ValueType::DateTime
        )
    }

    /// Whether a value of type `other` can be used where `self` is declared.
    pub fn is_assignable_from(&self, other: &ValueType) -> bool {
        match (self, other) {
            (ValueType::Object, _) => true,
            (ValueType::Sequence(a), ValueType::Sequence(b)) => a.is_assignable_from(b),
            (ValueType::Dictionary(ak, av), ValueType::Dictionary(bk, bv)) => {
                ak.is_assignable_from(bk) && av.is_assignable_from(bv)
            }
            _ => self == other,
        }
    }

    /// The single type shared by all `types`, or `Object` when they disagree
    /// or there are none.
    pub fn common(types: impl IntoIterator<Item = ValueType>) -> ValueType {
        let mut types = types.into_iter();
        let Some(first) = types.next() else {
            return ValueType::Object;
        };
        if types.all(|t| t == first) {
            first
        } else {
            ValueType::Object
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Object => f.write_str("object"),
            ValueType::Bool => f.write_str("bool"),
            ValueType::Integer => f.write_str("integer"),
            ValueType::Float => f.write_str("float"),
            ValueType::Char => f.write_str("char"),
            ValueType::String => f.write_str("string"),
            ValueType::DateTime => f.write_str("DateTime"),
            ValueType::Enum(name) | ValueType::Record(name) => f.write_str(name),
            ValueType::Sequence(element) => write!(f, "Sequence<{}>", element),
            ValueType::Dictionary(key, value) => write!(f, "Dictionary<{}, {}>", key, value),
        }
    }
}

// ========== Enums ==========

/// A value of an enumeration type.
///
/// Flag combinations carry their names joined by `", "` (e.g. `"Read, Write"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnumValue {
    type_name: String,
    name: Option<String>,
    value: i128,
}

impl EnumValue {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>, value: i128) -> Self {
        Self {
            type_name: type_name.into(),
            name: Some(name.into()),
            value,
        }
    }

    /// A numeric value with no symbolic name defined on the enum
    pub fn unnamed(type_name: impl Into<String>, value: i128) -> Self {
        Self {
            type_name: type_name.into(),
            name: None,
            value,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn value(&self) -> i128 {
        self.value
    }

    /// The symbolic name, or the number when there is none
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.value.to_string())
    }
}

// ========== Dictionary keys ==========

/// A hashable, totally ordered dictionary key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Null,
    Bool(bool),
    Integer(i128),
    Char(char),
    String(String),
    Enum(EnumValue),
}

impl Key {
    pub fn key_type(&self) -> ValueType {
        match self {
            Key::Null => ValueType::Object,
            Key::Bool(_) => ValueType::Bool,
            Key::Integer(_) => ValueType::Integer,
            Key::Char(_) => ValueType::Char,
            Key::String(_) => ValueType::String,
            Key::Enum(e) => ValueType::Enum(e.type_name.clone()),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Key::Null => Value::Null,
            Key::Bool(b) => Value::Bool(*b),
            Key::Integer(i) => Value::Integer(*i),
            Key::Char(c) => Value::Char(*c),
            Key::String(s) => Value::String(s.clone()),
            Key::Enum(e) => Value::Enum(e.clone()),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

impl From<char> for Key {
    fn from(c: char) -> Self {
        Key::Char(c)
    }
}

impl From<EnumValue> for Key {
    fn from(e: EnumValue) -> Self {
        Key::Enum(e)
    }
}

macro_rules! integer_key {
    ($($t:ty),*) => {
        $(impl From<$t> for Key {
            fn from(i: $t) -> Self {
                Key::Integer(i128::from(i))
            }
        })*
    };
}

integer_key!(i8, i16, i32, i64, u8, u16, u32, u64);

// ========== Sequences ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    List,
    Array,
    Set,
}

impl SequenceKind {
    /// Lists and arrays are ordered; sets are not.
    pub fn is_ordered(self) -> bool {
        !matches!(self, SequenceKind::Set)
    }
}

/// An enumerable collection of values.
///
/// Equality only looks at the items.
#[derive(Debug, Clone)]
pub struct Sequence {
    kind: SequenceKind,
    element_type: ValueType,
    items: Option<Vec<Value>>,
}

impl Sequence {
    pub fn new(kind: SequenceKind, element_type: ValueType, items: Vec<Value>) -> Self {
        Self {
            kind,
            element_type,
            items: Some(items),
        }
    }

    fn inferred<V: Into<Value>>(kind: SequenceKind, items: impl IntoIterator<Item = V>) -> Self {
        let items: Vec<Value> = items.into_iter().map(Into::into).collect();
        let element_type = element_type_of(&items);
        Self::new(kind, element_type, items)
    }

    /// An ordered list; the element type is inferred from the items
    pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::inferred(SequenceKind::List, items)
    }

    pub fn array<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::inferred(SequenceKind::Array, items)
    }

    /// An unordered collection; duplicates are kept
    pub fn set<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::inferred(SequenceKind::Set, items)
    }

    /// A default, never-initialized fixed-size array. It enumerates as empty.
    pub fn uninitialized(kind: SequenceKind, element_type: ValueType) -> Self {
        Self {
            kind,
            element_type,
            items: None,
        }
    }

    pub fn with_element_type(mut self, element_type: ValueType) -> Self {
        self.element_type = element_type;
        self
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    pub fn element_type(&self) -> &ValueType {
        &self.element_type
    }

    pub fn is_initialized(&self) -> bool {
        self.items.is_some()
    }

    pub fn items(&self) -> &[Value] {
        self.items.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.items.get_or_insert_with(Vec::new).push(value.into());
    }
}

impl PartialEq for Sequence {
    fn eq(&self, other: &Self) -> bool {
        self.items() == other.items()
    }
}

fn element_type_of(items: &[Value]) -> ValueType {
    ValueType::common(
        items
            .iter()
            .filter(|item| !item.is_null())
            .map(Value::runtime_type),
    )
}

// ========== Dictionaries ==========

/// One generic dictionary contract a dictionary type fulfils.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryInterface {
    key_type: ValueType,
    value_type: ValueType,
}

impl DictionaryInterface {
    pub fn new(key_type: ValueType, value_type: ValueType) -> Self {
        Self {
            key_type,
            value_type,
        }
    }

    pub fn key_type(&self) -> &ValueType {
        &self.key_type
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }
}

impl fmt::Display for DictionaryInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IDictionary<{}, {}>", self.key_type, self.value_type)
    }
}

/// A keyed collection. Entries are kept sorted by key so every walk over a
/// dictionary is deterministic.
#[derive(Debug, Clone)]
pub struct Dictionary {
    type_name: String,
    interfaces: Vec<DictionaryInterface>,
    entries: BTreeMap<Key, Value>,
}

impl Dictionary {
    pub fn new(key_type: ValueType, value_type: ValueType) -> Self {
        Self {
            type_name: "Dictionary".to_string(),
            interfaces: vec![DictionaryInterface::new(key_type, value_type)],
            entries: BTreeMap::new(),
        }
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Declare an additional dictionary contract on this type
    pub fn with_interface(mut self, key_type: ValueType, value_type: ValueType) -> Self {
        self.interfaces
            .push(DictionaryInterface::new(key_type, value_type));
        self
    }

    pub fn with_entry(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn interfaces(&self) -> &[DictionaryInterface] {
        &self.interfaces
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

// ========== Records ==========

#[derive(Debug, Clone)]
pub struct Member {
    name: String,
    value: Value,
    declared_type: ValueType,
}

impl Member {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn declared_type(&self) -> &ValueType {
        &self.declared_type
    }
}

/// An object with named members, compared member by member.
#[derive(Debug, Clone)]
pub struct Record {
    type_name: String,
    members: Vec<Member>,
}

impl Record {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            members: Vec::new(),
        }
    }

    /// Add or replace a member whose declared type is its runtime type
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Add or replace a member with an explicit declared type
    pub fn with_declared(
        mut self,
        name: impl Into<String>,
        declared_type: ValueType,
        value: impl Into<Value>,
    ) -> Self {
        let name = name.into();
        let value = value.into();
        match self.members.iter_mut().find(|m| m.name == name) {
            Some(member) => {
                member.value = value;
                member.declared_type = declared_type;
            }
            None => self.members.push(Member {
                name,
                value,
                declared_type,
            }),
        }
        self
    }

    /// Set a member's value, keeping its declared type when it already exists
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let value = value.into();
        let declared_type = value.runtime_type();
        self.set_typed(name.into(), value, declared_type);
    }

    /// `declared_type` only applies when the member is new
    fn set_typed(&mut self, name: String, value: Value, declared_type: ValueType) {
        match self.members.iter_mut().find(|m| m.name == name) {
            Some(member) => member.value = value,
            None => self.members.push(Member {
                name,
                value,
                declared_type,
            }),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.member(name).map(Member::value)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
            && self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .all(|m| other.get(&m.name) == Some(&m.value))
    }
}

// ========== Shared references ==========

/// A shared, mutable handle with reference identity.
///
/// Two handles are equal only when they point at the same allocation.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Value>>);

impl ObjectRef {
    pub fn new(value: impl Into<Value>) -> Self {
        ObjectRef(Rc::new(RefCell::new(value.into())))
    }

    /// Stable identity for the lifetime of the allocation
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn borrow(&self) -> Ref<'_, Value> {
        self.0.borrow()
    }

    pub fn replace(&self, value: impl Into<Value>) -> Value {
        self.0.replace(value.into())
    }

    /// Set a member on the referenced record. Returns `false` when the
    /// referenced value is not a record.
    pub fn set_member(&self, name: &str, value: impl Into<Value>) -> bool {
        // Typed before borrowing: the value may be this very handle.
        let value = value.into();
        let declared_type = value.runtime_type();
        match &mut *self.0.borrow_mut() {
            Value::Record(record) => {
                record.set_typed(name.to_string(), value, declared_type);
                true
            }
            _ => false,
        }
    }

    /// Append to the referenced sequence. Returns `false` when the
    /// referenced value is not a sequence.
    pub fn push(&self, value: impl Into<Value>) -> bool {
        match &mut *self.0.borrow_mut() {
            Value::Sequence(sequence) => {
                sequence.push(value);
                true
            }
            _ => false,
        }
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never descend: the target may point back at this handle.
        match self.0.try_borrow() {
            Ok(value) => write!(f, "ObjectRef(#{:x}: {})", self.id(), value.kind_name()),
            Err(_) => write!(f, "ObjectRef(#{:x}: <borrowed>)", self.id()),
        }
    }
}

// ========== Values ==========

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i128),
    Float(f64),
    Char(char),
    String(String),
    DateTime(DateTime<FixedOffset>),
    Enum(EnumValue),
    Sequence(Sequence),
    Dictionary(Dictionary),
    Record(Record),
    Object(ObjectRef),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The dynamic type; `Object` for null
    pub fn runtime_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Object,
            Value::Bool(_) => ValueType::Bool,
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::Char(_) => ValueType::Char,
            Value::String(_) => ValueType::String,
            Value::DateTime(_) => ValueType::DateTime,
            Value::Enum(e) => ValueType::Enum(e.type_name.clone()),
            Value::Sequence(s) => ValueType::sequence_of(s.element_type.clone()),
            Value::Dictionary(d) => match d.interfaces.first() {
                Some(i) => ValueType::dictionary_of(i.key_type.clone(), i.value_type.clone()),
                None => ValueType::dictionary_of(ValueType::Object, ValueType::Object),
            },
            Value::Record(r) => ValueType::Record(r.type_name.clone()),
            Value::Object(o) => referenced_type(o),
        }
    }

    /// Short name of the variant, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::DateTime(_) => "DateTime",
            Value::Enum(_) => "enum",
            Value::Sequence(_) => "sequence",
            Value::Dictionary(_) => "dictionary",
            Value::Record(_) => "record",
            Value::Object(_) => "object",
        }
    }

    /// Follow `ObjectRef` handles to the value they point at.
    ///
    /// Inline values are borrowed; referenced values are cloned one level
    /// deep (nested handles stay shared). A chain of handles that loops back
    /// on itself resolves to the last handle in the loop.
    pub fn resolved(&self) -> Cow<'_, Value> {
        let Value::Object(first) = self else {
            return Cow::Borrowed(self);
        };
        let mut seen = vec![first.id()];
        let mut current = first.borrow().clone();
        while let Value::Object(next) = &current {
            if seen.contains(&next.id()) {
                break;
            }
            seen.push(next.id());
            let inner = next.borrow().clone();
            current = inner;
        }
        Cow::Owned(current)
    }

    /// Identity of a reference-typed value
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Object(o) => Some(o.id()),
            _ => None,
        }
    }

    /// Both sides are the same shared reference
    pub fn same_reference(&self, other: &Value) -> bool {
        matches!((self, other), (Value::Object(a), Value::Object(b)) if a.ptr_eq(b))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }
}

fn referenced_type(handle: &ObjectRef) -> ValueType {
    let mut seen = vec![handle.id()];
    let mut current = handle.clone();
    loop {
        let next = match &*current.borrow() {
            Value::Object(next) if !seen.contains(&next.id()) => next.clone(),
            Value::Object(_) => return ValueType::Object,
            other => return other.runtime_type(),
        };
        seen.push(next.id());
        current = next;
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! integer_value {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(i: $t) -> Self {
                Value::Integer(i128::from(i))
            }
        })*
    };
}

integer_value!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        // usize is at most 64 bits on supported targets
        Value::Integer(i as i128)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(d: DateTime<FixedOffset>) -> Self {
        Value::DateTime(d)
    }
}

impl From<EnumValue> for Value {
    fn from(e: EnumValue) -> Self {
        Value::Enum(e)
    }
}

impl From<Sequence> for Value {
    fn from(s: Sequence) -> Self {
        Value::Sequence(s)
    }
}

impl From<Dictionary> for Value {
    fn from(d: Dictionary) -> Self {
        Value::Dictionary(d)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl From<Key> for Value {
    fn from(k: Key) -> Self {
        k.to_value()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(Sequence::list(items))
    }
}
